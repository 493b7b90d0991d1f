use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::llm_client::{classify_status, GenerationRequest, LlmError, TextGenerator};

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const PROVIDER: &str = "Gemini";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Generative-text client (`generateContent`).
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            api_key,
        })
    }
}

fn build_request(request: &GenerationRequest) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        system_instruction: request.system.as_deref().map(|text| Content {
            parts: vec![Part { text }],
        }),
        generation_config: GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
            response_mime_type: request.json_mode.then_some("application/json"),
        },
    }
}

fn response_text(response: GenerateContentResponse) -> Result<String, LlmError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(LlmError::UnexpectedResponse { provider: PROVIDER });
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let Some(api_key) = &self.api_key else {
            return Err(LlmError::NotConfigured { provider: PROVIDER });
        };
        let model = request.model.as_deref().unwrap_or(DEFAULT_MODEL);

        let response = self
            .client
            .post(format!("{GEMINI_BASE}/{model}:generateContent"))
            .header("x-goog-api-key", api_key.as_str())
            .json(&build_request(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(model, status = status.as_u16(), "Gemini API error: {message}");
            return Err(classify_status(PROVIDER, model, status.as_u16(), message));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|_| LlmError::UnexpectedResponse { provider: PROVIDER })?;
        response_text(body)
    }
}
