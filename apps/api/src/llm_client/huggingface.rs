use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::llm_client::{classify_status, GenerationRequest, LlmError, TextGenerator};

const HF_BASE: &str = "https://api-inference.huggingface.co/models";
const PROVIDER: &str = "Hugging Face";
const DEFAULT_MAX_NEW_TOKENS: u32 = 200;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const TOP_K: u32 = 50;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_k: u32,
    return_full_text: bool,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: Option<String>,
}

/// Hosted inference endpoint client (text-generation task).
#[derive(Clone)]
pub struct HuggingFaceClient {
    client: Client,
    api_key: Option<String>,
    model: Option<String>,
}

impl HuggingFaceClient {
    pub fn new(api_key: Option<String>, model: Option<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(60)).build()?,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let (Some(api_key), Some(configured_model)) = (&self.api_key, &self.model) else {
            return Err(LlmError::NotConfigured { provider: PROVIDER });
        };
        let model = request.model.as_deref().unwrap_or(configured_model);

        // The inference API has no system role; prepend it to the prompt.
        let inputs = match &request.system {
            Some(system) => format!("{system}\n\n{}", request.prompt),
            None => request.prompt.clone(),
        };

        let body = InferenceRequest {
            inputs: &inputs,
            parameters: InferenceParameters {
                max_new_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_NEW_TOKENS),
                temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                top_k: TOP_K,
                return_full_text: false,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let response = self
            .client
            .post(format!("{HF_BASE}/{model}"))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(model, status = status.as_u16(), "Hugging Face API error: {message}");
            return Err(classify_status(PROVIDER, model, status.as_u16(), message));
        }

        let generated: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|_| LlmError::UnexpectedResponse { provider: PROVIDER })?;

        first_generated_text(generated)
    }
}

fn first_generated_text(generated: Vec<GeneratedText>) -> Result<String, LlmError> {
    generated
        .into_iter()
        .next()
        .and_then(|g| g.generated_text)
        .filter(|t| !t.is_empty())
        .ok_or(LlmError::UnexpectedResponse { provider: PROVIDER })
}
