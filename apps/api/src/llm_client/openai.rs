use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::llm_client::{classify_status, GenerationRequest, LlmError, TextGenerator};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const PROVIDER: &str = "OpenAI";
const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completion client. `json_mode` maps to `response_format: json_object`.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, model: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(60)).build()?,
            api_key,
            model,
        })
    }
}

fn build_request<'a>(model: &'a str, request: &'a GenerationRequest) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &request.system {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &request.prompt,
    });

    ChatRequest {
        model,
        messages,
        temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        max_tokens: request.max_tokens,
        response_format: request
            .json_mode
            .then(|| json!({ "type": "json_object" })),
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let Some(api_key) = &self.api_key else {
            return Err(LlmError::NotConfigured { provider: PROVIDER });
        };
        let model = request.model.as_deref().unwrap_or(&self.model);

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(api_key)
            .json(&build_request(model, request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!(model, status = status.as_u16(), "OpenAI API error: {message}");
            return Err(classify_status(PROVIDER, model, status.as_u16(), message));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|_| LlmError::UnexpectedResponse { provider: PROVIDER })?;

        if let Some(usage) = &chat.usage {
            debug!(
                "OpenAI call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::UnexpectedResponse { provider: PROVIDER })
    }
}
