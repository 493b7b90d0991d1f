/// AI provider adapters behind one interface.
///
/// Three providers are wired: a hosted inference endpoint (Hugging Face), a
/// chat-completion API (OpenAI) and a generative-text API (Gemini). Each call
/// site picks one provider explicitly. There is no retry and no fallback
/// between providers; a failed call surfaces as `LlmError`.
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub mod gemini;
pub mod huggingface;
pub mod openai;
pub mod prompts;

pub use gemini::GeminiClient;
pub use huggingface::HuggingFaceClient;
pub use openai::OpenAiClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider} is not configured")]
    NotConfigured { provider: &'static str },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid {provider} API key")]
    InvalidApiKey { provider: &'static str },

    #[error("{provider} model \"{model}\" not found or inaccessible")]
    ModelNotFound {
        provider: &'static str,
        model: String,
    },

    #[error("{provider} API rate limit exceeded")]
    RateLimited { provider: &'static str },

    #[error("{provider} API error (status {status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Unexpected {provider} API response format")]
    UnexpectedResponse { provider: &'static str },

    #[error("Model output is not valid JSON")]
    NotJson,
}

impl LlmError {
    /// Message shown to API callers. Provider bodies and keys stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            LlmError::NotConfigured { provider } => {
                format!("{provider} is not configured. Set its API key in the environment.")
            }
            LlmError::InvalidApiKey { provider } => {
                format!("Invalid {provider} API key. Verify it in the environment.")
            }
            LlmError::ModelNotFound { provider, model } => format!(
                "{provider} model \"{model}\" not found or inaccessible. Check the configured model and your access permissions."
            ),
            LlmError::RateLimited { provider } => {
                format!("{provider} API rate limit exceeded. Try again later.")
            }
            LlmError::Http(e) if e.is_timeout() => "The AI provider timed out".to_string(),
            LlmError::Http(_) => "The AI provider could not be reached".to_string(),
            LlmError::Api { provider, status, .. } => {
                format!("{provider} API request failed with status {status}")
            }
            other => other.to_string(),
        }
    }
}

/// Maps a non-success provider status onto the error taxonomy.
pub(crate) fn classify_status(
    provider: &'static str,
    model: &str,
    status: u16,
    message: String,
) -> LlmError {
    match status {
        401 | 403 => LlmError::InvalidApiKey { provider },
        404 => LlmError::ModelNotFound {
            provider,
            model: model.to_string(),
        },
        429 => LlmError::RateLimited { provider },
        _ => LlmError::Api {
            provider,
            status,
            message,
        },
    }
}

/// One generation call. Knobs left `None` fall back to the provider default.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Ask the provider to enforce a JSON object response, where supported.
    pub json_mode: bool,
    /// Overrides the adapter's configured model.
    pub model: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable provider name used in error messages.
    fn provider(&self) -> &'static str;

    /// Returns the raw generated text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError>;
}

/// Result of asking a model for JSON: either it parsed, or the raw text is handed back.
#[derive(Debug, Clone, PartialEq)]
pub enum AiOutput<T> {
    Structured(T),
    RawText(String),
}

impl<T> AiOutput<T> {
    pub fn structured(self) -> Result<T, LlmError> {
        match self {
            AiOutput::Structured(value) => Ok(value),
            AiOutput::RawText(_) => Err(LlmError::NotJson),
        }
    }
}

/// Generates text and parses it with [`parse_model_output`].
pub async fn generate_structured<T: DeserializeOwned>(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
) -> Result<AiOutput<T>, LlmError> {
    debug!("Prompt sent to {}: {}", generator.provider(), request.prompt);
    let text = generator.generate(request).await?;
    debug!("Raw output from {}: {}", generator.provider(), text);
    Ok(parse_model_output(&text))
}

/// Strict parse, then fence-stripped parse, then the first balanced `{...}`.
/// Anything else comes back as `RawText` with the untouched model output.
pub fn parse_model_output<T: DeserializeOwned>(text: &str) -> AiOutput<T> {
    if let Ok(value) = serde_json::from_str::<T>(text) {
        return AiOutput::Structured(value);
    }

    let stripped = strip_json_fences(text);
    if let Ok(value) = serde_json::from_str::<T>(stripped) {
        return AiOutput::Structured(value);
    }

    if let Some(candidate) = extract_balanced_object(stripped) {
        match serde_json::from_str::<T>(candidate) {
            Ok(value) => return AiOutput::Structured(value),
            Err(e) => warn!("Extracted JSON block did not parse: {e}"),
        }
    } else {
        warn!("No JSON block found in model output");
    }

    AiOutput::RawText(text.to_string())
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Returns the first `{...}` span whose braces balance, ignoring braces inside
/// JSON string literals. Starts are tried left to right.
fn extract_balanced_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut start = 0;

    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (i, &b) in bytes.iter().enumerate().skip(open) {
            if in_string {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[open..=i]);
                    }
                }
                _ => {}
            }
        }

        start = open + 1;
    }

    None
}
