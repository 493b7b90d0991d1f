//! Raw prompt pass-through routes, one per provider.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::llm_client::{gemini, GenerationRequest};
use crate::state::AppState;

const HAIKU_SYSTEM: &str = "You are a helpful assistant that generates haikus.";
const HAIKU_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub prompt: Option<Value>,
}

fn prompt_text(req: PromptRequest) -> Result<String, AppError> {
    match req.prompt {
        Some(Value::String(prompt)) if !prompt.trim().is_empty() => Ok(prompt),
        _ => Err(AppError::BadRequest(
            "Prompt is required and must be a string".to_string(),
        )),
    }
}

/// POST /api/haiku
pub async fn handle_haiku(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PromptRequest>,
) -> Result<Json<Value>, AppError> {
    let prompt = prompt_text(req)?;
    let request = GenerationRequest::new(prompt)
        .system(HAIKU_SYSTEM)
        .model(HAIKU_MODEL)
        .max_tokens(50);
    let haiku = state.chat.generate(&request).await?;
    Ok(Json(json!({ "success": true, "haiku": haiku })))
}

/// POST /api/huggingface
pub async fn handle_huggingface(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PromptRequest>,
) -> Result<Json<Value>, AppError> {
    let prompt = prompt_text(req)?;
    let generated = state
        .inference
        .generate(&GenerationRequest::new(prompt).max_tokens(100))
        .await?;
    Ok(Json(json!({ "success": true, "generated_text": generated })))
}

/// POST /api/gemini
pub async fn handle_gemini(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PromptRequest>,
) -> Result<Json<Value>, AppError> {
    let prompt = prompt_text(req)?;
    let response = state
        .generative
        .generate(&GenerationRequest::new(prompt.clone()).model(gemini::DEFAULT_MODEL))
        .await?;
    Ok(Json(json!({ "success": true, "prompt": prompt, "response": response })))
}
