//! Chat-completion calls behind resume create, cover letters and field enhancement.

use serde_json::{Map, Value};
use tracing::info;

use crate::llm_client::{generate_structured, GenerationRequest, LlmError, TextGenerator};
use crate::resume::prompts::{
    cover_letter_prompt, enhance_system, resume_prompt, COVER_LETTER_SYSTEM,
    RESUME_BUILDER_SYSTEM,
};
use crate::resume::ResumeRequest;

/// Asks for full resume content as a JSON object.
pub async fn generate_resume_content(
    chat: &dyn TextGenerator,
    req: &ResumeRequest,
) -> Result<Map<String, Value>, LlmError> {
    let prompt = resume_prompt(
        req.name.as_deref(),
        req.content.as_ref(),
        req.job_description.as_deref().unwrap_or_default(),
    );
    let request = GenerationRequest::new(prompt)
        .system(RESUME_BUILDER_SYSTEM)
        .max_tokens(2000)
        .temperature(0.7)
        .json_mode();

    let generated = generate_structured::<Map<String, Value>>(chat, &request)
        .await?
        .structured()?;
    info!("Generated {} resume sections", generated.len());
    Ok(generated)
}

/// Shallow merge: generated keys overwrite the caller's.
pub fn merge_content(base: Option<Value>, generated: Map<String, Value>) -> Value {
    let mut merged = match base {
        Some(Value::Object(fields)) => fields,
        _ => Map::new(),
    };
    merged.extend(generated);
    Value::Object(merged)
}

pub async fn generate_cover_letter(
    chat: &dyn TextGenerator,
    name: &str,
    content: &Value,
    job_description: &str,
) -> Result<String, LlmError> {
    let request = GenerationRequest::new(cover_letter_prompt(name, content, job_description))
        .system(COVER_LETTER_SYSTEM)
        .max_tokens(1500)
        .temperature(0.6);
    chat.generate(&request).await
}

pub async fn enhance_field(
    chat: &dyn TextGenerator,
    field: &str,
    text: &str,
) -> Result<String, LlmError> {
    let request = GenerationRequest::new(text)
        .system(enhance_system(field))
        .max_tokens(500)
        .temperature(0.5);
    chat.generate(&request).await
}
