//! Public AI routes: resume drafting, ATS checks and the raw prompt playground.

pub mod handlers;
pub mod playground;
pub mod prompts;

use serde_json::{json, Value};

use crate::llm_client::AiOutput;

/// Maps a parse outcome onto `{ok: true, <key>: ...}` or the flagged raw-text body.
pub fn ai_output_body(output: AiOutput<Value>, key: &str) -> Value {
    match output {
        AiOutput::Structured(value) => {
            let mut body = json!({ "ok": true });
            body[key] = value;
            body
        }
        AiOutput::RawText(raw) => json!({
            "ok": false,
            "raw": raw,
            "message": "Model output is not valid JSON",
        }),
    }
}
