pub mod generation;
pub mod handlers;
pub mod prompts;
pub mod validation;

use serde::Deserialize;
use serde_json::Value;

/// Body of resume create and update requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRequest {
    pub name: Option<String>,
    pub content: Option<Value>,
    pub tags: Option<Vec<String>>,
    pub job_description: Option<String>,
    #[serde(default, rename = "generateWithAI")]
    pub generate_with_ai: bool,
}
