use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A versioned resume document. `content` is free-form JSON
/// (summary, experience, education, skills, plus anything AI generation merges in).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub content: Value,
    pub tags: Vec<String>,
    pub job_description: Option<String>,
    pub version: i32,
    #[serde(rename = "lastGeneratedPDF")]
    pub last_generated_pdf: Option<DateTime<Utc>>,
    pub last_cover_letter: Option<String>,
    pub last_cover_letter_generated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewResume {
    pub user_id: Uuid,
    pub name: String,
    pub content: Value,
    pub tags: Vec<String>,
    pub job_description: Option<String>,
}

/// Top-level partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ResumePatch {
    pub name: Option<String>,
    pub content: Option<Value>,
    pub tags: Option<Vec<String>>,
    pub job_description: Option<String>,
    pub last_generated_pdf: Option<DateTime<Utc>>,
    pub last_cover_letter: Option<String>,
    pub last_cover_letter_generated: Option<DateTime<Utc>>,
}
