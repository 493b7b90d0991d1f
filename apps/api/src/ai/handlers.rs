use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::ai::ai_output_body;
use crate::ai::prompts::{ats_check_prompt, generate_resume_prompt, CandidateDetails};
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::llm_client::{generate_structured, GenerationRequest};
use crate::state::AppState;

const DEFAULT_NAME: &str = "John Doe";
const DEFAULT_TITLE: &str = "Software Engineer";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateResumeRequest {
    pub name: Option<String>,
    pub title: Option<String>,
    pub experience: Vec<Value>,
    pub skills: Vec<String>,
    pub education: Vec<Value>,
    pub target_role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AtsCheckRequest {
    pub resume_text: String,
    pub resume_fields: Option<Value>,
    pub job_description: String,
}

fn inference_request(prompt: String) -> GenerationRequest {
    GenerationRequest::new(prompt).max_tokens(300).temperature(0.2)
}

/// POST /api/ai/generate-resume
///
/// Unparseable model output is a 200 with `ok: false` and the raw text.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GenerateResumeRequest>,
) -> Result<Json<Value>, AppError> {
    let name = req.name.as_deref().unwrap_or(DEFAULT_NAME);
    let title = req.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let target_role = req.target_role.as_deref().unwrap_or(title);

    let prompt = generate_resume_prompt(&CandidateDetails {
        name,
        title,
        target_role,
        skills: &req.skills,
        education: &req.education,
        experience: &req.experience,
    });
    let output = generate_structured::<Value>(state.inference.as_ref(), &inference_request(prompt)).await?;

    Ok(Json(ai_output_body(output, "resume")))
}

/// POST /api/ai/ats-check
pub async fn handle_ats_check(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AtsCheckRequest>,
) -> Result<Json<Value>, AppError> {
    if req.job_description.trim().is_empty() {
        return Err(AppError::BadRequest("jobDescription required".to_string()));
    }

    let resume = match &req.resume_fields {
        Some(fields) if !fields.is_null() => fields.to_string(),
        _ => req.resume_text.clone(),
    };
    let prompt = ats_check_prompt(&req.job_description, &resume);
    let output = generate_structured::<Value>(state.inference.as_ref(), &inference_request(prompt)).await?;

    Ok(Json(ai_output_body(output, "result")))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::testing::{json_request, send, TestApp};

    #[tokio::test]
    async fn test_prose_output_degrades_to_raw_text() {
        let app = TestApp::new();
        app.inference.reply("Here is a great resume for you, no JSON though.");

        let (status, body) = send(
            app.router(),
            json_request(Method::POST, "/api/ai/generate-resume", Some(json!({"name": "Ada"}))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], false);
        assert_eq!(body["raw"], "Here is a great resume for you, no JSON though.");
        assert_eq!(body["message"], "Model output is not valid JSON");
    }

    #[tokio::test]
    async fn test_generate_resume_applies_defaults_and_knobs() {
        let app = TestApp::new();
        app.inference
            .reply(r#"Sure: {"name": "John Doe", "skills": ["Go"]} enjoy"#);

        let (status, body) = send(
            app.router(),
            json_request(Method::POST, "/api/ai/generate-resume", Some(json!({}))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["resume"]["skills"], json!(["Go"]));

        let requests = app.inference.requests();
        assert_eq!(requests[0].max_tokens, Some(300));
        assert_eq!(requests[0].temperature, Some(0.2));
        assert!(requests[0].prompt.contains("Name: John Doe\n"));
        assert!(requests[0].prompt.contains("Target role: Software Engineer\n"));
    }

    #[tokio::test]
    async fn test_ats_check_requires_job_description() {
        let app = TestApp::new();
        let (status, _) = send(
            app.router(),
            json_request(
                Method::POST,
                "/api/ai/ats-check",
                Some(json!({"resumeText": "Rust"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(app.inference.requests().is_empty());
    }

    #[tokio::test]
    async fn test_ats_check_prefers_resume_fields() {
        let app = TestApp::new();
        app.inference.reply(r#"{"score": 82, "missingKeywords": ["k8s"]}"#);

        let (status, body) = send(
            app.router(),
            json_request(
                Method::POST,
                "/api/ai/ats-check",
                Some(json!({
                    "resumeText": "ignored",
                    "resumeFields": {"skills": ["Rust"]},
                    "jobDescription": "Rust and k8s"
                })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["score"], 82);
        let prompt = &app.inference.requests()[0].prompt;
        assert!(prompt.contains(r#"{"skills":["Rust"]}"#));
        assert!(!prompt.contains("ignored"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_bad_gateway() {
        let app = TestApp::new();
        app.inference.fail_with_status(404);
        let (status, body) = send(
            app.router(),
            json_request(Method::POST, "/api/ai/generate-resume", Some(json!({}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("not found or inaccessible"));
    }
}
