use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::models::resume::{NewResume, Resume, ResumePatch};
use crate::ownership::owned_resume;
use crate::pdf::render_resume_pdf;
use crate::resume::generation::{
    enhance_field, generate_cover_letter, generate_resume_content, merge_content,
};
use crate::resume::validation::{validate_resume_request, ValidationMode};
use crate::resume::ResumeRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    pub field: Option<String>,
    pub text: Option<String>,
    pub resume_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfRequest {
    pub resume_id: Uuid,
    pub html_content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterRequest {
    pub resume_id: Uuid,
    #[serde(default)]
    pub job_description: String,
}

/// `{id, ...resume, message}`
fn resume_body(resume: &Resume, message: &str) -> Result<Value, AppError> {
    let mut body = serde_json::to_value(resume).map_err(anyhow::Error::from)?;
    body["message"] = json!(message);
    Ok(body)
}

/// POST /api/resume (also /api/resume/generate)
pub async fn handle_create_resume(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<ResumeRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let errors = validate_resume_request(&req, ValidationMode::Create);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let content = if req.generate_with_ai {
        let generated = generate_resume_content(state.chat.as_ref(), &req).await?;
        merge_content(req.content.clone(), generated)
    } else {
        req.content.clone().unwrap_or_else(|| json!({}))
    };

    let resume = state
        .resumes
        .create_resume(NewResume {
            user_id: user.account_id,
            name: req.name.unwrap_or_default(),
            content,
            tags: req.tags.unwrap_or_default(),
            job_description: req.job_description,
        })
        .await?;

    let message = if req.generate_with_ai {
        "Resume created with AI assistance"
    } else {
        "Resume created successfully"
    };
    Ok((StatusCode::CREATED, Json(resume_body(&resume, message)?)))
}

/// GET /api/resume
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let resumes = state.resumes.list_resumes(user.account_id).await?;
    Ok(Json(json!({
        "count": resumes.len(),
        "resumes": resumes,
    })))
}

/// PUT /api/resume/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ResumeRequest>,
) -> Result<Json<Value>, AppError> {
    let errors = validate_resume_request(&req, ValidationMode::Update);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    owned_resume(state.resumes.as_ref(), id, user.account_id).await?;

    let patch = ResumePatch {
        name: req.name,
        content: req.content.filter(|c| !c.is_null()),
        tags: req.tags,
        job_description: req.job_description,
        ..Default::default()
    };
    let resume = state
        .resumes
        .update_resume(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    Ok(Json(resume_body(&resume, "Resume updated successfully")?))
}

/// DELETE /api/resume/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    owned_resume(state.resumes.as_ref(), id, user.account_id).await?;
    state.resumes.delete_resume(id).await?;
    info!("Deleted resume {id}");

    Ok(Json(json!({
        "message": "Resume deleted successfully",
        "deletedId": id,
    })))
}

/// POST /api/resume/enhance
///
/// Nothing is persisted; the caller re-saves the enhanced text if wanted.
pub async fn handle_enhance_field(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<EnhanceRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(field), Some(text)) = (
        req.field.filter(|f| !f.trim().is_empty()),
        req.text.filter(|t| !t.trim().is_empty()),
    ) else {
        return Err(AppError::BadRequest("Field and text are required".to_string()));
    };

    if let Some(resume_id) = req.resume_id {
        owned_resume(state.resumes.as_ref(), resume_id, user.account_id).await?;
    }

    let enhanced = enhance_field(state.chat.as_ref(), &field, &text).await?;
    Ok(Json(json!({
        "field": field,
        "original": text,
        "enhanced": enhanced,
    })))
}

/// POST /api/resume/pdf
pub async fn handle_generate_pdf(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<PdfRequest>,
) -> Result<Response, AppError> {
    let resume = owned_resume(state.resumes.as_ref(), req.resume_id, user.account_id).await?;
    let html = req
        .html_content
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("htmlContent is required".to_string()))?;

    let pdf = render_resume_pdf(
        state.pdf.as_ref(),
        state.payments.as_ref(),
        user.account_id,
        resume.id,
        &html,
    )
    .await?;

    state
        .resumes
        .update_resume(
            resume.id,
            ResumePatch {
                last_generated_pdf: Some(Utc::now()),
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;
    info!("Wrote {}", pdf.path.display());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}.pdf", resume.id),
            ),
        ],
        Bytes::from(pdf.bytes),
    )
        .into_response())
}

/// POST /api/resume/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CoverLetterRequest>,
) -> Result<Json<Value>, AppError> {
    let resume = owned_resume(state.resumes.as_ref(), req.resume_id, user.account_id).await?;

    let letter = generate_cover_letter(
        state.chat.as_ref(),
        &resume.name,
        &resume.content,
        &req.job_description,
    )
    .await?;

    state
        .resumes
        .update_resume(
            resume.id,
            ResumePatch {
                last_cover_letter: Some(letter.clone()),
                last_cover_letter_generated: Some(Utc::now()),
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    Ok(Json(json!({ "coverLetter": letter })))
}
