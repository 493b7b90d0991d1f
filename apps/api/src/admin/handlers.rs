//! Admin console routes. Every handler takes `AdminUser`, so the role gate
//! runs before any body is read.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::handlers::remove_account;
use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::models::account::{ROLE_ADMIN, ROLE_USER};
use crate::resume::generation::enhance_field;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleChange {
    pub user_id: Uuid,
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentFilter {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdate {
    pub template_id: String,
    pub template_data: Value,
}

/// GET /api/admin/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Value>, AppError> {
    let users = state.accounts.list_accounts().await?;
    Ok(Json(json!({ "users": users })))
}

/// POST /api/admin/user/delete
pub async fn handle_delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiJson(req): ApiJson<UserRef>,
) -> Result<Json<Value>, AppError> {
    if !remove_account(&state, req.user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    info!("Admin {} deleted account {}", admin.account.id, req.user_id);

    Ok(Json(json!({ "message": "User deleted" })))
}

/// POST /api/admin/user/analyze
pub async fn handle_analyze_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<UserRef>,
) -> Result<Json<Value>, AppError> {
    let resumes = state.resumes.list_resumes(req.user_id).await?;
    let serialized = serde_json::to_string(&resumes).map_err(anyhow::Error::from)?;
    let analysis = enhance_field(state.chat.as_ref(), "userAnalysis", &serialized).await?;

    Ok(Json(json!({ "analysis": analysis })))
}

/// POST /api/admin/user/role
pub async fn handle_set_role(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiJson(req): ApiJson<RoleChange>,
) -> Result<Json<Value>, AppError> {
    let role = req.role.trim().to_lowercase();
    if role != ROLE_USER && role != ROLE_ADMIN {
        return Err(AppError::Validation(vec![format!(
            "role must be \"{ROLE_USER}\" or \"{ROLE_ADMIN}\""
        )]));
    }

    let account = state
        .accounts
        .set_role(req.user_id, &role)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    info!("Admin {} set role of {} to {role}", admin.account.id, account.id);

    Ok(Json(json!({ "message": "Role updated", "user": account })))
}

/// GET /api/admin/payments
pub async fn handle_list_payments(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(filter): Query<PaymentFilter>,
) -> Result<Json<Value>, AppError> {
    let payments = state.payments.list_payments(filter.user_id).await?;
    Ok(Json(json!({ "payments": payments })))
}

/// POST /api/admin/template
///
/// Shallow merge: top-level keys in `templateData` replace stored ones.
pub async fn handle_update_template(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<TemplateUpdate>,
) -> Result<Json<Value>, AppError> {
    let template_id = req.template_id.trim();
    if template_id.is_empty() {
        return Err(AppError::Validation(vec!["templateId is required".to_string()]));
    }
    if !req.template_data.is_object() {
        return Err(AppError::Validation(vec![
            "templateData must be an object".to_string(),
        ]));
    }

    let template = state
        .templates
        .merge_template(template_id, req.template_data)
        .await?;

    Ok(Json(json!({ "message": "Template updated", "template": template })))
}
