use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{AdminUser, AuthUser};
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::identity::{check_password_strength, find_or_create_identity, IdentityError};
use crate::models::account::{Account, AccountSummary, NewAccount, SignInProvider};
use crate::models::otp::OtpChallenge;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LinkedInCallback {
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: Option<String>,
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Issues the session token and the `{token, user}` body every sign-in returns.
fn session_body(state: &AppState, account: &Account) -> Result<Value, AppError> {
    let token = state
        .sessions
        .issue(account.id)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign session token: {e}")))?;
    Ok(json!({
        "token": token,
        "user": AccountSummary::from(account),
    }))
}

async fn load_account(state: &AppState, id: Uuid) -> Result<Account, AppError> {
    state
        .accounts
        .get_account(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// POST /api/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let (Some(email), Some(password), Some(full_name)) = (
        required(req.email),
        req.password.filter(|p| !p.is_empty()),
        required(req.full_name),
    ) else {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    };
    check_password_strength(&password)?;

    let email = normalize_email(&email);
    let identity = state.identity.create_identity(&email, Some(&password)).await?;
    let account = state
        .accounts
        .upsert_account(NewAccount {
            id: identity.id,
            email,
            full_name: Some(full_name),
            provider: SignInProvider::Password,
            linked_in_data: None,
        })
        .await?;

    info!("Signed up account {}", account.id);
    Ok((StatusCode::CREATED, Json(session_body(&state, &account)?)))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(email), Some(password)) = (required(req.email), req.password) else {
        return Err(AppError::BadRequest("Email and password are required".to_string()));
    };

    let identity = state
        .identity
        .verify_password(&normalize_email(&email), &password)
        .await?;
    let account = match state.accounts.get_account(identity.id).await? {
        Some(account) => account,
        None => {
            state
                .accounts
                .upsert_account(NewAccount {
                    id: identity.id,
                    email: identity.email,
                    full_name: None,
                    provider: SignInProvider::Password,
                    linked_in_data: None,
                })
                .await?
        }
    };

    Ok(Json(session_body(&state, &account)?))
}

/// POST /api/auth/send-otp
///
/// There is no mail transport; the code is only written to the server log.
pub async fn handle_send_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SendOtpRequest>,
) -> Result<Json<Value>, AppError> {
    let email = required(req.email)
        .map(|e| normalize_email(&e))
        .ok_or_else(|| AppError::BadRequest("Email is required".to_string()))?;

    let code = rand::thread_rng().gen_range(100_000..=999_999).to_string();
    state
        .otps
        .put_otp(OtpChallenge::issue(&email, code.clone(), Utc::now()))
        .await?;
    info!("OTP for {email}: {code}");

    Ok(Json(json!({ "message": "OTP sent" })))
}

/// POST /api/auth/verify-otp
pub async fn handle_verify_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<VerifyOtpRequest>,
) -> Result<Json<Value>, AppError> {
    let invalid = || AppError::BadRequest("Invalid or expired OTP".to_string());
    let (Some(email), Some(otp)) = (required(req.email), required(req.otp)) else {
        return Err(invalid());
    };
    let email = normalize_email(&email);

    let challenge = state.otps.get_otp(&email).await?.ok_or_else(invalid)?;
    if challenge.code != otp || challenge.is_expired(Utc::now()) {
        warn!("Rejected OTP for {email}");
        return Err(invalid());
    }
    state.otps.delete_otp(&email).await?;

    let identity = find_or_create_identity(state.identity.as_ref(), &email).await?;
    let account = state
        .accounts
        .upsert_account(NewAccount {
            id: identity.id,
            email,
            full_name: None,
            provider: SignInProvider::Otp,
            linked_in_data: None,
        })
        .await?;

    Ok(Json(session_body(&state, &account)?))
}

/// POST /api/auth/google-login
pub async fn handle_google_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GoogleLoginRequest>,
) -> Result<Json<Value>, AppError> {
    let invalid = || AppError::Unauthorized("Invalid Google token".to_string());
    let token = required(req.token).ok_or_else(invalid)?;

    let federated = match state.google.verify_id_token(&token).await {
        Ok(federated) => federated,
        Err(IdentityError::InvalidToken(reason)) => {
            warn!("Google token rejected: {reason}");
            return Err(invalid());
        }
        Err(other) => return Err(other.into()),
    };

    let email = normalize_email(&federated.email);
    let identity = find_or_create_identity(state.identity.as_ref(), &email).await?;
    let account = state
        .accounts
        .upsert_account(NewAccount {
            id: identity.id,
            email,
            full_name: federated.name,
            provider: SignInProvider::Google,
            linked_in_data: None,
        })
        .await?;

    Ok(Json(session_body(&state, &account)?))
}

/// GET /api/auth/linkedin/callback
///
/// Success redirects to the client login page with the session token.
pub async fn handle_linkedin_callback(
    State(state): State<AppState>,
    Query(params): Query<LinkedInCallback>,
) -> Result<Response, AppError> {
    let code = required(params.code)
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let access_token = state.linkedin.exchange_code(&code).await?;
    let profile = state.linkedin.fetch_profile(&access_token).await?;
    let email = profile
        .email
        .as_deref()
        .map(normalize_email)
        .ok_or_else(|| AppError::upstream("identity", "LinkedIn profile has no email"))?;

    let identity = find_or_create_identity(state.identity.as_ref(), &email).await?;
    let account = state
        .accounts
        .upsert_account(NewAccount {
            id: identity.id,
            email,
            full_name: profile.name.clone(),
            provider: SignInProvider::Linkedin,
            linked_in_data: Some(serde_json::to_value(&profile).map_err(anyhow::Error::from)?),
        })
        .await?;

    let token = state
        .sessions
        .issue(account.id)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign session token: {e}")))?;
    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, format!("/login?token={token}"))],
    )
        .into_response())
}

/// GET /api/auth/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Account>, AppError> {
    Ok(Json(load_account(&state, user.account_id).await?))
}

/// PUT /api/auth/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<ProfileUpdate>,
) -> Result<Json<Value>, AppError> {
    let full_name = required(req.full_name)
        .ok_or_else(|| AppError::Validation(vec!["fullName is required".to_string()]))?;
    state
        .accounts
        .update_full_name(user.account_id, &full_name)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({ "message": "Profile updated" })))
}

/// GET /api/auth/linkedin-data
pub async fn handle_linkedin_data(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let account = load_account(&state, user.account_id).await?;
    Ok(Json(account.linked_in_data.unwrap_or_else(|| json!({}))))
}

/// PUT /api/auth/change-password
pub async fn handle_change_password(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> Result<Json<Value>, AppError> {
    let password = req
        .new_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation(vec!["newPassword is required".to_string()]))?;
    check_password_strength(&password)?;
    state.identity.set_password(user.account_id, &password).await?;

    Ok(Json(json!({ "message": "Password changed" })))
}

/// Deletes the identity and the account for `id`, tolerating either one
/// already being gone. Returns `false` only when neither record existed.
pub(crate) async fn remove_account(state: &AppState, id: Uuid) -> Result<bool, AppError> {
    let had_identity = match state.identity.delete_identity(id).await {
        Ok(()) => true,
        Err(IdentityError::NotFound) => false,
        Err(other) => return Err(other.into()),
    };
    let had_account = state.accounts.delete_account(id).await?;
    if had_identity != had_account {
        warn!("Account {id} was only partially present (identity: {had_identity}, account: {had_account})");
    }
    Ok(had_identity || had_account)
}

/// DELETE /api/auth/delete-account
///
/// The caller's resumes and payments are left in place.
pub async fn handle_delete_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    if !remove_account(&state, user.account_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    info!("Deleted account {}", user.account_id);

    Ok(Json(json!({ "message": "User account deleted" })))
}

/// POST /api/auth/logout
pub async fn handle_logout() -> Json<Value> {
    Json(json!({ "message": "Logout successful (client should delete token)" }))
}

/// GET /api/auth/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Value>, AppError> {
    let users = state.accounts.list_accounts().await?;
    Ok(Json(json!({ "success": true, "users": users })))
}
