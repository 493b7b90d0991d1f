//! Authentication and role gates as Axum extractors.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::account::Account;
use crate::state::AppState;

/// The caller's account id, resolved from a valid bearer session token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub account_id: Uuid,
}

/// An authenticated caller whose stored role is `admin`.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub account: Account,
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

    header
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized(
                "Invalid Authorization format (expected: Bearer <token>)".to_string(),
            )
        })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state
            .sessions
            .verify(token)
            .map_err(|_| AppError::Unauthorized("Invalid or expired session token".to_string()))?;
        Ok(AuthUser {
            account_id: claims.sub,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let account = state
            .accounts
            .get_account(user.account_id)
            .await?
            .filter(Account::is_admin)
            .ok_or_else(|| AppError::Forbidden("Admin access required".to_string()))?;
        Ok(AdminUser { account })
    }
}
