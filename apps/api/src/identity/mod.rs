//! Identity provider adapter: credential records, federated (Google) ID token
//! verification and the LinkedIn OAuth exchange.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod google;
pub mod linkedin;
pub mod local;

pub use google::GoogleTokenVerifier;
pub use linkedin::LinkedInClient;
pub use local::PgIdentityProvider;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Email already in use")]
    EmailInUse,

    #[error("{0}")]
    WeakPassword(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Identity not found")]
    NotFound,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Identity provider error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    Hash(String),
}

/// An identity record. Its id doubles as the account id.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an identity; `password` is `None` for passwordless (OTP/federated) sign-ups.
    async fn create_identity(
        &self,
        email: &str,
        password: Option<&str>,
    ) -> Result<Identity, IdentityError>;
    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, IdentityError>;
    async fn verify_password(&self, email: &str, password: &str) -> Result<Identity, IdentityError>;
    async fn set_password(&self, id: Uuid, password: &str) -> Result<(), IdentityError>;
    async fn delete_identity(&self, id: Uuid) -> Result<(), IdentityError>;
}

/// Returns the identity for `email`, creating a passwordless one when absent.
pub async fn find_or_create_identity(
    provider: &dyn IdentityProvider,
    email: &str,
) -> Result<Identity, IdentityError> {
    match provider.find_identity_by_email(email).await? {
        Some(identity) => Ok(identity),
        None => provider.create_identity(email, None).await,
    }
}

pub fn check_password_strength(password: &str) -> Result<(), IdentityError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(IdentityError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Claims taken from a verified federated ID token.
#[derive(Debug, Clone, PartialEq)]
pub struct FederatedIdentity {
    pub email: String,
    pub name: Option<String>,
}

#[async_trait]
pub trait FederatedVerifier: Send + Sync {
    async fn verify_id_token(&self, token: &str) -> Result<FederatedIdentity, IdentityError>;
}

/// LinkedIn OpenID `userinfo` profile, stored verbatim on the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedInProfile {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

#[async_trait]
pub trait OAuthExchange: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<String, IdentityError>;
    async fn fetch_profile(&self, access_token: &str) -> Result<LinkedInProfile, IdentityError>;
}
