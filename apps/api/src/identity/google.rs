use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::identity::{FederatedIdentity, FederatedVerifier, IdentityError};

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    email: Option<String>,
    /// Google returns this as the string "true"/"false".
    email_verified: Option<String>,
    name: Option<String>,
}

/// Verifies Google ID tokens against Google's `tokeninfo` endpoint.
#[derive(Clone)]
pub struct GoogleTokenVerifier {
    client: Client,
    client_id: Option<String>,
}

impl GoogleTokenVerifier {
    pub fn new(client_id: Option<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            client_id,
        })
    }
}

fn check_token_info(
    info: TokenInfo,
    expected_audience: Option<&str>,
) -> Result<FederatedIdentity, IdentityError> {
    if let Some(expected) = expected_audience {
        if info.aud != expected {
            return Err(IdentityError::InvalidToken(
                "token was issued for another client".to_string(),
            ));
        }
    }
    if info.email_verified.as_deref() == Some("false") {
        return Err(IdentityError::InvalidToken("email is not verified".to_string()));
    }
    let email = info
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| IdentityError::InvalidToken("token carries no email".to_string()))?;

    Ok(FederatedIdentity {
        email,
        name: info.name,
    })
}

#[async_trait]
impl FederatedVerifier for GoogleTokenVerifier {
    async fn verify_id_token(&self, token: &str) -> Result<FederatedIdentity, IdentityError> {
        let response = self
            .client
            .get(TOKENINFO_URL)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            warn!("Google tokeninfo rejected token: {}", response.status());
            return Err(IdentityError::InvalidToken("Google rejected the token".to_string()));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        check_token_info(info, self.client_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(aud: &str, verified: Option<&str>, email: Option<&str>) -> TokenInfo {
        TokenInfo {
            aud: aud.to_string(),
            email: email.map(str::to_string),
            email_verified: verified.map(str::to_string),
            name: Some("Ada".to_string()),
        }
    }

    #[test]
    fn test_audience_mismatch_is_rejected() {
        let result = check_token_info(info("other", Some("true"), Some("a@b.com")), Some("mine"));
        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[test]
    fn test_unverified_email_is_rejected() {
        let result = check_token_info(info("mine", Some("false"), Some("a@b.com")), Some("mine"));
        assert!(result.is_err());
    }

    #[test]
    fn test_valid_token_info_maps_claims() {
        let identity =
            check_token_info(info("mine", Some("true"), Some("a@b.com")), Some("mine")).unwrap();
        assert_eq!(identity.email, "a@b.com");
        assert_eq!(identity.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_audience_is_unchecked_without_client_id() {
        assert!(check_token_info(info("anything", None, Some("a@b.com")), None).is_ok());
    }
}
