use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::error;

use crate::identity::{IdentityError, LinkedInProfile, OAuthExchange};

const ACCESS_TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";
const USERINFO_URL: &str = "https://api.linkedin.com/v2/userinfo";

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

/// LinkedIn "Sign In with LinkedIn using OpenID Connect" client.
#[derive(Clone)]
pub struct LinkedInClient {
    client: Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: String,
}

impl LinkedInClient {
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_uri: String,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            client_id,
            client_secret,
            redirect_uri,
        })
    }
}

#[async_trait]
impl OAuthExchange for LinkedInClient {
    async fn exchange_code(&self, code: &str) -> Result<String, IdentityError> {
        let (Some(client_id), Some(client_secret)) = (&self.client_id, &self.client_secret) else {
            return Err(IdentityError::Upstream("LinkedIn is not configured".to_string()));
        };

        let response = self
            .client
            .post(ACCESS_TOKEN_URL)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("LinkedIn token exchange failed ({status}): {body}");
            return Err(IdentityError::Upstream(
                "Failed to get LinkedIn access token".to_string(),
            ));
        }

        let token: AccessTokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;
        Ok(token.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<LinkedInProfile, IdentityError> {
        let response = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            error!("LinkedIn userinfo failed: {}", response.status());
            return Err(IdentityError::Upstream(
                "Failed to fetch LinkedIn profile data".to_string(),
            ));
        }

        response
            .json::<LinkedInProfile>()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))
    }
}
