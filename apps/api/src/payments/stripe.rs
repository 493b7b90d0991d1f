use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::models::payment::PaymentProvider;
use crate::payments::{CheckoutProvider, CheckoutSession, PaymentConfirmation, PaymentError};

const SESSIONS_URL: &str = "https://api.stripe.com/v1/checkout/sessions";
const PROVIDER: &str = "Stripe";
const PRODUCT_NAME: &str = "Resume Download";

#[derive(Debug, Deserialize)]
struct Session {
    id: String,
    payment_status: Option<String>,
}

/// Stripe Checkout Sessions client. Confirmation re-reads the session.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: Option<String>,
    success_url: String,
    cancel_url: String,
}

impl StripeClient {
    pub fn new(
        secret_key: Option<String>,
        success_url: String,
        cancel_url: String,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            secret_key,
            success_url,
            cancel_url,
        })
    }

    fn checkout_form(&self, amount_minor: i64) -> Vec<(&'static str, String)> {
        vec![
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][price_data][currency]", "inr".to_string()),
            (
                "line_items[0][price_data][product_data][name]",
                PRODUCT_NAME.to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                amount_minor.to_string(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("mode", "payment".to_string()),
            ("success_url", self.success_url.clone()),
            ("cancel_url", self.cancel_url.clone()),
        ]
    }
}

#[async_trait]
impl CheckoutProvider for StripeClient {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Stripe
    }

    async fn create_checkout(&self, amount_minor: i64) -> Result<CheckoutSession, PaymentError> {
        let Some(secret_key) = &self.secret_key else {
            return Err(PaymentError::NotConfigured { provider: PROVIDER });
        };

        let response = self
            .client
            .post(SESSIONS_URL)
            .bearer_auth(secret_key)
            .form(&self.checkout_form(amount_minor))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Stripe session creation failed ({status}): {text}");
            return Err(PaymentError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let session: Session = response
            .json()
            .await
            .map_err(|_| PaymentError::UnexpectedResponse { provider: PROVIDER })?;
        info!("Created Stripe checkout session {}", session.id);

        Ok(CheckoutSession {
            provider_ref: session.id,
        })
    }

    async fn confirm(&self, confirmation: &PaymentConfirmation) -> Result<bool, PaymentError> {
        let Some(secret_key) = &self.secret_key else {
            return Err(PaymentError::NotConfigured { provider: PROVIDER });
        };

        let response = self
            .client
            .get(format!("{SESSIONS_URL}/{}", confirmation.provider_ref))
            .bearer_auth(secret_key)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(PaymentError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let session: Session = response
            .json()
            .await
            .map_err(|_| PaymentError::UnexpectedResponse { provider: PROVIDER })?;
        Ok(session_is_paid(&session))
    }
}

fn session_is_paid(session: &Session) -> bool {
    session.payment_status.as_deref() == Some("paid")
}
