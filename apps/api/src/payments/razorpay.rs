use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{error, info, warn};

use crate::models::payment::PaymentProvider;
use crate::payments::{CheckoutProvider, CheckoutSession, PaymentConfirmation, PaymentError};

const ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";
const PROVIDER: &str = "Razorpay";
const CURRENCY: &str = "INR";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize)]
struct CreateOrder<'a> {
    amount: i64,
    currency: &'a str,
    receipt: String,
}

#[derive(Debug, Deserialize)]
struct Order {
    id: String,
}

/// Razorpay Orders API client. Confirmation checks the checkout signature.
#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    key_id: Option<String>,
    key_secret: Option<String>,
}

impl RazorpayClient {
    pub fn new(key_id: Option<String>, key_secret: Option<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            key_id,
            key_secret,
        })
    }
}

/// Razorpay signs `"{order_id}|{payment_id}"` with the key secret (HMAC-SHA256, hex).
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    mac.verify_slice(&expected).is_ok()
}

#[async_trait]
impl CheckoutProvider for RazorpayClient {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Razorpay
    }

    async fn create_checkout(&self, amount_minor: i64) -> Result<CheckoutSession, PaymentError> {
        let (Some(key_id), Some(key_secret)) = (&self.key_id, &self.key_secret) else {
            return Err(PaymentError::NotConfigured { provider: PROVIDER });
        };

        let body = CreateOrder {
            amount: amount_minor,
            currency: CURRENCY,
            receipt: format!("receipt_{}", Utc::now().timestamp_millis()),
        };

        let response = self
            .client
            .post(ORDERS_URL)
            .basic_auth(key_id, Some(key_secret))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Razorpay order creation failed ({status}): {text}");
            return Err(PaymentError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let order: Order = response
            .json()
            .await
            .map_err(|_| PaymentError::UnexpectedResponse { provider: PROVIDER })?;
        info!("Created Razorpay order {}", order.id);

        Ok(CheckoutSession {
            provider_ref: order.id,
        })
    }

    async fn confirm(&self, confirmation: &PaymentConfirmation) -> Result<bool, PaymentError> {
        let Some(key_secret) = &self.key_secret else {
            return Err(PaymentError::NotConfigured { provider: PROVIDER });
        };
        let Some(signature) = confirmation.signature.as_deref() else {
            return Err(PaymentError::MissingConfirmation(
                "Razorpay verification requires orderId and signature".to_string(),
            ));
        };

        let valid = verify_signature(
            key_secret,
            &confirmation.provider_ref,
            &confirmation.payment_id,
            signature,
        );
        if !valid {
            warn!(
                "Razorpay signature mismatch for order {}",
                confirmation.provider_ref
            );
        }
        Ok(valid)
    }
}
