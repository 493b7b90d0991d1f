//! Payment adapters: checkout-session creation and provider-side confirmation.
//!
//! A checkout writes one pending Payment row. Verify flips that same row to
//! completed, and only once the provider confirms the money moved.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::payment::PaymentProvider;

pub mod handlers;
pub mod razorpay;
pub mod stripe;

pub use razorpay::RazorpayClient;
pub use stripe::StripeClient;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("{provider} is not configured")]
    NotConfigured { provider: &'static str },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error (status {status})")]
    Api { provider: &'static str, status: u16 },

    #[error("Unexpected {provider} API response format")]
    UnexpectedResponse { provider: &'static str },

    #[error("{0}")]
    MissingConfirmation(String),
}

/// A provider-hosted checkout that the client completes out of band.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    /// Razorpay order id or Stripe checkout session id.
    pub provider_ref: String,
}

/// What the client reports back after the provider redirect.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub provider_ref: String,
    pub payment_id: String,
    pub signature: Option<String>,
}

#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    fn provider(&self) -> PaymentProvider;

    async fn create_checkout(&self, amount_minor: i64) -> Result<CheckoutSession, PaymentError>;

    /// `Ok(true)` only when the provider proves the payment succeeded.
    async fn confirm(&self, confirmation: &PaymentConfirmation) -> Result<bool, PaymentError>;
}
