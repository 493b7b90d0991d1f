use std::sync::Arc;

use crate::identity::{FederatedVerifier, IdentityProvider, OAuthExchange};
use crate::llm_client::TextGenerator;
use crate::payments::CheckoutProvider;
use crate::pdf::PdfRenderer;
use crate::session::SessionKeys;
use crate::store::{AccountStore, OtpStore, PaymentStore, ResumeStore, TemplateStore};

/// Shared application state injected into all route handlers via Axum extractors.
/// Every external dependency sits behind a trait object so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub resumes: Arc<dyn ResumeStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub otps: Arc<dyn OtpStore>,
    pub templates: Arc<dyn TemplateStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub google: Arc<dyn FederatedVerifier>,
    pub linkedin: Arc<dyn OAuthExchange>,
    /// Hosted inference endpoint: public generate-resume and ATS check.
    pub inference: Arc<dyn TextGenerator>,
    /// Chat-completion API: resume content, cover letters, field enhancement.
    pub chat: Arc<dyn TextGenerator>,
    /// Generative-text API: prompt playground only.
    pub generative: Arc<dyn TextGenerator>,
    pub razorpay: Arc<dyn CheckoutProvider>,
    pub stripe: Arc<dyn CheckoutProvider>,
    pub pdf: Arc<dyn PdfRenderer>,
    pub sessions: SessionKeys,
}
