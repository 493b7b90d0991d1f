//! In-memory state, fake adapters and request helpers for router tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::config::Config;
use crate::identity::{
    FederatedIdentity, FederatedVerifier, Identity, IdentityError, IdentityProvider,
    LinkedInProfile, OAuthExchange,
};
use crate::llm_client::{classify_status, GenerationRequest, LlmError, TextGenerator};
use crate::models::account::{NewAccount, SignInProvider, ROLE_ADMIN};
use crate::models::payment::PaymentProvider;
use crate::payments::{CheckoutProvider, CheckoutSession, PaymentConfirmation, PaymentError};
use crate::pdf::{PdfRenderer, RenderError, RenderedPdf};
use crate::routes::build_router;
use crate::session::SessionKeys;
use crate::state::AppState;
use crate::store::memory::MemoryStore;
use crate::store::AccountStore;

pub const VALID_GOOGLE_TOKEN: &str = "google-id-token";
pub const VALID_LINKEDIN_CODE: &str = "linkedin-code";

struct Credential {
    identity: Identity,
    password: Option<String>,
}

/// Identity provider keeping plaintext credentials in memory.
#[derive(Default)]
pub struct MemoryIdentity {
    credentials: Mutex<HashMap<String, Credential>>,
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn create_identity(
        &self,
        email: &str,
        password: Option<&str>,
    ) -> Result<Identity, IdentityError> {
        let mut credentials = self.credentials.lock().unwrap();
        if credentials.contains_key(email) {
            return Err(IdentityError::EmailInUse);
        }
        let identity = Identity {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        credentials.insert(
            email.to_string(),
            Credential {
                identity: identity.clone(),
                password: password.map(str::to_string),
            },
        );
        Ok(identity)
    }

    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, IdentityError> {
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .get(email)
            .map(|c| c.identity.clone()))
    }

    async fn verify_password(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        match self.credentials.lock().unwrap().get(email) {
            Some(c) if c.password.as_deref() == Some(password) => Ok(c.identity.clone()),
            _ => Err(IdentityError::InvalidCredentials),
        }
    }

    async fn set_password(&self, id: Uuid, password: &str) -> Result<(), IdentityError> {
        let mut credentials = self.credentials.lock().unwrap();
        let credential = credentials
            .values_mut()
            .find(|c| c.identity.id == id)
            .ok_or(IdentityError::NotFound)?;
        credential.password = Some(password.to_string());
        Ok(())
    }

    async fn delete_identity(&self, id: Uuid) -> Result<(), IdentityError> {
        let mut credentials = self.credentials.lock().unwrap();
        let before = credentials.len();
        credentials.retain(|_, c| c.identity.id != id);
        if credentials.len() == before {
            return Err(IdentityError::NotFound);
        }
        Ok(())
    }
}

enum Scripted {
    Text(String),
    Status(u16),
}

/// Text generator that replays one scripted answer and records every request.
pub struct FakeGenerator {
    name: &'static str,
    next: Mutex<Scripted>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeGenerator {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next: Mutex::new(Scripted::Text("{}".to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(&self, text: &str) {
        *self.next.lock().unwrap() = Scripted::Text(text.to_string());
    }

    pub fn fail_with_status(&self, status: u16) {
        *self.next.lock().unwrap() = Scripted::Status(status);
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    fn provider(&self) -> &'static str {
        self.name
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        match &*self.next.lock().unwrap() {
            Scripted::Text(text) => Ok(text.clone()),
            Scripted::Status(status) => Err(classify_status(
                self.name,
                "fake-model",
                *status,
                "scripted failure".to_string(),
            )),
        }
    }
}

/// Checkout provider handing out sequential references.
pub struct FakeCheckout {
    provider: PaymentProvider,
    issued: AtomicUsize,
    confirmed: AtomicBool,
    confirmations: AtomicUsize,
}

impl FakeCheckout {
    pub fn new(provider: PaymentProvider) -> Self {
        Self {
            provider,
            issued: AtomicUsize::new(0),
            confirmed: AtomicBool::new(true),
            confirmations: AtomicUsize::new(0),
        }
    }

    pub fn set_confirmed(&self, confirmed: bool) {
        self.confirmed.store(confirmed, Ordering::SeqCst);
    }

    pub fn confirmations(&self) -> usize {
        self.confirmations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CheckoutProvider for FakeCheckout {
    fn provider(&self) -> PaymentProvider {
        self.provider
    }

    async fn create_checkout(&self, _amount_minor: i64) -> Result<CheckoutSession, PaymentError> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CheckoutSession {
            provider_ref: format!("{}_ref_{n}", self.provider),
        })
    }

    async fn confirm(&self, _confirmation: &PaymentConfirmation) -> Result<bool, PaymentError> {
        self.confirmations.fetch_add(1, Ordering::SeqCst);
        Ok(self.confirmed.load(Ordering::SeqCst))
    }
}

/// Renderer that keeps the HTML it was given instead of producing a file.
#[derive(Default)]
pub struct FakeRenderer {
    calls: Mutex<Vec<String>>,
}

impl FakeRenderer {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PdfRenderer for FakeRenderer {
    async fn render(&self, html: &str, resume_id: Uuid) -> Result<RenderedPdf, RenderError> {
        self.calls.lock().unwrap().push(html.to_string());
        Ok(RenderedPdf {
            path: PathBuf::from(format!("resume-{resume_id}.pdf")),
            bytes: b"%PDF-1.4 fake".to_vec(),
        })
    }
}

pub struct FakeGoogle;

#[async_trait]
impl FederatedVerifier for FakeGoogle {
    async fn verify_id_token(&self, token: &str) -> Result<FederatedIdentity, IdentityError> {
        if token != VALID_GOOGLE_TOKEN {
            return Err(IdentityError::InvalidToken("signature mismatch".to_string()));
        }
        Ok(FederatedIdentity {
            email: "grace@example.com".to_string(),
            name: Some("Grace Hopper".to_string()),
        })
    }
}

pub struct FakeLinkedIn;

#[async_trait]
impl OAuthExchange for FakeLinkedIn {
    async fn exchange_code(&self, code: &str) -> Result<String, IdentityError> {
        if code != VALID_LINKEDIN_CODE {
            return Err(IdentityError::Upstream(
                "LinkedIn token exchange failed with status 400".to_string(),
            ));
        }
        Ok("linkedin-access-token".to_string())
    }

    async fn fetch_profile(&self, _access_token: &str) -> Result<LinkedInProfile, IdentityError> {
        Ok(LinkedInProfile {
            sub: "li-sub-1".to_string(),
            email: Some("linus@example.com".to_string()),
            name: Some("Linus Torvalds".to_string()),
            given_name: Some("Linus".to_string()),
            family_name: Some("Torvalds".to_string()),
            picture: None,
        })
    }
}

/// A full `AppState` over in-memory fakes, with handles kept for assertions.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub identity: Arc<MemoryIdentity>,
    pub inference: Arc<FakeGenerator>,
    pub chat: Arc<FakeGenerator>,
    pub generative: Arc<FakeGenerator>,
    pub razorpay: Arc<FakeCheckout>,
    pub stripe: Arc<FakeCheckout>,
    pub renderer: Arc<FakeRenderer>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let config = Config::for_tests();
        let store = Arc::new(MemoryStore::new());
        let identity = Arc::new(MemoryIdentity::default());
        let inference = Arc::new(FakeGenerator::new("Hugging Face"));
        let chat = Arc::new(FakeGenerator::new("OpenAI"));
        let generative = Arc::new(FakeGenerator::new("Gemini"));
        let razorpay = Arc::new(FakeCheckout::new(PaymentProvider::Razorpay));
        let stripe = Arc::new(FakeCheckout::new(PaymentProvider::Stripe));
        let renderer = Arc::new(FakeRenderer::default());

        let state = AppState {
            accounts: store.clone(),
            resumes: store.clone(),
            payments: store.clone(),
            otps: store.clone(),
            templates: store.clone(),
            identity: identity.clone(),
            google: Arc::new(FakeGoogle),
            linkedin: Arc::new(FakeLinkedIn),
            inference: inference.clone(),
            chat: chat.clone(),
            generative: generative.clone(),
            razorpay: razorpay.clone(),
            stripe: stripe.clone(),
            pdf: renderer.clone(),
            sessions: SessionKeys::new(&config.jwt_secret),
        };

        Self {
            store,
            identity,
            inference,
            chat,
            generative,
            razorpay,
            stripe,
            renderer,
            state,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Registers an account and returns its id and a session token.
    pub async fn account_with_id(&self, email: &str) -> (Uuid, String) {
        let identity = self
            .identity
            .create_identity(email, Some("password1"))
            .await
            .unwrap();
        self.store
            .upsert_account(NewAccount {
                id: identity.id,
                email: email.to_string(),
                full_name: Some("Test User".to_string()),
                provider: SignInProvider::Password,
                linked_in_data: None,
            })
            .await
            .unwrap();
        (identity.id, self.state.sessions.issue(identity.id).unwrap())
    }

    pub async fn account(&self, email: &str) -> String {
        self.account_with_id(email).await.1
    }

    pub async fn admin(&self, email: &str) -> String {
        let (id, token) = self.account_with_id(email).await;
        self.store.set_role(id, ROLE_ADMIN).await.unwrap();
        token
    }
}

pub fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn bearer_request(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let mut request = json_request(method, uri, body);
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

pub async fn send_raw(router: Router, request: Request<Body>) -> Response {
    router.oneshot(request).await.unwrap()
}

/// Sends a request and decodes the body as JSON (`Null` when it is not JSON).
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = send_raw(router, request).await;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
