mod admin;
mod ai;
mod auth;
mod config;
mod db;
mod errors;
mod extract;
mod identity;
mod llm_client;
mod models;
mod ownership;
mod payments;
mod pdf;
mod resume;
mod routes;
mod session;
mod state;
mod store;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::identity::{GoogleTokenVerifier, LinkedInClient, PgIdentityProvider};
use crate::llm_client::{GeminiClient, HuggingFaceClient, OpenAiClient};
use crate::payments::{RazorpayClient, StripeClient};
use crate::pdf::WkHtmlToPdf;
use crate::routes::build_router;
use crate::session::SessionKeys;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));
    if config.is_development() {
        config.log_provider_report();
    }

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(db.clone()));

    // External adapters; missing credentials surface per call, not at startup
    let inference = HuggingFaceClient::new(config.hf_api_key.clone(), config.hf_model.clone())?;
    let chat = OpenAiClient::new(config.openai_api_key.clone(), config.openai_model.clone())?;
    let generative = GeminiClient::new(config.google_api_key.clone())?;
    let google = GoogleTokenVerifier::new(config.google_client_id.clone())?;
    let linkedin = LinkedInClient::new(
        config.linkedin_client_id.clone(),
        config.linkedin_client_secret.clone(),
        config.linkedin_redirect_uri.clone(),
    )?;
    let razorpay = RazorpayClient::new(
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
    )?;
    let stripe = StripeClient::new(
        config.stripe_secret_key.clone(),
        config.stripe_success_url.clone(),
        config.stripe_cancel_url.clone(),
    )?;
    let pdf = WkHtmlToPdf::new(config.wkhtmltopdf_path.clone(), config.pdf_output_dir.clone());
    info!("Adapters initialized (chat model: {})", config.openai_model);

    // Build app state
    let state = AppState {
        accounts: store.clone(),
        resumes: store.clone(),
        payments: store.clone(),
        otps: store.clone(),
        templates: store,
        identity: Arc::new(PgIdentityProvider::new(db)),
        google: Arc::new(google),
        linkedin: Arc::new(linkedin),
        inference: Arc::new(inference),
        chat: Arc::new(chat),
        generative: Arc::new(generative),
        razorpay: Arc::new(razorpay),
        stripe: Arc::new(stripe),
        pdf: Arc::new(pdf),
        sessions: SessionKeys::new(&config.jwt_secret),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
