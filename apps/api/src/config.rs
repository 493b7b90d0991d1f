use anyhow::{Context, Result};
use tracing::info;

/// Application configuration loaded from environment variables.
/// Only `DATABASE_URL` and `JWT_SECRET` are required; provider credentials
/// are optional and the matching adapter reports itself as not configured.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub hf_api_key: Option<String>,
    pub hf_model: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub google_api_key: Option<String>,
    pub google_client_id: Option<String>,
    pub linkedin_client_id: Option<String>,
    pub linkedin_client_secret: Option<String>,
    pub linkedin_redirect_uri: String,
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    pub stripe_secret_key: Option<String>,
    pub stripe_success_url: String,
    pub stripe_cancel_url: String,
    pub pdf_output_dir: String,
    pub wkhtmltopdf_path: String,
    pub port: u16,
    pub rust_log: String,
    pub app_env: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            hf_api_key: optional_env("HF_API_KEY"),
            hf_model: optional_env("HF_MODEL"),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_model: env_or("OPENAI_MODEL", "gpt-4o"),
            google_api_key: optional_env("GOOGLE_API_KEY"),
            google_client_id: optional_env("GOOGLE_CLIENT_ID"),
            linkedin_client_id: optional_env("LINKEDIN_CLIENT_ID"),
            linkedin_client_secret: optional_env("LINKEDIN_CLIENT_SECRET"),
            linkedin_redirect_uri: env_or(
                "LINKEDIN_REDIRECT_URI",
                "http://localhost:5000/api/auth/linkedin/callback",
            ),
            razorpay_key_id: optional_env("RAZORPAY_KEY_ID"),
            razorpay_key_secret: optional_env("RAZORPAY_KEY_SECRET"),
            stripe_secret_key: optional_env("STRIPE_SECRET_KEY"),
            stripe_success_url: env_or("STRIPE_SUCCESS_URL", "http://localhost:3000/success"),
            stripe_cancel_url: env_or("STRIPE_CANCEL_URL", "http://localhost:3000/cancel"),
            pdf_output_dir: env_or("PDF_OUTPUT_DIR", "pdfs"),
            wkhtmltopdf_path: env_or("WKHTMLTOPDF_PATH", "wkhtmltopdf"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            app_env: env_or("APP_ENV", "production"),
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("development")
    }

    /// Logs which provider credentials are present. Values are never printed.
    pub fn log_provider_report(&self) {
        let set = |v: &Option<String>| if v.is_some() { "set" } else { "not set" };
        info!(
            hf_model = self.hf_model.as_deref().unwrap_or("not set"),
            hf_api_key = set(&self.hf_api_key),
            openai_api_key = set(&self.openai_api_key),
            openai_model = %self.openai_model,
            google_api_key = set(&self.google_api_key),
            linkedin = set(&self.linkedin_client_id),
            razorpay = set(&self.razorpay_key_id),
            stripe = set(&self.stripe_secret_key),
            port = self.port,
            "Loaded environment"
        );
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
impl Config {
    /// A configuration with every provider credential absent.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            jwt_secret: "test-secret".to_string(),
            hf_api_key: None,
            hf_model: None,
            openai_api_key: None,
            openai_model: "gpt-4o".to_string(),
            google_api_key: None,
            google_client_id: None,
            linkedin_client_id: None,
            linkedin_client_secret: None,
            linkedin_redirect_uri: "http://localhost:5000/api/auth/linkedin/callback".to_string(),
            razorpay_key_id: None,
            razorpay_key_secret: None,
            stripe_secret_key: None,
            stripe_success_url: "http://localhost:3000/success".to_string(),
            stripe_cancel_url: "http://localhost:3000/cancel".to_string(),
            pdf_output_dir: "pdfs".to_string(),
            wkhtmltopdf_path: "wkhtmltopdf".to_string(),
            port: 5000,
            rust_log: "info".to_string(),
            app_env: "test".to_string(),
        }
    }
}
