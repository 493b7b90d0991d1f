use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

/// A registered user or admin identity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "uid")]
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub provider: String,
    pub linked_in_data: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// How an account proved its identity on first sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInProvider {
    Password,
    Otp,
    Google,
    Linkedin,
}

impl SignInProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignInProvider::Password => "password",
            SignInProvider::Otp => "otp",
            SignInProvider::Google => "google",
            SignInProvider::Linkedin => "linkedin",
        }
    }
}

/// Upsert payload. `full_name` and `linked_in_data` only overwrite stored
/// values when present, so a re-login never blanks a profile.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub provider: SignInProvider,
    pub linked_in_data: Option<Value>,
}

/// The public subset returned next to a session token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub uid: Uuid,
    pub email: String,
    pub full_name: String,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        AccountSummary {
            uid: account.id,
            email: account.email.clone(),
            full_name: account.full_name.clone(),
        }
    }
}
