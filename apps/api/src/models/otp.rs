use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// OTP challenges live for ten minutes.
pub const OTP_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OtpChallenge {
    pub email: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    /// `None` only for malformed rows; treated as already expired.
    pub expires_at: Option<DateTime<Utc>>,
}

impl OtpChallenge {
    pub fn issue(email: &str, code: String, now: DateTime<Utc>) -> Self {
        OtpChallenge {
            email: email.to_string(),
            code,
            created_at: now,
            expires_at: Some(now + Duration::minutes(OTP_TTL_MINUTES)),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at < now,
            None => true,
        }
    }
}
