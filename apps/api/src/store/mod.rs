//! Document store gateway: one trait per record kind, a PostgreSQL
//! implementation, and an in-memory one for tests.
//!
//! There are no cross-kind transactions. Ownership between kinds
//! (resume → account, payment → account) is not enforced here.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::models::account::{Account, NewAccount};
use crate::models::otp::OtpChallenge;
use crate::models::payment::{NewPayment, Payment, PaymentProvider};
use crate::models::resume::{NewResume, Resume, ResumePatch};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get_account(&self, id: Uuid) -> StoreResult<Option<Account>>;
    /// Inserts or merges the account. Role and creation time survive a merge.
    async fn upsert_account(&self, account: NewAccount) -> StoreResult<Account>;
    async fn update_full_name(&self, id: Uuid, full_name: &str) -> StoreResult<Option<Account>>;
    async fn set_role(&self, id: Uuid, role: &str) -> StoreResult<Option<Account>>;
    async fn delete_account(&self, id: Uuid) -> StoreResult<bool>;
    async fn list_accounts(&self) -> StoreResult<Vec<Account>>;
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Persists a new resume at version 1.
    async fn create_resume(&self, resume: NewResume) -> StoreResult<Resume>;
    async fn get_resume(&self, id: Uuid) -> StoreResult<Option<Resume>>;
    async fn list_resumes(&self, user_id: Uuid) -> StoreResult<Vec<Resume>>;
    /// Applies the patch, increments `version` by one and refreshes `updated_at`.
    async fn update_resume(&self, id: Uuid, patch: ResumePatch) -> StoreResult<Option<Resume>>;
    async fn delete_resume(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Records a pending checkout.
    async fn create_payment(&self, payment: NewPayment) -> StoreResult<Payment>;
    async fn find_payment_by_ref(
        &self,
        provider: PaymentProvider,
        provider_ref: &str,
    ) -> StoreResult<Option<Payment>>;
    /// Moves a payment to `completed` in place. Completing twice is a no-op.
    async fn complete_payment(&self, id: Uuid) -> StoreResult<Option<Payment>>;
    async fn has_completed_payment(&self, user_id: Uuid, resume_id: Uuid) -> StoreResult<bool>;
    /// All payments, or only those of `user_id`.
    async fn list_payments(&self, user_id: Option<Uuid>) -> StoreResult<Vec<Payment>>;
}

#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Stores the challenge, replacing any active one for the same email.
    async fn put_otp(&self, challenge: OtpChallenge) -> StoreResult<()>;
    async fn get_otp(&self, email: &str) -> StoreResult<Option<OtpChallenge>>;
    async fn delete_otp(&self, email: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Shallow-merges `data` into the stored template and returns the result.
    async fn merge_template(&self, id: &str, data: Value) -> StoreResult<Value>;
}
