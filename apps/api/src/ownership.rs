//! Owner checks shared by every route that touches a caller's record.

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::payment::Payment;
use crate::models::resume::Resume;
use crate::store::ResumeStore;

pub trait Owned {
    const KIND: &'static str;
    fn owner_id(&self) -> Uuid;
}

impl Owned for Resume {
    const KIND: &'static str = "Resume";
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Owned for Payment {
    const KIND: &'static str = "Payment";
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// 404 when the record did not resolve, 403 when it belongs to someone else.
pub fn ensure_owner<T: Owned>(record: Option<T>, caller: Uuid) -> Result<T, AppError> {
    let record = record.ok_or_else(|| AppError::NotFound(format!("{} not found", T::KIND)))?;
    if record.owner_id() != caller {
        tracing::warn!("Account {caller} denied access to another owner's {}", T::KIND);
        return Err(AppError::Forbidden("Unauthorized access".to_string()));
    }
    Ok(record)
}

/// Fetches a resume and applies [`ensure_owner`].
pub async fn owned_resume(
    store: &dyn ResumeStore,
    resume_id: Uuid,
    caller: Uuid,
) -> Result<Resume, AppError> {
    ensure_owner(store.get_resume(resume_id).await?, caller)
}
