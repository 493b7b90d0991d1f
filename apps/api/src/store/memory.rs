//! In-memory store used by router and handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::models::account::{Account, NewAccount, ROLE_USER};
use crate::models::otp::OtpChallenge;
use crate::models::payment::{NewPayment, Payment, PaymentProvider, PaymentStatus};
use crate::models::resume::{NewResume, Resume, ResumePatch};
use crate::store::{
    AccountStore, OtpStore, PaymentStore, ResumeStore, StoreError, StoreResult, TemplateStore,
};

#[derive(Default)]
struct Tables {
    accounts: HashMap<Uuid, Account>,
    resumes: HashMap<Uuid, Resume>,
    payments: Vec<Payment>,
    otps: HashMap<String, OtpChallenge>,
    templates: HashMap<String, Value>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail, to exercise store-failure paths.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn payment_count(&self) -> usize {
        self.tables.lock().unwrap().payments.len()
    }

    pub fn resume_count(&self) -> usize {
        self.tables.lock().unwrap().resumes.len()
    }

    /// Backdates or corrupts a stored OTP challenge.
    pub fn replace_otp(&self, challenge: OtpChallenge) {
        self.tables
            .lock()
            .unwrap()
            .otps
            .insert(challenge.email.clone(), challenge);
    }

    fn check(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn get_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        self.check()?;
        Ok(self.tables.lock().unwrap().accounts.get(&id).cloned())
    }

    async fn upsert_account(&self, account: NewAccount) -> StoreResult<Account> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let full_name = account.full_name.filter(|n| !n.trim().is_empty());
        let row = match tables.accounts.get(&account.id) {
            Some(existing) => Account {
                email: account.email,
                full_name: full_name.unwrap_or_else(|| existing.full_name.clone()),
                provider: account.provider.as_str().to_string(),
                linked_in_data: account
                    .linked_in_data
                    .or_else(|| existing.linked_in_data.clone()),
                ..existing.clone()
            },
            None => Account {
                id: account.id,
                email: account.email,
                full_name: full_name.unwrap_or_default(),
                role: ROLE_USER.to_string(),
                provider: account.provider.as_str().to_string(),
                linked_in_data: account.linked_in_data,
                created_at: Utc::now(),
            },
        };
        tables.accounts.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_full_name(&self, id: Uuid, full_name: &str) -> StoreResult<Option<Account>> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.accounts.get_mut(&id).map(|a| {
            a.full_name = full_name.to_string();
            a.clone()
        }))
    }

    async fn set_role(&self, id: Uuid, role: &str) -> StoreResult<Option<Account>> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.accounts.get_mut(&id).map(|a| {
            a.role = role.to_string();
            a.clone()
        }))
    }

    async fn delete_account(&self, id: Uuid) -> StoreResult<bool> {
        self.check()?;
        Ok(self.tables.lock().unwrap().accounts.remove(&id).is_some())
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        self.check()?;
        let mut accounts: Vec<_> = self
            .tables
            .lock()
            .unwrap()
            .accounts
            .values()
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.created_at);
        Ok(accounts)
    }
}

#[async_trait]
impl ResumeStore for MemoryStore {
    async fn create_resume(&self, resume: NewResume) -> StoreResult<Resume> {
        self.check()?;
        let now = Utc::now();
        let row = Resume {
            id: Uuid::new_v4(),
            user_id: resume.user_id,
            name: resume.name,
            content: resume.content,
            tags: resume.tags,
            job_description: resume.job_description,
            version: 1,
            last_generated_pdf: None,
            last_cover_letter: None,
            last_cover_letter_generated: None,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .unwrap()
            .resumes
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_resume(&self, id: Uuid) -> StoreResult<Option<Resume>> {
        self.check()?;
        Ok(self.tables.lock().unwrap().resumes.get(&id).cloned())
    }

    async fn list_resumes(&self, user_id: Uuid) -> StoreResult<Vec<Resume>> {
        self.check()?;
        let mut resumes: Vec<_> = self
            .tables
            .lock()
            .unwrap()
            .resumes
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        resumes.sort_by_key(|r| r.created_at);
        Ok(resumes)
    }

    async fn update_resume(&self, id: Uuid, patch: ResumePatch) -> StoreResult<Option<Resume>> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let Some(row) = tables.resumes.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(content) = patch.content {
            row.content = content;
        }
        if let Some(tags) = patch.tags {
            row.tags = tags;
        }
        if patch.job_description.is_some() {
            row.job_description = patch.job_description;
        }
        if patch.last_generated_pdf.is_some() {
            row.last_generated_pdf = patch.last_generated_pdf;
        }
        if patch.last_cover_letter.is_some() {
            row.last_cover_letter = patch.last_cover_letter;
        }
        if patch.last_cover_letter_generated.is_some() {
            row.last_cover_letter_generated = patch.last_cover_letter_generated;
        }
        row.version += 1;
        row.updated_at = row.updated_at.max(Utc::now());
        Ok(Some(row.clone()))
    }

    async fn delete_resume(&self, id: Uuid) -> StoreResult<bool> {
        self.check()?;
        Ok(self.tables.lock().unwrap().resumes.remove(&id).is_some())
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn create_payment(&self, payment: NewPayment) -> StoreResult<Payment> {
        self.check()?;
        let row = Payment {
            id: Uuid::new_v4(),
            user_id: payment.user_id,
            amount: payment.amount,
            status: PaymentStatus::Pending.as_str().to_string(),
            provider: payment.provider.as_str().to_string(),
            provider_ref: payment.provider_ref,
            resume_id: payment.resume_id,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.tables.lock().unwrap().payments.push(row.clone());
        Ok(row)
    }

    async fn find_payment_by_ref(
        &self,
        provider: PaymentProvider,
        provider_ref: &str,
    ) -> StoreResult<Option<Payment>> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .payments
            .iter()
            .find(|p| p.provider == provider.as_str() && p.provider_ref == provider_ref)
            .cloned())
    }

    async fn complete_payment(&self, id: Uuid) -> StoreResult<Option<Payment>> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.payments.iter_mut().find(|p| p.id == id).map(|p| {
            p.status = PaymentStatus::Completed.as_str().to_string();
            p.completed_at.get_or_insert_with(Utc::now);
            p.clone()
        }))
    }

    async fn has_completed_payment(&self, user_id: Uuid, resume_id: Uuid) -> StoreResult<bool> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .payments
            .iter()
            .any(|p| p.user_id == user_id && p.resume_id == Some(resume_id) && p.is_completed()))
    }

    async fn list_payments(&self, user_id: Option<Uuid>) -> StoreResult<Vec<Payment>> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .payments
            .iter()
            .filter(|p| user_id.map_or(true, |u| p.user_id == u))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OtpStore for MemoryStore {
    async fn put_otp(&self, challenge: OtpChallenge) -> StoreResult<()> {
        self.check()?;
        self.replace_otp(challenge);
        Ok(())
    }

    async fn get_otp(&self, email: &str) -> StoreResult<Option<OtpChallenge>> {
        self.check()?;
        Ok(self.tables.lock().unwrap().otps.get(email).cloned())
    }

    async fn delete_otp(&self, email: &str) -> StoreResult<()> {
        self.check()?;
        self.tables.lock().unwrap().otps.remove(email);
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn merge_template(&self, id: &str, data: Value) -> StoreResult<Value> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let entry = tables
            .templates
            .entry(id.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
        if let (Value::Object(stored), Value::Object(incoming)) = (&mut *entry, data) {
            stored.extend(incoming);
        }
        Ok(entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_resume(user_id: Uuid) -> NewResume {
        NewResume {
            user_id,
            name: "Backend".to_string(),
            content: json!({"summary": "Rust engineer"}),
            tags: vec![],
            job_description: None,
        }
    }

    #[tokio::test]
    async fn test_update_bumps_version_and_keeps_omitted_fields() {
        let store = MemoryStore::new();
        let created = store.create_resume(new_resume(Uuid::new_v4())).await.unwrap();

        let updated = store
            .update_resume(
                created.id,
                ResumePatch {
                    tags: Some(vec!["rust".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.version, 2);
        assert_eq!(updated.name, "Backend");
        assert_eq!(updated.tags, vec!["rust".to_string()]);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_template_merge_is_shallow() {
        let store = MemoryStore::new();
        store
            .merge_template("classic", json!({"font": "Inter", "color": "blue"}))
            .await
            .unwrap();
        let merged = store
            .merge_template("classic", json!({"color": "red"}))
            .await
            .unwrap();
        assert_eq!(merged, json!({"font": "Inter", "color": "red"}));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_reads() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(store.get_account(Uuid::new_v4()).await.is_err());
    }
}
