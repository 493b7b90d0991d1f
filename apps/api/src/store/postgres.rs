use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::account::{Account, NewAccount};
use crate::models::otp::OtpChallenge;
use crate::models::payment::{NewPayment, Payment, PaymentProvider, PaymentStatus};
use crate::models::resume::{NewResume, Resume, ResumePatch};
use crate::store::{
    AccountStore, OtpStore, PaymentStore, ResumeStore, StoreResult, TemplateStore,
};

/// PostgreSQL-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn get_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(
            sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn upsert_account(&self, account: NewAccount) -> StoreResult<Account> {
        let full_name = account.full_name.filter(|n| !n.trim().is_empty());
        let row = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, email, full_name, provider, linked_in_data)
            VALUES ($1, $2, COALESCE($3, ''), $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                full_name = COALESCE($3, accounts.full_name),
                provider = EXCLUDED.provider,
                linked_in_data = COALESCE($5, accounts.linked_in_data)
            RETURNING *
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(full_name)
        .bind(account.provider.as_str())
        .bind(account.linked_in_data)
        .fetch_one(&self.pool)
        .await?;

        info!("Upserted account {} via {}", row.id, row.provider);
        Ok(row)
    }

    async fn update_full_name(&self, id: Uuid, full_name: &str) -> StoreResult<Option<Account>> {
        Ok(sqlx::query_as::<_, Account>(
            "UPDATE accounts SET full_name = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(full_name)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_role(&self, id: Uuid, role: &str) -> StoreResult<Option<Account>> {
        Ok(
            sqlx::query_as::<_, Account>("UPDATE accounts SET role = $2 WHERE id = $1 RETURNING *")
                .bind(id)
                .bind(role)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn delete_account(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        Ok(
            sqlx::query_as::<_, Account>("SELECT * FROM accounts ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?,
        )
    }
}

#[async_trait]
impl ResumeStore for PgStore {
    async fn create_resume(&self, resume: NewResume) -> StoreResult<Resume> {
        let row = sqlx::query_as::<_, Resume>(
            r#"
            INSERT INTO resumes (id, user_id, name, content, tags, job_description, version)
            VALUES ($1, $2, $3, $4, $5, $6, 1)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(resume.user_id)
        .bind(&resume.name)
        .bind(&resume.content)
        .bind(&resume.tags)
        .bind(&resume.job_description)
        .fetch_one(&self.pool)
        .await?;

        info!("Created resume {} for user {}", row.id, row.user_id);
        Ok(row)
    }

    async fn get_resume(&self, id: Uuid) -> StoreResult<Option<Resume>> {
        Ok(
            sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_resumes(&self, user_id: Uuid) -> StoreResult<Vec<Resume>> {
        Ok(sqlx::query_as::<_, Resume>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_resume(&self, id: Uuid, patch: ResumePatch) -> StoreResult<Option<Resume>> {
        // The increment happens inside the UPDATE; concurrent writers each get their own bump.
        Ok(sqlx::query_as::<_, Resume>(
            r#"
            UPDATE resumes SET
                name = COALESCE($2, name),
                content = COALESCE($3, content),
                tags = COALESCE($4, tags),
                job_description = COALESCE($5, job_description),
                last_generated_pdf = COALESCE($6, last_generated_pdf),
                last_cover_letter = COALESCE($7, last_cover_letter),
                last_cover_letter_generated = COALESCE($8, last_cover_letter_generated),
                version = version + 1,
                updated_at = GREATEST(now(), updated_at)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.content)
        .bind(patch.tags)
        .bind(patch.job_description)
        .bind(patch.last_generated_pdf)
        .bind(patch.last_cover_letter)
        .bind(patch.last_cover_letter_generated)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_resume(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PaymentStore for PgStore {
    async fn create_payment(&self, payment: NewPayment) -> StoreResult<Payment> {
        let row = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, user_id, amount, status, provider, provider_ref, resume_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payment.user_id)
        .bind(payment.amount)
        .bind(PaymentStatus::Pending.as_str())
        .bind(payment.provider.as_str())
        .bind(&payment.provider_ref)
        .bind(payment.resume_id)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Recorded pending {} payment {} for user {}",
            row.provider, row.id, row.user_id
        );
        Ok(row)
    }

    async fn find_payment_by_ref(
        &self,
        provider: PaymentProvider,
        provider_ref: &str,
    ) -> StoreResult<Option<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE provider = $1 AND provider_ref = $2",
        )
        .bind(provider.as_str())
        .bind(provider_ref)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn complete_payment(&self, id: Uuid) -> StoreResult<Option<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = $2, completed_at = COALESCE(completed_at, now())
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(PaymentStatus::Completed.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn has_completed_payment(&self, user_id: Uuid, resume_id: Uuid) -> StoreResult<bool> {
        Ok(sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM payments
                WHERE user_id = $1 AND resume_id = $2 AND status = $3
            )
            "#,
        )
        .bind(user_id)
        .bind(resume_id)
        .bind(PaymentStatus::Completed.as_str())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_payments(&self, user_id: Option<Uuid>) -> StoreResult<Vec<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(
            r#"
            SELECT * FROM payments
            WHERE $1::uuid IS NULL OR user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[async_trait]
impl OtpStore for PgStore {
    async fn put_otp(&self, challenge: OtpChallenge) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO otp_challenges (email, code, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE SET
                code = EXCLUDED.code,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&challenge.email)
        .bind(&challenge.code)
        .bind(challenge.created_at)
        .bind(challenge.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_otp(&self, email: &str) -> StoreResult<Option<OtpChallenge>> {
        Ok(
            sqlx::query_as::<_, OtpChallenge>("SELECT * FROM otp_challenges WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn delete_otp(&self, email: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM otp_challenges WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for PgStore {
    async fn merge_template(&self, id: &str, data: Value) -> StoreResult<Value> {
        Ok(sqlx::query_scalar::<_, Value>(
            r#"
            INSERT INTO templates (id, data) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET
                data = templates.data || EXCLUDED.data,
                updated_at = now()
            RETURNING data
            "#,
        )
        .bind(id)
        .bind(data)
        .fetch_one(&self.pool)
        .await?)
    }
}
