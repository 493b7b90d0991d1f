use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::identity::{check_password_strength, Identity, IdentityError, IdentityProvider};

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    email: String,
    password_hash: Option<String>,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Identity {
            id: row.id,
            email: row.email,
        }
    }
}

/// Credential store over the `identities` table with argon2 password hashes.
#[derive(Clone)]
pub struct PgIdentityProvider {
    pool: PgPool,
}

impl PgIdentityProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::Hash(e.to_string()))
}

pub fn password_matches(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn create_identity(
        &self,
        email: &str,
        password: Option<&str>,
    ) -> Result<Identity, IdentityError> {
        let password_hash = match password {
            Some(password) => {
                check_password_strength(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let row = sqlx::query_as::<_, IdentityRow>(
            "INSERT INTO identities (id, email, password_hash) VALUES ($1, $2, $3) RETURNING id, email, password_hash",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => IdentityError::EmailInUse,
            other => IdentityError::Database(other),
        })?;

        info!("Created identity {}", row.id);
        Ok(row.into())
    }

    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, IdentityError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            "SELECT id, email, password_hash FROM identities WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Identity::from))
    }

    async fn verify_password(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            "SELECT id, email, password_hash FROM identities WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(IdentityError::InvalidCredentials)?;

        match row.password_hash.as_deref() {
            Some(hash) if password_matches(password, hash) => Ok(row.into()),
            _ => Err(IdentityError::InvalidCredentials),
        }
    }

    async fn set_password(&self, id: Uuid, password: &str) -> Result<(), IdentityError> {
        check_password_strength(password)?;
        let hash = hash_password(password)?;
        let result = sqlx::query("UPDATE identities SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(hash)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(IdentityError::NotFound);
        }
        Ok(())
    }

    async fn delete_identity(&self, id: Uuid) -> Result<(), IdentityError> {
        let result = sqlx::query("DELETE FROM identities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(IdentityError::NotFound);
        }
        info!("Deleted identity {id}");
        Ok(())
    }
}
