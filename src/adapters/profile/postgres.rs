//! PostgreSQL adapter for ProfileStore.
//!
//! Backs the identity-to-customer link with a single table:
//!
//! ```sql
//! CREATE TABLE payment_profiles (
//!     user_id     TEXT PRIMARY KEY,
//!     customer_id TEXT NOT NULL,
//!     created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```
//!
//! The primary key carries the one-link-per-identity invariant; a second
//! insert surfaces as `StoreError::DuplicateLink`.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::UserId;
use crate::ports::{ProfileStore, StoreError};

/// PostgreSQL implementation of ProfileStore.
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn insert_profile_link(
        &self,
        user_id: &UserId,
        customer_id: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO payment_profiles (user_id, customer_id) VALUES ($1, $2)")
            .bind(user_id.as_str())
            .bind(customer_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.as_database_error()
                    .is_some_and(|db| db.is_unique_violation())
                {
                    StoreError::DuplicateLink(user_id.to_string())
                } else {
                    tracing::error!(user_id = %user_id, error = %e, "Profile link insert failed");
                    StoreError::Database(e.to_string())
                }
            })?;
        Ok(())
    }

    async fn get_customer_id(&self, user_id: &UserId) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar("SELECT customer_id FROM payment_profiles WHERE user_id = $1")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user_id, error = %e, "Profile link lookup failed");
                StoreError::Database(e.to_string())
            })
    }
}
