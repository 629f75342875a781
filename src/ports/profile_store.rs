//! Profile store port - the durable identity-to-customer link.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::UserId;

/// Narrow interface to the profile row tying an identity to its processor
/// customer.
///
/// The core treats any non-success as a hard failure requiring compensation;
/// it never retries store writes itself. Retries, if desired, belong to the
/// implementation's own policy.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Persist the link exactly once per identity.
    ///
    /// A second insert for the same identity fails with
    /// [`StoreError::DuplicateLink`].
    async fn insert_profile_link(
        &self,
        user_id: &UserId,
        customer_id: &str,
    ) -> Result<(), StoreError>;

    /// Look up the linked customer id, `None` when the identity has no link.
    async fn get_customer_id(&self, user_id: &UserId) -> Result<Option<String>, StoreError>;
}

/// Errors from profile store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("A profile link already exists for user {0}")]
    DuplicateLink(String),

    #[error("Profile store error: {0}")]
    Database(String),
}
