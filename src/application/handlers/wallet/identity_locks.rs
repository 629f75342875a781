//! Per-identity serialization for wallet workflows.
//!
//! The duplicate check is list-then-attach and therefore not atomic; two
//! concurrent attachments for one identity could both pass it. Holding the
//! identity's lock for the whole workflow closes that race. Different
//! identities never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::UserId;

/// Map of identity to its workflow lock.
///
/// Locks are created on first use and kept for the process lifetime; the
/// population of active identities per instance is small enough that no
/// eviction is needed.
#[derive(Default)]
pub struct IdentityLocks {
    locks: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for an identity, waiting behind any workflow already
    /// running for it.
    pub async fn acquire(&self, user_id: &UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().expect("identity lock map poisoned");
            locks
                .entry(user_id.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
