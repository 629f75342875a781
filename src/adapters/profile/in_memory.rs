//! In-memory profile store for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::ports::{ProfileStore, StoreError};

/// `ProfileStore` backed by a `HashMap`, with failure and delay injection.
#[derive(Default)]
pub struct InMemoryProfileStore {
    links: Mutex<HashMap<UserId, String>>,
    fail_insert: Mutex<bool>,
    lookup_delay: Mutex<Option<Duration>>,
    insert_delay: Mutex<Option<Duration>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a link directly, bypassing the port.
    pub fn seed_link(&self, user_id: &UserId, customer_id: &str) {
        self.links
            .lock()
            .unwrap()
            .insert(user_id.clone(), customer_id.to_string());
    }

    /// Drop all links.
    pub fn clear(&self) {
        self.links.lock().unwrap().clear();
    }

    /// Make the next inserts fail with a database error.
    pub fn set_fail_insert(&self, fail: bool) {
        *self.fail_insert.lock().unwrap() = fail;
    }

    /// Delay lookups, simulating a slow or hung database.
    pub fn set_lookup_delay(&self, delay: Duration) {
        *self.lookup_delay.lock().unwrap() = Some(delay);
    }

    /// Delay inserts, simulating a slow or hung database.
    pub fn set_insert_delay(&self, delay: Duration) {
        *self.insert_delay.lock().unwrap() = Some(delay);
    }

    // Copies the delay out before sleeping; the mutex is never held across
    // the await.
    async fn sleep_if_set(&self, delay: &Mutex<Option<Duration>>) {
        let delay = *delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn insert_profile_link(
        &self,
        user_id: &UserId,
        customer_id: &str,
    ) -> Result<(), StoreError> {
        self.sleep_if_set(&self.insert_delay).await;
        if *self.fail_insert.lock().unwrap() {
            return Err(StoreError::Database("Mock: insert failed".to_string()));
        }
        let mut links = self.links.lock().unwrap();
        if links.contains_key(user_id) {
            return Err(StoreError::DuplicateLink(user_id.to_string()));
        }
        links.insert(user_id.clone(), customer_id.to_string());
        Ok(())
    }

    async fn get_customer_id(&self, user_id: &UserId) -> Result<Option<String>, StoreError> {
        self.sleep_if_set(&self.lookup_delay).await;
        Ok(self.links.lock().unwrap().get(user_id).cloned())
    }
}
