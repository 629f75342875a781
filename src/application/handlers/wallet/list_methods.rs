//! ListMethodsHandler - rebuilds the wallet view from the processor.
//!
//! Nothing here is cached. The default pointer comes from a fresh customer
//! read so a default changed elsewhere is reflected immediately.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::UserId;
use crate::domain::wallet::{PaymentMethodView, WalletError};
use crate::ports::{PaymentProcessor, ProfileStore};

use super::support::{bounded, bounded_store};

#[derive(Debug, Clone)]
pub struct ListMethodsQuery {
    pub user_id: UserId,
}

pub struct ListMethodsHandler {
    profile_store: Arc<dyn ProfileStore>,
    processor: Arc<dyn PaymentProcessor>,
    call_timeout: Duration,
}

impl ListMethodsHandler {
    pub fn new(
        profile_store: Arc<dyn ProfileStore>,
        processor: Arc<dyn PaymentProcessor>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            profile_store,
            processor,
            call_timeout,
        }
    }

    pub async fn handle(
        &self,
        query: ListMethodsQuery,
    ) -> Result<Vec<PaymentMethodView>, WalletError> {
        let customer_id = bounded_store(
            self.call_timeout,
            self.profile_store.get_customer_id(&query.user_id),
        )
        .await
        .map_err(|failure| failure.store())?
        .ok_or_else(|| WalletError::profile_not_found(query.user_id.clone()))?;

        let tokens = bounded(self.call_timeout, self.processor.list_tokens(&customer_id))
            .await
            .map_err(|failure| failure.unavailable())?;

        let customer = bounded(self.call_timeout, self.processor.get_customer(&customer_id))
            .await
            .map_err(|failure| failure.unavailable())?
            .ok_or_else(|| {
                WalletError::processor_unavailable(format!(
                    "Customer {} no longer exists at the processor",
                    customer_id
                ))
            })?;

        let default_token_id = customer.default_token_id;
        Ok(tokens
            .iter()
            .map(|t| t.to_view(default_token_id.as_deref()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::profile::InMemoryProfileStore;
    use crate::adapters::stripe::MockProcessor;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    #[tokio::test]
    async fn lists_methods_with_fresh_default_pointer() {
        let store = Arc::new(InMemoryProfileStore::new());
        let processor = Arc::new(MockProcessor::new());
        let customer_id = processor.seed_customer("u1@example.com");
        store.seed_link(&user(), &customer_id);
        let a = processor.seed_attached_token(&customer_id, "visa", "4242", 12, 2030);
        let b = processor.seed_attached_token(&customer_id, "mastercard", "4444", 1, 2029);
        processor.force_default(&customer_id, &b);

        let handler = ListMethodsHandler::new(store, processor, Duration::from_secs(1));
        let views = handler
            .handle(ListMethodsQuery { user_id: user() })
            .await
            .unwrap();

        assert_eq!(views.len(), 2);
        let view_a = views.iter().find(|v| v.token_id == a).unwrap();
        let view_b = views.iter().find(|v| v.token_id == b).unwrap();
        assert!(!view_a.is_default);
        assert!(view_b.is_default);
    }

    #[tokio::test]
    async fn empty_wallet_lists_empty() {
        let store = Arc::new(InMemoryProfileStore::new());
        let processor = Arc::new(MockProcessor::new());
        let customer_id = processor.seed_customer("u1@example.com");
        store.seed_link(&user(), &customer_id);

        let handler = ListMethodsHandler::new(store, processor, Duration::from_secs(1));
        let views = handler
            .handle(ListMethodsQuery { user_id: user() })
            .await
            .unwrap();

        assert!(views.is_empty());
    }

    #[tokio::test]
    async fn unprovisioned_identity_is_profile_not_found() {
        let handler = ListMethodsHandler::new(
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(MockProcessor::new()),
            Duration::from_secs(1),
        );

        let result = handler.handle(ListMethodsQuery { user_id: user() }).await;

        assert!(matches!(result, Err(WalletError::ProfileNotFound(_))));
    }
}
