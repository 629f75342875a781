//! ProvisionIdentityHandler - saga creating a processor customer and its
//! profile link, atomically in effect.
//!
//! Ordering is deliberate: the processor customer is created first, the link
//! second. The only failure left uncompensated is "link insert failed and the
//! compensating delete also failed", which leaves an orphaned customer with
//! no link - a detectable leak, never a dangling link or a double customer.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::domain::foundation::UserId;
use crate::domain::wallet::WalletError;
use crate::ports::{
    CreateCustomerRequest, Notification, NotificationKind, NotificationSink, PaymentProcessor,
    ProfileStore,
};

use super::support::{bounded, bounded_store, notify_best_effort, StoreCallFailure};

/// Command to provision a payment identity.
#[derive(Debug, Clone)]
pub struct ProvisionIdentityCommand {
    pub user_id: UserId,
    pub email: String,
    pub display_name: Option<String>,
}

/// Handler for the provisioning saga.
pub struct ProvisionIdentityHandler {
    profile_store: Arc<dyn ProfileStore>,
    processor: Arc<dyn PaymentProcessor>,
    notifications: Arc<dyn NotificationSink>,
    call_timeout: Duration,
}

impl ProvisionIdentityHandler {
    pub fn new(
        profile_store: Arc<dyn ProfileStore>,
        processor: Arc<dyn PaymentProcessor>,
        notifications: Arc<dyn NotificationSink>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            profile_store,
            processor,
            notifications,
            call_timeout,
        }
    }

    /// Runs the saga. On success returns the processor customer id.
    pub async fn handle(&self, cmd: ProvisionIdentityCommand) -> Result<String, WalletError> {
        // An identity with a link already claims a customer; creating a
        // second one would violate the one-customer-per-identity invariant.
        if let Some(existing) = bounded_store(
            self.call_timeout,
            self.profile_store.get_customer_id(&cmd.user_id),
        )
        .await
        .map_err(|failure| failure.store())?
        {
            tracing::debug!(user_id = %cmd.user_id, customer_id = %existing, "Identity already provisioned");
            return Err(WalletError::already_provisioned(cmd.user_id));
        }

        // Step 1: create the processor customer. Nothing to compensate if
        // this fails.
        let customer = bounded(
            self.call_timeout,
            self.processor.create_customer(CreateCustomerRequest {
                user_id: cmd.user_id.clone(),
                email: cmd.email.clone(),
                display_name: cmd.display_name.clone(),
            }),
        )
        .await
        .map_err(|failure| failure.unavailable())?;

        tracing::info!(user_id = %cmd.user_id, customer_id = %customer.id, "Processor customer created");

        // Step 2: persist the link. On a definite failure, compensate with a
        // single best-effort customer delete; a failed delete leaves an orphan
        // the identity never references, so the identity stays retryable. A
        // timed-out insert is indeterminate - the link may have landed - so no
        // delete is attempted there.
        match bounded_store(
            self.call_timeout,
            self.profile_store.insert_profile_link(&cmd.user_id, &customer.id),
        )
        .await
        {
            Ok(()) => {}
            Err(StoreCallFailure::TimedOut) => {
                tracing::error!(
                    user_id = %cmd.user_id,
                    customer_id = %customer.id,
                    "Profile link insert timed out, outcome unknown"
                );
                return Err(WalletError::Timeout);
            }
            Err(StoreCallFailure::Failed(insert_err)) => {
                tracing::error!(
                    user_id = %cmd.user_id,
                    customer_id = %customer.id,
                    error = %insert_err,
                    "Profile link insert failed, compensating"
                );

                if let Err(delete_failure) =
                    bounded(self.call_timeout, self.processor.delete_customer(&customer.id)).await
                {
                    tracing::warn!(
                        customer_id = %customer.id,
                        error = ?delete_failure.processor_error().map(|e| e.to_string()),
                        "Compensating customer delete failed, orphaned customer left behind"
                    );
                }

                return Err(WalletError::provisioning_failed(insert_err.to_string()));
            }
        }

        notify_best_effort(
            self.notifications.as_ref(),
            Notification::now(
                NotificationKind::IdentityProvisioned,
                cmd.user_id.clone(),
                json!({ "customer_id": customer.id, "email": cmd.email }),
            ),
        )
        .await;

        Ok(customer.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notification::RecordingSink;
    use crate::adapters::profile::InMemoryProfileStore;
    use crate::adapters::stripe::MockProcessor;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn command() -> ProvisionIdentityCommand {
        ProvisionIdentityCommand {
            user_id: user(),
            email: "u1@example.com".to_string(),
            display_name: Some("User One".to_string()),
        }
    }

    fn handler(
        store: Arc<InMemoryProfileStore>,
        processor: Arc<MockProcessor>,
        sink: Arc<RecordingSink>,
    ) -> ProvisionIdentityHandler {
        ProvisionIdentityHandler::new(store, processor, sink, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn provisions_customer_and_link() {
        let store = Arc::new(InMemoryProfileStore::new());
        let processor = Arc::new(MockProcessor::new());
        let sink = Arc::new(RecordingSink::new());

        let customer_id = handler(store.clone(), processor.clone(), sink.clone())
            .handle(command())
            .await
            .unwrap();

        assert_eq!(
            store.get_customer_id(&user()).await.unwrap(),
            Some(customer_id.clone())
        );
        assert!(processor.customer_exists(&customer_id));
        assert_eq!(sink.events().len(), 1);
        assert_eq!(
            sink.events()[0].kind,
            NotificationKind::IdentityProvisioned
        );
    }

    #[tokio::test]
    async fn rejects_identity_that_already_has_a_link() {
        let store = Arc::new(InMemoryProfileStore::new());
        store.seed_link(&user(), "cus_existing");
        let processor = Arc::new(MockProcessor::new());
        let sink = Arc::new(RecordingSink::new());

        let result = handler(store, processor.clone(), sink)
            .handle(command())
            .await;

        assert!(matches!(result, Err(WalletError::AlreadyProvisioned(_))));
        assert_eq!(processor.created_customer_count(), 0);
    }

    #[tokio::test]
    async fn processor_failure_reports_unavailable_without_link() {
        let store = Arc::new(InMemoryProfileStore::new());
        let processor = Arc::new(MockProcessor::new());
        processor.set_fail_create_customer(true);
        let sink = Arc::new(RecordingSink::new());

        let result = handler(store.clone(), processor, sink)
            .handle(command())
            .await;

        assert!(matches!(
            result,
            Err(WalletError::ProcessorUnavailable { .. })
        ));
        assert_eq!(store.get_customer_id(&user()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn store_failure_compensates_with_customer_delete() {
        let store = Arc::new(InMemoryProfileStore::new());
        store.set_fail_insert(true);
        let processor = Arc::new(MockProcessor::new());
        let sink = Arc::new(RecordingSink::new());

        let result = handler(store.clone(), processor.clone(), sink.clone())
            .handle(command())
            .await;

        assert!(matches!(result, Err(WalletError::ProvisioningFailed { .. })));
        // No link persisted, and the created customer was deleted again.
        assert_eq!(store.get_customer_id(&user()).await.unwrap(), None);
        assert_eq!(processor.live_customer_count(), 0);
        assert_eq!(processor.deleted_customers().len(), 1);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn failed_compensation_still_reports_provisioning_failed() {
        let store = Arc::new(InMemoryProfileStore::new());
        store.set_fail_insert(true);
        let processor = Arc::new(MockProcessor::new());
        processor.set_fail_delete_customer(true);
        let sink = Arc::new(RecordingSink::new());

        let result = handler(store.clone(), processor.clone(), sink)
            .handle(command())
            .await;

        // The orphaned customer is tolerated; the identity has no link and
        // stays retryable.
        assert!(matches!(result, Err(WalletError::ProvisioningFailed { .. })));
        assert_eq!(store.get_customer_id(&user()).await.unwrap(), None);
        assert_eq!(processor.live_customer_count(), 1);
    }

    #[tokio::test]
    async fn slow_link_insert_maps_to_timeout_without_compensation() {
        let store = Arc::new(InMemoryProfileStore::new());
        store.set_insert_delay(Duration::from_secs(5));
        let processor = Arc::new(MockProcessor::new());
        let sink = Arc::new(RecordingSink::new());

        let handler = ProvisionIdentityHandler::new(
            store,
            processor.clone(),
            sink,
            Duration::from_millis(10),
        );
        let result = handler.handle(command()).await;

        // The insert outcome is unknown, so the customer must not be deleted
        // out from under a link that may exist.
        assert!(matches!(result, Err(WalletError::Timeout)));
        assert_eq!(processor.live_customer_count(), 1);
        assert!(processor.deleted_customers().is_empty());
    }

    #[tokio::test]
    async fn create_customer_timeout_maps_to_timeout() {
        let store = Arc::new(InMemoryProfileStore::new());
        let processor = Arc::new(MockProcessor::new());
        processor.set_create_customer_delay(Duration::from_secs(5));
        let sink = Arc::new(RecordingSink::new());

        let handler = ProvisionIdentityHandler::new(
            store,
            processor,
            sink,
            Duration::from_millis(10),
        );
        let result = handler.handle(command()).await;

        assert!(matches!(result, Err(WalletError::Timeout)));
    }
}
