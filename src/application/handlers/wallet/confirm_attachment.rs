//! ConfirmAttachmentHandler - turns a completed setup handshake into an
//! attached, deduplicated payment method.
//!
//! The attach call is idempotent at the processor, so failures past it need
//! no compensation; the caller may simply re-run the workflow.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::domain::foundation::UserId;
use crate::domain::wallet::{becomes_default, find_duplicate, PaymentMethodView, WalletError};
use crate::ports::{
    Notification, NotificationKind, NotificationSink, PaymentProcessor, ProfileStore,
};

use super::identity_locks::IdentityLocks;
use super::support::{bounded, bounded_store, notify_best_effort};

/// Command to confirm a completed setup handshake.
#[derive(Debug, Clone)]
pub struct ConfirmAttachmentCommand {
    pub user_id: UserId,
    pub handshake_ref: String,
}

/// Handler for the attachment workflow.
pub struct ConfirmAttachmentHandler {
    profile_store: Arc<dyn ProfileStore>,
    processor: Arc<dyn PaymentProcessor>,
    notifications: Arc<dyn NotificationSink>,
    locks: Arc<IdentityLocks>,
    call_timeout: Duration,
}

impl ConfirmAttachmentHandler {
    pub fn new(
        profile_store: Arc<dyn ProfileStore>,
        processor: Arc<dyn PaymentProcessor>,
        notifications: Arc<dyn NotificationSink>,
        locks: Arc<IdentityLocks>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            profile_store,
            processor,
            notifications,
            locks,
            call_timeout,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmAttachmentCommand,
    ) -> Result<PaymentMethodView, WalletError> {
        let _guard = self.locks.acquire(&cmd.user_id).await;
        self.execute(cmd).await
    }

    /// Workflow body, run under the identity's lock. The swap workflow calls
    /// this directly while holding the lock itself.
    pub(crate) async fn execute(
        &self,
        cmd: ConfirmAttachmentCommand,
    ) -> Result<PaymentMethodView, WalletError> {
        // 1. Resolve the handshake to a token.
        let resolution = bounded(
            self.call_timeout,
            self.processor.resolve_handshake(&cmd.handshake_ref),
        )
        .await
        .map_err(|failure| failure.unavailable())?;

        if !resolution.status.is_succeeded() {
            return Err(WalletError::handshake_incomplete(
                resolution.status.as_str(),
            ));
        }
        if resolution.payment_type != "card" {
            return Err(WalletError::unsupported_payment_type(
                resolution.payment_type,
            ));
        }
        let token = resolution.token.ok_or_else(|| {
            WalletError::attachment_failed("Succeeded handshake carries no payment method")
        })?;

        // 2. Resolve the identity's customer.
        let customer_id = bounded_store(
            self.call_timeout,
            self.profile_store.get_customer_id(&cmd.user_id),
        )
        .await
        .map_err(|failure| failure.store())?
        .ok_or_else(|| WalletError::profile_not_found(cmd.user_id.clone()))?;

        // 3-4. Duplicate check against the currently attached set.
        let existing = bounded(self.call_timeout, self.processor.list_tokens(&customer_id))
            .await
            .map_err(|failure| failure.unavailable())?;

        if let Some(duplicate) = find_duplicate(&token, &existing) {
            tracing::debug!(
                user_id = %cmd.user_id,
                token_id = %token.token_id,
                duplicate_of = %duplicate.token_id,
                "Duplicate payment method rejected"
            );
            return Err(WalletError::DuplicatePaymentMethod);
        }

        // 5. Attach unless the processor already recorded us as the owner.
        if token.customer_id.as_deref() != Some(customer_id.as_str()) {
            bounded(
                self.call_timeout,
                self.processor.attach_token(&token.token_id, &customer_id),
            )
            .await
            .map_err(|failure| failure.attachment())?;
        }

        // 6. First-method-becomes-default, decided on the post-attach count.
        let attached_after =
            bounded(self.call_timeout, self.processor.list_tokens(&customer_id))
                .await
                .map_err(|failure| failure.attachment())?;

        let is_default = becomes_default(attached_after.len());
        if is_default {
            bounded(
                self.call_timeout,
                self.processor
                    .set_default_token(&customer_id, &token.token_id),
            )
            .await
            .map_err(|failure| failure.attachment())?;
        }

        tracing::info!(
            user_id = %cmd.user_id,
            token_id = %token.token_id,
            is_default,
            "Payment method attached"
        );

        notify_best_effort(
            self.notifications.as_ref(),
            Notification::now(
                NotificationKind::MethodAttached,
                cmd.user_id.clone(),
                json!({
                    "token_id": token.token_id,
                    "brand": token.brand,
                    "last4": token.last4,
                    "is_default": is_default,
                }),
            ),
        )
        .await;

        let default_pointer = is_default.then(|| token.token_id.clone());
        Ok(token.to_view(default_pointer.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notification::RecordingSink;
    use crate::adapters::profile::InMemoryProfileStore;
    use crate::adapters::stripe::MockProcessor;
    use crate::ports::HandshakeStatus;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    struct Fixture {
        store: Arc<InMemoryProfileStore>,
        processor: Arc<MockProcessor>,
        sink: Arc<RecordingSink>,
        handler: ConfirmAttachmentHandler,
        customer_id: String,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryProfileStore::new());
        let processor = Arc::new(MockProcessor::new());
        let sink = Arc::new(RecordingSink::new());
        let customer_id = processor.seed_customer("u1@example.com");
        store.seed_link(&user(), &customer_id);

        let handler = ConfirmAttachmentHandler::new(
            store.clone(),
            processor.clone(),
            sink.clone(),
            Arc::new(IdentityLocks::new()),
            Duration::from_secs(1),
        );
        Fixture {
            store,
            processor,
            sink,
            handler,
            customer_id,
        }
    }

    fn cmd(handshake_ref: &str) -> ConfirmAttachmentCommand {
        ConfirmAttachmentCommand {
            user_id: user(),
            handshake_ref: handshake_ref.to_string(),
        }
    }

    #[tokio::test]
    async fn first_card_attaches_and_becomes_default() {
        let fx = fixture();
        let handshake = fx
            .processor
            .seed_succeeded_handshake("card", "visa", "4242", 12, 2030);

        let view = fx.handler.handle(cmd(&handshake)).await.unwrap();

        assert!(view.is_default);
        assert_eq!(view.brand, "visa");
        assert_eq!(view.last4, "4242");
        assert_eq!(fx.processor.attached_tokens(&fx.customer_id).len(), 1);
        assert_eq!(
            fx.processor.default_of(&fx.customer_id),
            Some(view.token_id.clone())
        );
        assert_eq!(fx.sink.events().len(), 1);
        assert_eq!(fx.sink.events()[0].kind, NotificationKind::MethodAttached);
    }

    #[tokio::test]
    async fn second_distinct_card_attaches_without_touching_default() {
        let fx = fixture();
        let first = fx
            .processor
            .seed_succeeded_handshake("card", "visa", "4242", 12, 2030);
        let first_view = fx.handler.handle(cmd(&first)).await.unwrap();

        let second = fx
            .processor
            .seed_succeeded_handshake("card", "mastercard", "4444", 1, 2029);
        let second_view = fx.handler.handle(cmd(&second)).await.unwrap();

        assert!(!second_view.is_default);
        assert_eq!(fx.processor.attached_tokens(&fx.customer_id).len(), 2);
        assert_eq!(
            fx.processor.default_of(&fx.customer_id),
            Some(first_view.token_id)
        );
    }

    #[tokio::test]
    async fn same_fingerprint_is_rejected_as_duplicate() {
        let fx = fixture();
        let first = fx
            .processor
            .seed_succeeded_handshake("card", "visa", "4242", 12, 2030);
        fx.handler.handle(cmd(&first)).await.unwrap();

        // New token id, same card.
        let second = fx
            .processor
            .seed_succeeded_handshake("card", "visa", "4242", 12, 2030);
        let result = fx.handler.handle(cmd(&second)).await;

        assert!(matches!(result, Err(WalletError::DuplicatePaymentMethod)));
        assert_eq!(fx.processor.attached_tokens(&fx.customer_id).len(), 1);
    }

    #[tokio::test]
    async fn incomplete_handshake_is_rejected() {
        let fx = fixture();
        let handshake = fx
            .processor
            .seed_handshake(HandshakeStatus::RequiresAction, "card", None);

        let result = fx.handler.handle(cmd(&handshake)).await;

        assert!(matches!(
            result,
            Err(WalletError::HandshakeIncomplete { .. })
        ));
        assert!(fx.processor.attached_tokens(&fx.customer_id).is_empty());
    }

    #[tokio::test]
    async fn non_card_payment_type_is_rejected() {
        let fx = fixture();
        let handshake = fx
            .processor
            .seed_succeeded_handshake("sepa_debit", "n/a", "0000", 1, 2030);

        let result = fx.handler.handle(cmd(&handshake)).await;

        assert!(matches!(
            result,
            Err(WalletError::UnsupportedPaymentType(kind)) if kind == "sepa_debit"
        ));
    }

    #[tokio::test]
    async fn missing_profile_link_fails_before_any_mutation() {
        let fx = fixture();
        fx.store.clear();
        let handshake = fx
            .processor
            .seed_succeeded_handshake("card", "visa", "4242", 12, 2030);

        let result = fx.handler.handle(cmd(&handshake)).await;

        assert!(matches!(result, Err(WalletError::ProfileNotFound(_))));
        assert!(fx.processor.attached_tokens(&fx.customer_id).is_empty());
    }

    #[tokio::test]
    async fn attach_failure_surfaces_as_attachment_failed() {
        let fx = fixture();
        let handshake = fx
            .processor
            .seed_succeeded_handshake("card", "visa", "4242", 12, 2030);
        fx.processor.set_fail_attach(true);

        let result = fx.handler.handle(cmd(&handshake)).await;

        assert!(matches!(result, Err(WalletError::AttachmentFailed { .. })));
        assert!(fx.sink.events().is_empty());
    }

    #[tokio::test]
    async fn set_default_failure_after_attach_is_attachment_failed() {
        let fx = fixture();
        let handshake = fx
            .processor
            .seed_succeeded_handshake("card", "visa", "4242", 12, 2030);
        fx.processor.set_fail_set_default(true);

        let result = fx.handler.handle(cmd(&handshake)).await;

        // The attach went through and stays attached.
        assert!(matches!(result, Err(WalletError::AttachmentFailed { .. })));
        assert_eq!(fx.processor.attached_tokens(&fx.customer_id).len(), 1);
    }

    #[tokio::test]
    async fn resolve_timeout_maps_to_timeout() {
        let fx = fixture();
        let handshake = fx
            .processor
            .seed_succeeded_handshake("card", "visa", "4242", 12, 2030);
        fx.processor.set_resolve_delay(Duration::from_secs(5));

        let handler = ConfirmAttachmentHandler::new(
            fx.store.clone(),
            fx.processor.clone(),
            fx.sink.clone(),
            Arc::new(IdentityLocks::new()),
            Duration::from_millis(10),
        );
        let result = handler.handle(cmd(&handshake)).await;

        assert!(matches!(result, Err(WalletError::Timeout)));
    }
}
