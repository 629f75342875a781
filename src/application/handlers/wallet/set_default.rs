//! SetDefaultHandler - repoints the customer's default token.
//!
//! The default pointer lives at the processor only. Ownership is verified
//! against a fresh listing, never against cached state.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::domain::foundation::UserId;
use crate::domain::wallet::WalletError;
use crate::ports::{
    Notification, NotificationKind, NotificationSink, PaymentProcessor, ProfileStore,
};

use super::identity_locks::IdentityLocks;
use super::support::{bounded, bounded_store, notify_best_effort};

#[derive(Debug, Clone)]
pub struct SetDefaultCommand {
    pub user_id: UserId,
    pub token_id: String,
}

pub struct SetDefaultHandler {
    profile_store: Arc<dyn ProfileStore>,
    processor: Arc<dyn PaymentProcessor>,
    notifications: Arc<dyn NotificationSink>,
    locks: Arc<IdentityLocks>,
    call_timeout: Duration,
}

impl SetDefaultHandler {
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

    pub async fn handle(&self, cmd: SetDefaultCommand) -> Result<(), WalletError> {
        let _guard = self.locks.acquire(&cmd.user_id).await;

        let customer_id = bounded_store(
            self.call_timeout,
            self.profile_store.get_customer_id(&cmd.user_id),
        )
        .await
        .map_err(|failure| failure.store())?
        .ok_or_else(|| WalletError::profile_not_found(cmd.user_id.clone()))?;

        let attached = bounded(self.call_timeout, self.processor.list_tokens(&customer_id))
            .await
            .map_err(|failure| failure.unavailable())?;

        if !attached.iter().any(|t| t.token_id == cmd.token_id) {
            return Err(WalletError::not_owned(cmd.token_id));
        }

        bounded(
            self.call_timeout,
            self.processor
                .set_default_token(&customer_id, &cmd.token_id),
        )
        .await
        .map_err(|failure| failure.unavailable())?;

        tracing::info!(
            user_id = %cmd.user_id,
            token_id = %cmd.token_id,
            "Default payment method changed"
        );

        notify_best_effort(
            self.notifications.as_ref(),
            Notification::now(
                NotificationKind::DefaultChanged,
                cmd.user_id.clone(),
                json!({ "token_id": cmd.token_id }),
            ),
        )
        .await;

        Ok(())
    }
}
