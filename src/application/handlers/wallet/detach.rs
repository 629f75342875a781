//! DetachHandler - removes a token from the identity's customer.
//!
//! Detachment is idempotent: a token the processor already released counts as
//! success. The default pointer is never reassigned here; the processor drops
//! it when the default token detaches and the next listing reflects that.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::domain::foundation::UserId;
use crate::domain::wallet::WalletError;
use crate::ports::{
    Notification, NotificationKind, NotificationSink, PaymentProcessor, ProcessorErrorCode,
    ProfileStore,
};

use super::identity_locks::IdentityLocks;
use super::support::{bounded, bounded_store, notify_best_effort, CallFailure};

#[derive(Debug, Clone)]
pub struct DetachCommand {
    pub user_id: UserId,
    pub token_id: String,
}

pub struct DetachHandler {
    profile_store: Arc<dyn ProfileStore>,
    processor: Arc<dyn PaymentProcessor>,
    notifications: Arc<dyn NotificationSink>,
    locks: Arc<IdentityLocks>,
    call_timeout: Duration,
}

impl DetachHandler {
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

    pub async fn handle(&self, cmd: DetachCommand) -> Result<(), WalletError> {
        let _guard = self.locks.acquire(&cmd.user_id).await;
        self.execute(cmd).await
    }

    /// Workflow body, run under the identity's lock. The swap workflow calls
    /// this directly while holding the lock itself.
    pub(crate) async fn execute(&self, cmd: DetachCommand) -> Result<(), WalletError> {
        let customer_id = bounded_store(
            self.call_timeout,
            self.profile_store.get_customer_id(&cmd.user_id),
        )
        .await
        .map_err(|failure| failure.store())?
        .ok_or_else(|| WalletError::profile_not_found(cmd.user_id.clone()))?;

        let token = bounded(self.call_timeout, self.processor.get_token(&cmd.token_id))
            .await
            .map_err(|failure| failure.unavailable())?;

        match token {
            // Unknown token: refuse rather than leak whether it exists.
            None => return Err(WalletError::forbidden(cmd.token_id)),
            Some(record) => match record.customer_id.as_deref() {
                // Already detached everywhere.
                None => {
                    tracing::debug!(
                        user_id = %cmd.user_id,
                        token_id = %cmd.token_id,
                        "Token already detached"
                    );
                    return Ok(());
                }
                Some(owner) if owner != customer_id => {
                    tracing::warn!(
                        user_id = %cmd.user_id,
                        token_id = %cmd.token_id,
                        "Detach refused for token owned by another customer"
                    );
                    return Err(WalletError::forbidden(cmd.token_id));
                }
                Some(_) => {}
            },
        }

        match bounded(
            self.call_timeout,
            self.processor.detach_token(&cmd.token_id),
        )
        .await
        {
            Ok(()) => {}
            Err(CallFailure::Failed(err)) if err.code == ProcessorErrorCode::NotAttached => {
                tracing::debug!(
                    user_id = %cmd.user_id,
                    token_id = %cmd.token_id,
                    "Processor reports token already detached"
                );
            }
            Err(failure) => return Err(failure.detachment()),
        }

        tracing::info!(
            user_id = %cmd.user_id,
            token_id = %cmd.token_id,
            "Payment method detached"
        );

        notify_best_effort(
            self.notifications.as_ref(),
            Notification::now(
                NotificationKind::MethodDetached,
                cmd.user_id.clone(),
                json!({ "token_id": cmd.token_id }),
            ),
        )
        .await;

        Ok(())
    }
}
