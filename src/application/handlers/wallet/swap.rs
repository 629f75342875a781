//! SwapHandler - replaces one payment method with another in a single
//! locked sequence: attach the replacement first, then release the old token.
//!
//! The detach leg is tolerated-failure: once the new method is attached the
//! swap has succeeded from the caller's point of view, and a stale old token
//! is an operational cleanup concern, not a rollback trigger.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::wallet::{PaymentMethodView, WalletError};

use super::confirm_attachment::{ConfirmAttachmentCommand, ConfirmAttachmentHandler};
use super::detach::{DetachCommand, DetachHandler};
use super::identity_locks::IdentityLocks;

#[derive(Debug, Clone)]
pub struct SwapCommand {
    pub user_id: UserId,
    pub handshake_ref: String,
    pub old_token_id: String,
}

pub struct SwapHandler {
    attachment: Arc<ConfirmAttachmentHandler>,
    detachment: Arc<DetachHandler>,
    locks: Arc<IdentityLocks>,
}

impl SwapHandler {
    pub fn new(
        attachment: Arc<ConfirmAttachmentHandler>,
        detachment: Arc<DetachHandler>,
        locks: Arc<IdentityLocks>,
    ) -> Self {
        Self {
            attachment,
            detachment,
            locks,
        }
    }

    pub async fn handle(&self, cmd: SwapCommand) -> Result<PaymentMethodView, WalletError> {
        // One lock across both legs; the inner workflow bodies are lock-free.
        let _guard = self.locks.acquire(&cmd.user_id).await;

        let view = self
            .attachment
            .execute(ConfirmAttachmentCommand {
                user_id: cmd.user_id.clone(),
                handshake_ref: cmd.handshake_ref,
            })
            .await?;

        if view.token_id != cmd.old_token_id {
            if let Err(err) = self
                .detachment
                .execute(DetachCommand {
                    user_id: cmd.user_id.clone(),
                    token_id: cmd.old_token_id.clone(),
                })
                .await
            {
                tracing::warn!(
                    user_id = %cmd.user_id,
                    old_token_id = %cmd.old_token_id,
                    error = %err,
                    "Old payment method could not be detached after swap"
                );
            }
        }

        Ok(view)
    }
}
