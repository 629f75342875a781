//! BeginAttachmentHandler - opens a setup handshake with the processor so the
//! caller can collect card details out of band.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::UserId;
use crate::domain::wallet::WalletError;
use crate::ports::{PaymentProcessor, SetupHandshake};

use super::support::bounded;

#[derive(Debug, Clone)]
pub struct BeginAttachmentCommand {
    pub user_id: UserId,
}

pub struct BeginAttachmentHandler {
    processor: Arc<dyn PaymentProcessor>,
    call_timeout: Duration,
}

impl BeginAttachmentHandler {
    pub fn new(processor: Arc<dyn PaymentProcessor>, call_timeout: Duration) -> Self {
        Self {
            processor,
            call_timeout,
        }
    }

    pub async fn handle(
        &self,
        cmd: BeginAttachmentCommand,
    ) -> Result<SetupHandshake, WalletError> {
        let handshake = bounded(
            self.call_timeout,
            self.processor.create_setup_handshake(&cmd.user_id),
        )
        .await
        .map_err(|failure| failure.unavailable())?;

        tracing::info!(
            user_id = %cmd.user_id,
            handshake_id = %handshake.id,
            "Setup handshake created"
        );
        Ok(handshake)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockProcessor;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    #[tokio::test]
    async fn returns_handshake_with_client_secret() {
        let processor = Arc::new(MockProcessor::new());
        let handler = BeginAttachmentHandler::new(processor, Duration::from_secs(1));

        let handshake = handler
            .handle(BeginAttachmentCommand { user_id: user() })
            .await
            .unwrap();

        assert!(!handshake.id.is_empty());
        assert!(!handshake.client_secret.is_empty());
    }

    #[tokio::test]
    async fn processor_failure_maps_to_unavailable() {
        let processor = Arc::new(MockProcessor::new());
        processor.set_fail_create_handshake(true);
        let handler = BeginAttachmentHandler::new(processor, Duration::from_secs(1));

        let result = handler
            .handle(BeginAttachmentCommand { user_id: user() })
            .await;

        assert!(matches!(
            result,
            Err(WalletError::ProcessorUnavailable { .. })
        ));
    }
}
