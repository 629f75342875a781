//! Outbound webhook notification sink.
//!
//! Posts wallet events as JSON to a configured endpoint (an automation
//! pipeline in the usual deployment). Fire-and-forget from the workflows'
//! perspective; this sink only reports the failure, callers swallow it.

use std::time::Duration;

use async_trait::async_trait;

use crate::ports::{Notification, NotificationError, NotificationSink};

/// `NotificationSink` delivering events over HTTP.
pub struct WebhookSink {
    endpoint: String,
    http_client: reqwest::Client,
}

impl WebhookSink {
    /// Fails if the HTTP client cannot be built; a client without the
    /// configured delivery timeout must not be used silently.
    pub fn new(
        endpoint: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            http_client,
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&notification)
            .send()
            .await
            .map_err(|e| NotificationError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotificationError(format!(
                "Webhook endpoint returned {}",
                response.status()
            )));
        }

        tracing::debug!(
            event = notification.kind.as_str(),
            user_id = %notification.user_id,
            "Notification delivered"
        );
        Ok(())
    }
}

/// Sink used when no webhook endpoint is configured.
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn notify(&self, _notification: Notification) -> Result<(), NotificationError> {
        Ok(())
    }
}
