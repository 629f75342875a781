//! Notification configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Outbound webhook notification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Endpoint receiving wallet events as JSON. Unset disables delivery.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Delivery timeout in seconds
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout_secs: u64,
}

impl NotificationConfig {
    /// Get the delivery timeout as Duration
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }

    /// Validate notification configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.webhook_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidWebhookUrl);
            }
        }
        Ok(())
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            delivery_timeout_secs: default_delivery_timeout(),
        }
    }
}

fn default_delivery_timeout() -> u64 {
    5
}
