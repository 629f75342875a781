//! Payment processor configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Payment processor configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key (sk_test_... or sk_live_...)
    pub stripe_api_key: String,

    /// Override for the Stripe API base URL (testing)
    #[serde(default)]
    pub stripe_api_base_url: Option<String>,

    /// Upper bound for any single processor call, in seconds. Workflows fail
    /// with a timeout past this; they never retry on their own.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
}

impl PaymentConfig {
    /// Get the processor call timeout as Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"));
        }
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if self.call_timeout_secs == 0 || self.call_timeout_secs > 60 {
            return Err(ValidationError::InvalidProcessorTimeout);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_api_base_url: None,
            call_timeout_secs: default_call_timeout(),
        }
    }
}

fn default_call_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_detection() {
        let config = PaymentConfig {
            stripe_api_key: "sk_test_xxx".to_string(),
            ..Default::default()
        };
        assert!(config.is_test_mode());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_api_key_is_rejected() {
        assert!(PaymentConfig::default().validate().is_err());
    }

    #[test]
    fn wrong_key_prefix_is_rejected() {
        let config = PaymentConfig {
            stripe_api_key: "pk_test_xxx".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidStripeKey)
        ));
    }

    #[test]
    fn zero_call_timeout_is_rejected() {
        let config = PaymentConfig {
            stripe_api_key: "sk_test_xxx".to_string(),
            call_timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidProcessorTimeout)
        ));
    }
}
