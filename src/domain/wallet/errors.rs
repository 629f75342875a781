//! Wallet-specific error types.
//!
//! The taxonomy every workflow reports through. Business outcomes the UI must
//! explain (duplicate card, not-owned token) are ordinary variants here, not
//! panics or generic failures.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ProfileNotFound | 404 |
//! | AlreadyProvisioned | 409 |
//! | DuplicatePaymentMethod | 409 |
//! | UnsupportedPaymentType | 400 |
//! | HandshakeIncomplete | 400 |
//! | NotOwned | 403 |
//! | Forbidden | 403 |
//! | Timeout | 504 |
//! | ProcessorUnavailable | 503 |
//! | ProvisioningFailed | 502 |
//! | AttachmentFailed | 502 |
//! | DetachmentFailed | 502 |
//! | Store | 500 |

use crate::domain::foundation::UserId;

/// Wallet workflow errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The processor could not be reached; the whole workflow may be retried.
    ProcessorUnavailable { reason: String },

    /// An external call exceeded its time bound. Never retried internally.
    Timeout,

    /// No profile link exists for this identity; provisioning must run first.
    ProfileNotFound(UserId),

    /// The identity already has a profile link and a claimed customer.
    AlreadyProvisioned(UserId),

    /// The card is already attached to this customer (same token id or
    /// same fingerprint). Nothing changed; an expected outcome, not a fault.
    DuplicatePaymentMethod,

    /// The handshake resolved to a non-card payment type.
    UnsupportedPaymentType(String),

    /// The setup handshake has not reached `succeeded`.
    HandshakeIncomplete { status: String },

    /// The token is not attached to the caller's customer (default
    /// reassignment path).
    NotOwned { token_id: String },

    /// The token belongs to a different customer (detach path).
    Forbidden { token_id: String },

    /// Saga step 2 failed: the profile link was not persisted. The created
    /// customer was compensated (best effort); provisioning may be retried.
    ProvisioningFailed { reason: String },

    /// A processor call failed after the handshake was resolved. The attach
    /// itself is idempotent at the processor, so the caller may retry.
    AttachmentFailed { reason: String },

    /// The processor rejected the detach for a reason other than
    /// "already detached".
    DetachmentFailed { reason: String },

    /// Profile store infrastructure error.
    Store(String),
}

impl WalletError {
    pub fn processor_unavailable(reason: impl Into<String>) -> Self {
        WalletError::ProcessorUnavailable {
            reason: reason.into(),
        }
    }

    pub fn profile_not_found(user_id: UserId) -> Self {
        WalletError::ProfileNotFound(user_id)
    }

    pub fn already_provisioned(user_id: UserId) -> Self {
        WalletError::AlreadyProvisioned(user_id)
    }

    pub fn unsupported_payment_type(kind: impl Into<String>) -> Self {
        WalletError::UnsupportedPaymentType(kind.into())
    }

    pub fn handshake_incomplete(status: impl Into<String>) -> Self {
        WalletError::HandshakeIncomplete {
            status: status.into(),
        }
    }

    pub fn not_owned(token_id: impl Into<String>) -> Self {
        WalletError::NotOwned {
            token_id: token_id.into(),
        }
    }

    pub fn forbidden(token_id: impl Into<String>) -> Self {
        WalletError::Forbidden {
            token_id: token_id.into(),
        }
    }

    pub fn provisioning_failed(reason: impl Into<String>) -> Self {
        WalletError::ProvisioningFailed {
            reason: reason.into(),
        }
    }

    pub fn attachment_failed(reason: impl Into<String>) -> Self {
        WalletError::AttachmentFailed {
            reason: reason.into(),
        }
    }

    pub fn detachment_failed(reason: impl Into<String>) -> Self {
        WalletError::DetachmentFailed {
            reason: reason.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        WalletError::Store(message.into())
    }

    /// Returns the stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::ProcessorUnavailable { .. } => "PROCESSOR_UNAVAILABLE",
            WalletError::Timeout => "TIMEOUT",
            WalletError::ProfileNotFound(_) => "PROFILE_NOT_FOUND",
            WalletError::AlreadyProvisioned(_) => "ALREADY_PROVISIONED",
            WalletError::DuplicatePaymentMethod => "DUPLICATE_PAYMENT_METHOD",
            WalletError::UnsupportedPaymentType(_) => "UNSUPPORTED_PAYMENT_TYPE",
            WalletError::HandshakeIncomplete { .. } => "HANDSHAKE_INCOMPLETE",
            WalletError::NotOwned { .. } => "NOT_OWNED",
            WalletError::Forbidden { .. } => "FORBIDDEN",
            WalletError::ProvisioningFailed { .. } => "PROVISIONING_FAILED",
            WalletError::AttachmentFailed { .. } => "ATTACHMENT_FAILED",
            WalletError::DetachmentFailed { .. } => "DETACHMENT_FAILED",
            WalletError::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            WalletError::ProcessorUnavailable { reason } => {
                format!("Payment processor unavailable: {}", reason)
            }
            WalletError::Timeout => "External call timed out".to_string(),
            WalletError::ProfileNotFound(user_id) => {
                format!("No payment profile found for user: {}", user_id)
            }
            WalletError::AlreadyProvisioned(user_id) => {
                format!("User {} already has a payment profile", user_id)
            }
            WalletError::DuplicatePaymentMethod => {
                "This card is already saved for this customer".to_string()
            }
            WalletError::UnsupportedPaymentType(kind) => {
                format!("Only card payment methods are supported, got '{}'", kind)
            }
            WalletError::HandshakeIncomplete { status } => {
                format!("Card setup has not completed (status: {})", status)
            }
            WalletError::NotOwned { token_id } => {
                format!("Payment method {} is not attached to this customer", token_id)
            }
            WalletError::Forbidden { token_id } => {
                format!("Payment method {} belongs to a different customer", token_id)
            }
            WalletError::ProvisioningFailed { reason } => {
                format!("Could not provision payment profile: {}", reason)
            }
            WalletError::AttachmentFailed { reason } => {
                format!("Could not attach payment method: {}", reason)
            }
            WalletError::DetachmentFailed { reason } => {
                format!("Could not detach payment method: {}", reason)
            }
            WalletError::Store(msg) => format!("Profile store error: {}", msg),
        }
    }

    /// Returns true if the caller may retry the whole workflow.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WalletError::ProcessorUnavailable { .. }
                | WalletError::Timeout
                | WalletError::ProvisioningFailed { .. }
                | WalletError::AttachmentFailed { .. }
        )
    }

    /// Returns true for expected business outcomes rather than faults.
    pub fn is_business_outcome(&self) -> bool {
        matches!(
            self,
            WalletError::DuplicatePaymentMethod
                | WalletError::NotOwned { .. }
                | WalletError::Forbidden { .. }
        )
    }
}

impl std::fmt::Display for WalletError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for WalletError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(WalletError::DuplicatePaymentMethod.code(), "DUPLICATE_PAYMENT_METHOD");
        assert_eq!(WalletError::profile_not_found(user()).code(), "PROFILE_NOT_FOUND");
        assert_eq!(WalletError::not_owned("pm_1").code(), "NOT_OWNED");
        assert_eq!(WalletError::Timeout.code(), "TIMEOUT");
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(WalletError::processor_unavailable("down").is_retryable());
        assert!(WalletError::Timeout.is_retryable());
        assert!(WalletError::provisioning_failed("insert failed").is_retryable());
    }

    #[test]
    fn business_outcomes_are_not_retryable() {
        assert!(!WalletError::DuplicatePaymentMethod.is_retryable());
        assert!(!WalletError::forbidden("pm_1").is_retryable());
        assert!(WalletError::DuplicatePaymentMethod.is_business_outcome());
        assert!(WalletError::not_owned("pm_1").is_business_outcome());
        assert!(!WalletError::Timeout.is_business_outcome());
    }

    #[test]
    fn display_uses_friendly_message() {
        let err = WalletError::handshake_incomplete("requires_action");
        assert!(err.to_string().contains("requires_action"));
    }
}
