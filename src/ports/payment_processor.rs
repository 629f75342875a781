//! Payment processor port.
//!
//! Defines the contract for the external processor that owns customer
//! records, card tokens, and the authoritative default-method pointer
//! (e.g. Stripe). The core never holds a local copy of any of this state.
//!
//! # Design
//!
//! - **Processor agnostic**: the interface works with any tokenizing gateway
//! - **Stateless accessor**: the default pointer is always re-read, never cached
//! - **Idempotent detach**: "already detached" is reported as a distinct code
//!   so workflows can treat it as success

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;
use crate::domain::wallet::TokenRecord;

/// Port for the external payment processor.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a customer record for an identity.
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerRecord, ProcessorError>;

    /// Fetch a customer, including the current default token pointer.
    ///
    /// Returns `None` for unknown or deleted customers.
    async fn get_customer(&self, customer_id: &str)
        -> Result<Option<CustomerRecord>, ProcessorError>;

    /// Delete a customer. Used only as saga compensation.
    async fn delete_customer(&self, customer_id: &str) -> Result<(), ProcessorError>;

    /// Open a setup handshake for off-band card collection.
    ///
    /// The identity travels as metadata; no card data ever passes through
    /// this service.
    async fn create_setup_handshake(
        &self,
        user_id: &UserId,
    ) -> Result<SetupHandshake, ProcessorError>;

    /// Resolve a handshake to its status and, when complete, the collected
    /// token.
    async fn resolve_handshake(
        &self,
        handshake_ref: &str,
    ) -> Result<HandshakeResolution, ProcessorError>;

    /// List card tokens currently attached to a customer.
    async fn list_tokens(&self, customer_id: &str) -> Result<Vec<TokenRecord>, ProcessorError>;

    /// Fetch a single token regardless of attachment state.
    ///
    /// Returns `None` for unknown tokens.
    async fn get_token(&self, token_id: &str) -> Result<Option<TokenRecord>, ProcessorError>;

    /// Attach a token to a customer. Safe to re-invoke for a token already
    /// attached to the same customer.
    async fn attach_token(&self, token_id: &str, customer_id: &str)
        -> Result<(), ProcessorError>;

    /// Detach a token from whichever customer holds it.
    ///
    /// Detaching an unattached token fails with `ProcessorErrorCode::NotAttached`.
    async fn detach_token(&self, token_id: &str) -> Result<(), ProcessorError>;

    /// Point the customer's default at the given token.
    ///
    /// The processor enforces "at most one default" internally; this call is
    /// the only writer the core uses.
    async fn set_default_token(
        &self,
        customer_id: &str,
        token_id: &str,
    ) -> Result<(), ProcessorError>;
}

/// Request to create a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    /// Internal user ID (stored as processor metadata).
    pub user_id: UserId,

    /// Customer email address.
    pub email: String,

    /// Display name shown on processor dashboards.
    pub display_name: Option<String>,
}

/// Customer record as held by the processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Processor's customer id (cus_...).
    pub id: String,

    /// Customer email.
    pub email: String,

    /// Source of truth for "default": the token the customer's default
    /// pointer currently targets, if any.
    pub default_token_id: Option<String>,
}

/// Opaque reference to an opened setup handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupHandshake {
    /// Processor's handshake id (seti_...).
    pub id: String,

    /// Secret handed to the card-collection UI.
    pub client_secret: String,
}

/// Outcome of resolving a setup handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeResolution {
    /// Processor's handshake id.
    pub handshake_id: String,

    /// Handshake status as reported by the processor.
    pub status: HandshakeStatus,

    /// Payment method type of the collected token ("card", "sepa_debit", ...).
    pub payment_type: String,

    /// The collected token, present once the handshake has a payment method.
    pub token: Option<TokenRecord>,
}

/// Setup handshake status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeStatus {
    /// Card collected and confirmed.
    Succeeded,

    /// Still confirming.
    Processing,

    /// Customer action outstanding (3DS etc.).
    RequiresAction,

    /// No payment method supplied yet.
    RequiresPaymentMethod,

    /// Handshake was canceled.
    Canceled,

    /// Unknown status from the processor.
    Unknown,
}

impl HandshakeStatus {
    /// Only a succeeded handshake may be turned into an attached method.
    pub fn is_succeeded(&self) -> bool {
        matches!(self, HandshakeStatus::Succeeded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HandshakeStatus::Succeeded => "succeeded",
            HandshakeStatus::Processing => "processing",
            HandshakeStatus::RequiresAction => "requires_action",
            HandshakeStatus::RequiresPaymentMethod => "requires_payment_method",
            HandshakeStatus::Canceled => "canceled",
            HandshakeStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for HandshakeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors from processor operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorError {
    /// Error code for categorization.
    pub code: ProcessorErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Processor's own error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried by the adapter's own policy.
    pub retryable: bool,
}

impl ProcessorError {
    /// Create a new processor error.
    pub fn new(code: ProcessorErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Attach the processor's own error code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::NetworkError, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(ProcessorErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Create an already-detached error.
    pub fn not_attached(token_id: &str) -> Self {
        Self::new(
            ProcessorErrorCode::NotAttached,
            format!("Payment method {} is not attached to a customer", token_id),
        )
    }

    /// Create a generic provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for ProcessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ProcessorError {}

/// Processor error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Resource not found.
    NotFound,

    /// Detach was requested for a token that is not attached.
    NotAttached,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Processor API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl ProcessorErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProcessorErrorCode::NetworkError | ProcessorErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for ProcessorErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProcessorErrorCode::NetworkError => "network_error",
            ProcessorErrorCode::AuthenticationError => "authentication_error",
            ProcessorErrorCode::NotFound => "not_found",
            ProcessorErrorCode::NotAttached => "not_attached",
            ProcessorErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            ProcessorErrorCode::ProviderError => "provider_error",
            ProcessorErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
