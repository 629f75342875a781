//! HTTP DTOs for wallet endpoints.
//!
//! The JSON boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::domain::wallet::PaymentMethodView;
use crate::ports::SetupHandshake;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to provision a payment identity.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionRequest {
    /// Email for the processor customer.
    pub email: String,

    /// Optional display name shown on processor dashboards.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Request to confirm a completed setup handshake.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmMethodRequest {
    /// The handshake ref returned by `POST /wallet/setup`.
    pub handshake_ref: String,
}

/// Request to repoint the default payment method.
#[derive(Debug, Clone, Deserialize)]
pub struct SetDefaultRequest {
    pub token_id: String,
}

/// Request to replace an existing payment method.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapMethodRequest {
    /// Handshake that collected the replacement card.
    pub handshake_ref: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response after provisioning an identity.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionResponse {
    pub customer_id: String,
}

/// Response carrying a freshly opened setup handshake.
#[derive(Debug, Clone, Serialize)]
pub struct SetupResponse {
    pub handshake_id: String,
    pub client_secret: String,
}

impl From<SetupHandshake> for SetupResponse {
    fn from(handshake: SetupHandshake) -> Self {
        Self {
            handshake_id: handshake.id,
            client_secret: handshake.client_secret,
        }
    }
}

/// A single payment method in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethodResponse {
    pub token_id: String,
    pub brand: String,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: i32,
    pub is_default: bool,
    /// ISO 8601.
    pub created_at: String,
}

impl From<PaymentMethodView> for PaymentMethodResponse {
    fn from(view: PaymentMethodView) -> Self {
        Self {
            token_id: view.token_id,
            brand: view.brand,
            last4: view.last4,
            exp_month: view.exp_month,
            exp_year: view.exp_year,
            is_default: view.is_default,
            created_at: view.created_at.to_rfc3339(),
        }
    }
}

/// Response listing all attached methods.
#[derive(Debug, Clone, Serialize)]
pub struct ListMethodsResponse {
    pub methods: Vec<PaymentMethodResponse>,
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
