//! Card token records and caller-facing views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Fingerprint;

/// A tokenized card as reported by the processor.
///
/// Never persisted locally as source of truth; every read re-derives this
/// from the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Processor's opaque token id (pm_...).
    pub token_id: String,

    /// Customer the token is currently attached to, if any.
    pub customer_id: Option<String>,

    /// Card network (visa, mastercard, ...), as the processor reports it.
    pub brand: String,

    /// Last four digits of the card number.
    pub last4: String,

    /// Expiry month (1-12).
    pub exp_month: u32,

    /// Expiry year (four digits).
    pub exp_year: i32,

    /// When the token was created at the processor.
    pub created_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Derives the duplicate-detection fingerprint for this token.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            brand: self.brand.clone(),
            last4: self.last4.clone(),
            exp_month: self.exp_month,
            exp_year: self.exp_year,
        }
    }

    /// Builds the caller-facing view, marking whether this token is the
    /// customer's default.
    pub fn to_view(&self, default_token_id: Option<&str>) -> PaymentMethodView {
        PaymentMethodView {
            token_id: self.token_id.clone(),
            brand: self.brand.clone(),
            last4: self.last4.clone(),
            exp_month: self.exp_month,
            exp_year: self.exp_year,
            is_default: default_token_id == Some(self.token_id.as_str()),
            created_at: self.created_at,
        }
    }
}

/// What workflows return to the caller about an attached card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodView {
    pub token_id: String,
    pub brand: String,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: i32,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}
