//! Stripe API response types.
//!
//! Only the fields the adapter reads are modeled; everything else in the
//! Stripe payloads is ignored by serde.

use serde::Deserialize;

/// Stripe customer object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomer {
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    /// Present (and true) on deleted customer stubs.
    #[serde(default)]
    pub deleted: bool,

    #[serde(default)]
    pub invoice_settings: Option<StripeInvoiceSettings>,
}

/// Customer invoice settings; carries the default payment method pointer.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeInvoiceSettings {
    #[serde(default)]
    pub default_payment_method: Option<String>,
}

/// Stripe setup intent object (fetched with `expand[]=payment_method`).
#[derive(Debug, Clone, Deserialize)]
pub struct StripeSetupIntent {
    pub id: String,

    pub status: String,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default)]
    pub payment_method: Option<StripePaymentMethod>,
}

/// Stripe payment method object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentMethod {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub customer: Option<String>,

    #[serde(default)]
    pub card: Option<StripeCard>,

    /// Unix timestamp.
    #[serde(default)]
    pub created: i64,
}

/// Card details on a payment method.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCard {
    pub brand: String,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: i32,
}

/// Generic Stripe list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,
}

/// Stripe error envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    pub error: StripeApiError,
}

/// The error object inside a Stripe failure response.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_expanded_setup_intent() {
        let json = r#"{
            "id": "seti_1",
            "status": "succeeded",
            "client_secret": "seti_1_secret_x",
            "payment_method": {
                "id": "pm_1",
                "type": "card",
                "customer": null,
                "created": 1700000000,
                "card": {"brand": "visa", "last4": "4242", "exp_month": 12, "exp_year": 2030}
            }
        }"#;

        let intent: StripeSetupIntent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.status, "succeeded");
        let pm = intent.payment_method.unwrap();
        assert_eq!(pm.kind, "card");
        assert_eq!(pm.card.unwrap().last4, "4242");
    }

    #[test]
    fn parses_deleted_customer_stub() {
        let json = r#"{"id": "cus_1", "object": "customer", "deleted": true}"#;
        let customer: StripeCustomer = serde_json::from_str(json).unwrap();
        assert!(customer.deleted);
        assert!(customer.invoice_settings.is_none());
    }

    #[test]
    fn parses_error_envelope() {
        let json = r#"{"error": {"code": "payment_method_unattached", "message": "nope"}}"#;
        let body: StripeErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.error.code.as_deref(), Some("payment_method_unattached"));
    }
}
