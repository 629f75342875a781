//! Stripe payment processor adapter.
//!
//! Implements `PaymentProcessor` against the Stripe REST API: customers,
//! setup intents (the setup handshake), and payment methods (card tokens).
//! All requests are form-encoded per Stripe convention; the API key is held
//! in `secrecy::SecretString` and sent via basic auth.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::UserId;
use crate::domain::wallet::TokenRecord;
use crate::ports::{
    CreateCustomerRequest, CustomerRecord, HandshakeResolution, HandshakeStatus, PaymentProcessor,
    ProcessorError, ProcessorErrorCode, SetupHandshake,
};

use super::types::{
    StripeCustomer, StripeErrorBody, StripeList, StripePaymentMethod, StripeSetupIntent,
};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Stripe payment processor adapter.
pub struct StripeProcessorAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeProcessorAdapter {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    fn api_key(&self) -> &str {
        self.config.api_key.expose_secret()
    }

    /// Turn a non-success Stripe response into a `ProcessorError`, keeping
    /// Stripe's own error code when the body carries one.
    async fn error_from_response(
        operation: &str,
        response: reqwest::Response,
    ) -> ProcessorError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(operation, status = %status, error = %body, "Stripe API call failed");

        let code = match status.as_u16() {
            401 | 403 => ProcessorErrorCode::AuthenticationError,
            404 => ProcessorErrorCode::NotFound,
            429 => ProcessorErrorCode::RateLimitExceeded,
            _ => ProcessorErrorCode::ProviderError,
        };

        let parsed: Option<StripeErrorBody> = serde_json::from_str(&body).ok();
        let stripe_code = parsed.as_ref().and_then(|b| b.error.code.clone());
        let message = parsed
            .and_then(|b| b.error.message)
            .unwrap_or_else(|| format!("Stripe API error ({})", status));

        let mut err = ProcessorError::new(code, message);
        if let Some(stripe_code) = stripe_code {
            err = err.with_provider_code(stripe_code);
        }
        err
    }

    fn token_from_payment_method(pm: StripePaymentMethod) -> Result<TokenRecord, ProcessorError> {
        let card = pm.card.ok_or_else(|| {
            ProcessorError::provider(format!("Payment method {} has no card details", pm.id))
        })?;
        Ok(TokenRecord {
            token_id: pm.id,
            customer_id: pm.customer,
            brand: card.brand,
            last4: card.last4,
            exp_month: card.exp_month,
            exp_year: card.exp_year,
            created_at: DateTime::<Utc>::from_timestamp(pm.created, 0).unwrap_or_default(),
        })
    }

    fn handshake_status(status: &str) -> HandshakeStatus {
        match status {
            "succeeded" => HandshakeStatus::Succeeded,
            "processing" => HandshakeStatus::Processing,
            "requires_action" => HandshakeStatus::RequiresAction,
            "requires_payment_method" | "requires_confirmation" => {
                HandshakeStatus::RequiresPaymentMethod
            }
            "canceled" => HandshakeStatus::Canceled,
            other => {
                tracing::warn!(status = other, "Unrecognized setup intent status");
                HandshakeStatus::Unknown
            }
        }
    }

    fn customer_record(stripe_customer: StripeCustomer) -> CustomerRecord {
        CustomerRecord {
            id: stripe_customer.id,
            email: stripe_customer.email.unwrap_or_default(),
            default_token_id: stripe_customer
                .invoice_settings
                .and_then(|s| s.default_payment_method),
        }
    }
}

#[async_trait]
impl PaymentProcessor for StripeProcessorAdapter {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerRecord, ProcessorError> {
        let mut params = vec![
            ("email", request.email.clone()),
            ("metadata[user_id]", request.user_id.to_string()),
        ];
        if let Some(name) = &request.display_name {
            params.push(("name", name.clone()));
        }

        let response = self
            .http_client
            .post(self.url("/v1/customers"))
            .basic_auth(self.api_key(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProcessorError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("create_customer", response).await);
        }

        let stripe_customer: StripeCustomer = response
            .json()
            .await
            .map_err(|e| ProcessorError::provider(format!("Failed to parse Stripe response: {}", e)))?;

        Ok(Self::customer_record(stripe_customer))
    }

    async fn get_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<CustomerRecord>, ProcessorError> {
        let response = self
            .http_client
            .get(self.url(&format!("/v1/customers/{}", customer_id)))
            .basic_auth(self.api_key(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| ProcessorError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from_response("get_customer", response).await);
        }

        let stripe_customer: StripeCustomer = response
            .json()
            .await
            .map_err(|e| ProcessorError::provider(format!("Failed to parse Stripe response: {}", e)))?;

        if stripe_customer.deleted {
            return Ok(None);
        }
        Ok(Some(Self::customer_record(stripe_customer)))
    }

    async fn delete_customer(&self, customer_id: &str) -> Result<(), ProcessorError> {
        let response = self
            .http_client
            .delete(self.url(&format!("/v1/customers/{}", customer_id)))
            .basic_auth(self.api_key(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| ProcessorError::network(e.to_string()))?;

        // Deleting an already-deleted customer is fine for compensation.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(Self::error_from_response("delete_customer", response).await);
        }
        Ok(())
    }

    async fn create_setup_handshake(
        &self,
        user_id: &UserId,
    ) -> Result<SetupHandshake, ProcessorError> {
        let params = vec![
            ("payment_method_types[]", "card".to_string()),
            ("usage", "off_session".to_string()),
            ("metadata[user_id]", user_id.to_string()),
        ];

        let response = self
            .http_client
            .post(self.url("/v1/setup_intents"))
            .basic_auth(self.api_key(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProcessorError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("create_setup_handshake", response).await);
        }

        let intent: StripeSetupIntent = response
            .json()
            .await
            .map_err(|e| ProcessorError::provider(format!("Failed to parse Stripe response: {}", e)))?;

        let client_secret = intent.client_secret.ok_or_else(|| {
            ProcessorError::provider(format!("Setup intent {} has no client secret", intent.id))
        })?;
        Ok(SetupHandshake {
            id: intent.id,
            client_secret,
        })
    }

    async fn resolve_handshake(
        &self,
        handshake_ref: &str,
    ) -> Result<HandshakeResolution, ProcessorError> {
        let response = self
            .http_client
            .get(self.url(&format!("/v1/setup_intents/{}", handshake_ref)))
            .basic_auth(self.api_key(), Option::<&str>::None)
            .query(&[("expand[]", "payment_method")])
            .send()
            .await
            .map_err(|e| ProcessorError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("resolve_handshake", response).await);
        }

        let intent: StripeSetupIntent = response
            .json()
            .await
            .map_err(|e| ProcessorError::provider(format!("Failed to parse Stripe response: {}", e)))?;

        let payment_type = intent
            .payment_method
            .as_ref()
            .map(|pm| pm.kind.clone())
            .unwrap_or_else(|| "card".to_string());
        let token = intent
            .payment_method
            .map(Self::token_from_payment_method)
            .transpose()?;

        Ok(HandshakeResolution {
            handshake_id: intent.id,
            status: Self::handshake_status(&intent.status),
            payment_type,
            token,
        })
    }

    async fn list_tokens(&self, customer_id: &str) -> Result<Vec<TokenRecord>, ProcessorError> {
        let response = self
            .http_client
            .get(self.url("/v1/payment_methods"))
            .basic_auth(self.api_key(), Option::<&str>::None)
            .query(&[("customer", customer_id), ("type", "card")])
            .send()
            .await
            .map_err(|e| ProcessorError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("list_tokens", response).await);
        }

        let list: StripeList<StripePaymentMethod> = response
            .json()
            .await
            .map_err(|e| ProcessorError::provider(format!("Failed to parse Stripe response: {}", e)))?;

        list.data
            .into_iter()
            .map(Self::token_from_payment_method)
            .collect()
    }

    async fn get_token(&self, token_id: &str) -> Result<Option<TokenRecord>, ProcessorError> {
        let response = self
            .http_client
            .get(self.url(&format!("/v1/payment_methods/{}", token_id)))
            .basic_auth(self.api_key(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| ProcessorError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from_response("get_token", response).await);
        }

        let pm: StripePaymentMethod = response
            .json()
            .await
            .map_err(|e| ProcessorError::provider(format!("Failed to parse Stripe response: {}", e)))?;

        Ok(Some(Self::token_from_payment_method(pm)?))
    }

    async fn attach_token(
        &self,
        token_id: &str,
        customer_id: &str,
    ) -> Result<(), ProcessorError> {
        let response = self
            .http_client
            .post(self.url(&format!("/v1/payment_methods/{}/attach", token_id)))
            .basic_auth(self.api_key(), Option::<&str>::None)
            .form(&[("customer", customer_id)])
            .send()
            .await
            .map_err(|e| ProcessorError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("attach_token", response).await);
        }
        Ok(())
    }

    async fn detach_token(&self, token_id: &str) -> Result<(), ProcessorError> {
        let response = self
            .http_client
            .post(self.url(&format!("/v1/payment_methods/{}/detach", token_id)))
            .basic_auth(self.api_key(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| ProcessorError::network(e.to_string()))?;

        if !response.status().is_success() {
            let err = Self::error_from_response("detach_token", response).await;
            // Stripe reports a detach of an unattached method with this code;
            // surface it distinctly so workflows can treat it as success.
            if err.provider_code.as_deref() == Some("payment_method_unattached") {
                return Err(ProcessorError::not_attached(token_id)
                    .with_provider_code("payment_method_unattached"));
            }
            return Err(err);
        }
        Ok(())
    }

    async fn set_default_token(
        &self,
        customer_id: &str,
        token_id: &str,
    ) -> Result<(), ProcessorError> {
        let response = self
            .http_client
            .post(self.url(&format!("/v1/customers/{}", customer_id)))
            .basic_auth(self.api_key(), Option::<&str>::None)
            .form(&[("invoice_settings[default_payment_method]", token_id)])
            .send()
            .await
            .map_err(|e| ProcessorError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("set_default_token", response).await);
        }
        Ok(())
    }
}
