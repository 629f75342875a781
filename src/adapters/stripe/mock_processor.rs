//! Mock payment processor for testing.
//!
//! A fully stateful in-memory processor: seeded customers, tokens, and
//! handshakes behave like the real thing (attach/detach move ownership, the
//! default pointer drops when its token detaches). Supports error injection
//! and per-call delays for timeout tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::foundation::UserId;
use crate::domain::wallet::TokenRecord;
use crate::ports::{
    CreateCustomerRequest, CustomerRecord, HandshakeResolution, HandshakeStatus, PaymentProcessor,
    ProcessorError, SetupHandshake,
};

/// Configurable in-memory `PaymentProcessor`.
///
/// # Example
///
/// ```ignore
/// let mock = MockProcessor::new();
/// let customer = mock.seed_customer("u1@example.com");
/// let handshake = mock.seed_succeeded_handshake("card", "visa", "4242", 12, 2030);
/// mock.set_fail_attach(true);
/// ```
#[derive(Default)]
pub struct MockProcessor {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    customers: HashMap<String, CustomerRecord>,
    tokens: HashMap<String, TokenRecord>,
    handshakes: HashMap<String, StoredHandshake>,

    created_customers: u32,
    deleted: Vec<String>,
    next_id: u32,

    fail_create_customer: bool,
    fail_delete_customer: bool,
    fail_create_handshake: bool,
    fail_attach: bool,
    fail_detach: bool,
    fail_set_default: bool,

    create_customer_delay: Option<Duration>,
    resolve_delay: Option<Duration>,
    detach_delay: Option<Duration>,
}

struct StoredHandshake {
    status: HandshakeStatus,
    payment_type: String,
    token_id: Option<String>,
}

impl MockProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(state: &mut MockState, prefix: &str) -> String {
        state.next_id += 1;
        format!("{}_{}", prefix, state.next_id)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Seeding
    // ════════════════════════════════════════════════════════════════════════════

    /// Seed a live customer, returning its id.
    pub fn seed_customer(&self, email: &str) -> String {
        let mut state = self.inner.lock().unwrap();
        let id = Self::next_id(&mut state, "cus");
        state.customers.insert(
            id.clone(),
            CustomerRecord {
                id: id.clone(),
                email: email.to_string(),
                default_token_id: None,
            },
        );
        id
    }

    /// Seed a token already attached to a customer, returning the token id.
    pub fn seed_attached_token(
        &self,
        customer_id: &str,
        brand: &str,
        last4: &str,
        exp_month: u32,
        exp_year: i32,
    ) -> String {
        let mut state = self.inner.lock().unwrap();
        let id = Self::next_id(&mut state, "pm");
        state.tokens.insert(
            id.clone(),
            TokenRecord {
                token_id: id.clone(),
                customer_id: Some(customer_id.to_string()),
                brand: brand.to_string(),
                last4: last4.to_string(),
                exp_month,
                exp_year,
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Seed a succeeded handshake whose token is not attached to anyone yet.
    /// Returns the handshake ref.
    pub fn seed_succeeded_handshake(
        &self,
        payment_type: &str,
        brand: &str,
        last4: &str,
        exp_month: u32,
        exp_year: i32,
    ) -> String {
        let mut state = self.inner.lock().unwrap();
        let token_id = Self::next_id(&mut state, "pm");
        state.tokens.insert(
            token_id.clone(),
            TokenRecord {
                token_id: token_id.clone(),
                customer_id: None,
                brand: brand.to_string(),
                last4: last4.to_string(),
                exp_month,
                exp_year,
                created_at: Utc::now(),
            },
        );
        let handshake_id = Self::next_id(&mut state, "seti");
        state.handshakes.insert(
            handshake_id.clone(),
            StoredHandshake {
                status: HandshakeStatus::Succeeded,
                payment_type: payment_type.to_string(),
                token_id: Some(token_id),
            },
        );
        handshake_id
    }

    /// Seed a succeeded card handshake resolving to an existing token.
    pub fn seed_succeeded_handshake_for_token(&self, token_id: &str) -> String {
        let mut state = self.inner.lock().unwrap();
        let handshake_id = Self::next_id(&mut state, "seti");
        state.handshakes.insert(
            handshake_id.clone(),
            StoredHandshake {
                status: HandshakeStatus::Succeeded,
                payment_type: "card".to_string(),
                token_id: Some(token_id.to_string()),
            },
        );
        handshake_id
    }

    /// Seed a handshake in an arbitrary state.
    pub fn seed_handshake(
        &self,
        status: HandshakeStatus,
        payment_type: &str,
        token_id: Option<&str>,
    ) -> String {
        let mut state = self.inner.lock().unwrap();
        let handshake_id = Self::next_id(&mut state, "seti");
        state.handshakes.insert(
            handshake_id.clone(),
            StoredHandshake {
                status,
                payment_type: payment_type.to_string(),
                token_id: token_id.map(String::from),
            },
        );
        handshake_id
    }

    // ════════════════════════════════════════════════════════════════════════════
    // State manipulation and assertions
    // ════════════════════════════════════════════════════════════════════════════

    pub fn customer_exists(&self, customer_id: &str) -> bool {
        self.inner.lock().unwrap().customers.contains_key(customer_id)
    }

    /// How many customers `create_customer` has made, deleted or not.
    pub fn created_customer_count(&self) -> usize {
        self.inner.lock().unwrap().created_customers as usize
    }

    pub fn live_customer_count(&self) -> usize {
        self.inner.lock().unwrap().customers.len()
    }

    pub fn deleted_customers(&self) -> Vec<String> {
        self.inner.lock().unwrap().deleted.clone()
    }

    /// Tokens currently attached to a customer.
    pub fn attached_tokens(&self, customer_id: &str) -> Vec<TokenRecord> {
        self.inner
            .lock()
            .unwrap()
            .tokens
            .values()
            .filter(|t| t.customer_id.as_deref() == Some(customer_id))
            .cloned()
            .collect()
    }

    /// The customer's current default token pointer.
    pub fn default_of(&self, customer_id: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .customers
            .get(customer_id)
            .and_then(|c| c.default_token_id.clone())
    }

    /// Point the customer's default directly, bypassing the port.
    pub fn force_default(&self, customer_id: &str, token_id: &str) {
        let mut state = self.inner.lock().unwrap();
        if let Some(customer) = state.customers.get_mut(customer_id) {
            customer.default_token_id = Some(token_id.to_string());
        }
    }

    /// Release a token directly, bypassing the port.
    pub fn force_detach(&self, token_id: &str) {
        let mut state = self.inner.lock().unwrap();
        if let Some(token) = state.tokens.get_mut(token_id) {
            token.customer_id = None;
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error injection and delays
    // ════════════════════════════════════════════════════════════════════════════

    pub fn set_fail_create_customer(&self, fail: bool) {
        self.inner.lock().unwrap().fail_create_customer = fail;
    }

    pub fn set_fail_delete_customer(&self, fail: bool) {
        self.inner.lock().unwrap().fail_delete_customer = fail;
    }

    pub fn set_fail_create_handshake(&self, fail: bool) {
        self.inner.lock().unwrap().fail_create_handshake = fail;
    }

    pub fn set_fail_attach(&self, fail: bool) {
        self.inner.lock().unwrap().fail_attach = fail;
    }

    pub fn set_fail_detach(&self, fail: bool) {
        self.inner.lock().unwrap().fail_detach = fail;
    }

    pub fn set_fail_set_default(&self, fail: bool) {
        self.inner.lock().unwrap().fail_set_default = fail;
    }

    pub fn set_create_customer_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().create_customer_delay = Some(delay);
    }

    pub fn set_resolve_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().resolve_delay = Some(delay);
    }

    pub fn set_detach_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().detach_delay = Some(delay);
    }

    async fn sleep_if_set(&self, pick: fn(&MockState) -> Option<Duration>) {
        let delay = pick(&self.inner.lock().unwrap());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerRecord, ProcessorError> {
        self.sleep_if_set(|s| s.create_customer_delay).await;
        let mut state = self.inner.lock().unwrap();
        if state.fail_create_customer {
            return Err(ProcessorError::network("Mock: customer creation failed"));
        }
        state.created_customers += 1;
        let id = Self::next_id(&mut state, "cus");
        let customer = CustomerRecord {
            id: id.clone(),
            email: request.email,
            default_token_id: None,
        };
        state.customers.insert(id, customer.clone());
        Ok(customer)
    }

    async fn get_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<CustomerRecord>, ProcessorError> {
        Ok(self.inner.lock().unwrap().customers.get(customer_id).cloned())
    }

    async fn delete_customer(&self, customer_id: &str) -> Result<(), ProcessorError> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_delete_customer {
            return Err(ProcessorError::network("Mock: customer delete failed"));
        }
        state.customers.remove(customer_id);
        state.deleted.push(customer_id.to_string());
        Ok(())
    }

    async fn create_setup_handshake(
        &self,
        _user_id: &UserId,
    ) -> Result<SetupHandshake, ProcessorError> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_create_handshake {
            return Err(ProcessorError::provider("Mock: handshake creation failed"));
        }
        let id = Self::next_id(&mut state, "seti");
        state.handshakes.insert(
            id.clone(),
            StoredHandshake {
                status: HandshakeStatus::RequiresPaymentMethod,
                payment_type: "card".to_string(),
                token_id: None,
            },
        );
        Ok(SetupHandshake {
            client_secret: format!("{}_secret_test", id),
            id,
        })
    }

    async fn resolve_handshake(
        &self,
        handshake_ref: &str,
    ) -> Result<HandshakeResolution, ProcessorError> {
        self.sleep_if_set(|s| s.resolve_delay).await;
        let state = self.inner.lock().unwrap();
        let handshake = state
            .handshakes
            .get(handshake_ref)
            .ok_or_else(|| ProcessorError::not_found("Setup handshake"))?;
        let token = handshake
            .token_id
            .as_ref()
            .and_then(|id| state.tokens.get(id))
            .cloned();
        Ok(HandshakeResolution {
            handshake_id: handshake_ref.to_string(),
            status: handshake.status,
            payment_type: handshake.payment_type.clone(),
            token,
        })
    }

    async fn list_tokens(&self, customer_id: &str) -> Result<Vec<TokenRecord>, ProcessorError> {
        Ok(self.attached_tokens(customer_id))
    }

    async fn get_token(&self, token_id: &str) -> Result<Option<TokenRecord>, ProcessorError> {
        Ok(self.inner.lock().unwrap().tokens.get(token_id).cloned())
    }

    async fn attach_token(
        &self,
        token_id: &str,
        customer_id: &str,
    ) -> Result<(), ProcessorError> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_attach {
            return Err(ProcessorError::provider("Mock: attach failed"));
        }
        match state.tokens.get_mut(token_id) {
            None => Err(ProcessorError::not_found("Payment method")),
            Some(token) => {
                token.customer_id = Some(customer_id.to_string());
                Ok(())
            }
        }
    }

    async fn detach_token(&self, token_id: &str) -> Result<(), ProcessorError> {
        self.sleep_if_set(|s| s.detach_delay).await;
        let mut state = self.inner.lock().unwrap();
        if state.fail_detach {
            return Err(ProcessorError::provider("Mock: detach failed"));
        }
        let owner = match state.tokens.get_mut(token_id) {
            None => return Err(ProcessorError::not_found("Payment method")),
            Some(token) => match token.customer_id.take() {
                None => return Err(ProcessorError::not_attached(token_id)),
                Some(owner) => owner,
            },
        };
        // Stripe drops the default pointer when the default token detaches.
        if let Some(customer) = state.customers.get_mut(&owner) {
            if customer.default_token_id.as_deref() == Some(token_id) {
                customer.default_token_id = None;
            }
        }
        Ok(())
    }

    async fn set_default_token(
        &self,
        customer_id: &str,
        token_id: &str,
    ) -> Result<(), ProcessorError> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_set_default {
            return Err(ProcessorError::provider("Mock: set default failed"));
        }
        match state.customers.get_mut(customer_id) {
            None => Err(ProcessorError::not_found("Customer")),
            Some(customer) => {
                customer.default_token_id = Some(token_id.to_string());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn attach_and_detach_move_ownership() {
        let mock = MockProcessor::new();
        let customer = mock.seed_customer("a@example.com");
        let handshake = mock.seed_succeeded_handshake("card", "visa", "4242", 12, 2030);
        let token = mock
            .resolve_handshake(&handshake)
            .await
            .unwrap()
            .token
            .unwrap();

        mock.attach_token(&token.token_id, &customer).await.unwrap();
        assert_eq!(mock.list_tokens(&customer).await.unwrap().len(), 1);

        mock.detach_token(&token.token_id).await.unwrap();
        assert!(mock.list_tokens(&customer).await.unwrap().is_empty());

        let second = mock.detach_token(&token.token_id).await;
        assert_eq!(
            second.unwrap_err().code,
            crate::ports::ProcessorErrorCode::NotAttached
        );
    }

    #[tokio::test]
    async fn detaching_default_token_clears_pointer() {
        let mock = MockProcessor::new();
        let customer = mock.seed_customer("a@example.com");
        let token = mock.seed_attached_token(&customer, "visa", "4242", 12, 2030);
        mock.set_default_token(&customer, &token).await.unwrap();

        mock.detach_token(&token).await.unwrap();

        let record = mock.get_customer(&customer).await.unwrap().unwrap();
        assert_eq!(record.default_token_id, None);
    }
}
