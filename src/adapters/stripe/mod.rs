//! Stripe adapter for the PaymentProcessor port.

mod mock_processor;
mod stripe_adapter;
mod types;

pub use mock_processor::MockProcessor;
pub use stripe_adapter::{StripeConfig, StripeProcessorAdapter};
