//! Wallet domain - card tokens, fingerprints, and lifecycle rules.
//!
//! The processor owns every card token and the default pointer; this module
//! only holds the derived views and the pure rules applied to them.

mod card;
mod default_policy;
mod errors;
mod fingerprint;

pub use card::{PaymentMethodView, TokenRecord};
pub use default_policy::becomes_default;
pub use errors::WalletError;
pub use fingerprint::{find_duplicate, Fingerprint};
