//! Strongly-typed identifier value objects.
//!
//! Processor-side identifiers (customer ids, token ids, handshake ids) stay
//! opaque strings owned by the processor; only the internal identity gets a
//! newtype, because it crosses every layer of this service.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Internal user identity, issued by the upstream identity provider.
///
/// Treated as an immutable opaque key; never parsed or derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
