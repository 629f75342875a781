//! Domain layer - pure types and business rules.
//!
//! No IO happens here. The wallet module holds the card-lifecycle rules;
//! foundation holds shared value objects.

pub mod foundation;
pub mod wallet;
