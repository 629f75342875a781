//! Adapters - implementations of the ports against real infrastructure,
//! plus the in-memory doubles the test suites run on.

pub mod http;
pub mod notification;
pub mod profile;
pub mod stripe;
