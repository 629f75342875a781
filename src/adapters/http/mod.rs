//! HTTP adapters - the inbound axum surface.

pub mod wallet;
