//! HTTP adapter for the wallet module.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AuthenticatedUser, WalletApiError, WalletAppState};
pub use routes::{app_router, wallet_routes};
