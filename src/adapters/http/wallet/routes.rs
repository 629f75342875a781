//! Axum router configuration for wallet endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{
    begin_attachment, confirm_method, detach_method, list_methods, provision_identity,
    set_default_method, swap_method, WalletAppState,
};

/// Create the wallet API router.
///
/// # Routes
///
/// - `POST /provision` - Provision a processor customer for the identity
/// - `POST /setup` - Open a setup handshake for card collection
/// - `POST /methods` - Confirm a handshake into an attached method
/// - `GET /methods` - List attached methods
/// - `POST /methods/default` - Repoint the default method
/// - `DELETE /methods/:token_id` - Detach a method
/// - `PUT /methods/:token_id` - Replace a method (swap)
pub fn wallet_routes() -> Router<WalletAppState> {
    Router::new()
        .route("/provision", post(provision_identity))
        .route("/setup", post(begin_attachment))
        .route("/methods", post(confirm_method).get(list_methods))
        .route("/methods/default", post(set_default_method))
        .route(
            "/methods/:token_id",
            delete(detach_method).put(swap_method),
        )
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

/// Create the full application router with the wallet module mounted.
pub fn app_router(state: WalletAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/wallet", wallet_routes())
        .with_state(state)
}
