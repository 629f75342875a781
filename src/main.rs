//! Cardhold service entry point.
//!
//! Loads configuration, wires adapters to the wallet workflows, and serves
//! the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use cardhold::adapters::http::wallet::{app_router, WalletAppState};
use cardhold::adapters::notification::{NullSink, WebhookSink};
use cardhold::adapters::profile::PgProfileStore;
use cardhold::adapters::stripe::{StripeConfig, StripeProcessorAdapter};
use cardhold::application::handlers::wallet::IdentityLocks;
use cardhold::config::AppConfig;
use cardhold::ports::NotificationSink;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    tracing::info!(
        environment = ?config.server.environment,
        test_mode = config.payment.is_test_mode(),
        "Starting cardhold"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    let mut stripe_config = StripeConfig::new(config.payment.stripe_api_key.clone());
    if let Some(base_url) = &config.payment.stripe_api_base_url {
        stripe_config = stripe_config.with_base_url(base_url.clone());
    }

    let notifications: Arc<dyn NotificationSink> = match &config.notification.webhook_url {
        Some(url) => Arc::new(WebhookSink::new(
            url.clone(),
            config.notification.delivery_timeout(),
        )?),
        None => {
            tracing::info!("No notification webhook configured, events are dropped");
            Arc::new(NullSink)
        }
    };

    let state = WalletAppState {
        profile_store: Arc::new(PgProfileStore::new(pool)),
        processor: Arc::new(StripeProcessorAdapter::new(stripe_config)),
        notifications,
        locks: Arc::new(IdentityLocks::new()),
        call_timeout: config.payment.call_timeout(),
    };

    // `allow_origin` replaces any previous value, so all origins go in as
    // one list.
    let origins = parse_origins(&config.server.cors_origins_list())?;
    let cors = CorsLayer::new().allow_origin(AllowOrigin::list(origins));

    let app = app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors);

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn parse_origins(
    origins: &[String],
) -> Result<Vec<HeaderValue>, axum::http::header::InvalidHeaderValue> {
    origins.iter().map(|origin| origin.parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_configured_origin_is_kept() {
        let origins = parse_origins(&[
            "https://app.example.com".to_string(),
            "http://localhost:3000".to_string(),
        ])
        .unwrap();

        assert_eq!(
            origins,
            vec![
                HeaderValue::from_static("https://app.example.com"),
                HeaderValue::from_static("http://localhost:3000"),
            ]
        );
    }

    #[test]
    fn invalid_origin_is_rejected() {
        assert!(parse_origins(&["bad\norigin".to_string()]).is_err());
    }
}
