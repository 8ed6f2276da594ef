//! atelier-market HTTP Server
//!
//! Axum-based server for the storefront's payment flow: Stripe Connect
//! onboarding for the seller and split-payment checkout for buyers. The
//! content catalog is served elsewhere; this process only ever sees the
//! purchase-time facts a checkout request carries.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelier_payments::{
    MemorySettingsStore, StripeClient, CANCEL_ROUTE, CONNECT_RETURN_ROUTE, SUCCESS_ROUTE,
};

use crate::handlers::{
    begin_onboarding, cancel_page, connect_return, connect_status, create_checkout, health_check,
    success_page,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Payments run fail-closed: without a configured secret key every payment
    // endpoint answers PAYMENTS_DISABLED. There is no placeholder credential.
    let stripe = match StripeClient::from_env() {
        Ok(client) => {
            tracing::info!("✓ Stripe configured");
            tracing::info!("  Platform fee: {}%", client.config().fee_rate * 100.0);
            tracing::info!("  Seller country: {}", client.config().seller_country);
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!("⚠ Stripe not configured - payments disabled ({})", e);
            tracing::warn!("  Set STRIPE_SECRET_KEY in .env");
            None
        }
    };

    // Build application state
    let state = AppState {
        settings: Arc::new(MemorySettingsStore::new()),
        stripe,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & info
        .route("/health", get(health_check))
        // Seller onboarding
        .route("/api/connect/onboard", post(begin_onboarding))
        .route("/api/connect/status", get(connect_status))
        .route(CONNECT_RETURN_ROUTE, get(connect_return))
        // Checkout
        .route("/api/checkout", post(create_checkout))
        .route(SUCCESS_ROUTE, get(success_page))
        .route(CANCEL_ROUTE, get(cancel_page))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🛍 atelier-market server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  POST /api/connect/onboard - Start seller onboarding");
    tracing::info!("  GET  /api/connect/status  - Seller connection status");
    tracing::info!("  GET  /connect/return      - Onboarding redirect target");
    tracing::info!("  POST /api/checkout        - Create split-payment checkout");
    tracing::info!("  GET  /success, /cancel    - Buyer redirect pages");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
