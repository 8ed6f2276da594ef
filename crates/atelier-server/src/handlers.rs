//! HTTP Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use atelier_payments::{
    validate_return_path, ListingSnapshot, OnboardingCallback, OnboardingManager, PaymentError,
    SellerConnection, SettingsStore, StripeClient, DEFAULT_RETURN_PATH, DEFAULT_SELLER,
};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
    pub seller_connected: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct OnboardRequest {
    #[serde(default)]
    pub return_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OnboardResponse {
    pub onboarding_url: String,
}

/// Query parameters Stripe's onboarding redirect lands with.
///
/// The names are fixed by the return URL built in `atelier-payments`.
#[derive(Debug, Deserialize)]
pub struct ConnectReturnParams {
    pub connected: Option<String>,
    #[serde(rename = "accountId")]
    pub account_id: Option<String>,
    #[serde(rename = "returnPath")]
    pub return_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub product_id: String,
    pub name: String,
    /// Major currency units
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
    pub session_id: String,
}

// ============================================================================
// Error mapping
// ============================================================================

fn error_response(err: &PaymentError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match err {
        PaymentError::Config(_) => (StatusCode::SERVICE_UNAVAILABLE, "PAYMENTS_DISABLED"),
        PaymentError::SellerNotPayable => (StatusCode::CONFLICT, "SELLER_NOT_PAYABLE"),
        PaymentError::AlreadyConnected => (StatusCode::CONFLICT, "ALREADY_CONNECTED"),
        PaymentError::InvalidPrice(_)
        | PaymentError::InvalidFeeRate(_)
        | PaymentError::InvalidReturnPath(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST")
        }
        PaymentError::CallbackRejected(_) => (StatusCode::BAD_REQUEST, "CALLBACK_REJECTED"),
        PaymentError::Stripe(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PROVIDER_ERROR"),
        PaymentError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
    };

    (
        status,
        Json(ErrorResponse {
            error: err.user_message().into(),
            code: code.into(),
        }),
    )
}

fn require_stripe(state: &AppState) -> Result<&Arc<StripeClient>, (StatusCode, Json<ErrorResponse>)> {
    state.stripe.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Payments not configured".into(),
                code: "PAYMENTS_DISABLED".into(),
            }),
        )
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let seller_connected = state
        .settings
        .seller_connection(DEFAULT_SELLER)
        .map(|c| c.is_payable())
        .unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: state.stripe.is_some(),
        seller_connected,
    })
}

/// Start Stripe Connect onboarding for the seller
pub async fn begin_onboarding(
    State(state): State<AppState>,
    Json(payload): Json<OnboardRequest>,
) -> Result<Json<OnboardResponse>, (StatusCode, Json<ErrorResponse>)> {
    let stripe = require_stripe(&state)?;

    let manager = OnboardingManager::new(state.settings.clone());
    let link = manager
        .begin(stripe, DEFAULT_SELLER, payload.return_path.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Onboarding error: {}", e);
            error_response(&e)
        })?;

    Ok(Json(OnboardResponse {
        onboarding_url: link.url,
    }))
}

/// Stripe Connect onboarding redirect target
///
/// Persists the confirmed connection, then redirects to the clean return
/// path so a page reload cannot replay the query parameters.
pub async fn connect_return(
    State(state): State<AppState>,
    Query(params): Query<ConnectReturnParams>,
) -> Result<Redirect, (StatusCode, Json<ErrorResponse>)> {
    let callback = OnboardingCallback {
        connected: params.connected.as_deref() == Some("true"),
        account_id: params.account_id,
    };

    let manager = OnboardingManager::new(state.settings.clone());
    let connection = manager
        .apply_callback(DEFAULT_SELLER, &callback)
        .map_err(|e| {
            tracing::warn!("Rejected onboarding callback: {}", e);
            error_response(&e)
        })?;

    tracing::info!(account_id = ?connection.account_id, "Seller connected via onboarding callback");

    let to = params
        .return_path
        .as_deref()
        .and_then(|p| validate_return_path(p).ok())
        .unwrap_or(DEFAULT_RETURN_PATH);

    Ok(Redirect::to(to))
}

/// Current seller connection record
pub async fn connect_status(
    State(state): State<AppState>,
) -> Result<Json<SellerConnection>, (StatusCode, Json<ErrorResponse>)> {
    state
        .settings
        .seller_connection(DEFAULT_SELLER)
        .map(Json)
        .map_err(|e| error_response(&e))
}

/// Create a split-payment checkout session for a listing
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, (StatusCode, Json<ErrorResponse>)> {
    let stripe = require_stripe(&state)?;

    // The persisted settings record decides payability, not the caller.
    let connection = state
        .settings
        .seller_connection(DEFAULT_SELLER)
        .map_err(|e| error_response(&e))?;
    if !connection.is_payable() {
        return Err(error_response(&PaymentError::SellerNotPayable));
    }

    let listing = ListingSnapshot {
        product_id: payload.product_id,
        name: payload.name,
        price: payload.price,
        seller_account_id: connection.account_id.unwrap_or_default(),
    };

    let session = stripe.create_checkout_session(listing).await.map_err(|e| {
        tracing::error!("Checkout error: {}", e);
        error_response(&e)
    })?;

    Ok(Json(CheckoutResponse {
        checkout_url: session.checkout_url,
        session_id: session.id,
    }))
}

// Fixed redirect destinations. Confirmation only: payment state lives with
// Stripe, these pages verify nothing.

const SUCCESS_PAGE: &str = r#"<!doctype html>
<html>
  <head><title>Order received</title></head>
  <body>
    <h1>Thank you for your order</h1>
    <p>Your payment went through. A confirmation is on its way from Stripe.</p>
    <p><a href="/">Back to the shop</a></p>
  </body>
</html>
"#;

const CANCEL_PAGE: &str = r#"<!doctype html>
<html>
  <head><title>Checkout cancelled</title></head>
  <body>
    <h1>Checkout cancelled</h1>
    <p>No payment was taken. Your piece is still waiting in the shop.</p>
    <p><a href="/">Back to the shop</a></p>
  </body>
</html>
"#;

/// Post-payment confirmation page
pub async fn success_page() -> Html<&'static str> {
    Html(SUCCESS_PAGE)
}

/// Abandoned-checkout page
pub async fn cancel_page() -> Html<&'static str> {
    Html(CANCEL_PAGE)
}
