//! # atelier-payments
//!
//! Payment splitting and seller onboarding for the atelier-market storefront.
//!
//! The marketplace sells handmade goods on behalf of an individual seller and
//! keeps a commission on every sale. Both halves of that arrangement live
//! here, on top of Stripe Connect:
//!
//! ## Destination charges
//!
//! Every purchase is a single hosted Checkout session that charges the buyer
//! the full listing price and splits it inside Stripe:
//!
//! ```text
//!                       ┌──────────────────────┐
//!  buyer pays $85.00 ──▶│   Stripe Checkout    │──▶ $8.50 application fee
//!                       │  (destination charge) │        (platform)
//!                       └──────────────────────┘──▶ $76.50 transfer
//!                                                       (seller's account)
//! ```
//!
//! There is no money movement to reconcile locally: the split is part of the
//! charge itself, so the fee can never drift from the price it was computed
//! for.
//!
//! ## Seller onboarding
//!
//! Before a seller can receive transfers they complete Stripe's hosted
//! onboarding once. [`OnboardingManager`] provisions the connected account,
//! hands out the time-limited link, and correlates the redirect callback
//! back into the persisted [`SellerConnection`] record, the single source
//! of truth for "is this seller payable".
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atelier_payments::{ListingSnapshot, StripeClient};
//!
//! let client = StripeClient::from_env()?;
//!
//! let session = client.create_checkout_session(ListingSnapshot {
//!     product_id: "j97abc...".into(),
//!     name: "Stoneware vase".into(),
//!     price: 85.0,
//!     seller_account_id: "acct_123".into(),
//! }).await?;
//!
//! // Redirect buyer to: session.checkout_url
//! ```

mod checkout;
mod config;
mod connect;
mod error;
mod fee;
mod settings;

pub use checkout::{
    CheckoutIntent, CheckoutSession, ListingSnapshot, StripeClient, CANCEL_ROUTE, SUCCESS_ROUTE,
};
pub use config::{validate_fee_rate, PaymentsConfig, DEFAULT_PLATFORM_FEE_RATE};
pub use connect::{
    validate_return_path, OnboardingLink, OnboardingManager, CONNECT_RETURN_ROUTE,
    DEFAULT_RETURN_PATH,
};
pub use error::{PaymentError, Result};
pub use fee::{apply_rate, compute_fee, price_to_minor_units, FeeSplit};
pub use settings::{
    ConnectionStatus, MemorySettingsStore, OnboardingCallback, SellerConnection, SettingsStore,
    DEFAULT_SELLER,
};
