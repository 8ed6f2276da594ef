//! Stripe Checkout Integration
//!
//! Hosted one-time-payment sessions carrying a destination charge: the buyer
//! pays the full listing price, Stripe retains the platform's application fee
//! and transfers the remainder to the seller's connected account in the same
//! charge.
//!
//! ```text
//! ┌─────────────┐    ┌─────────────────┐    ┌───────────────────────────┐
//! │    Buyer    │───▶│  Stripe Hosted  │───▶│ platform: application fee │
//! │ (storefront)│    │  Checkout Page  │    │ seller:   the remainder   │
//! └─────────────┘    └─────────────────┘    └───────────────────────────┘
//! ```
//!
//! Nothing about an attempt is persisted locally; the session lives entirely
//! on Stripe's side and the buyer lands on fixed success/cancel pages.

use serde::{Deserialize, Serialize};
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionMode, Client,
    CreateCheckoutSession, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData,
    CreateCheckoutSessionPaymentIntentData,
    CreateCheckoutSessionPaymentIntentDataTransferData,
};

use crate::config::PaymentsConfig;
use crate::error::{PaymentError, Result};
use crate::fee::{apply_rate, price_to_minor_units, FeeSplit};

/// Fixed redirect target after a completed payment.
pub const SUCCESS_ROUTE: &str = "/success";

/// Fixed redirect target after an abandoned payment.
pub const CANCEL_ROUTE: &str = "/cancel";

/// Stripe client wrapper
pub struct StripeClient {
    client: Client,
    config: PaymentsConfig,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(config: PaymentsConfig) -> Self {
        Self {
            client: Client::new(config.secret_key.clone()),
            config,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(PaymentsConfig::from_env()?))
    }

    /// Get the resolved configuration
    pub fn config(&self) -> &PaymentsConfig {
        &self.config
    }

    /// Get the underlying Stripe client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Create a hosted checkout session for one listing.
    ///
    /// Returns a URL to redirect the buyer to. The fee split and the charged
    /// amount are derived from the same price in the same call, so a stale
    /// fee can never be attached to a different price.
    pub async fn create_checkout_session(&self, listing: ListingSnapshot) -> Result<CheckoutSession> {
        let intent = CheckoutIntent::build(listing, self.config.fee_rate)?;

        let success_url = format!("{}{SUCCESS_ROUTE}", self.config.base_url);
        let cancel_url = format!("{}{CANCEL_ROUTE}", self.config.base_url);

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);
        params.success_url = Some(&success_url);
        params.cancel_url = Some(&cancel_url);

        // Correlate the session back to the catalog listing
        let mut metadata = std::collections::HashMap::new();
        metadata.insert("product_id".to_string(), intent.listing.product_id.clone());
        params.metadata = Some(metadata);

        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            quantity: Some(1),
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency: self.config.currency,
                unit_amount: Some(intent.gross_minor),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: intent.listing.name.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);

        // The destination charge: platform keeps the fee, seller gets the rest
        params.payment_intent_data = Some(CreateCheckoutSessionPaymentIntentData {
            application_fee_amount: Some(intent.split.application_fee_minor),
            transfer_data: Some(CreateCheckoutSessionPaymentIntentDataTransferData {
                amount: None,
                destination: intent.split.transfer_destination.clone(),
            }),
            ..Default::default()
        });

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        let checkout_url = session
            .url
            .ok_or_else(|| PaymentError::Stripe("No checkout URL returned".into()))?;

        tracing::info!(
            session_id = %session.id,
            product_id = %intent.listing.product_id,
            gross_minor = intent.gross_minor,
            application_fee_minor = intent.split.application_fee_minor,
            destination = %intent.split.transfer_destination,
            "Created checkout session"
        );

        Ok(CheckoutSession {
            id: session.id.to_string(),
            checkout_url,
        })
    }
}

/// Purchase-time facts about one listing, built fresh per attempt from
/// catalog data and discarded with the request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListingSnapshot {
    /// Catalog id of the product being bought
    pub product_id: String,

    /// Display name shown on the Stripe page
    pub name: String,

    /// Listed price in major currency units
    pub price: f64,

    /// The seller's connected account id
    pub seller_account_id: String,
}

/// One purchase attempt, validated and priced. Lives only for the duration
/// of the provider call.
#[derive(Clone, Debug)]
pub struct CheckoutIntent {
    pub listing: ListingSnapshot,

    /// Full sale amount in minor units
    pub gross_minor: i64,

    /// Platform/seller split derived from `gross_minor`
    pub split: FeeSplit,
}

impl CheckoutIntent {
    /// Validate the listing and price the attempt.
    ///
    /// An empty seller account id is rejected here, before any provider
    /// interaction, as a distinct "seller not payable" error.
    pub fn build(listing: ListingSnapshot, rate: f64) -> Result<Self> {
        if listing.seller_account_id.trim().is_empty() {
            return Err(PaymentError::SellerNotPayable);
        }

        let gross_minor = price_to_minor_units(listing.price)?;
        let application_fee_minor = apply_rate(gross_minor, rate)?;

        Ok(Self {
            split: FeeSplit {
                application_fee_minor,
                transfer_destination: listing.seller_account_id.clone(),
            },
            gross_minor,
            listing,
        })
    }

    /// What the seller receives after the platform's cut.
    pub fn seller_net_minor(&self) -> i64 {
        self.gross_minor - self.split.application_fee_minor
    }
}

/// Result of creating a checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Stripe session ID
    pub id: String,

    /// URL to redirect the buyer to
    pub checkout_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PLATFORM_FEE_RATE;
    use stripe::Currency;

    fn listing(price: f64, seller: &str) -> ListingSnapshot {
        ListingSnapshot {
            product_id: "prod_1".into(),
            name: "Stoneware vase".into(),
            price,
            seller_account_id: seller.into(),
        }
    }

    fn test_config() -> PaymentsConfig {
        PaymentsConfig {
            secret_key: "sk_test_123".into(),
            base_url: "http://localhost:3000".into(),
            seller_country: "AU".into(),
            currency: Currency::AUD,
            fee_rate: DEFAULT_PLATFORM_FEE_RATE,
        }
    }

    #[test]
    fn test_intent_splits_85_dollars() {
        let intent = CheckoutIntent::build(listing(85.0, "acct_123"), 0.10).unwrap();
        assert_eq!(intent.gross_minor, 8500);
        assert_eq!(intent.split.application_fee_minor, 850);
        assert_eq!(intent.seller_net_minor(), 7650);
        assert_eq!(intent.split.transfer_destination, "acct_123");
    }

    #[test]
    fn test_intent_rejects_missing_seller() {
        assert!(matches!(
            CheckoutIntent::build(listing(85.0, ""), 0.10),
            Err(PaymentError::SellerNotPayable)
        ));
        assert!(matches!(
            CheckoutIntent::build(listing(85.0, "   "), 0.10),
            Err(PaymentError::SellerNotPayable)
        ));
    }

    #[test]
    fn test_intent_rejects_invalid_price() {
        assert!(matches!(
            CheckoutIntent::build(listing(0.0, "acct_123"), 0.10),
            Err(PaymentError::InvalidPrice(_))
        ));
    }

    #[tokio::test]
    async fn test_checkout_rejects_unpayable_seller_before_stripe() {
        // Validation short-circuits, so the dummy key is never used.
        let client = StripeClient::new(test_config());
        let result = client.create_checkout_session(listing(85.0, "")).await;
        assert!(matches!(result, Err(PaymentError::SellerNotPayable)));
    }
}
