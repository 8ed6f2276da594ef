//! Stripe Connect Onboarding
//!
//! Provisions the seller's connected account and walks it through Stripe's
//! hosted onboarding. The flow is a redirect handshake:
//!
//! ```text
//! admin ──▶ POST onboard ──▶ Stripe hosted onboarding ──▶ GET /connect/return
//!                                                          ?connected=true
//!                                                          &accountId=acct_…
//! ```
//!
//! The return redirect is the only signal that onboarding finished; its
//! parameters are validated before any stored state changes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stripe::{
    Account, AccountLink, AccountLinkType, AccountType, CreateAccount,
    CreateAccountCapabilities, CreateAccountCapabilitiesCardPayments,
    CreateAccountCapabilitiesTransfers, CreateAccountLink,
};

use crate::checkout::StripeClient;
use crate::error::{PaymentError, Result};
use crate::settings::{ConnectionStatus, OnboardingCallback, SellerConnection, SettingsStore};

/// Fixed route the onboarding redirect returns to.
pub const CONNECT_RETURN_ROUTE: &str = "/connect/return";

/// Where the seller's browser ends up after the callback is processed.
pub const DEFAULT_RETURN_PATH: &str = "/admin";

impl StripeClient {
    /// Provision a Standard connected account for the seller.
    ///
    /// The account is scoped to the configured country and requests the two
    /// capabilities a destination charge needs: taking card payments and
    /// receiving transfers.
    pub async fn create_connect_account(&self) -> Result<String> {
        let mut params = CreateAccount::new();
        params.type_ = Some(AccountType::Standard);
        params.country = Some(&self.config().seller_country);
        params.capabilities = Some(CreateAccountCapabilities {
            card_payments: Some(CreateAccountCapabilitiesCardPayments {
                requested: Some(true),
            }),
            transfers: Some(CreateAccountCapabilitiesTransfers {
                requested: Some(true),
            }),
            ..Default::default()
        });

        let account = Account::create(self.inner(), params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        tracing::info!(account_id = %account.id, country = %self.config().seller_country, "Provisioned connected account");

        Ok(account.id.to_string())
    }

    /// Mint a time-limited onboarding link for a connected account.
    ///
    /// The link expires on Stripe's schedule; an expired link simply requires
    /// a fresh `begin` call, nothing is stored about it locally.
    pub async fn create_onboarding_link(&self, account_id: &str, return_path: &str) -> Result<String> {
        let account = account_id
            .parse()
            .map_err(|_| PaymentError::Stripe(format!("Malformed account id: {account_id}")))?;

        let refresh = refresh_url(&self.config().base_url, return_path);
        let ret = return_url(&self.config().base_url, account_id, return_path);

        let mut params = CreateAccountLink::new(account, AccountLinkType::AccountOnboarding);
        params.refresh_url = Some(&refresh);
        params.return_url = Some(&ret);

        let link = AccountLink::create(self.inner(), params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        Ok(link.url)
    }
}

/// Result of starting onboarding
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OnboardingLink {
    /// URL to redirect the seller's browser to
    pub url: String,

    /// The connected account the link is bound to
    pub account_id: String,
}

/// Drives a seller through `NotConnected -> Onboarding -> Connected`.
pub struct OnboardingManager<S: SettingsStore> {
    store: Arc<S>,
}

impl<S: SettingsStore> OnboardingManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Start (or resume) onboarding for a seller.
    ///
    /// Re-running while already connected is rejected. An account provisioned
    /// by an earlier attempt whose link was never completed is reused rather
    /// than orphaned, so only the first call ever creates an account.
    pub async fn begin(
        &self,
        stripe: &StripeClient,
        seller: &str,
        return_path: Option<&str>,
    ) -> Result<OnboardingLink> {
        let return_path = validate_return_path(return_path.unwrap_or(DEFAULT_RETURN_PATH))?;

        let connection = self.store.seller_connection(seller)?;
        if connection.status == ConnectionStatus::Connected {
            return Err(PaymentError::AlreadyConnected);
        }

        let account_id = match connection.account_id {
            Some(id) if !id.is_empty() => id,
            _ => {
                let id = stripe.create_connect_account().await?;
                self.store.mark_onboarding(seller, &id)?;
                id
            }
        };

        let url = stripe.create_onboarding_link(&account_id, return_path).await?;

        tracing::info!(seller = %seller, account_id = %account_id, "Issued onboarding link");

        Ok(OnboardingLink { url, account_id })
    }

    /// Apply the redirect callback.
    ///
    /// Only the valid shape (`connected=true` plus a non-empty account id)
    /// transitions the seller to `Connected`; anything else errors and leaves
    /// stored state exactly as it was.
    pub fn apply_callback(
        &self,
        seller: &str,
        callback: &OnboardingCallback,
    ) -> Result<SellerConnection> {
        let Some(account_id) = callback.confirmed_account() else {
            return Err(PaymentError::CallbackRejected(
                "callback must carry connected=true and a non-empty accountId".into(),
            ));
        };

        let connection = self.store.confirm_connection(seller, account_id)?;

        tracing::info!(seller = %seller, account_id = %account_id, "Seller payout account connected");

        Ok(connection)
    }
}

/// A caller-supplied return path must be a site-local absolute path.
pub fn validate_return_path(path: &str) -> Result<&str> {
    let ok = path.starts_with('/')
        && !path.contains(['?', '#', '&'])
        && !path.chars().any(char::is_whitespace);

    if ok {
        Ok(path)
    } else {
        Err(PaymentError::InvalidReturnPath(path.to_string()))
    }
}

fn refresh_url(base_url: &str, return_path: &str) -> String {
    format!("{base_url}{return_path}")
}

fn return_url(base_url: &str, account_id: &str, return_path: &str) -> String {
    format!(
        "{base_url}{CONNECT_RETURN_ROUTE}?connected=true&accountId={account_id}&returnPath={return_path}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{CheckoutIntent, ListingSnapshot};
    use crate::config::{PaymentsConfig, DEFAULT_PLATFORM_FEE_RATE};
    use crate::settings::{MemorySettingsStore, DEFAULT_SELLER};
    use stripe::Currency;

    fn manager() -> (OnboardingManager<MemorySettingsStore>, Arc<MemorySettingsStore>) {
        let store = Arc::new(MemorySettingsStore::new());
        (OnboardingManager::new(store.clone()), store)
    }

    fn stripe_client() -> StripeClient {
        StripeClient::new(PaymentsConfig {
            secret_key: "sk_test_123".into(),
            base_url: "http://localhost:3000".into(),
            seller_country: "AU".into(),
            currency: Currency::AUD,
            fee_rate: DEFAULT_PLATFORM_FEE_RATE,
        })
    }

    #[test]
    fn test_return_url_shape() {
        let url = return_url("http://localhost:3000", "acct_9", "/admin");
        assert_eq!(
            url,
            "http://localhost:3000/connect/return?connected=true&accountId=acct_9&returnPath=/admin"
        );
    }

    #[test]
    fn test_validate_return_path() {
        assert!(validate_return_path("/admin").is_ok());
        assert!(validate_return_path("/admin/settings").is_ok());
        assert!(validate_return_path("admin").is_err());
        assert!(validate_return_path("/admin?x=1").is_err());
        assert!(validate_return_path("/ad min").is_err());
        assert!(validate_return_path("").is_err());
    }

    #[tokio::test]
    async fn test_begin_rejects_already_connected() {
        let (manager, store) = manager();
        store.confirm_connection(DEFAULT_SELLER, "acct_123").unwrap();

        let result = manager.begin(&stripe_client(), DEFAULT_SELLER, None).await;
        assert!(matches!(result, Err(PaymentError::AlreadyConnected)));
    }

    #[tokio::test]
    async fn test_begin_rejects_bad_return_path() {
        let (manager, _store) = manager();
        let result = manager
            .begin(&stripe_client(), DEFAULT_SELLER, Some("evil.example/phish"))
            .await;
        assert!(matches!(result, Err(PaymentError::InvalidReturnPath(_))));
    }

    #[test]
    fn test_malformed_callback_leaves_state_unchanged() {
        let (manager, store) = manager();
        store.mark_onboarding(DEFAULT_SELLER, "acct_pending").unwrap();

        let callback = OnboardingCallback {
            connected: true,
            account_id: None,
        };
        assert!(manager.apply_callback(DEFAULT_SELLER, &callback).is_err());

        let conn = store.seller_connection(DEFAULT_SELLER).unwrap();
        assert_eq!(conn.status, ConnectionStatus::Onboarding);
        assert_eq!(conn.account_id.as_deref(), Some("acct_pending"));
    }

    #[test]
    fn test_confirmed_callback_feeds_checkout() {
        let (manager, store) = manager();

        let callback = OnboardingCallback {
            connected: true,
            account_id: Some("acct_999".into()),
        };
        let conn = manager.apply_callback(DEFAULT_SELLER, &callback).unwrap();
        assert_eq!(conn.status, ConnectionStatus::Connected);

        // A listing built from the stored account carries it as the
        // transfer destination.
        let stored = store.seller_connection(DEFAULT_SELLER).unwrap();
        let intent = CheckoutIntent::build(
            ListingSnapshot {
                product_id: "prod_1".into(),
                name: "Woven wall hanging".into(),
                price: 120.0,
                seller_account_id: stored.account_id.unwrap(),
            },
            0.10,
        )
        .unwrap();
        assert_eq!(intent.split.transfer_destination, "acct_999");
    }
}
