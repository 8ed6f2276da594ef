//! Seller Connection Settings
//!
//! The persisted record answering "is this seller payable". Keyed by seller
//! identity so a multi-seller deployment needs no structural change, even
//! though the current marketplace runs with a single first-party seller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::Result;

/// Seller key used by the single-seller deployment.
pub const DEFAULT_SELLER: &str = "atelier";

/// Where a seller stands in the payout onboarding flow.
///
/// Transitions move forward only: `NotConnected -> Onboarding -> Connected`.
/// There is no disconnect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    NotConnected,
    Onboarding,
    Connected,
}

/// A seller's payout connection record
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SellerConnection {
    /// Current onboarding state
    pub status: ConnectionStatus,

    /// Stripe connected account id, present from `Onboarding` onward
    pub account_id: Option<String>,

    /// When the connection was confirmed by the onboarding callback
    pub connected_at: Option<DateTime<Utc>>,
}

impl SellerConnection {
    /// A seller is payable once the callback confirmed the account.
    pub fn is_payable(&self) -> bool {
        self.status == ConnectionStatus::Connected
            && self.account_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Query parameters Stripe's redirect lands back on our return URL with.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OnboardingCallback {
    /// Must be literally `true` for the callback to count
    pub connected: bool,

    /// The connected account id being confirmed
    pub account_id: Option<String>,
}

impl OnboardingCallback {
    /// The confirmed account id, only when the callback has the valid shape:
    /// `connected=true` and a non-empty account id. Anything else is a
    /// correlation failure and must not touch stored state.
    pub fn confirmed_account(&self) -> Option<&str> {
        match (self.connected, self.account_id.as_deref()) {
            (true, Some(id)) if !id.trim().is_empty() => Some(id),
            _ => None,
        }
    }
}

/// Settings storage trait
pub trait SettingsStore: Send + Sync {
    /// Current connection record for a seller (default when never seen)
    fn seller_connection(&self, seller: &str) -> Result<SellerConnection>;

    /// Record that an onboarding link was issued for this provider account
    fn mark_onboarding(&self, seller: &str, account_id: &str) -> Result<()>;

    /// Record a callback-confirmed connection
    fn confirm_connection(&self, seller: &str, account_id: &str) -> Result<SellerConnection>;
}

/// In-memory settings store (for development and tests)
pub struct MemorySettingsStore {
    connections: RwLock<HashMap<String, SellerConnection>>,
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn seller_connection(&self, seller: &str) -> Result<SellerConnection> {
        let connections = self.connections.read().unwrap();
        Ok(connections.get(seller).cloned().unwrap_or_default())
    }

    fn mark_onboarding(&self, seller: &str, account_id: &str) -> Result<()> {
        let mut connections = self.connections.write().unwrap();
        let entry = connections.entry(seller.to_string()).or_default();
        entry.status = ConnectionStatus::Onboarding;
        entry.account_id = Some(account_id.to_string());
        Ok(())
    }

    fn confirm_connection(&self, seller: &str, account_id: &str) -> Result<SellerConnection> {
        let mut connections = self.connections.write().unwrap();
        let entry = connections.entry(seller.to_string()).or_default();
        entry.status = ConnectionStatus::Connected;
        entry.account_id = Some(account_id.to_string());
        entry.connected_at = Some(Utc::now());
        Ok(entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_requires_both_params() {
        let missing_flag = OnboardingCallback {
            connected: false,
            account_id: Some("acct_123".into()),
        };
        assert!(missing_flag.confirmed_account().is_none());

        let missing_id = OnboardingCallback {
            connected: true,
            account_id: None,
        };
        assert!(missing_id.confirmed_account().is_none());

        let blank_id = OnboardingCallback {
            connected: true,
            account_id: Some("  ".into()),
        };
        assert!(blank_id.confirmed_account().is_none());

        let valid = OnboardingCallback {
            connected: true,
            account_id: Some("acct_123".into()),
        };
        assert_eq!(valid.confirmed_account(), Some("acct_123"));
    }

    #[test]
    fn test_confirm_round_trip() {
        let store = MemorySettingsStore::new();
        store.confirm_connection(DEFAULT_SELLER, "acct_123").unwrap();

        let conn = store.seller_connection(DEFAULT_SELLER).unwrap();
        assert_eq!(conn.status, ConnectionStatus::Connected);
        assert_eq!(conn.account_id.as_deref(), Some("acct_123"));
        assert!(conn.connected_at.is_some());
        assert!(conn.is_payable());
    }

    #[test]
    fn test_sellers_are_isolated() {
        let store = MemorySettingsStore::new();
        store.confirm_connection("tanya", "acct_123").unwrap();

        let other = store.seller_connection("someone-else").unwrap();
        assert_eq!(other.status, ConnectionStatus::NotConnected);
        assert!(other.account_id.is_none());
    }

    #[test]
    fn test_onboarding_keeps_account_id() {
        let store = MemorySettingsStore::new();
        store.mark_onboarding(DEFAULT_SELLER, "acct_pending").unwrap();

        let conn = store.seller_connection(DEFAULT_SELLER).unwrap();
        assert_eq!(conn.status, ConnectionStatus::Onboarding);
        assert_eq!(conn.account_id.as_deref(), Some("acct_pending"));
        assert!(!conn.is_payable());
    }
}
