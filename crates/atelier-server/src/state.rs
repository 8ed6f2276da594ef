//! Application State

use std::sync::Arc;

use atelier_payments::{MemorySettingsStore, StripeClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Persisted seller connection settings
    pub settings: Arc<MemorySettingsStore>,

    /// Stripe client (optional - None if not configured)
    pub stripe: Option<Arc<StripeClient>>,
}
