//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Stripe API error
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Listing price is zero, negative, or not a number
    #[error("Invalid listing price: {0}")]
    InvalidPrice(f64),

    /// Platform fee rate outside (0, 1)
    #[error("Invalid platform fee rate: {0}")]
    InvalidFeeRate(f64),

    /// Onboarding return path is not a site-local absolute path
    #[error("Invalid return path: {0}")]
    InvalidReturnPath(String),

    /// Seller has no connected payout account
    #[error("Seller has no connected payout account")]
    SellerNotPayable,

    /// Seller payout account is already connected
    #[error("Seller payout account is already connected")]
    AlreadyConnected,

    /// Onboarding callback did not carry a confirmed account
    #[error("Onboarding callback rejected: {0}")]
    CallbackRejected(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PaymentError {
    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            PaymentError::Stripe(_) => "Payment processing failed. Please try again later.",
            PaymentError::InvalidPrice(_) => "This listing has an invalid price.",
            PaymentError::SellerNotPayable => {
                "This seller hasn't connected their payout account yet. Please contact support."
            }
            PaymentError::AlreadyConnected => "Your payout account is already connected.",
            PaymentError::CallbackRejected(_) => "Payout account connection could not be confirmed.",
            PaymentError::Config(_) => "Payments are not configured on this deployment.",
            _ => "An error occurred processing your request.",
        }
    }
}
