//! Payments Configuration
//!
//! All settings come from the process environment. A missing secret key is a
//! hard configuration error: there is no placeholder-credential mode, the
//! caller decides whether to run with payments disabled.

use stripe::Currency;

use crate::error::{PaymentError, Result};

/// Default platform commission on each sale (10%).
pub const DEFAULT_PLATFORM_FEE_RATE: f64 = 0.10;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_SELLER_COUNTRY: &str = "AU";

/// Resolved payments configuration
#[derive(Clone, Debug)]
pub struct PaymentsConfig {
    /// Stripe secret key (`sk_...`)
    pub secret_key: String,

    /// Public origin the redirect targets are built on, no trailing slash
    pub base_url: String,

    /// Two-letter country the seller account is provisioned in
    pub seller_country: String,

    /// Settlement currency for checkout sessions
    pub currency: Currency,

    /// Platform commission rate, strictly inside (0, 1)
    pub fee_rate: f64,
}

impl PaymentsConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;

        let base_url = std::env::var("APP_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let seller_country = std::env::var("SELLER_COUNTRY")
            .unwrap_or_else(|_| DEFAULT_SELLER_COUNTRY.into())
            .to_uppercase();

        let currency = match std::env::var("CHECKOUT_CURRENCY") {
            Ok(code) => parse_currency(&code)?,
            Err(_) => Currency::AUD,
        };

        let fee_rate = match std::env::var("PLATFORM_FEE_RATE") {
            Ok(raw) => {
                let rate: f64 = raw.parse().map_err(|_| {
                    PaymentError::Config(format!("PLATFORM_FEE_RATE is not a number: {raw}"))
                })?;
                validate_fee_rate(rate)?
            }
            Err(_) => DEFAULT_PLATFORM_FEE_RATE,
        };

        Ok(Self {
            secret_key,
            base_url,
            seller_country,
            currency,
            fee_rate,
        })
    }
}

/// Check a commission rate lies strictly inside (0, 1)
pub fn validate_fee_rate(rate: f64) -> Result<f64> {
    if rate.is_finite() && rate > 0.0 && rate < 1.0 {
        Ok(rate)
    } else {
        Err(PaymentError::InvalidFeeRate(rate))
    }
}

// Settlement currencies this marketplace is prepared to charge in.
// Currency conversion is out of scope, so the list stays short.
fn parse_currency(code: &str) -> Result<Currency> {
    match code.to_lowercase().as_str() {
        "aud" => Ok(Currency::AUD),
        "usd" => Ok(Currency::USD),
        "eur" => Ok(Currency::EUR),
        "gbp" => Ok(Currency::GBP),
        "nzd" => Ok(Currency::NZD),
        other => Err(PaymentError::Config(format!(
            "Unsupported CHECKOUT_CURRENCY: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_rate_bounds() {
        assert!(validate_fee_rate(0.10).is_ok());
        assert!(validate_fee_rate(0.999).is_ok());
        assert!(validate_fee_rate(0.0).is_err());
        assert!(validate_fee_rate(1.0).is_err());
        assert!(validate_fee_rate(-0.1).is_err());
        assert!(validate_fee_rate(f64::NAN).is_err());
    }

    #[test]
    fn test_currency_whitelist() {
        assert_eq!(parse_currency("AUD").unwrap(), Currency::AUD);
        assert_eq!(parse_currency("usd").unwrap(), Currency::USD);
        assert!(parse_currency("jpy").is_err());
    }
}
