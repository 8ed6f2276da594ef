//! Platform Fee Policy
//!
//! Pure arithmetic for splitting a sale between the platform and the seller.
//! Prices arrive in major currency units (dollars), Stripe wants minor units
//! (cents); currencies with fractional minor units are out of scope.

use serde::{Deserialize, Serialize};

use crate::config::validate_fee_rate;
use crate::error::{PaymentError, Result};

/// Convert a major-unit price to minor units, rejecting non-positive input.
pub fn price_to_minor_units(price_major: f64) -> Result<i64> {
    if !price_major.is_finite() || price_major <= 0.0 {
        return Err(PaymentError::InvalidPrice(price_major));
    }
    Ok((price_major * 100.0).round() as i64)
}

/// Apply a commission rate to a minor-unit amount.
///
/// With the rate strictly below 1 the result can never exceed the amount.
pub fn apply_rate(amount_minor: i64, rate: f64) -> Result<i64> {
    let rate = validate_fee_rate(rate)?;
    Ok((amount_minor as f64 * rate).round() as i64)
}

/// Platform fee in minor units for a major-unit price.
pub fn compute_fee(price_major: f64, rate: f64) -> Result<i64> {
    apply_rate(price_to_minor_units(price_major)?, rate)
}

/// The two facts Stripe needs to execute a destination charge: how much the
/// platform keeps and which connected account receives the rest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Platform commission, minor units
    pub application_fee_minor: i64,

    /// Connected account id the remainder is transferred to
    pub transfer_destination: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_percent_of_85_dollars() {
        assert_eq!(compute_fee(85.0, 0.10).unwrap(), 850);
    }

    #[test]
    fn test_rounds_to_nearest_cent() {
        assert_eq!(price_to_minor_units(19.99).unwrap(), 1999);
        assert_eq!(compute_fee(19.99, 0.10).unwrap(), 200); // 199.9 rounds up
    }

    #[test]
    fn test_fee_never_exceeds_gross() {
        for price in [0.01, 0.49, 1.0, 19.99, 85.0, 1234.56] {
            let gross = price_to_minor_units(price).unwrap();
            let fee = compute_fee(price, 0.10).unwrap();
            assert!(fee >= 0);
            assert!(fee <= gross, "fee {fee} exceeds gross {gross} at {price}");
        }
    }

    #[test]
    fn test_rejects_non_positive_prices() {
        for price in [0.0, -0.01, -85.0, f64::NAN] {
            assert!(matches!(
                compute_fee(price, 0.10),
                Err(PaymentError::InvalidPrice(_))
            ));
        }
    }

    #[test]
    fn test_rejects_out_of_range_rates() {
        for rate in [0.0, 1.0, 1.5, -0.1] {
            assert!(matches!(
                compute_fee(85.0, rate),
                Err(PaymentError::InvalidFeeRate(_))
            ));
        }
    }
}
