//! Pricing
//!
//! Money arithmetic is done in `i64` minor units and only wrapped back into [`Money`] at the
//! edges, so sums of many two-decimal prices never drift.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors that can occur during pricing arithmetic.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// A major-unit amount could not be represented in minor units.
    #[error("amount {0} cannot be represented in minor units")]
    InvalidAmount(f64),

    /// A price was negative.
    #[error("amount {0} is negative")]
    NegativeAmount(f64),
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the multiplication overflows or the rounded
/// result does not fit in an `i64`.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}

/// Apply a fractional discount to a price. The result never drops below zero.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the discount cannot be computed.
pub fn discounted_price<'a>(
    price: &Money<'a, Currency>,
    discount: &Percentage,
) -> Result<Money<'a, Currency>, PricingError> {
    let original_minor = price.to_minor_units();
    let discount_minor = percent_of_minor(discount, original_minor)?;

    let discounted_minor = original_minor
        .checked_sub(discount_minor)
        .ok_or(PricingError::PercentConversion)?;

    Ok(Money::from_minor(discounted_minor.max(0), price.currency()))
}

/// Convert a major-unit amount (e.g. `8.5` dollars) into minor units (e.g. `850` cents).
///
/// # Errors
///
/// Returns an error if the amount is negative, not finite, or too large for an `i64`.
pub fn minor_units_from_major(amount: f64) -> Result<i64, PricingError> {
    if amount < 0.0 {
        return Err(PricingError::NegativeAmount(amount));
    }

    Decimal::from_f64(amount)
        .and_then(|value| value.checked_mul(Decimal::ONE_HUNDRED))
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_i64())
        .ok_or(PricingError::InvalidAmount(amount))
}

/// Multiply a unit price in minor units by a quantity, saturating on overflow.
pub fn line_total_minor(unit_minor: i64, quantity: usize) -> i64 {
    unit_minor.saturating_mul(i64::try_from(quantity).unwrap_or(i64::MAX))
}

/// Express a fractional percentage as percent points (0.25 -> 25.00).
pub fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}
