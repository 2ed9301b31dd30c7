//! Discounts
//!
//! Quantity discount tiers and the rate arithmetic shared by the pricing engine and coupons.
//! Rates are fractions (`0.1` is 10% off) and are combined in [`Decimal`], never in `f64`.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

/// Any single line item at or above this quantity triggers the bulk discount for the whole cart.
pub const BULK_DISCOUNT_THRESHOLD: u32 = 10;

/// Cart-wide bulk discount rate (5%).
pub const BULK_DISCOUNT_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Ceiling on the combined tier and bulk discount for one line item (50%).
pub const MAX_DISCOUNT_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// "Buy at least `quantity` units of this product, get `rate` off the line total."
#[derive(Debug, Clone, Copy)]
pub struct QuantityDiscount {
    quantity: u32,
    rate: Percentage,
}

impl QuantityDiscount {
    /// Create a new quantity discount tier.
    pub fn new(quantity: u32, rate: Percentage) -> Self {
        Self { quantity, rate }
    }

    /// Minimum quantity for the tier to apply.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Discount rate as a fraction.
    pub fn rate(&self) -> Percentage {
        self.rate
    }

    /// Whether a line of `quantity` units reaches this tier.
    pub fn qualifies(&self, quantity: u32) -> bool {
        quantity >= self.quantity
    }

    /// Whether the tier itself is well formed: quantity of at least one and a rate in `[0, 1]`.
    pub fn is_valid(&self) -> bool {
        let rate = fraction(self.rate);

        self.quantity >= 1 && rate >= Decimal::ZERO && rate <= Decimal::ONE
    }
}

/// Return the fractional value of a percentage.
pub fn fraction(percent: Percentage) -> Decimal {
    // decimal_percentage doesn't expose the underlying Decimal
    percent * Decimal::ONE
}

/// Highest rate among `tiers` that `quantity` qualifies for, or zero.
///
/// A linear reduction over the tiers in declaration order: the running maximum only moves when a
/// tier both qualifies and is strictly greater, so tiers need not be sorted.
pub fn best_tier_rate(tiers: &[QuantityDiscount], quantity: u32) -> Decimal {
    tiers.iter().fold(Decimal::ZERO, |max, tier| {
        let rate = fraction(tier.rate);

        if tier.qualifies(quantity) && rate > max {
            rate
        } else {
            max
        }
    })
}

/// Combine a tier rate and the bulk rate under [`MAX_DISCOUNT_RATE`].
pub fn capped_rate(tier_rate: Decimal, bulk_rate: Decimal) -> Decimal {
    (tier_rate + bulk_rate).min(MAX_DISCOUNT_RATE)
}

/// Apply a fractional discount to an amount in minor units.
///
/// Computes `round(minor × (1 − rate))` once, rounding ties away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the product overflows `Decimal` or the rounded
/// result does not fit in an `i64`.
pub fn discounted_minor(minor: i64, rate: Decimal) -> Result<i64, DiscountError> {
    Decimal::from(minor)
        .checked_mul(Decimal::ONE - rate)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}
