//! Pricing
//!
//! The cart pricing engine. Every function here is pure: it borrows a cart (and optionally a
//! coupon), never mutates them, and returns the same result for the same inputs.
//!
//! Each line item is discounted by its best quantity tier plus the cart-wide bulk discount,
//! capped at [`MAX_DISCOUNT_RATE`](crate::discounts::MAX_DISCOUNT_RATE). The selected coupon then
//! applies to the discounted grand total.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::{Cart, CartItem},
    coupons::{Coupon, CouponDiscount},
    discounts::{
        BULK_DISCOUNT_RATE, BULK_DISCOUNT_THRESHOLD, DiscountError, best_tier_rate, capped_rate,
        discounted_minor, fraction,
    },
};

/// Errors that can occur while pricing a cart.
///
/// None of these are business-rule failures; they only surface amounts that cannot be
/// represented or currencies that cannot be combined.
#[derive(Debug, Error)]
pub enum PricingError {
    /// An intermediate total overflowed.
    #[error("cart total overflowed")]
    Overflow,

    /// An amount coupon is denominated in a different currency than the cart (coupon, cart).
    #[error("Coupon has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Wrapped discount calculation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Grand totals for a cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotal<'a> {
    total_before_discount: Money<'a, Currency>,
    total_after_discount: Money<'a, Currency>,
}

impl<'a> CartTotal<'a> {
    /// Create a new cart total.
    pub fn new(
        total_before_discount: Money<'a, Currency>,
        total_after_discount: Money<'a, Currency>,
    ) -> Self {
        Self {
            total_before_discount,
            total_after_discount,
        }
    }

    /// Sum of `price × quantity` over every line, with no discounts.
    pub fn total_before_discount(&self) -> Money<'a, Currency> {
        self.total_before_discount
    }

    /// Sum of discounted line totals with the coupon applied.
    pub fn total_after_discount(&self) -> Money<'a, Currency> {
        self.total_after_discount
    }

    /// Amount saved by every discount together.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.total_before_discount.sub(self.total_after_discount)
    }
}

/// Best quantity tier rate for a single line item, or zero when no tier qualifies.
pub fn product_discount_rate(item: &CartItem<'_>) -> Percentage {
    Percentage::from(best_tier_rate(&item.product().discounts, item.quantity()))
}

/// Cart-wide bulk rate: 5% when any line reaches [`BULK_DISCOUNT_THRESHOLD`] units, else zero.
pub fn bulk_discount_rate(cart: &Cart<'_>) -> Percentage {
    Percentage::from(bulk_rate(cart))
}

/// Combined tier and bulk rate for one line, capped at 50%.
pub fn max_applicable_discount(item: &CartItem<'_>, cart: &Cart<'_>) -> Percentage {
    Percentage::from(line_rate(item, bulk_rate(cart)))
}

/// Discounted total of a single line: `round(price × quantity × (1 − rate))`.
///
/// # Errors
///
/// Returns a [`PricingError`] if the line total overflows.
pub fn line_item_total<'a>(
    item: &CartItem<'a>,
    cart: &Cart<'_>,
) -> Result<Money<'a, Currency>, PricingError> {
    discounted_line(item, bulk_rate(cart))
}

/// Undiscounted sum of every line.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the sum overflows.
pub fn total_before_discount<'a>(cart: &Cart<'a>) -> Result<Money<'a, Currency>, PricingError> {
    let total = cart.iter().try_fold(0i64, |acc, item| {
        item.subtotal_minor()
            .and_then(|subtotal| acc.checked_add(subtotal))
            .ok_or(PricingError::Overflow)
    })?;

    Ok(Money::from_minor(total, cart.currency()))
}

/// Price a cart, optionally with a coupon.
///
/// The bulk rate is computed once and shared by every line. Coupons apply to the discounted
/// total: amount coupons subtract and floor at zero, percentage coupons scale and round.
///
/// # Errors
///
/// Returns a [`PricingError`] if a total overflows or an amount coupon's currency differs from
/// the cart's.
pub fn cart_total<'a>(
    cart: &Cart<'a>,
    coupon: Option<&Coupon<'_>>,
) -> Result<CartTotal<'a>, PricingError> {
    let currency = cart.currency();
    let bulk_rate = bulk_rate(cart);

    let mut before = 0i64;
    let mut after = 0i64;

    for item in cart.iter() {
        let subtotal = item.subtotal_minor().ok_or(PricingError::Overflow)?;

        before = before.checked_add(subtotal).ok_or(PricingError::Overflow)?;

        let discounted = discounted_minor(subtotal, line_rate(item, bulk_rate))?;

        after = after.checked_add(discounted).ok_or(PricingError::Overflow)?;
    }

    if let Some(coupon) = coupon {
        after = apply_coupon(after, coupon.discount(), currency)?;
    }

    Ok(CartTotal::new(
        Money::from_minor(before, currency),
        Money::from_minor(after, currency),
    ))
}

fn bulk_rate(cart: &Cart<'_>) -> Decimal {
    if cart
        .iter()
        .any(|item| item.quantity() >= BULK_DISCOUNT_THRESHOLD)
    {
        BULK_DISCOUNT_RATE
    } else {
        Decimal::ZERO
    }
}

fn line_rate(item: &CartItem<'_>, bulk_rate: Decimal) -> Decimal {
    capped_rate(
        best_tier_rate(&item.product().discounts, item.quantity()),
        bulk_rate,
    )
}

fn discounted_line<'a>(
    item: &CartItem<'a>,
    bulk_rate: Decimal,
) -> Result<Money<'a, Currency>, PricingError> {
    let subtotal = item.subtotal_minor().ok_or(PricingError::Overflow)?;
    let discounted = discounted_minor(subtotal, line_rate(item, bulk_rate))?;

    Ok(Money::from_minor(discounted, item.unit_price().currency()))
}

fn apply_coupon(
    total: i64,
    discount: &CouponDiscount<'_>,
    currency: &'static Currency,
) -> Result<i64, PricingError> {
    let reduced = match discount {
        CouponDiscount::Amount(amount) => {
            if amount.currency() != currency {
                return Err(PricingError::CurrencyMismatch(
                    amount.currency().iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            total
                .checked_sub(amount.to_minor_units())
                .ok_or(PricingError::Overflow)?
        }
        CouponDiscount::Percentage(percent) => discounted_minor(total, fraction(*percent))?,
    };

    // A percentage above 100% is not rejected here, only floored like an oversized amount.
    Ok(reduced.max(0))
}
