//! Coupons
//!
//! Cart-level discounts, selected at most one at a time. Percentage coupons are gated on the
//! cart's discounted total before the coupon is applied: price the cart without the coupon,
//! check the gate, then price it again with the coupon.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::Cart,
    discounts::fraction,
    pricing::{CartTotal, PricingError, cart_total},
};

/// Minimum discounted cart total, in minor units, for a percentage coupon to be selected.
pub const PERCENTAGE_COUPON_MINIMUM: i64 = 10_000;

/// Largest amount, in minor units, an amount coupon may take off.
pub const MAX_COUPON_AMOUNT: i64 = 100_000;

/// Errors related to coupons and coupon selection.
#[derive(Debug, Error)]
pub enum CouponError {
    /// A coupon with this code already exists.
    #[error("Coupon code {0} already exists")]
    DuplicateCode(String),

    /// No coupon has this code.
    #[error("Coupon {0} not found")]
    NotFound(String),

    /// The coupon's value is outside the allowed range.
    #[error("Coupon {0} has an out of range discount value")]
    InvalidDiscount(String),

    /// The cart total is below the percentage coupon minimum (minimum, total, currency).
    #[error("Percentage coupons require a total of at least {0} {2}, but the cart total is {1} {2}")]
    MinimumNotMet(i64, i64, &'static str),

    /// Wrapped pricing error.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// How a coupon reduces the cart total.
#[derive(Debug, Clone, Copy)]
pub enum CouponDiscount<'a> {
    /// Subtract a fixed amount (e.g., "₩5,000 off")
    Amount(Money<'a, Currency>),

    /// Take a fraction off (e.g., "10% off")
    Percentage(Percentage),
}

impl CouponDiscount<'_> {
    /// Whether the value is within range: a fraction in `[0, 1]`, or an amount between zero and
    /// [`MAX_COUPON_AMOUNT`].
    pub fn is_valid(&self) -> bool {
        match self {
            CouponDiscount::Amount(amount) => {
                (0..=MAX_COUPON_AMOUNT).contains(&amount.to_minor_units())
            }
            CouponDiscount::Percentage(percent) => {
                let value = fraction(*percent);

                value >= Decimal::ZERO && value <= Decimal::ONE
            }
        }
    }

    /// Clamp the value into range.
    #[must_use]
    pub fn clamp(self) -> Self {
        match self {
            CouponDiscount::Amount(amount) => CouponDiscount::Amount(Money::from_minor(
                amount.to_minor_units().clamp(0, MAX_COUPON_AMOUNT),
                amount.currency(),
            )),
            CouponDiscount::Percentage(percent) => CouponDiscount::Percentage(Percentage::from(
                fraction(percent).clamp(Decimal::ZERO, Decimal::ONE),
            )),
        }
    }
}

/// A coupon
#[derive(Debug, Clone)]
pub struct Coupon<'a> {
    code: String,
    name: String,
    discount: CouponDiscount<'a>,
}

impl<'a> Coupon<'a> {
    /// Create a new coupon.
    pub fn new(code: impl Into<String>, name: impl Into<String>, discount: CouponDiscount<'a>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            discount,
        }
    }

    /// Return the coupon code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Return the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the discount.
    pub fn discount(&self) -> &CouponDiscount<'a> {
        &self.discount
    }

    /// Check whether the coupon may be applied to a cart priced without any coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::MinimumNotMet`] for a percentage coupon when the total is below
    /// [`PERCENTAGE_COUPON_MINIMUM`]. Amount coupons always pass.
    pub fn check_eligibility(&self, totals: &CartTotal<'_>) -> Result<(), CouponError> {
        let total = totals.total_after_discount();

        match self.discount {
            CouponDiscount::Percentage(_) if total.to_minor_units() < PERCENTAGE_COUPON_MINIMUM => {
                Err(CouponError::MinimumNotMet(
                    PERCENTAGE_COUPON_MINIMUM,
                    total.to_minor_units(),
                    total.currency().iso_alpha_code,
                ))
            }
            CouponDiscount::Percentage(_) | CouponDiscount::Amount(_) => Ok(()),
        }
    }
}

/// The available coupons and the one currently selected, if any.
#[derive(Debug, Clone, Default)]
pub struct CouponBook<'a> {
    coupons: Vec<Coupon<'a>>,
    selected: Option<String>,
}

impl<'a> CouponBook<'a> {
    /// Create an empty coupon book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a coupon book from a list of coupons.
    ///
    /// # Errors
    ///
    /// Returns a `CouponError` if a code repeats or a value is out of range.
    pub fn with_coupons(coupons: impl IntoIterator<Item = Coupon<'a>>) -> Result<Self, CouponError> {
        let mut book = Self::new();

        for coupon in coupons {
            book.add(coupon)?;
        }

        Ok(book)
    }

    /// Add a coupon.
    ///
    /// # Errors
    ///
    /// - [`CouponError::DuplicateCode`]: a coupon with the same code exists.
    /// - [`CouponError::InvalidDiscount`]: the value is out of range; see
    ///   [`CouponDiscount::clamp`].
    pub fn add(&mut self, coupon: Coupon<'a>) -> Result<(), CouponError> {
        if self.get(coupon.code()).is_some() {
            return Err(CouponError::DuplicateCode(coupon.code));
        }

        if !coupon.discount.is_valid() {
            return Err(CouponError::InvalidDiscount(coupon.code));
        }

        debug!(code = coupon.code(), "added coupon");

        self.coupons.push(coupon);

        Ok(())
    }

    /// Remove a coupon, clearing the selection if it was selected.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::NotFound`] if no coupon has this code.
    pub fn remove(&mut self, code: &str) -> Result<Coupon<'a>, CouponError> {
        let index = self
            .coupons
            .iter()
            .position(|coupon| coupon.code() == code)
            .ok_or_else(|| CouponError::NotFound(code.to_string()))?;

        if self.selected.as_deref() == Some(code) {
            self.selected = None;
        }

        debug!(code, "removed coupon");

        Ok(self.coupons.remove(index))
    }

    /// Select a coupon for a cart, enforcing the percentage coupon minimum.
    ///
    /// # Errors
    ///
    /// - [`CouponError::NotFound`]: no coupon has this code.
    /// - [`CouponError::MinimumNotMet`]: see [`Coupon::check_eligibility`].
    /// - [`CouponError::Pricing`]: the cart could not be priced.
    pub fn select(&mut self, code: &str, cart: &Cart<'_>) -> Result<&Coupon<'a>, CouponError> {
        let coupon = self
            .coupons
            .iter()
            .find(|coupon| coupon.code() == code)
            .ok_or_else(|| CouponError::NotFound(code.to_string()))?;

        let totals = cart_total(cart, None)?;

        if let Err(err) = coupon.check_eligibility(&totals) {
            debug!(code, %err, "rejected coupon");

            return Err(err);
        }

        debug!(code, "selected coupon");

        self.selected = Some(code.to_string());

        Ok(coupon)
    }

    /// Return the selected coupon.
    pub fn selected(&self) -> Option<&Coupon<'a>> {
        let code = self.selected.as_deref()?;

        self.get(code)
    }

    /// Deselect the current coupon.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Price a cart with the selected coupon.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart cannot be priced.
    pub fn totals<'c>(&self, cart: &Cart<'c>) -> Result<CartTotal<'c>, PricingError> {
        cart_total(cart, self.selected())
    }

    /// Get a coupon by code.
    pub fn get(&self, code: &str) -> Option<&Coupon<'a>> {
        self.coupons.iter().find(|coupon| coupon.code() == code)
    }

    /// Iterate over the coupons.
    pub fn iter(&self) -> impl Iterator<Item = &Coupon<'a>> {
        self.coupons.iter()
    }

    /// Get the number of coupons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Check if there are no coupons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}
