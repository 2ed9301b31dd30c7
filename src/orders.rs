//! Orders

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::info;

use crate::{
    cart::Cart,
    coupons::CouponBook,
    pricing::{CartTotal, PricingError},
};

/// Errors that can occur when completing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The cart has no items.
    #[error("Cannot complete an order for an empty cart")]
    EmptyCart,

    /// Wrapped pricing error.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A completed order.
#[derive(Debug, Clone)]
pub struct OrderConfirmation<'a> {
    order_number: String,
    placed_at: Timestamp,
    totals: CartTotal<'a>,
    coupon: Option<String>,
    item_count: u64,
}

impl<'a> OrderConfirmation<'a> {
    /// Order number, `ORD-<unix millis>`
    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    /// When the order was placed
    pub fn placed_at(&self) -> Timestamp {
        self.placed_at
    }

    /// Totals charged, including the coupon
    pub fn totals(&self) -> &CartTotal<'a> {
        &self.totals
    }

    /// Amount charged
    pub fn total(&self) -> Money<'a, Currency> {
        self.totals.total_after_discount()
    }

    /// Code of the coupon applied, if any
    pub fn coupon(&self) -> Option<&str> {
        self.coupon.as_deref()
    }

    /// Total units ordered across all lines
    pub fn item_count(&self) -> u64 {
        self.item_count
    }
}

/// Complete an order now.
///
/// See [`complete_order_at`].
///
/// # Errors
///
/// Returns an [`OrderError`] if the cart is empty or cannot be priced.
pub fn complete_order<'a>(
    cart: &mut Cart<'a>,
    coupons: &mut CouponBook<'_>,
) -> Result<OrderConfirmation<'a>, OrderError> {
    complete_order_at(cart, coupons, Timestamp::now())
}

/// Complete an order placed at `placed_at`.
///
/// Prices the cart with the selected coupon, then empties the cart and clears the coupon
/// selection. Nothing is cleared if pricing fails.
///
/// # Errors
///
/// - [`OrderError::EmptyCart`]: the cart has no items.
/// - [`OrderError::Pricing`]: the cart could not be priced.
pub fn complete_order_at<'a>(
    cart: &mut Cart<'a>,
    coupons: &mut CouponBook<'_>,
    placed_at: Timestamp,
) -> Result<OrderConfirmation<'a>, OrderError> {
    if cart.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let totals = coupons.totals(cart)?;
    let coupon = coupons.selected().map(|coupon| coupon.code().to_string());
    let item_count = cart
        .iter()
        .try_fold(0u64, |count, item| count.checked_add(u64::from(item.quantity())))
        .ok_or(PricingError::Overflow)?;
    let order_number = format!("ORD-{}", placed_at.as_millisecond());

    info!(
        order_number = %order_number,
        total = %totals.total_after_discount(),
        coupon = coupon.as_deref(),
        "completed order"
    );

    cart.clear();
    coupons.clear_selection();

    Ok(OrderConfirmation {
        order_number,
        placed_at,
        totals,
        coupon,
        item_count,
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::KRW;
    use testresult::TestResult;

    use crate::{
        cart::CartItem,
        coupons::{Coupon, CouponDiscount},
        products::Product,
    };

    use super::*;

    #[test]
    fn empty_cart_is_rejected() {
        let mut cart = Cart::new(KRW);
        let mut coupons = CouponBook::new();

        let result = complete_order(&mut cart, &mut coupons);

        assert!(matches!(result, Err(OrderError::EmptyCart)));
    }

    #[test]
    fn completing_order_clears_cart_and_coupon() -> TestResult {
        let tea = Product::new("p1", "Tea", Money::from_minor(6_000, KRW), 20);

        let mut cart = Cart::new(KRW);
        cart.add_product(&tea)?;
        cart.add_product(&tea)?;

        let mut coupons = CouponBook::with_coupons([Coupon::new(
            "AMOUNT5000",
            "5,000 off",
            CouponDiscount::Amount(Money::from_minor(5_000, KRW)),
        )])?;
        coupons.select("AMOUNT5000", &cart)?;

        let placed_at = Timestamp::from_millisecond(1_700_000_000_000)?;
        let order = complete_order_at(&mut cart, &mut coupons, placed_at)?;

        assert_eq!(order.order_number(), "ORD-1700000000000");
        assert_eq!(order.placed_at(), placed_at);
        assert_eq!(order.total(), Money::from_minor(7_000, KRW));
        assert_eq!(
            order.totals().total_before_discount(),
            Money::from_minor(12_000, KRW)
        );
        assert_eq!(order.coupon(), Some("AMOUNT5000"));
        assert_eq!(order.item_count(), 2);

        assert!(cart.is_empty());
        assert!(coupons.selected().is_none());
        assert_eq!(coupons.len(), 1);

        Ok(())
    }

    #[test]
    fn item_count_exceeding_u32_is_counted() -> TestResult {
        let half = u32::MAX / 2 + 1;

        let mut cart = Cart::with_items(
            [
                CartItem::new(Product::new("p1", "Free A", Money::from_minor(0, KRW), 1), half),
                CartItem::new(Product::new("p2", "Free B", Money::from_minor(0, KRW), 1), half),
            ],
            KRW,
        )?;
        let mut coupons = CouponBook::new();

        let order = complete_order(&mut cart, &mut coupons)?;

        assert_eq!(order.item_count(), 2 * u64::from(half));
        assert_eq!(order.total(), Money::from_minor(0, KRW));

        Ok(())
    }
}
