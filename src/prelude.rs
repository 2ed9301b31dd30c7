//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartItem, StockStatus},
    catalog::{Catalog, CatalogError, ProductDraft, ProductUpdate},
    coupons::{Coupon, CouponBook, CouponDiscount, CouponError},
    discounts::{DiscountError, QuantityDiscount},
    fixtures::{Fixture, FixtureError},
    orders::{OrderConfirmation, OrderError, complete_order},
    pricing::{
        CartTotal, PricingError, bulk_discount_rate, cart_total, line_item_total,
        max_applicable_discount, product_discount_rate,
    },
    products::{Product, ProductId},
    receipt::{Receipt, ReceiptError},
};
