//! Storefront
//!
//! Storefront is a cart pricing engine with the stores around it: a product catalog with
//! quantity discount tiers, a stock-checked cart, a coupon book and order completion.
//!
//! Pricing is pure. Each line item gets its best quantity tier plus a cart-wide bulk discount,
//! capped at 50%, and an optional coupon applies to the discounted total.

pub mod cart;
pub mod catalog;
pub mod cli;
pub mod coupons;
pub mod discounts;
pub mod fixtures;
pub mod observability;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
