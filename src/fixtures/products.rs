//! Product Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, KRW, USD},
};
use serde::Deserialize;

use crate::{discounts::QuantityDiscount, fixtures::FixtureError, products::Product};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product id -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Product description
    #[serde(default)]
    pub description: String,

    /// Product price (e.g., "10000 KRW")
    pub price: String,

    /// Units in stock
    pub stock: u32,

    /// Quantity discount tiers
    #[serde(default)]
    pub discounts: Vec<QuantityDiscountFixture>,
}

/// Quantity discount tier from YAML
#[derive(Debug, Deserialize)]
pub struct QuantityDiscountFixture {
    /// Minimum quantity
    pub quantity: u32,

    /// Discount rate (e.g., "10%" or "0.1")
    pub rate: String,
}

impl ProductFixture {
    /// Convert into a [`Product`] with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the price or a discount rate cannot be parsed.
    pub fn try_into_product(self, id: String) -> Result<Product<'static>, FixtureError> {
        let (minor_units, currency) = parse_price(&self.price)?;

        let discounts = self
            .discounts
            .iter()
            .map(|tier| Ok(QuantityDiscount::new(tier.quantity, parse_percentage(&tier.rate)?)))
            .collect::<Result<Vec<_>, FixtureError>>()?;

        Ok(
            Product::new(id, self.name, Money::from_minor(minor_units, currency), self.stock)
                .with_description(self.description)
                .with_discounts(discounts),
        )
    }
}

/// Parse price string (e.g., "10000 KRW" or "2.99 GBP") into minor units and currency
///
/// The amount is scaled by the currency's exponent.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the amount is not
/// a decimal number with at most the currency's precision, or if the currency code is not
/// recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = parse_currency(currency_code)?;

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let scaled = amount
        .checked_mul(Decimal::from(10i64.pow(currency.exponent)))
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    if !scaled.fract().is_zero() {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let minor_units = scaled
        .to_i64()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Look up a supported ISO currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for any other code.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "KRW" => Ok(KRW),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a decimal.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let value = if let Some(points) = trimmed.strip_suffix('%') {
        points
            .trim()
            .parse::<Decimal>()
            .map(|points| points / Decimal::ONE_HUNDRED)
    } else {
        trimmed.parse::<Decimal>()
    };

    value
        .map(Percentage::from)
        .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))
}
