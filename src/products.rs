//! Products

use std::fmt;

use rusty_money::{Money, iso::Currency};

use crate::discounts::QuantityDiscount;

/// Product identifier, e.g. `p1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Free-form description, searched alongside the name
    pub description: String,

    /// Unit price
    pub price: Money<'a, Currency>,

    /// Total units available
    pub stock: u32,

    /// Quantity discount tiers, in declaration order
    pub discounts: Vec<QuantityDiscount>,
}

impl<'a> Product<'a> {
    /// Create a product with no description and no discount tiers.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money<'a, Currency>,
        stock: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            stock,
            discounts: Vec::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the quantity discount tiers.
    #[must_use]
    pub fn with_discounts(mut self, discounts: impl Into<Vec<QuantityDiscount>>) -> Self {
        self.discounts = discounts.into();
        self
    }

    /// Return the product currency.
    pub fn currency(&self) -> &'a Currency {
        self.price.currency()
    }

    /// Whether the name or description contains `term`, ignoring case.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();

        self.name.to_lowercase().contains(&term) || self.description.to_lowercase().contains(&term)
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::iso::KRW;

    use super::*;

    #[test]
    fn builder_sets_description_and_discounts() {
        let product = Product::new("p1", "Green Tea", Money::from_minor(10_000, KRW), 20)
            .with_description("Loose leaf")
            .with_discounts([QuantityDiscount::new(10, Percentage::from(0.1))]);

        assert_eq!(product.id, ProductId::from("p1"));
        assert_eq!(product.description, "Loose leaf");
        assert_eq!(product.discounts.len(), 1);
        assert_eq!(product.currency(), KRW);
    }

    #[test]
    fn matches_name_and_description_case_insensitively() {
        let product = Product::new("p1", "Green Tea", Money::from_minor(10_000, KRW), 20)
            .with_description("Organic LEAVES");

        assert!(product.matches("green"));
        assert!(product.matches("leaves"));
        assert!(product.matches(""));
        assert!(!product.matches("coffee"));
    }

    #[test]
    fn product_id_displays_inner_string() {
        assert_eq!(ProductId::new("p42").to_string(), "p42");
        assert_eq!(ProductId::new("p42").as_str(), "p42");
    }
}
