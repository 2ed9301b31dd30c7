//! Catalog
//!
//! The product store behind the shop and the admin panel. Products live in a [`SlotMap`] with a
//! string-id index; every write is validated before it lands.

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;
use tracing::debug;

use crate::{
    discounts::QuantityDiscount,
    products::{Product, ProductId},
};

/// Most units a product may hold in stock.
pub const MAX_STOCK: u32 = 9_999;

new_key_type! {
    struct ProductKey;
}

/// Errors related to catalog writes and lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A product with this id already exists.
    #[error("Product {0} already exists")]
    DuplicateId(ProductId),

    /// No product has this id.
    #[error("Product {0} not found")]
    NotFound(ProductId),

    /// The price is below zero.
    #[error("Product {0} has a negative price")]
    NegativePrice(ProductId),

    /// The stock exceeds [`MAX_STOCK`].
    #[error("Product {0} has stock {1}, above the maximum of {MAX_STOCK}")]
    StockOutOfRange(ProductId, u32),

    /// A discount tier has a zero quantity or a rate outside `[0, 1]`.
    #[error("Product {0} has an invalid discount tier")]
    InvalidDiscountTier(ProductId),

    /// The product's currency differs from the catalog currency (product, product currency,
    /// catalog currency).
    #[error("Product {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),
}

/// A product before it has been given an id.
#[derive(Debug, Clone)]
pub struct ProductDraft<'a> {
    /// Product name
    pub name: String,

    /// Product description
    pub description: String,

    /// Unit price
    pub price: Money<'a, Currency>,

    /// Units in stock
    pub stock: u32,

    /// Quantity discount tiers
    pub discounts: Vec<QuantityDiscount>,
}

/// A partial product edit; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate<'a> {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New unit price
    pub price: Option<Money<'a, Currency>>,

    /// New stock
    pub stock: Option<u32>,

    /// Replacement discount tiers
    pub discounts: Option<Vec<QuantityDiscount>>,
}

/// Catalog
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    currency: &'static Currency,
    products: SlotMap<ProductKey, Product<'a>>,
    keys: FxHashMap<ProductId, ProductKey>,
    order: Vec<ProductKey>,
    next_sequence: u64,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            currency,
            products: SlotMap::with_key(),
            keys: FxHashMap::default(),
            order: Vec::new(),
            next_sequence: 1,
        }
    }

    /// Insert a product under its own id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if the id is taken, or a validation error.
    pub fn insert(&mut self, product: Product<'a>) -> Result<(), CatalogError> {
        if self.keys.contains_key(&product.id) {
            return Err(CatalogError::DuplicateId(product.id));
        }

        self.validate(&product)?;

        debug!(product = %product.id, "inserted product");

        let id = product.id.clone();
        let key = self.products.insert(product);

        self.keys.insert(id, key);
        self.order.push(key);

        Ok(())
    }

    /// Create a product from a draft, assigning the next free `p<N>` id.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the draft is invalid.
    pub fn create(&mut self, draft: ProductDraft<'a>) -> Result<ProductId, CatalogError> {
        let id = self.next_id();

        let product = Product::new(id.clone(), draft.name, draft.price, draft.stock)
            .with_description(draft.description)
            .with_discounts(draft.discounts);

        self.insert(product)?;

        Ok(id)
    }

    /// Apply a partial update to a product.
    ///
    /// The update is validated as a whole; on error the product is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no product has this id, or a validation error.
    pub fn update(&mut self, id: &ProductId, update: ProductUpdate<'a>) -> Result<(), CatalogError> {
        let key = self.key(id)?;

        let mut product = self
            .products
            .get(key)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;

        if let Some(name) = update.name {
            product.name = name;
        }

        if let Some(description) = update.description {
            product.description = description;
        }

        if let Some(price) = update.price {
            product.price = price;
        }

        if let Some(stock) = update.stock {
            product.stock = stock;
        }

        if let Some(discounts) = update.discounts {
            product.discounts = discounts;
        }

        self.validate(&product)?;

        if let Some(slot) = self.products.get_mut(key) {
            *slot = product;
        }

        debug!(product = %id, "updated product");

        Ok(())
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no product has this id.
    pub fn remove(&mut self, id: &ProductId) -> Result<Product<'a>, CatalogError> {
        let key = self
            .keys
            .remove(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;

        self.order.retain(|listed| *listed != key);

        debug!(product = %id, "removed product");

        self.products
            .remove(key)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// Get a product by id.
    pub fn get(&self, id: &ProductId) -> Option<&Product<'a>> {
        let key = self.keys.get(id)?;

        self.products.get(*key)
    }

    /// Products whose name or description contains `term`, ignoring case.
    ///
    /// An empty term matches every product.
    pub fn search(&self, term: &str) -> Vec<&Product<'a>> {
        let term = term.trim();

        self.iter().filter(|product| product.matches(term)).collect()
    }

    /// Iterate over the products in insertion order.
    ///
    /// Removing a product does not reorder the rest.
    pub fn iter(&self) -> impl Iterator<Item = &Product<'a>> {
        self.order.iter().filter_map(|key| self.products.get(*key))
    }

    /// Get the number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Get the currency of the catalog.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn key(&self, id: &ProductId) -> Result<ProductKey, CatalogError> {
        self.keys
            .get(id)
            .copied()
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    fn next_id(&mut self) -> ProductId {
        loop {
            let id = ProductId::new(format!("p{}", self.next_sequence));

            self.next_sequence += 1;

            if !self.keys.contains_key(&id) {
                return id;
            }
        }
    }

    fn validate(&self, product: &Product<'_>) -> Result<(), CatalogError> {
        let currency = product.currency();

        if currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                product.id.clone(),
                currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if product.price.to_minor_units() < 0 {
            return Err(CatalogError::NegativePrice(product.id.clone()));
        }

        if product.stock > MAX_STOCK {
            return Err(CatalogError::StockOutOfRange(
                product.id.clone(),
                product.stock,
            ));
        }

        if !product.discounts.iter().all(QuantityDiscount::is_valid) {
            return Err(CatalogError::InvalidDiscountTier(product.id.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rust_decimal::Decimal;
    use rusty_money::iso::{KRW, USD};
    use testresult::TestResult;

    use super::*;

    fn draft(name: &str, price: i64) -> ProductDraft<'static> {
        ProductDraft {
            name: name.to_string(),
            description: String::new(),
            price: Money::from_minor(price, KRW),
            stock: 10,
            discounts: Vec::new(),
        }
    }

    #[test]
    fn create_assigns_sequential_ids() -> TestResult {
        let mut catalog = Catalog::new(KRW);

        let first = catalog.create(draft("Tea", 1_000))?;
        let second = catalog.create(draft("Coffee", 2_000))?;

        assert_eq!(first.as_str(), "p1");
        assert_eq!(second.as_str(), "p2");
        assert_eq!(catalog.len(), 2);

        Ok(())
    }

    #[test]
    fn create_skips_taken_ids() -> TestResult {
        let mut catalog = Catalog::new(KRW);

        catalog.insert(Product::new("p1", "Seeded", Money::from_minor(100, KRW), 1))?;

        let id = catalog.create(draft("Tea", 1_000))?;

        assert_eq!(id.as_str(), "p2");

        Ok(())
    }

    #[test]
    fn insert_rejects_duplicate_id() -> TestResult {
        let mut catalog = Catalog::new(KRW);

        catalog.insert(Product::new("p1", "Tea", Money::from_minor(100, KRW), 1))?;

        let result = catalog.insert(Product::new("p1", "Tea", Money::from_minor(100, KRW), 1));

        assert!(matches!(result, Err(CatalogError::DuplicateId(_))));

        Ok(())
    }

    #[test]
    fn insert_validates_product() {
        let mut catalog = Catalog::new(KRW);

        assert!(matches!(
            catalog.insert(Product::new("a", "A", Money::from_minor(-1, KRW), 1)),
            Err(CatalogError::NegativePrice(_))
        ));
        assert!(matches!(
            catalog.insert(Product::new("b", "B", Money::from_minor(1, KRW), MAX_STOCK + 1)),
            Err(CatalogError::StockOutOfRange(_, 10_000))
        ));
        assert!(matches!(
            catalog.insert(Product::new("c", "C", Money::from_minor(1, USD), 1)),
            Err(CatalogError::CurrencyMismatch(_, "USD", "KRW"))
        ));
        assert!(matches!(
            catalog.insert(
                Product::new("d", "D", Money::from_minor(1, KRW), 1).with_discounts([
                    QuantityDiscount::new(0, Percentage::from(Decimal::new(1, 1)))
                ])
            ),
            Err(CatalogError::InvalidDiscountTier(_))
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn update_changes_only_given_fields() -> TestResult {
        let mut catalog = Catalog::new(KRW);
        let id = catalog.create(draft("Tea", 1_000))?;

        catalog.update(
            &id,
            ProductUpdate {
                price: Some(Money::from_minor(1_200, KRW)),
                stock: Some(30),
                ..ProductUpdate::default()
            },
        )?;

        let product = catalog.get(&id).ok_or("missing product")?;

        assert_eq!(product.name, "Tea");
        assert_eq!(product.price, Money::from_minor(1_200, KRW));
        assert_eq!(product.stock, 30);

        Ok(())
    }

    #[test]
    fn invalid_update_leaves_product_unchanged() -> TestResult {
        let mut catalog = Catalog::new(KRW);
        let id = catalog.create(draft("Tea", 1_000))?;

        let result = catalog.update(
            &id,
            ProductUpdate {
                name: Some("Renamed".to_string()),
                stock: Some(MAX_STOCK + 1),
                ..ProductUpdate::default()
            },
        );

        assert!(matches!(result, Err(CatalogError::StockOutOfRange(..))));
        assert_eq!(catalog.get(&id).map(|p| p.name.as_str()), Some("Tea"));

        Ok(())
    }

    #[test]
    fn update_unknown_product_errors() {
        let mut catalog = Catalog::new(KRW);

        let result = catalog.update(&ProductId::from("p9"), ProductUpdate::default());

        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn remove_returns_product() -> TestResult {
        let mut catalog = Catalog::new(KRW);
        let id = catalog.create(draft("Tea", 1_000))?;

        let removed = catalog.remove(&id)?;

        assert_eq!(removed.name, "Tea");
        assert!(catalog.get(&id).is_none());
        assert!(matches!(catalog.remove(&id), Err(CatalogError::NotFound(_))));

        Ok(())
    }

    #[test]
    fn iter_keeps_insertion_order_after_remove() -> TestResult {
        let mut catalog = Catalog::new(KRW);

        let tea = catalog.create(draft("Tea", 1_000))?;
        catalog.create(draft("Coffee", 2_000))?;
        catalog.create(draft("Juice", 3_000))?;

        catalog.remove(&tea)?;
        catalog.create(draft("Cocoa", 4_000))?;

        let names: Vec<&str> = catalog.iter().map(|product| product.name.as_str()).collect();

        assert_eq!(names, vec!["Coffee", "Juice", "Cocoa"]);
        assert_eq!(catalog.len(), 3);

        Ok(())
    }

    #[test]
    fn search_matches_name_or_description() -> TestResult {
        let mut catalog = Catalog::new(KRW);

        catalog.create(draft("Green Tea", 1_000))?;
        catalog.create(ProductDraft {
            description: "Pairs well with tea".to_string(),
            ..draft("Shortbread", 2_000)
        })?;
        catalog.create(draft("Coffee", 3_000))?;

        let mut names: Vec<&str> = catalog
            .search("TEA")
            .into_iter()
            .map(|product| product.name.as_str())
            .collect();

        names.sort_unstable();

        assert_eq!(names, vec!["Green Tea", "Shortbread"]);
        assert_eq!(catalog.search("").len(), 3);
        assert!(catalog.search("juice").is_empty());

        Ok(())
    }
}
