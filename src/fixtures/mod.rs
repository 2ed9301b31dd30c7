//! Fixtures
//!
//! YAML fixture sets under `<base>/{products,coupons,carts}/<set>.yml`.

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError, CartItem},
    catalog::{Catalog, CatalogError},
    coupons::{Coupon, CouponBook, CouponError},
    fixtures::{carts::CartFixture, coupons::CouponsFixture, products::ProductsFixture},
    products::{Product, ProductId},
};

pub mod carts;
pub mod coupons;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// A cart line with a zero quantity
    #[error("Cart line for product {0} has a zero quantity")]
    ZeroQuantity(String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Catalog rejected a product
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Cart construction error
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Coupon book rejected a coupon
    #[error(transparent)]
    Coupon(#[from] CouponError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Products loaded so far
    catalog: Option<Catalog<'a>>,

    /// Coupons loaded so far, in code order
    coupons: Vec<Coupon<'a>>,

    /// Cart lines as product id and quantity
    cart_lines: Vec<(ProductId, u32)>,
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: None,
            coupons: Vec::new(),
            cart_lines: Vec::new(),
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// Products are inserted in id order. All products share the currency of the first.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if currencies differ, or if the
    /// catalog rejects a product.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("products", name)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        let mut entries: Vec<_> = fixture.products.into_iter().collect();

        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (id, product_fixture) in entries {
            let product = product_fixture.try_into_product(id)?;
            let currency = product.currency();

            let catalog = self.catalog.get_or_insert_with(|| Catalog::new(currency));

            if catalog.currency() != currency {
                return Err(FixtureError::CurrencyMismatch(
                    catalog.currency().iso_alpha_code.to_string(),
                    currency.iso_alpha_code.to_string(),
                ));
            }

            catalog.insert(product)?;
        }

        Ok(self)
    }

    /// Load coupons from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("coupons", name)?;
        let fixture: CouponsFixture = serde_norway::from_str(&contents)?;

        let mut entries: Vec<_> = fixture.coupons.into_iter().collect();

        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (code, coupon_fixture) in entries {
            self.coupons.push(coupon_fixture.try_into_coupon(code)?);
        }

        Ok(self)
    }

    /// Load cart lines from a YAML fixture file
    ///
    /// Lines are resolved against the catalog when [`Fixture::cart`] is called.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a line has a zero quantity.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("carts", name)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        for line in fixture.items {
            if line.quantity == 0 {
                return Err(FixtureError::ZeroQuantity(line.product));
            }

            self.cart_lines
                .push((ProductId::new(line.product), line.quantity));
        }

        Ok(self)
    }

    /// Load a complete fixture set (products, coupons, and cart with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_products(name)?
            .load_coupons(name)?
            .load_cart(name)
    }

    /// Load a complete fixture set from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_set(name)?;

        Ok(fixture)
    }

    /// Get the loaded catalog
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn catalog(&self) -> Result<&Catalog<'a>, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoCurrency)
    }

    /// Get a product by its id
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded or the id is unknown.
    pub fn product(&self, id: &str) -> Result<&Product<'a>, FixtureError> {
        let id = ProductId::from(id);

        self.catalog()?
            .get(&id)
            .ok_or(FixtureError::Cart(CartError::ProductNotFound(id)))
    }

    /// Build a cart from the loaded lines
    ///
    /// # Errors
    ///
    /// Returns an error if a line names an unknown product, exceeds its stock, or repeats a
    /// product.
    pub fn cart(&self) -> Result<Cart<'a>, FixtureError> {
        let catalog = self.catalog()?;

        let items = self
            .cart_lines
            .iter()
            .map(|(id, quantity)| {
                let product = catalog
                    .get(id)
                    .ok_or_else(|| CartError::ProductNotFound(id.clone()))?;

                if *quantity > product.stock {
                    return Err(CartError::StockLimit {
                        product: id.clone(),
                        stock: product.stock,
                    });
                }

                Ok(CartItem::new(product.clone(), *quantity))
            })
            .collect::<Result<Vec<_>, CartError>>()?;

        Ok(Cart::with_items(items, catalog.currency())?)
    }

    /// Build a coupon book from the loaded coupons
    ///
    /// # Errors
    ///
    /// Returns an error if a coupon value is out of range.
    pub fn coupons(&self) -> Result<CouponBook<'a>, FixtureError> {
        Ok(CouponBook::with_coupons(self.coupons.iter().cloned())?)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.catalog().map(Catalog::currency)
    }

    fn read(&self, kind: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));

        Ok(fs::read_to_string(file_path)?)
    }
}
