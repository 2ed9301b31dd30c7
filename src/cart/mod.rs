//! Cart

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::Catalog,
    pricing::{PricingError, total_before_discount},
    products::{Product, ProductId},
};

pub mod items;

pub use items::CartItem;

/// Errors related to cart construction and mutation.
#[derive(Debug, Error)]
pub enum CartError {
    /// A product's currency differs from the cart currency (product, product currency, cart currency).
    #[error("Product {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),

    /// The same product appears on more than one line.
    #[error("Product {0} appears more than once")]
    DuplicateProduct(ProductId),

    /// Nothing left to add: the cart already holds every unit in stock.
    #[error("Insufficient stock for product {0}")]
    InsufficientStock(ProductId),

    /// The requested quantity exceeds the units in stock.
    #[error("Only {stock} units of product {product} are in stock")]
    StockLimit {
        /// Product whose stock was exceeded
        product: ProductId,
        /// Units in stock
        stock: u32,
    },

    /// The product does not exist in the catalog.
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    /// The product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    ItemNotFound(ProductId),
}

/// Stock available for a product once the cart's own quantity is taken out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    /// Units still available to add.
    Available(u32),

    /// Nothing left to add.
    SoldOut,
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    items: Vec<CartItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new, empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given items.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if an item has a different currency or a product appears twice.
    pub fn with_items(
        items: impl Into<Vec<CartItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let items = items.into();

        items.iter().enumerate().try_for_each(|(i, item)| {
            ensure_currency(item.product(), currency)?;

            if items
                .iter()
                .take(i)
                .any(|earlier| earlier.product_id() == item.product_id())
            {
                return Err(CartError::DuplicateProduct(item.product_id().clone()));
            }

            Ok(())
        })?;

        Ok(Cart { items, currency })
    }

    /// Quantity of a product already in the cart, zero when absent.
    pub fn quantity_of(&self, product: &ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| item.product_id() == product)
            .map_or(0, CartItem::quantity)
    }

    /// Stock left for a product after the cart's own quantity, which may be negative if stock was
    /// lowered after the product was added.
    pub fn remaining_stock(&self, product: &Product<'_>) -> i64 {
        i64::from(product.stock) - i64::from(self.quantity_of(&product.id))
    }

    /// Whether any more units of a product can be added.
    pub fn stock_status(&self, product: &Product<'_>) -> StockStatus {
        match u32::try_from(self.remaining_stock(product)) {
            Ok(remaining) if remaining > 0 => StockStatus::Available(remaining),
            _ => StockStatus::SoldOut,
        }
    }

    /// Add one unit of a product, appending a new line if needed.
    ///
    /// Returns the new quantity of the line.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`]: the product is priced in a different currency.
    /// - [`CartError::InsufficientStock`]: every unit in stock is already in the cart.
    pub fn add_product(&mut self, product: &Product<'a>) -> Result<u32, CartError> {
        ensure_currency(product, self.currency)?;

        if self.remaining_stock(product) <= 0 {
            debug!(product = %product.id, "rejected add: sold out");

            return Err(CartError::InsufficientStock(product.id.clone()));
        }

        let quantity = if let Some(item) = self.find_mut(&product.id) {
            let quantity = item.quantity().saturating_add(1);

            item.set_quantity(quantity);

            quantity
        } else {
            self.items.push(CartItem::new(product.clone(), 1));

            1
        };

        debug!(product = %product.id, quantity, "added to cart");

        Ok(quantity)
    }

    /// Remove a product's line, returning it if it was present.
    pub fn remove_product(&mut self, product: &ProductId) -> Option<CartItem<'a>> {
        let index = self
            .items
            .iter()
            .position(|item| item.product_id() == product)?;

        debug!(%product, "removed from cart");

        Some(self.items.remove(index))
    }

    /// Set the quantity of a line, checked against the catalog's current stock.
    ///
    /// A quantity of zero removes the line.
    ///
    /// # Errors
    ///
    /// - [`CartError::ProductNotFound`]: the product is not in the catalog.
    /// - [`CartError::StockLimit`]: the quantity exceeds the product's stock.
    /// - [`CartError::ItemNotFound`]: the product has no line in the cart.
    pub fn update_quantity(
        &mut self,
        product: &ProductId,
        quantity: u32,
        catalog: &Catalog<'_>,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            self.remove_product(product);

            return Ok(());
        }

        let stock = catalog
            .get(product)
            .ok_or_else(|| CartError::ProductNotFound(product.clone()))?
            .stock;

        if quantity > stock {
            debug!(%product, quantity, stock, "rejected quantity update");

            return Err(CartError::StockLimit {
                product: product.clone(),
                stock,
            });
        }

        self.find_mut(product)
            .ok_or_else(|| CartError::ItemNotFound(product.clone()))?
            .set_quantity(quantity);

        debug!(%product, quantity, "updated quantity");

        Ok(())
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Calculate the undiscounted subtotal of the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the subtotal overflows.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, PricingError> {
        total_before_discount(self)
    }

    /// Get a line by product.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ItemNotFound` if the product has no line.
    pub fn get_item(&self, product: &ProductId) -> Result<&CartItem<'a>, CartError> {
        self.items
            .iter()
            .find(|item| item.product_id() == product)
            .ok_or_else(|| CartError::ItemNotFound(product.clone()))
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartItem<'a>> {
        self.items.iter()
    }

    /// The lines in the cart, in insertion order.
    pub fn items(&self) -> &[CartItem<'a>] {
        &self.items
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn find_mut(&mut self, product: &ProductId) -> Option<&mut CartItem<'a>> {
        self.items
            .iter_mut()
            .find(|item| item.product_id() == product)
    }
}

fn ensure_currency(product: &Product<'_>, currency: &'static Currency) -> Result<(), CartError> {
    let product_currency = product.currency();

    if product_currency == currency {
        Ok(())
    } else {
        Err(CartError::CurrencyMismatch(
            product.id.clone(),
            product_currency.iso_alpha_code,
            currency.iso_alpha_code,
        ))
    }
}
