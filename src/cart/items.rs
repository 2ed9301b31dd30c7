//! Cart line items

use rusty_money::{Money, iso::Currency};

use crate::products::{Product, ProductId};

/// One product-and-quantity pair in a cart.
///
/// The product is a snapshot taken when the line was added; later catalog edits do not reach it.
#[derive(Debug, Clone)]
pub struct CartItem<'a> {
    product: Product<'a>,
    quantity: u32,
}

impl<'a> CartItem<'a> {
    /// Creates a new line item.
    pub fn new(product: Product<'a>, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Returns the product snapshot.
    pub fn product(&self) -> &Product<'a> {
        &self.product
    }

    /// Returns the product identifier.
    pub fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Returns the quantity.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Returns the unit price.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.product.price
    }

    /// Undiscounted line total (`price × quantity`) in minor units, or `None` on overflow.
    pub fn subtotal_minor(&self) -> Option<i64> {
        self.product
            .price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::KRW;

    use super::*;

    #[test]
    fn accessors_return_constructor_values() {
        let item = CartItem::new(
            Product::new("p1", "Green Tea", Money::from_minor(1_500, KRW), 20),
            4,
        );

        assert_eq!(item.product_id(), &ProductId::from("p1"));
        assert_eq!(item.quantity(), 4);
        assert_eq!(item.unit_price(), &Money::from_minor(1_500, KRW));
        assert_eq!(item.subtotal_minor(), Some(6_000));
    }

    #[test]
    fn subtotal_overflow_returns_none() {
        let item = CartItem::new(
            Product::new("p1", "Gold Bar", Money::from_minor(i64::MAX, KRW), 2),
            2,
        );

        assert_eq!(item.subtotal_minor(), None);
    }
}
