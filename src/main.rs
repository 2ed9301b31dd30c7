//! Storefront checkout
//!
//! Loads a fixture set, optionally applies a coupon, prints the receipt and, with `--checkout`,
//! completes the order.
//!
//! Use `-f` to point at a fixture directory
//! Use `-s` to pick a fixture set by name
//! Use `-c` to apply a coupon code

use std::io::{self, Write};

use anyhow::Result;
use tracing::warn;

use storefront::{
    cli::StorefrontConfig, fixtures::Fixture, observability::init_subscriber,
    orders::complete_order, receipt::Receipt,
};

/// Storefront entry point
fn main() -> Result<()> {
    let config = StorefrontConfig::load().unwrap_or_else(|err| err.exit());

    init_subscriber(&config.logging)?;

    let mut fixture = Fixture::with_base_path(&config.fixtures);

    fixture.load_set(&config.set)?;

    let mut cart = fixture.cart()?;
    let mut coupons = fixture.coupons()?;

    if let Some(code) = config.coupon.as_deref()
        && let Err(err) = coupons.select(code, &cart)
    {
        warn!(code, %err, "coupon not applied");
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::from_cart(&cart, coupons.selected())?.write_to(&mut handle)?;

    if config.checkout {
        let order = complete_order(&mut cart, &mut coupons)?;

        writeln!(
            handle,
            "Order {} placed: {} for {} items",
            order.order_number(),
            order.total(),
            order.item_count()
        )?;
    }

    Ok(())
}
