//! Receipt

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    coupons::{Coupon, CouponDiscount},
    discounts::fraction,
    pricing::{CartTotal, PricingError, cart_total, line_item_total, max_applicable_discount},
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error pricing the cart.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One priced cart line.
#[derive(Debug, Clone)]
pub struct ReceiptLine<'a> {
    name: String,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    subtotal: Money<'a, Currency>,
    rate: Percentage,
    total: Money<'a, Currency>,
}

impl<'a> ReceiptLine<'a> {
    /// Product name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Units bought
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price
    pub fn unit_price(&self) -> Money<'a, Currency> {
        self.unit_price
    }

    /// Line total before discounts
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Combined tier and bulk rate applied to the line
    pub fn rate(&self) -> Percentage {
        self.rate
    }

    /// Line total after discounts
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }
}

/// Final receipt for a priced cart.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    /// Priced lines in cart order
    lines: SmallVec<[ReceiptLine<'a>; 10]>,

    /// Code and display name of the applied coupon
    coupon: Option<(String, String)>,

    /// Grand totals, coupon included
    totals: CartTotal<'a>,

    /// Currency used for all monetary values
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Price a cart and capture the result.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the cart cannot be priced.
    pub fn from_cart(cart: &Cart<'a>, coupon: Option<&Coupon<'_>>) -> Result<Self, ReceiptError> {
        let mut lines = SmallVec::with_capacity(cart.len());

        for item in cart.iter() {
            let subtotal = item.subtotal_minor().ok_or(PricingError::Overflow)?;

            lines.push(ReceiptLine {
                name: item.product().name.clone(),
                quantity: item.quantity(),
                unit_price: *item.unit_price(),
                subtotal: Money::from_minor(subtotal, cart.currency()),
                rate: max_applicable_discount(item, cart),
                total: line_item_total(item, cart)?,
            });
        }

        Ok(Self {
            lines,
            coupon: coupon.map(|coupon| (coupon.code().to_string(), describe(coupon.discount()))),
            totals: cart_total(cart, coupon)?,
            currency: cart.currency(),
        })
    }

    /// Priced lines in cart order
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Code of the applied coupon
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon.as_ref().map(|(code, _)| code.as_str())
    }

    /// Total cost before any discounts
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.totals.total_before_discount()
    }

    /// Total amount paid
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.totals.total_after_discount()
    }

    /// Amount taken off by the coupon alone.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the arithmetic fails.
    pub fn coupon_savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        let lines_total = self
            .lines
            .iter()
            .try_fold(Money::from_minor(0, self.currency), |acc, line| {
                acc.add(line.total)
            })?;

        lines_total.sub(self.total())
    }

    /// Amount saved by every discount together.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.totals.savings()
    }

    /// Savings as a fraction of the subtotal; zero for an empty cart.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings = self.savings()?.to_minor_units();
        let subtotal = self.subtotal().to_minor_units();

        if subtotal == 0 {
            return Ok(Percentage::from(Decimal::ZERO));
        }

        Ok(Percentage::from(Decimal::from(savings) / Decimal::from(subtotal)))
    }

    /// Write the receipt table and summary.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Unit price", "Subtotal", "Discount", "Total"]);

        for line in &self.lines {
            builder.push_record([
                line.name.clone(),
                line.quantity.to_string(),
                format!("{}", line.unit_price),
                format!("{}", line.subtotal),
                format!("{}%", percent_points(line.rate)),
                format!("{}", line.total),
            ]);
        }

        write_receipt_table(&mut out, builder)?;
        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let mut rows: SmallVec<[(String, String); 4]> = SmallVec::new();

        rows.push((" Subtotal:".to_string(), format!("{}  ", self.subtotal())));

        if let Some((code, description)) = &self.coupon {
            rows.push((
                format!(" Coupon {code} ({description}):"),
                format!("-{}  ", self.coupon_savings()?),
            ));
        }

        rows.push((
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{}  \x1b[0m", self.total()),
        ));

        rows.push((
            " Savings:".to_string(),
            format!(
                "({}%) {}  ",
                percent_points(self.savings_percent()?),
                self.savings()?
            ),
        ));

        let label_width = rows
            .iter()
            .map(|(label, _)| visible_width(label))
            .max()
            .unwrap_or_default();

        let value_width = rows
            .iter()
            .map(|(_, value)| visible_width(value))
            .max()
            .unwrap_or_default();

        for (label, value) in &rows {
            write_summary_line(out, label, value, label_width, value_width)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

/// Short human description of a coupon's discount, e.g. `10%` or `₩5,000`.
fn describe(discount: &CouponDiscount<'_>) -> String {
    match discount {
        CouponDiscount::Amount(amount) => format!("{amount}"),
        CouponDiscount::Percentage(percent) => format!("{}%", percent_points(*percent)),
    }
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    (fraction(percentage) * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .normalize()
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..), Alignment::right());

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

/// Wraps runs of box-drawing characters (U+2500..U+257F) in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {:>value_pad$}{value}",
        "", ""
    )
    .map_err(|_err| ReceiptError::IO)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::KRW;
    use testresult::TestResult;

    use crate::{
        cart::{Cart, CartItem},
        discounts::QuantityDiscount,
        products::Product,
    };

    use super::*;

    fn tiered_cart() -> TestResult<Cart<'static>> {
        let tea = Product::new("p1", "Green Tea", Money::from_minor(1_000, KRW), 50)
            .with_discounts([QuantityDiscount::new(
                10,
                Percentage::from(Decimal::new(10, 2)),
            )]);
        let cup = Product::new("p2", "Tea Cup", Money::from_minor(5_000, KRW), 5);

        Ok(Cart::with_items(
            [CartItem::new(tea, 10), CartItem::new(cup, 1)],
            KRW,
        )?)
    }

    #[test]
    fn from_cart_prices_every_line() -> TestResult {
        let cart = tiered_cart()?;
        let receipt = Receipt::from_cart(&cart, None)?;

        assert_eq!(receipt.lines().len(), 2);

        let tea = receipt.lines().first().ok_or("missing tea line")?;
        let cup = receipt.lines().get(1).ok_or("missing cup line")?;

        // Tea: 10% tier plus 5% bulk; cup: bulk only.
        assert_eq!(tea.subtotal(), Money::from_minor(10_000, KRW));
        assert_eq!(tea.total(), Money::from_minor(8_500, KRW));
        assert_eq!(percent_points(tea.rate()), Decimal::new(15, 0));
        assert_eq!(cup.total(), Money::from_minor(4_750, KRW));

        assert_eq!(receipt.subtotal(), Money::from_minor(15_000, KRW));
        assert_eq!(receipt.total(), Money::from_minor(13_250, KRW));
        assert_eq!(receipt.savings()?, Money::from_minor(1_750, KRW));
        assert_eq!(receipt.coupon_savings()?, Money::from_minor(0, KRW));
        assert_eq!(receipt.coupon_code(), None);

        Ok(())
    }

    #[test]
    fn coupon_savings_is_taken_from_discounted_total() -> TestResult {
        let cart = tiered_cart()?;
        let coupon = Coupon::new(
            "PERCENT10",
            "10% off",
            CouponDiscount::Percentage(Percentage::from(Decimal::new(10, 2))),
        );

        let receipt = Receipt::from_cart(&cart, Some(&coupon))?;

        assert_eq!(receipt.coupon_code(), Some("PERCENT10"));
        assert_eq!(receipt.total(), Money::from_minor(11_925, KRW));
        assert_eq!(receipt.coupon_savings()?, Money::from_minor(1_325, KRW));

        Ok(())
    }

    #[test]
    fn savings_percent_is_zero_for_empty_cart() -> TestResult {
        let cart = Cart::new(KRW);
        let receipt = Receipt::from_cart(&cart, None)?;

        assert_eq!(fraction(receipt.savings_percent()?), Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_and_summary() -> TestResult {
        let cart = tiered_cart()?;
        let coupon = Coupon::new(
            "AMOUNT5000",
            "5,000 off",
            CouponDiscount::Amount(Money::from_minor(5_000, KRW)),
        );

        let receipt = Receipt::from_cart(&cart, Some(&coupon))?;

        let mut out = Vec::new();
        receipt.write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Green Tea"));
        assert!(output.contains("Tea Cup"));
        assert!(output.contains("15%"));
        assert!(output.contains("Subtotal:"));
        assert!(output.contains("Coupon AMOUNT5000"));
        assert!(output.contains("Total:"));
        assert!(output.contains("Savings:"));

        Ok(())
    }

    #[test]
    fn percent_points_drops_trailing_zeros() {
        assert_eq!(
            percent_points(Percentage::from(Decimal::new(1250, 4))).to_string(),
            "12.5"
        );
    }
}
