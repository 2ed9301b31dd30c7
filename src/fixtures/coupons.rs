//! Coupon Fixtures

use rustc_hash::FxHashMap;
use rusty_money::Money;
use serde::Deserialize;

use crate::{
    coupons::{Coupon, CouponDiscount},
    fixtures::{
        FixtureError,
        products::{parse_percentage, parse_price},
    },
};

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Map of coupon code -> coupon fixture
    pub coupons: FxHashMap<String, CouponFixture>,
}

/// Coupon fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponFixture {
    /// Fixed amount off the total
    Amount {
        /// Coupon name
        name: String,

        /// Amount off (e.g., "5000 KRW")
        value: String,
    },

    /// Percentage off the total
    Percentage {
        /// Coupon name
        name: String,

        /// Rate off (e.g., "10%")
        value: String,
    },
}

impl CouponFixture {
    /// Convert into a [`Coupon`] with the given code.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be parsed.
    pub fn try_into_coupon(self, code: String) -> Result<Coupon<'static>, FixtureError> {
        match self {
            CouponFixture::Amount { name, value } => {
                let (minor_units, currency) = parse_price(&value)?;

                Ok(Coupon::new(
                    code,
                    name,
                    CouponDiscount::Amount(Money::from_minor(minor_units, currency)),
                ))
            }
            CouponFixture::Percentage { name, value } => Ok(Coupon::new(
                code,
                name,
                CouponDiscount::Percentage(parse_percentage(&value)?),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::KRW;
    use testresult::TestResult;

    use crate::discounts::fraction;

    use super::*;

    #[test]
    fn amount_coupon_converts() -> TestResult {
        let fixture: CouponFixture =
            serde_norway::from_str("type: amount\nname: 5,000 off\nvalue: 5000 KRW\n")?;

        let coupon = fixture.try_into_coupon("AMOUNT5000".to_string())?;

        assert_eq!(coupon.code(), "AMOUNT5000");
        assert_eq!(coupon.name(), "5,000 off");
        assert!(matches!(
            coupon.discount(),
            CouponDiscount::Amount(amount) if *amount == Money::from_minor(5_000, KRW)
        ));

        Ok(())
    }

    #[test]
    fn percentage_coupon_converts() -> TestResult {
        let fixture: CouponFixture =
            serde_norway::from_str("type: percentage\nname: 10% off\nvalue: 10%\n")?;

        let coupon = fixture.try_into_coupon("PERCENT10".to_string())?;

        assert!(matches!(
            coupon.discount(),
            CouponDiscount::Percentage(rate) if fraction(*rate) == Decimal::new(10, 2)
        ));

        Ok(())
    }

    #[test]
    fn unknown_type_fails_to_parse() {
        let result: Result<CouponFixture, _> =
            serde_norway::from_str("type: bogo\nname: Free\nvalue: 1\n");

        assert!(result.is_err());
    }
}
