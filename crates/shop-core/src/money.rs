//! # Money
//!
//! Currency handling for the storefront. Amounts are `rust_decimal::Decimal`
//! in major units everywhere except at the payment processor boundary, which
//! takes integer minor units.

use crate::error::{ShopError, ShopResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::JPY => "jpy",
            Currency::CAD => "cad",
            Currency::AUD => "aud",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, the others have 2)
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Convert a decimal amount to the smallest currency unit (cents, etc.)
    pub fn to_minor_units(&self, amount: Decimal) -> ShopResult<i64> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ShopError::InvalidAmount {
                message: format!("negative amount {amount}"),
            });
        }
        let scaled = amount
            .checked_mul(Decimal::from(10_i64.pow(self.decimal_places())))
            .ok_or_else(|| ShopError::InvalidAmount {
                message: format!("amount {amount} overflows"),
            })?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        scaled.to_i64().ok_or_else(|| ShopError::InvalidAmount {
            message: format!("amount {amount} does not fit in minor units"),
        })
    }

    /// Convert from smallest unit back to decimal
    pub fn from_minor_units(&self, amount: i64) -> Decimal {
        Decimal::new(amount, self.decimal_places())
    }
}

impl FromStr for Currency {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usd" => Ok(Currency::USD),
            "eur" => Ok(Currency::EUR),
            "gbp" => Ok(Currency::GBP),
            "jpy" => Ok(Currency::JPY),
            "cad" => Ok(Currency::CAD),
            "aud" => Ok(Currency::AUD),
            other => Err(ShopError::Configuration(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_minor_unit_conversion() {
        let usd = Currency::USD;
        assert_eq!(usd.to_minor_units(dec!(10.99)).unwrap(), 1099);
        assert_eq!(usd.to_minor_units(dec!(44)).unwrap(), 4400);
        assert_eq!(usd.from_minor_units(1099), dec!(10.99));

        let jpy = Currency::JPY;
        assert_eq!(jpy.to_minor_units(dec!(1000)).unwrap(), 1000);
        assert_eq!(jpy.from_minor_units(1000), dec!(1000));
    }

    #[test]
    fn test_sub_cent_amounts_round_half_away_from_zero() {
        assert_eq!(Currency::USD.to_minor_units(dec!(0.005)).unwrap(), 1);
        assert_eq!(Currency::USD.to_minor_units(dec!(0.004)).unwrap(), 0);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = Currency::USD.to_minor_units(dec!(-1.00)).unwrap_err();
        assert!(matches!(err, ShopError::InvalidAmount { .. }));
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!("USD".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!("eur".parse::<Currency>().unwrap(), Currency::EUR);
        assert!("xyz".parse::<Currency>().is_err());
    }
}
