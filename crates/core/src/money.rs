use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A non-negative monetary amount held at two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("not a decimal amount: '{0}'")]
    Invalid(String),
    #[error("amount must not be negative: '{0}'")]
    Negative(String),
}

impl Money {
    /// Rounds to cents. Negative values are rejected.
    pub fn from_decimal(decimal: Decimal) -> Option<Self> {
        if decimal.is_zero() {
            return Some(Money::zero());
        }
        if decimal.is_sign_negative() {
            return None;
        }
        Some(Money(decimal.round_dp(2)))
    }

    pub fn from_cents(cents: u32) -> Self {
        Money(Decimal::from(cents) / Decimal::from(100))
    }

    pub fn to_cents(self) -> Option<i64> {
        (self.0 * Decimal::from(100)).to_i64()
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Strict parse: a plain decimal with `.` as the separator, e.g. `"101.00"`.
impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let dec = Decimal::from_str(trimmed).map_err(|_| MoneyError::Invalid(s.to_string()))?;
        Money::from_decimal(dec).ok_or_else(|| MoneyError::Negative(s.to_string()))
    }
}
