//! Amount type for the non-negative magnitude of a transaction.
//!
//! This module provides the `Amount` type which wraps `Decimal`. The sign of a transaction is
//! implied by its `Kind`, so an `Amount` is never negative. Parsing accepts an optional currency
//! prefix (`R$` or `$`) and either a decimal point or a decimal comma.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents the magnitude of an income or expense.
///
/// # Examples
///
/// Parsing with a decimal comma:
/// ```
/// # use finance_tracker::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("R$ 1.234,50").unwrap();
/// assert_eq!(amount.to_string(), "1234.50");
/// ```
///
/// Negative values are rejected:
/// ```
/// # use finance_tracker::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("-50.00").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    /// Creates a new `Amount`, returning `None` if `value` is negative.
    pub fn new(value: Decimal) -> Option<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            None
        } else {
            Some(Self { value })
        }
    }

    /// Creates an `Amount` from the magnitude of `value`, discarding its sign.
    pub fn magnitude(value: Decimal) -> Self {
        Self { value: value.abs() }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn to_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or_default()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub enum AmountError {
    Empty,
    Negative(String),
    Invalid(String, rust_decimal::Error),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "An amount is required"),
            AmountError::Negative(s) => write!(f, "The amount '{s}' is negative"),
            AmountError::Invalid(s, e) => write!(f, "The amount '{s}' is not a number: {e}"),
        }
    }
}

impl Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::Invalid(_, e) => Some(e),
            _ => None,
        }
    }
}

impl Amount {
    /// Parses `s` without rejecting negative numbers. Used for values that come back from the
    /// remote collection, where a negative number is read as its magnitude.
    pub(crate) fn parse_signed(s: &str) -> Result<Decimal, AmountError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let without_symbol = unsigned
            .strip_prefix("R$")
            .or_else(|| unsigned.strip_prefix('$'))
            .unwrap_or(unsigned)
            .trim();

        let normalized = normalize_separators(without_symbol);
        let value = Decimal::from_str(&normalized)
            .map_err(|e| AmountError::Invalid(trimmed.to_string(), e))?;
        Ok(if negative { -value } else { value })
    }
}

/// Reduces a number written with a decimal comma and/or grouping separators to the plain
/// `1234.56` form that `Decimal` parses.
fn normalize_separators(s: &str) -> String {
    match (s.rfind(','), s.rfind('.')) {
        // Both present: whichever comes last is the decimal separator.
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        // A single comma is a decimal comma, several are thousands separators.
        (Some(_), None) if s.matches(',').count() == 1 => s.replace(',', "."),
        (Some(_), None) => s.replace(',', ""),
        _ => s.to_string(),
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Amount::parse_signed(s)?;
        Amount::new(value).ok_or_else(|| AmountError::Negative(s.trim().to_string()))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut rounded = self.value.round_dp(2);
        rounded.rescale(2);
        write!(f, "{rounded}")
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
