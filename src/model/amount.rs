//! Amount type for handling monetary values as they appear in transaction data.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! arrive as JSON numbers, as strings that may carry a currency symbol and commas, or as CSV
//! fields.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Currency symbols that may prefix an amount string. They carry no meaning for the value; the
/// currency of a transaction lives in its own field.
const CURRENCY_SYMBOLS: [char; 4] = ['$', '¥', '€', '£'];

/// Represents a monetary amount, either a sales amount or a fee.
///
/// Sums are exact because the value is a `Decimal`, so adding up the buckets of an aggregation
/// always gives the same total as adding up the rows directly.
///
/// # Examples
///
/// ```
/// # use sales_agg::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-$1,250.50").unwrap();
/// assert_eq!(amount.to_string(), "-1,250.50");
/// ```
///
/// An empty string is zero, matching how a missing amount is treated:
/// ```
/// # use sales_agg::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("").unwrap().is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// Adds `rhs`, returning `None` if the result is outside the range of `Decimal`.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.value.checked_add(rhs.value).map(Amount::new)
    }

    /// Adds `rhs`, clamping to the largest or smallest `Decimal` on overflow.
    pub fn saturating_add(self, rhs: Amount) -> Amount {
        Amount::new(self.value.saturating_add(rhs.value))
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError {
    input: String,
    source: rust_decimal::Error,
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AmountError({:?}, {:?})", self.input, self.source)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid amount '{}': {}", self.input, self.source)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::ZERO);
        }

        // "-$50.00" and "$50.00" are both accepted, the symbol is dropped
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let unsigned = unsigned
            .strip_prefix(CURRENCY_SYMBOLS)
            .unwrap_or(unsigned)
            .trim_start();

        let digits = unsigned.replace(',', "");
        let value = Decimal::from_str(&digits).map_err(|source| AmountError {
            input: s.to_string(),
            source,
        })?;
        Ok(Amount::new(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.value().abs().to_f64().unwrap_or_default();
        write!(f, "{sign}{}", format_num::format_num!(",.2", num))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Lossless: the plain decimal, no symbol, no commas
        serializer.serialize_str(&self.value.normalize().to_string())
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a string holding a number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        Decimal::from_f64(v)
            .map(Amount::new)
            .ok_or_else(|| E::custom(format!("amount {v} cannot be represented as a decimal")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::ZERO)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Saturates at the bounds of `Decimal` instead of panicking.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        self.saturating_add(rhs)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Amount::new(Decimal::from(value))
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::new(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
