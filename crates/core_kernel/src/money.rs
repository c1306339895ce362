//! Monetary amounts with precise decimal arithmetic
//!
//! Fines and estimated values are recorded in the jurisdiction's single
//! currency, so an [`Amount`] carries no currency code. It wraps
//! `rust_decimal::Decimal` to avoid floating-point drift when summing fines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Number of decimal places kept internally
const AMOUNT_SCALE: u32 = 4;

/// Errors that can occur during amount handling
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount must not be negative: {0}")]
    Negative(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Creates a new amount, rounded to four decimal places
    pub fn new(value: Decimal) -> Self {
        Self(value.round_dp(AMOUNT_SCALE))
    }

    /// Creates an amount from minor units (cents)
    pub fn from_minor(minor_units: i64) -> Self {
        Self::new(Decimal::new(minor_units, 2))
    }

    /// The zero amount
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the decimal value
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Checked addition
    pub fn checked_add(&self, other: Amount) -> Result<Amount, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or(MoneyError::Overflow)
    }

    /// Fails when the amount is below zero
    pub fn ensure_non_negative(self) -> Result<Self, MoneyError> {
        if self.is_negative() {
            return Err(MoneyError::Negative(self.to_string()));
        }
        Ok(self)
    }

    /// Canonical text used at the storage boundary
    pub fn to_storage(&self) -> String {
        self.0.to_string()
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl FromStr for Amount {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Amount::new)
            .map_err(|_| MoneyError::InvalidAmount(s.to_string()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, other: Amount) -> Amount {
        Amount(self.0 + other.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, other: Amount) -> Amount {
        Amount(self.0 - other.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::zero(), |acc, a| acc + a)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_rounds_to_four_places() {
        let amount = Amount::new(dec!(10.123456));
        assert_eq!(amount.value(), dec!(10.1235));
    }

    #[test]
    fn test_from_minor() {
        assert_eq!(Amount::from_minor(15050).value(), dec!(150.50));
    }

    #[test]
    fn test_sum_of_amounts() {
        let total: Amount = vec![Amount::new(dec!(150)), Amount::new(dec!(75.25))]
            .into_iter()
            .sum();
        assert_eq!(total.value(), dec!(225.25));
    }

    #[test]
    fn test_storage_round_trip() {
        let amount = Amount::new(dec!(5000.00));
        let parsed: Amount = amount.to_storage().parse().unwrap();
        assert_eq!(parsed, amount);
    }

    #[test]
    fn test_negative_rejected() {
        assert!(Amount::new(dec!(-1)).ensure_non_negative().is_err());
        assert!(Amount::zero().ensure_non_negative().is_ok());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(matches!("abc".parse::<Amount>(), Err(MoneyError::InvalidAmount(_))));
    }
}
