//! Money value object.
//!
//! Amounts are held as integer minor units (cents) so totals are exact,
//! and cross the API boundary as two-place decimals ("25.00").

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{AppError, AppResult};

/// Monetary amount in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Convert a decimal major-unit amount, rounding to the nearest cent.
    pub fn from_decimal(amount: Decimal) -> AppResult<Self> {
        (amount.round_dp(2) * Decimal::ONE_HUNDRED)
            .to_i64()
            .map(Self)
            .ok_or_else(out_of_range)
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Line total for `quantity` units at this unit price.
    pub fn times(&self, quantity: i32) -> AppResult<Self> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Self)
            .ok_or_else(out_of_range)
    }

    pub fn checked_add(self, rhs: Money) -> AppResult<Self> {
        self.0.checked_add(rhs.0).map(Self).ok_or_else(out_of_range)
    }

    /// Sum of `amounts`, failing instead of overflowing.
    pub fn total<I>(amounts: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = AppResult<Money>>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, amount| acc.checked_add(amount?))
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

fn out_of_range() -> AppError {
    AppError::validation("amount is out of range")
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.to_decimal(), serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Money::from_decimal(amount).map_err(serde::de::Error::custom)
    }
}
