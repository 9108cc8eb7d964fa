use crate::error::{EngineError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;

/// A signed monetary value in the group's single currency.
///
/// Wraps `rust_decimal::Decimal` so that every sum the engine performs is exact.
/// Positive balances mean the member is owed money, negative ones that they owe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money(pub Decimal);

/// A strictly positive monetary amount.
///
/// Used for expense totals and settlement transfers. Construction and
/// deserialization both reject zero and negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// One minor currency unit (0.01), the default tolerance.
    pub const DEFAULT_EPSILON: Self = Self(Decimal::from_parts(1, 0, 0, false, 2));

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Converts a float coming from an untyped boundary, rejecting NaN and infinities.
    pub fn try_from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(EngineError::invalid_amount(value));
        }
        Decimal::from_f64(value)
            .map(Self)
            .ok_or_else(|| EngineError::invalid_amount(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// True when the value is zero within `epsilon`.
    pub fn is_negligible(&self, epsilon: Money) -> bool {
        self.0.abs() <= epsilon.0
    }

    /// Adds `rhs`, failing with `InvalidAmount` where `Decimal` would overflow.
    pub fn checked_add(self, rhs: Money) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| EngineError::invalid_amount(format!("{} + {} overflows", self.0, rhs.0)))
    }

    pub fn checked_sub(self, rhs: Money) -> Result<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or_else(|| EngineError::invalid_amount(format!("{} - {} overflows", self.0, rhs.0)))
    }

    /// Sums `values` without overflowing.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(values: I) -> Result<Self> {
        values.into_iter().try_fold(Self::ZERO, Self::checked_add)
    }

    /// Drops trailing zeros so `100.00` renders as `100`.
    pub fn normalize(self) -> Self {
        Self(self.0.normalize())
    }
}

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(EngineError::invalid_amount(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = EngineError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<Money> for Amount {
    type Error = EngineError;

    fn try_from(value: Money) -> Result<Self> {
        Self::new(value.0)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Money {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}
