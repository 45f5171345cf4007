//! Exact money amounts.
//!
//! Documents store money as JSON numbers in the major unit. The core converts
//! each value once into [`Amount`], an integer count of minor units, so every
//! total is an exact integer sum.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Minor units per major currency unit.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Non-negative money value in minor units (1/100 of the major unit).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Wraps a raw minor-unit count.
    pub const fn from_minor_units(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Converts a major-unit document value, rounding half away from zero.
    ///
    /// # Errors
    /// - `NonFinite` for NaN/infinite input.
    /// - `Negative` for values below zero.
    /// - `OutOfRange` when the minor-unit count does not fit in `i64`.
    pub fn from_major(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NonFinite);
        }
        if value < 0.0 {
            return Err(AmountError::Negative(value));
        }
        let minor = (value * MINOR_UNITS_PER_MAJOR as f64).round();
        if minor >= i64::MAX as f64 {
            return Err(AmountError::OutOfRange(value));
        }
        Ok(Self(minor as i64))
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Major-unit value, for display and JSON export only.
    pub fn to_major(self) -> f64 {
        self.0 as f64 / MINOR_UNITS_PER_MAJOR as f64
    }

    /// Whole major units, rounded half away from zero.
    pub fn rounded_major(self) -> i64 {
        let half = MINOR_UNITS_PER_MAJOR / 2;
        if self.0 >= 0 {
            (self.0 + half) / MINOR_UNITS_PER_MAJOR
        } else {
            (self.0 - half) / MINOR_UNITS_PER_MAJOR
        }
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

// Saturating: a saturated total is still a visible, bounded number.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

/// Reasons a document amount cannot become an [`Amount`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountError {
    /// Value is missing from the document.
    Missing,
    /// Value is NaN or infinite.
    NonFinite,
    /// Value is below zero.
    Negative(f64),
    /// Value is too large for minor-unit representation.
    OutOfRange(f64),
}

impl AmountError {
    /// Stable short code used in diagnostic log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::NonFinite => "non_finite",
            Self::Negative(_) => "negative",
            Self::OutOfRange(_) => "out_of_range",
        }
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "amount is missing"),
            Self::NonFinite => write!(f, "amount must be a finite number"),
            Self::Negative(value) => write!(f, "amount must not be negative: {value}"),
            Self::OutOfRange(value) => write!(f, "amount is out of range: {value}"),
        }
    }
}

impl Error for AmountError {}
