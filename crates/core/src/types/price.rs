//! Non-negative listing price using decimal arithmetic.
//!
//! Catalog prices are plain amounts in the storefront currency (USD). Inputs
//! from loosely-typed sources go through [`Price::from_f64`], which clamps
//! negative or non-finite values to zero.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer, Serialize};

/// A listing price. Always `>= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, clamping negative amounts to zero.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        if amount.is_sign_negative() {
            Self::ZERO
        } else {
            Self(amount.normalize())
        }
    }

    /// Create a price from whole currency units.
    #[must_use]
    pub fn whole(units: u32) -> Self {
        Self(Decimal::from(units))
    }

    /// Create a price from a floating point amount.
    ///
    /// NaN, infinities and negative values become zero.
    #[must_use]
    pub fn from_f64(amount: f64) -> Self {
        if !amount.is_finite() {
            return Self::ZERO;
        }
        Decimal::from_f64(amount).map_or(Self::ZERO, Self::new)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display (e.g., "$299" or "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        if self.0.fract().is_zero() {
            format!("${}", self.0.trunc())
        } else {
            format!("${:.2}", self.0)
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self::new)
    }
}
