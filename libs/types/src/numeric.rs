//! Fixed-point price type
//!
//! Uses rust_decimal for deterministic arithmetic. A `Price` is strictly
//! positive by construction: every path that could produce a non-positive
//! value either rejects it (`try_new`) or clamps it to `PRICE_FLOOR`.
//! Moves saturate at `PRICE_CEILING` instead of overflowing.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Precision prices are stored at (8 dp).
pub const PRICE_DP: u32 = 8;

/// Smallest representable price (1e-8). Clamped prices never go below this.
pub const PRICE_FLOOR: Decimal = Decimal::from_parts(1, 0, 0, false, PRICE_DP);

/// Largest price a move can produce (1e15).
pub const PRICE_CEILING: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Strictly positive asset price
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Create a new Price
    ///
    /// # Panics
    /// Panics if the value is not strictly positive
    pub fn new(value: Decimal) -> Self {
        assert!(value > Decimal::ZERO, "Price must be positive");
        Self(value)
    }

    /// Try to create a Price, returning None if not strictly positive
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Round to `PRICE_DP` and clamp into `[PRICE_FLOOR, PRICE_CEILING]`.
    ///
    /// Total over every `Decimal`, which is what lets the price engine
    /// apply arbitrary deltas without breaking positivity.
    pub fn clamped(value: Decimal) -> Self {
        let rounded =
            value.round_dp_with_strategy(PRICE_DP, RoundingStrategy::MidpointAwayFromZero);
        Self(rounded.clamp(PRICE_FLOOR, PRICE_CEILING))
    }

    pub fn from_u64(value: u64) -> Self {
        Self::new(Decimal::from(value))
    }

    /// Parse from a decimal string, returning None if invalid or non-positive
    pub fn from_str(s: &str) -> Option<Self> {
        Decimal::from_str_exact(s).ok().and_then(Self::try_new)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Apply a fractional move: `price × (1 + delta)`, clamped.
    ///
    /// Never panics: a product too large for `Decimal` saturates at the
    /// bound on its side.
    pub fn apply_delta(&self, delta: Decimal) -> Self {
        let factor = Decimal::ONE.checked_add(delta).unwrap_or(Decimal::MAX);
        match self.0.checked_mul(factor) {
            Some(value) => Self::clamped(value),
            None if factor.is_sign_negative() => Self(PRICE_FLOOR),
            None => Self(PRICE_CEILING),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = String;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(value).ok_or_else(|| format!("price must be positive, got {}", value))
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}
