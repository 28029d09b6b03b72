//! Price engine
//!
//! Applies a fired event to every tracked asset. Each asset gets its own
//! uniform draw inside the band selected by the event's impact; all assets
//! move in the same direction on a given day.

use crate::random::RandomSource;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use types::numeric::Price;
use types::position::AssetPosition;
use types::scenario::{Impact, SimulationEvent};

/// Precision of a realized price delta.
const DELTA_DP: u32 = 8;

/// Inclusive-low / exclusive-high range of fractional price moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaRange {
    pub low: f64,
    pub high: f64,
}

impl DeltaRange {
    /// Band for an impact category
    pub fn for_impact(impact: Impact) -> Self {
        match impact {
            Impact::Positive => Self { low: 0.02, high: 0.10 },
            Impact::Negative => Self { low: -0.20, high: -0.05 },
            Impact::Neutral => Self { low: -0.02, high: 0.02 },
        }
    }

    /// Map a uniform draw onto the band.
    pub fn sample(&self, u: f64) -> Decimal {
        let raw = self.low + u * (self.high - self.low);
        Decimal::from_f64(raw)
            .unwrap_or(Decimal::ZERO)
            .round_dp_with_strategy(DELTA_DP, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Stateless price mutator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceEngine;

impl PriceEngine {
    pub fn new() -> Self {
        Self
    }

    /// Move every position's price by an independent draw from the event's band.
    ///
    /// Prices are clamped by `Price::apply_delta`, so they stay within
    /// `[PRICE_FLOOR, PRICE_CEILING]` however many events stack up. New
    /// prices are computed for every asset before any is written.
    pub fn apply_event(
        &self,
        positions: &mut [AssetPosition],
        event: &SimulationEvent,
        random: &mut dyn RandomSource,
    ) {
        let range = DeltaRange::for_impact(event.impact);
        let moved: Vec<Price> = positions
            .iter()
            .map(|p| p.price.apply_delta(range.sample(random.next_uniform())))
            .collect();
        for (position, price) in positions.iter_mut().zip(moved) {
            position.price = price;
        }
    }
}
