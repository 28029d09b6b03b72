//! Session statistics
//!
//! Tracks ticks, fired events by impact, and the extremes of the
//! portfolio's health over a session.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::risk::{HealthLevel, PortfolioSnapshot};
use types::scenario::{Impact, SimulationEvent};

/// Aggregated per-session statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub ticks_run: u32,
    pub positive_events: u32,
    pub negative_events: u32,
    pub neutral_events: u32,
    /// Lowest health factor observed while in debt
    pub min_health_factor: Option<Decimal>,
    pub peak_net_worth: Option<Decimal>,
    pub trough_net_worth: Option<Decimal>,
    /// Days that ended with the health factor below 1.0
    pub days_liquidatable: u32,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            ticks_run: 0,
            positive_events: 0,
            negative_events: 0,
            neutral_events: 0,
            min_health_factor: None,
            peak_net_worth: None,
            trough_net_worth: None,
            days_liquidatable: 0,
        }
    }

    /// Record a fired event.
    pub fn record_event(&mut self, event: &SimulationEvent) {
        match event.impact {
            Impact::Positive => self.positive_events += 1,
            Impact::Negative => self.negative_events += 1,
            Impact::Neutral => self.neutral_events += 1,
        }
    }

    /// Record the snapshot a tick ended with.
    pub fn record_tick(&mut self, snapshot: &PortfolioSnapshot) {
        self.ticks_run += 1;
        self.observe(snapshot);
        if HealthLevel::classify(snapshot.health_factor) == HealthLevel::Liquidatable {
            self.days_liquidatable += 1;
        }
    }

    /// Fold a snapshot into the extremes without counting a tick.
    pub fn observe(&mut self, snapshot: &PortfolioSnapshot) {
        if let Some(hf) = snapshot.health_factor.ratio() {
            self.min_health_factor = Some(match self.min_health_factor {
                Some(current) => current.min(hf),
                None => hf,
            });
        }
        let nw = snapshot.net_worth;
        self.peak_net_worth = Some(self.peak_net_worth.map_or(nw, |p| p.max(nw)));
        self.trough_net_worth = Some(self.trough_net_worth.map_or(nw, |t| t.min(nw)));
    }

    pub fn total_events(&self) -> u32 {
        self.positive_events + self.negative_events + self.neutral_events
    }

    /// Share of ticks that produced an event.
    pub fn event_rate(&self) -> f64 {
        if self.ticks_run == 0 {
            return 0.0;
        }
        self.total_events() as f64 / self.ticks_run as f64
    }

    /// Build a summary string.
    pub fn summary(&self) -> String {
        format!(
            "Days: {} | Events: {} (+{} / -{} / ={}) | Min HF: {} | Days liquidatable: {}",
            self.ticks_run,
            self.total_events(),
            self.positive_events,
            self.negative_events,
            self.neutral_events,
            self.min_health_factor
                .map(|hf| hf.round_dp(2).to_string())
                .unwrap_or_else(|| "n/a".to_string()),
            self.days_liquidatable,
        )
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}
