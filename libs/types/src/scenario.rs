//! Scenario definitions and realized simulation events
//!
//! Scenarios are authored content: created once when the catalog loads and
//! never mutated afterwards.

use crate::ids::ScenarioId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Learner-facing difficulty label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Volatility label shown next to a scenario.
///
/// Display only: price moves are driven by each event's `Impact`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Volatility {
    Low,
    Medium,
    High,
}

/// Direction an event pushes prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Impact::Positive => "positive",
            Impact::Negative => "negative",
            Impact::Neutral => "neutral",
        };
        write!(f, "{}", s)
    }
}

/// One entry of a scenario's event table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTemplate {
    pub description: String,
    pub impact: Impact,
}

impl EventTemplate {
    pub fn new(description: impl Into<String>, impact: Impact) -> Self {
        Self {
            description: description.into(),
            impact,
        }
    }

    /// Realize this template on a given simulated day.
    pub fn realize(&self, day: u32) -> SimulationEvent {
        SimulationEvent {
            day,
            description: self.description.clone(),
            impact: self.impact,
        }
    }
}

/// Authored simulation scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: ScenarioId,
    pub name: String,
    pub difficulty: Difficulty,
    /// Number of simulated days; always > 0
    pub total_days: u32,
    pub volatility: Volatility,
    /// Ordered, equally weighted event templates
    pub event_table: Vec<EventTemplate>,
}

impl Scenario {
    /// Structural checks applied when a catalog is loaded.
    ///
    /// Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.as_str().trim().is_empty() {
            return Err("scenario id must not be empty".to_string());
        }
        if self.total_days == 0 {
            return Err(format!("scenario {} has total_days = 0", self.id));
        }
        if self.event_table.iter().any(|t| t.description.trim().is_empty()) {
            return Err(format!("scenario {} has an event with no description", self.id));
        }
        Ok(())
    }
}

/// A realized event appended to the session log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Day the event fired on (1-based: the day the tick advanced to)
    pub day: u32,
    pub description: String,
    pub impact: Impact,
}
