//! Simulation configuration

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use types::errors::ConfigError;

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Wall-clock length of one simulated day
    pub tick_interval_ms: u64,
    /// Schedule ticks on a timer; when false the host calls `tick()` itself
    pub auto_tick: bool,
    /// Fraction of supplied value that may be borrowed in total
    pub collateral_cap: Decimal,
    /// Fixed seed for reproducible runs; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            auto_tick: true,
            collateral_cap: Decimal::new(67, 2),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Parse and validate from JSON; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tick_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.collateral_cap <= Decimal::ZERO || self.collateral_cap > Decimal::ONE {
            return Err(ConfigError::InvalidValue {
                field: "collateral_cap".to_string(),
                reason: format!("must be in (0, 1], got {}", self.collateral_cap),
            });
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Config for host-driven runs: no timer, fixed seed.
    pub fn manual(seed: u64) -> Self {
        Self {
            auto_tick: false,
            seed: Some(seed),
            ..Self::default()
        }
    }
}
