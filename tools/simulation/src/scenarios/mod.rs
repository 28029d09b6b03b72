//! Scenario catalog
//!
//! Read-only registry of authored scenarios plus the default starting
//! portfolio sessions begin from.

pub mod builtin;
pub mod portfolio;

pub use portfolio::StartingPortfolio;

use std::collections::HashSet;
use types::errors::{CatalogError, SimulationError};
use types::scenario::Scenario;

/// Immutable scenario registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    /// Build a catalog, validating every scenario and rejecting duplicate ids.
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for s in &scenarios {
            s.validate().map_err(|reason| CatalogError::Invalid { reason })?;
            if !seen.insert(s.id.clone()) {
                return Err(CatalogError::DuplicateScenario {
                    scenario_id: s.id.to_string(),
                });
            }
        }
        Ok(Self { scenarios })
    }

    /// The built-in scenario table.
    pub fn builtin() -> Self {
        Self {
            scenarios: builtin::scenarios(),
        }
    }

    /// Load an externally authored catalog (JSON array of scenarios).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let scenarios: Vec<Scenario> = serde_json::from_str(json)?;
        Self::new(scenarios)
    }

    /// All scenarios in authored order.
    pub fn list(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn get_by_id(&self, id: &str) -> Result<&Scenario, SimulationError> {
        self.scenarios
            .iter()
            .find(|s| s.id.as_str() == id)
            .ok_or_else(|| SimulationError::NotFound {
                scenario_id: id.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
