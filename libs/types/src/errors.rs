//! Error types for the simulator
//!
//! Comprehensive error taxonomy using thiserror. Every variant is local and
//! recoverable: a rejected operation never mutates session state.

use thiserror::Error;

/// Errors returned by simulation controller operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Scenario not found: {scenario_id}")]
    NotFound { scenario_id: String },

    #[error("Cannot {operation} while {state}")]
    InvalidState { operation: String, state: String },

    #[error("Insufficient balance for {symbol}: requested {requested}, available {available}")]
    InsufficientBalance {
        symbol: String,
        requested: String,
        available: String,
    },

    #[error("Insufficient collateral for {symbol}: requested value {requested_value}, max borrow value {max_borrow_value}, available {available_value}")]
    InsufficientCollateral {
        symbol: String,
        requested_value: String,
        max_borrow_value: String,
        available_value: String,
    },

    #[error("Unknown asset: {symbol}")]
    UnknownAsset { symbol: String },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: String },

    #[error("No async runtime available to schedule ticks")]
    SchedulerUnavailable,
}

impl SimulationError {
    /// Stable machine-readable code for the presentation layer
    pub fn code(&self) -> &'static str {
        match self {
            SimulationError::NotFound { .. } => "NOT_FOUND",
            SimulationError::InvalidState { .. } => "INVALID_STATE",
            SimulationError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            SimulationError::InsufficientCollateral { .. } => "INSUFFICIENT_COLLATERAL",
            SimulationError::UnknownAsset { .. } => "UNKNOWN_ASSET",
            SimulationError::InvalidAmount { .. } => "INVALID_AMOUNT",
            SimulationError::SchedulerUnavailable => "SCHEDULER_UNAVAILABLE",
        }
    }
}

/// Errors raised while loading authored content (catalogs, portfolios)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Malformed catalog JSON: {0}")]
    Json(String),

    #[error("Invalid scenario: {reason}")]
    Invalid { reason: String },

    #[error("Duplicate scenario id: {scenario_id}")]
    DuplicateScenario { scenario_id: String },

    #[error("Invalid starting portfolio: {reason}")]
    InvalidPortfolio { reason: String },
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Json(err.to_string())
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Malformed config JSON: {0}")]
    Json(String),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = SimulationError::NotFound {
            scenario_id: "moon-landing".to_string(),
        };
        assert_eq!(err.to_string(), "Scenario not found: moon-landing");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_insufficient_collateral_carries_cap() {
        let err = SimulationError::InsufficientCollateral {
            symbol: "BTC".to_string(),
            requested_value: "700".to_string(),
            max_borrow_value: "670".to_string(),
            available_value: "670".to_string(),
        };
        assert!(err.to_string().contains("670"));
        assert!(err.to_string().contains("BTC"));
    }

    #[test]
    fn test_invalid_state_display() {
        let err = SimulationError::InvalidState {
            operation: "pause".to_string(),
            state: "Idle".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot pause while Idle");
    }

    #[test]
    fn test_catalog_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CatalogError = json_err.into();
        assert!(matches!(err, CatalogError::Json(_)));
    }
}
