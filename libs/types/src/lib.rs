//! Types library for the learn-mode lending simulator
//!
//! This library provides the core type definitions shared by the simulation
//! engine and any presentation layer that reads from it, keeping arithmetic
//! deterministic and the wire shapes stable.
//!
//! # Version
//! v1.0.0
//!
//! # Modules
//! - `ids`: Identifiers (ScenarioId, SessionId, AssetSymbol)
//! - `numeric`: Strictly positive fixed-point `Price`
//! - `scenario`: Authored scenario definitions and realized events
//! - `position`: Per-asset supply/borrow positions
//! - `risk`: Portfolio snapshot, health factor, risk bands
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod numeric;
pub mod scenario;
pub mod position;
pub mod risk;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::scenario::*;
    pub use crate::position::*;
    pub use crate::risk::*;
    pub use crate::errors::*;
}
