//! Learn-mode lending market simulation
//!
//! Runs a scripted lending-market scenario day by day: random market events
//! move asset prices, the portfolio is revalued after every simulated day,
//! and the learner can supply and borrow against a collateral cap while the
//! simulation runs.
//!
//! # Modules
//! - `scenarios` — Scenario catalog and the starting portfolio
//! - `random` — Injectable, seedable randomness
//! - `events` — Daily event generation
//! - `price` — Price moves driven by fired events
//! - `valuation` — Portfolio snapshot, per-asset risk, borrow headroom
//! - `controller` — Session state machine and manual actions
//! - `scheduler` — Cancellable tokio tick loop
//! - `notify` — User-facing notifications
//! - `metrics` — Per-session statistics
//! - `replay` — Seeded headless replay and determinism checks
//! - `export` — Session JSON export
//! - `config` — Controller configuration

pub mod config;
pub mod controller;
pub mod events;
pub mod export;
pub mod metrics;
pub mod notify;
pub mod price;
pub mod random;
pub mod replay;
pub mod scenarios;
pub mod scheduler;
pub mod valuation;

pub use config::SimulationConfig;
pub use controller::{
    SessionView, SimulationController, SimulationSession, SimulationState, Subscription, TickReport,
};
pub use random::{EntropyRandom, RandomSource, ScriptedRandom, SeededRandom};
pub use scenarios::{ScenarioCatalog, StartingPortfolio};

/// Crate version constant
pub const VERSION: &str = "1.0.0";
