//! Session export
//!
//! Serializes a session (event log, positions, snapshot, stats) to JSON for
//! debriefs and external tooling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use types::ids::{ScenarioId, SessionId};
use types::position::AssetPosition;
use types::risk::PortfolioSnapshot;
use types::scenario::SimulationEvent;

use crate::controller::{SimulationSession, SimulationState};
use crate::metrics::SessionStats;

/// Everything worth keeping from one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub session_id: Option<SessionId>,
    pub scenario_id: Option<ScenarioId>,
    pub state: SimulationState,
    pub current_day: u32,
    pub total_days: u32,
    pub events: Vec<SimulationEvent>,
    pub positions: Vec<AssetPosition>,
    pub snapshot: PortfolioSnapshot,
    pub stats: SessionStats,
}

/// Build an export stamped with the current time.
pub fn build_export(session: &SimulationSession) -> SessionExport {
    SessionExport {
        version: crate::VERSION.to_string(),
        exported_at: Utc::now(),
        session_id: session.session_id,
        scenario_id: session.scenario.as_ref().map(|s| s.id.clone()),
        state: session.state,
        current_day: session.current_day,
        total_days: session.total_days(),
        events: session.events.clone(),
        positions: session.positions.clone(),
        snapshot: session.snapshot,
        stats: session.stats.clone(),
    }
}

/// Export as pretty JSON.
pub fn export_json(export: &SessionExport) -> String {
    serde_json::to_string_pretty(export).unwrap_or_default()
}

pub fn import_json(json: &str) -> Result<SessionExport, serde_json::Error> {
    serde_json::from_str(json)
}
