//! Deterministic replay
//!
//! Re-runs a scenario headless from a seed and a list of manual actions,
//! then captures the end state. Same plan → same event log, prices and
//! snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use types::errors::SimulationError;
use types::ids::{AssetSymbol, ScenarioId};
use types::numeric::Price;
use types::risk::PortfolioSnapshot;
use types::scenario::SimulationEvent;

use crate::config::SimulationConfig;
use crate::controller::{SimulationController, SimulationState};
use crate::scenarios::{ScenarioCatalog, StartingPortfolio};

/// A learner action recorded for replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ManualAction {
    Supply { symbol: String, amount: Decimal },
    Borrow { symbol: String, amount: Decimal },
    Withdraw { symbol: String, amount: Decimal },
    Repay { symbol: String, amount: Decimal },
}

impl ManualAction {
    fn apply(&self, controller: &SimulationController) -> Result<(), SimulationError> {
        match self {
            ManualAction::Supply { symbol, amount } => controller.supply(symbol, *amount),
            ManualAction::Borrow { symbol, amount } => controller.borrow(symbol, *amount),
            ManualAction::Withdraw { symbol, amount } => controller.withdraw(symbol, *amount),
            ManualAction::Repay { symbol, amount } => controller.repay(symbol, *amount),
        }
    }
}

/// Action applied once the session has reached `day`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAction {
    pub day: u32,
    pub action: ManualAction,
}

/// Everything needed to reproduce a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayPlan {
    pub scenario_id: ScenarioId,
    pub seed: u64,
    /// Stop after this many days; `None` runs to completion
    pub days: Option<u32>,
    #[serde(default)]
    pub actions: Vec<ScheduledAction>,
}

impl ReplayPlan {
    pub fn new(scenario_id: impl Into<ScenarioId>, seed: u64) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            seed,
            days: None,
            actions: Vec::new(),
        }
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = Some(days);
        self
    }

    pub fn with_action(mut self, day: u32, action: ManualAction) -> Self {
        self.actions.push(ScheduledAction { day, action });
        self
    }
}

/// End state of a replayed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySnapshot {
    pub scenario_id: ScenarioId,
    pub seed: u64,
    pub state: SimulationState,
    pub day: u32,
    pub events: Vec<SimulationEvent>,
    pub prices: Vec<(AssetSymbol, Price)>,
    pub snapshot: PortfolioSnapshot,
    /// Scheduled actions the controller rejected
    pub rejected_actions: usize,
}

/// Run a plan against a fresh manual-tick controller.
pub fn replay(
    catalog: &ScenarioCatalog,
    starting: &StartingPortfolio,
    plan: &ReplayPlan,
) -> Result<ReplaySnapshot, SimulationError> {
    let controller = SimulationController::build(
        catalog.clone(),
        starting.clone(),
        SimulationConfig::manual(plan.seed),
    );
    controller.start(plan.scenario_id.as_str())?;

    let mut actions: Vec<&ScheduledAction> = plan.actions.iter().collect();
    actions.sort_by_key(|a| a.day);
    let mut pending = actions.into_iter().peekable();
    let mut rejected_actions = 0;

    loop {
        let day = controller.current_day();
        while let Some(scheduled) = pending.next_if(|a| a.day <= day) {
            if let Err(err) = scheduled.action.apply(&controller) {
                debug!(day, code = err.code(), "replayed action rejected");
                rejected_actions += 1;
            }
        }
        if plan.days.is_some_and(|limit| day >= limit) {
            break;
        }
        if controller.tick().is_none() {
            break;
        }
    }

    let session = controller.session();
    Ok(ReplaySnapshot {
        scenario_id: plan.scenario_id.clone(),
        seed: plan.seed,
        state: session.state,
        day: session.current_day,
        events: session.events,
        prices: session
            .positions
            .iter()
            .map(|p| (p.symbol.clone(), p.price))
            .collect(),
        snapshot: session.snapshot,
        rejected_actions,
    })
}

/// Result of replay validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayValidation {
    pub matches: bool,
    pub original: ReplaySnapshot,
    pub replayed: ReplaySnapshot,
}

/// Replay `plan` and compare with a previously captured snapshot.
pub fn validate_replay(
    catalog: &ScenarioCatalog,
    starting: &StartingPortfolio,
    plan: &ReplayPlan,
    expected: &ReplaySnapshot,
) -> Result<ReplayValidation, SimulationError> {
    let replayed = replay(catalog, starting, plan)?;
    Ok(ReplayValidation {
        matches: replayed == *expected,
        original: expected.clone(),
        replayed,
    })
}

/// Export a plan as JSON.
pub fn export_plan(plan: &ReplayPlan) -> String {
    serde_json::to_string_pretty(plan).unwrap_or_default()
}

/// Import a plan from JSON.
pub fn import_plan(json: &str) -> Result<ReplayPlan, serde_json::Error> {
    serde_json::from_str(json)
}
