//! Simulation controller
//!
//! Owns the single active `SimulationSession` and drives it through
//! `Idle → Running ⇄ Paused → Completed`, with `reset()` returning to
//! `Idle` from anywhere.
//!
//! All session state sits behind one mutex. A tick (event draw, price move,
//! snapshot recompute, day increment) runs inside a single lock acquisition,
//! so neither another tick nor a manual action can observe it half-applied.
//! Every scheduled loop carries the epoch it was spawned in; pause, resume,
//! reset and start bump the epoch, which turns any stale loop into a no-op.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use types::errors::{ConfigError, SimulationError};
use types::ids::{AssetSymbol, ScenarioId, SessionId};
use types::position::AssetPosition;
use types::risk::{AssetRisk, HealthLevel, PortfolioSnapshot};
use types::scenario::{Scenario, SimulationEvent};

use crate::config::SimulationConfig;
use crate::events::EventGenerator;
use crate::metrics::SessionStats;
use crate::notify::{Notification, NotificationSink, TracingSink};
use crate::price::PriceEngine;
use crate::random::{EntropyRandom, RandomSource, SeededRandom};
use crate::scenarios::{ScenarioCatalog, StartingPortfolio};
use crate::scheduler::{TickControl, TickHandle};
use crate::valuation::PortfolioValuator;

/// Lifecycle state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationState {
    Idle,
    Running,
    Paused,
    Completed,
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SimulationState::Idle => "Idle",
            SimulationState::Running => "Running",
            SimulationState::Paused => "Paused",
            SimulationState::Completed => "Completed",
        };
        write!(f, "{}", s)
    }
}

/// The one active simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSession {
    pub session_id: Option<SessionId>,
    pub scenario: Option<Scenario>,
    pub state: SimulationState,
    pub current_day: u32,
    pub events: Vec<SimulationEvent>,
    pub positions: Vec<AssetPosition>,
    pub snapshot: PortfolioSnapshot,
    pub stats: SessionStats,
}

impl SimulationSession {
    fn idle(positions: Vec<AssetPosition>) -> Self {
        let snapshot = PortfolioValuator::new().recompute(&positions);
        Self {
            session_id: None,
            scenario: None,
            state: SimulationState::Idle,
            current_day: 0,
            events: Vec::new(),
            positions,
            snapshot,
            stats: SessionStats::new(),
        }
    }

    pub fn total_days(&self) -> u32 {
        self.scenario.as_ref().map_or(0, |s| s.total_days)
    }

    /// Read-only payload handed to listeners.
    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.session_id,
            scenario_id: self.scenario.as_ref().map(|s| s.id.clone()),
            state: self.state,
            current_day: self.current_day,
            total_days: self.total_days(),
            events: self.events.clone(),
            positions: self.positions.clone(),
            snapshot: self.snapshot,
        }
    }

    fn position_index(&self, symbol: &AssetSymbol) -> Result<usize, SimulationError> {
        self.positions
            .iter()
            .position(|p| &p.symbol == symbol)
            .ok_or_else(|| SimulationError::UnknownAsset {
                symbol: symbol.to_string(),
            })
    }
}

/// What listeners receive after every state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Option<SessionId>,
    pub scenario_id: Option<ScenarioId>,
    pub state: SimulationState,
    pub current_day: u32,
    pub total_days: u32,
    pub events: Vec<SimulationEvent>,
    pub positions: Vec<AssetPosition>,
    pub snapshot: PortfolioSnapshot,
}

/// Outcome of one applied tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub day: u32,
    pub event: Option<SimulationEvent>,
    pub snapshot: PortfolioSnapshot,
    pub completed: bool,
}

type Listener = Box<dyn Fn(&SessionView) + Send>;

struct Shared {
    session: SimulationSession,
    random: Box<dyn RandomSource>,
    /// Re-seed `random` with this on every start
    reseed: Option<u64>,
    listeners: BTreeMap<u64, Listener>,
    next_listener_id: u64,
    ticker: Option<TickHandle>,
    epoch: u64,
    health_level: HealthLevel,
}

impl Shared {
    fn publish(&self) {
        if self.listeners.is_empty() {
            return;
        }
        let view = self.session.view();
        for listener in self.listeners.values() {
            listener(&view);
        }
    }

    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    /// Refresh the snapshot after a manual action.
    fn revalue(&mut self) {
        self.session.snapshot = PortfolioValuator::new().recompute(&self.session.positions);
        self.session.stats.observe(&self.session.snapshot);
        self.health_level = HealthLevel::classify(self.session.snapshot.health_factor);
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Apply one tick. No-op unless the session is `Running`.
fn advance(shared: &mut Shared, sink: &dyn NotificationSink) -> Option<TickReport> {
    if shared.session.state != SimulationState::Running {
        return None;
    }
    let Shared { session, random, .. } = &mut *shared;
    let scenario = session.scenario.as_ref()?;
    let total_days = scenario.total_days;
    if session.current_day >= total_days {
        session.state = SimulationState::Completed;
        return None;
    }

    let day = session.current_day + 1;
    let event = EventGenerator::new().maybe_generate_event(scenario, day, random.as_mut());
    if let Some(event) = &event {
        PriceEngine::new().apply_event(&mut session.positions, event, random.as_mut());
        session.stats.record_event(event);
        session.events.push(event.clone());
        sink.notify(Notification::info(format!("Day {}: {}", day, event.description)));
    }
    session.snapshot = PortfolioValuator::new().recompute(&session.positions);
    session.current_day = day;
    session.stats.record_tick(&session.snapshot);

    debug!(
        scenario_id = %scenario.id,
        day,
        total_days,
        net_worth = %session.snapshot.net_worth,
        "tick"
    );

    let level = HealthLevel::classify(session.snapshot.health_factor);
    if level > shared.health_level && level.is_at_risk() {
        warn!(day, ?level, "health factor deteriorated");
        sink.notify(Notification::warning(match level {
            HealthLevel::Liquidatable => format!(
                "Day {}: health factor below 1.0, position would be liquidated",
                day
            ),
            _ => format!("Day {}: health factor entering danger zone", day),
        }));
    }
    shared.health_level = level;

    let completed = day == total_days;
    if completed {
        shared.session.state = SimulationState::Completed;
        shared.cancel_ticker();
        info!(day, summary = %shared.session.stats.summary(), "simulation completed");
        sink.notify(Notification::success(format!("Simulation complete after {} days", day)));
    }

    shared.publish();
    Some(TickReport {
        day,
        event,
        snapshot: shared.session.snapshot,
        completed,
    })
}

/// Orchestrates the learn-mode simulation.
///
/// Listeners and notification sinks run while the session lock is held and
/// must not call back into the controller.
pub struct SimulationController {
    shared: Arc<Mutex<Shared>>,
    catalog: Arc<ScenarioCatalog>,
    starting: StartingPortfolio,
    config: SimulationConfig,
    sink: Arc<dyn NotificationSink>,
}

impl SimulationController {
    /// Create a controller in `Idle` holding the starting portfolio.
    pub fn new(
        catalog: ScenarioCatalog,
        starting: StartingPortfolio,
        config: SimulationConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(catalog, starting, config))
    }

    /// Built-in catalog, default portfolio, default config.
    pub fn with_defaults() -> Self {
        Self::build(
            ScenarioCatalog::builtin(),
            StartingPortfolio::default(),
            SimulationConfig::default(),
        )
    }

    /// Skips validation; callers pass a known-good config.
    pub(crate) fn build(
        catalog: ScenarioCatalog,
        starting: StartingPortfolio,
        config: SimulationConfig,
    ) -> Self {
        let random: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(EntropyRandom::new()),
        };
        let session = SimulationSession::idle(starting.positions());
        let health_level = HealthLevel::classify(session.snapshot.health_factor);
        let shared = Shared {
            session,
            random,
            reseed: config.seed,
            listeners: BTreeMap::new(),
            next_listener_id: 0,
            ticker: None,
            epoch: 0,
            health_level,
        };
        Self {
            shared: Arc::new(Mutex::new(shared)),
            catalog: Arc::new(catalog),
            starting,
            config,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the random source. Disables seed-on-start from the config.
    pub fn with_random(self, random: impl RandomSource + 'static) -> Self {
        {
            let mut shared = lock(&self.shared);
            shared.random = Box::new(random);
            shared.reseed = None;
        }
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    // -- lifecycle ---------------------------------------------------------

    /// Load a scenario and begin ticking from day 0.
    ///
    /// Allowed from `Idle` or `Completed`. Unknown ids fail with `NotFound`
    /// and leave the session untouched.
    pub fn start(&self, scenario_id: &str) -> Result<(), SimulationError> {
        let scenario = self.catalog.get_by_id(scenario_id)?.clone();
        let mut shared = lock(&self.shared);

        match shared.session.state {
            SimulationState::Idle | SimulationState::Completed => {}
            state => {
                return Err(SimulationError::InvalidState {
                    operation: "start".to_string(),
                    state: state.to_string(),
                })
            }
        }
        let runtime = self.runtime()?;

        shared.cancel_ticker();
        shared.epoch += 1;
        if let Some(seed) = shared.reseed {
            shared.random = Box::new(SeededRandom::new(seed));
        }

        let mut session = SimulationSession::idle(self.starting.positions());
        session.session_id = Some(SessionId::new());
        session.state = SimulationState::Running;
        session.stats.observe(&session.snapshot);
        info!(
            scenario_id = %scenario.id,
            total_days = scenario.total_days,
            session_id = ?session.session_id,
            "simulation started"
        );
        self.sink.notify(Notification::info(format!(
            "Started {} ({} days)",
            scenario.name, scenario.total_days
        )));
        session.scenario = Some(scenario);
        shared.health_level = HealthLevel::classify(session.snapshot.health_factor);
        shared.session = session;

        if let Some(runtime) = runtime {
            let epoch = shared.epoch;
            shared.ticker = Some(self.spawn_ticker(&runtime, epoch));
        }
        shared.publish();
        Ok(())
    }

    /// Stop ticking without touching day, events or positions.
    pub fn pause(&self) -> Result<(), SimulationError> {
        let mut shared = lock(&self.shared);
        if shared.session.state != SimulationState::Running {
            return Err(SimulationError::InvalidState {
                operation: "pause".to_string(),
                state: shared.session.state.to_string(),
            });
        }
        shared.cancel_ticker();
        shared.epoch += 1;
        shared.session.state = SimulationState::Paused;
        info!(day = shared.session.current_day, "simulation paused");
        shared.publish();
        Ok(())
    }

    /// Continue ticking from the current day. No-op while already running.
    pub fn resume(&self) -> Result<(), SimulationError> {
        let mut shared = lock(&self.shared);
        match shared.session.state {
            SimulationState::Running => return Ok(()),
            SimulationState::Paused => {}
            state => {
                return Err(SimulationError::InvalidState {
                    operation: "resume".to_string(),
                    state: state.to_string(),
                })
            }
        }
        let runtime = self.runtime()?;

        shared.cancel_ticker();
        shared.epoch += 1;
        shared.session.state = SimulationState::Running;
        if let Some(runtime) = runtime {
            let epoch = shared.epoch;
            shared.ticker = Some(self.spawn_ticker(&runtime, epoch));
        }
        info!(day = shared.session.current_day, "simulation resumed");
        shared.publish();
        Ok(())
    }

    /// Back to `Idle` with the starting portfolio, from any state.
    pub fn reset(&self) {
        let mut shared = lock(&self.shared);
        shared.cancel_ticker();
        shared.epoch += 1;
        shared.session = SimulationSession::idle(self.starting.positions());
        shared.health_level = HealthLevel::classify(shared.session.snapshot.health_factor);
        info!("simulation reset");
        shared.publish();
    }

    /// Apply one tick now. `None` unless running.
    ///
    /// This is the same step the timer runs; with `auto_tick = false` it is
    /// the only way days advance.
    pub fn tick(&self) -> Option<TickReport> {
        let mut shared = lock(&self.shared);
        advance(&mut shared, self.sink.as_ref())
    }

    fn runtime(&self) -> Result<Option<Handle>, SimulationError> {
        if !self.config.auto_tick {
            return Ok(None);
        }
        Handle::try_current()
            .map(Some)
            .map_err(|_| SimulationError::SchedulerUnavailable)
    }

    fn spawn_ticker(&self, runtime: &Handle, epoch: u64) -> TickHandle {
        let weak: Weak<Mutex<Shared>> = Arc::downgrade(&self.shared);
        let sink = self.sink.clone();
        TickHandle::spawn(runtime, self.config.tick_interval(), move || {
            let Some(shared) = weak.upgrade() else {
                return TickControl::Stop;
            };
            let mut guard = lock(&shared);
            if guard.epoch != epoch {
                return TickControl::Stop;
            }
            match advance(&mut guard, sink.as_ref()) {
                Some(report) if !report.completed => TickControl::Continue,
                _ => TickControl::Stop,
            }
        })
    }

    // -- manual actions ----------------------------------------------------

    /// Move `amount` from the wallet balance into supply.
    pub fn supply(&self, symbol: &str, amount: Decimal) -> Result<(), SimulationError> {
        let symbol = parse_symbol(symbol).map_err(|e| self.reject(e))?;
        let mut shared = lock(&self.shared);
        let idx = shared
            .session
            .position_index(&symbol)
            .map_err(|e| self.reject(e))?;
        let available = shared.session.positions[idx].balance;

        if amount <= Decimal::ZERO || amount > available {
            return Err(self.reject(SimulationError::InsufficientBalance {
                symbol: symbol.to_string(),
                requested: amount.to_string(),
                available: available.to_string(),
            }));
        }

        let position = &mut shared.session.positions[idx];
        position.balance -= amount;
        position.supplied_qty += amount;
        shared.revalue();
        info!(%symbol, %amount, "supplied");
        self.sink.notify(Notification::success(format!("Supplied {} {}", amount, symbol)));
        shared.publish();
        Ok(())
    }

    /// Borrow `amount` into the wallet, bounded by the collateral cap.
    ///
    /// Total borrowed value after the call must stay within
    /// `supplied_value × collateral_cap`.
    pub fn borrow(&self, symbol: &str, amount: Decimal) -> Result<(), SimulationError> {
        let symbol = parse_symbol(symbol).map_err(|e| self.reject(e))?;
        if amount <= Decimal::ZERO {
            return Err(self.reject(SimulationError::InvalidAmount {
                amount: amount.to_string(),
            }));
        }
        let mut shared = lock(&self.shared);
        let idx = shared
            .session
            .position_index(&symbol)
            .map_err(|e| self.reject(e))?;

        let valuator = PortfolioValuator::new();
        let snapshot = shared.session.snapshot;
        let price = shared.session.positions[idx].price.as_decimal();
        let max_borrow_value = valuator.max_borrow_value(&snapshot, self.config.collateral_cap);
        let headroom = valuator.borrow_headroom(&snapshot, self.config.collateral_cap);

        // overflow means the value is past any cap
        let requested_value = amount.checked_mul(price);
        if !requested_value.is_some_and(|value| value <= headroom) {
            return Err(self.reject(SimulationError::InsufficientCollateral {
                symbol: symbol.to_string(),
                requested_value: requested_value.unwrap_or(Decimal::MAX).to_string(),
                max_borrow_value: max_borrow_value.to_string(),
                available_value: headroom.to_string(),
            }));
        }

        let position = &shared.session.positions[idx];
        let (Some(borrowed_qty), Some(balance)) = (
            position.borrowed_qty.checked_add(amount),
            position.balance.checked_add(amount),
        ) else {
            return Err(self.reject(SimulationError::InvalidAmount {
                amount: amount.to_string(),
            }));
        };

        let position = &mut shared.session.positions[idx];
        position.borrowed_qty = borrowed_qty;
        position.balance = balance;
        shared.revalue();
        info!(%symbol, %amount, "borrowed");
        self.sink.notify(Notification::success(format!("Borrowed {} {}", amount, symbol)));
        shared.publish();
        Ok(())
    }

    /// Move `amount` of supply back to the wallet, keeping debt within the cap.
    pub fn withdraw(&self, symbol: &str, amount: Decimal) -> Result<(), SimulationError> {
        let symbol = parse_symbol(symbol).map_err(|e| self.reject(e))?;
        let mut shared = lock(&self.shared);
        let idx = shared
            .session
            .position_index(&symbol)
            .map_err(|e| self.reject(e))?;
        let supplied = shared.session.positions[idx].supplied_qty;

        if amount <= Decimal::ZERO || amount > supplied {
            return Err(self.reject(SimulationError::InsufficientBalance {
                symbol: symbol.to_string(),
                requested: amount.to_string(),
                available: supplied.to_string(),
            }));
        }

        let snapshot = shared.session.snapshot;
        let cap = self.config.collateral_cap;
        let price = shared.session.positions[idx].price.as_decimal();
        let requested_value = amount.saturating_mul(price);
        let max_after = snapshot.supplied_value.saturating_sub(requested_value) * cap;
        if snapshot.borrowed_value > max_after {
            let needed = snapshot.borrowed_value.checked_div(cap).unwrap_or(Decimal::MAX);
            let withdrawable = snapshot.supplied_value.saturating_sub(needed).max(Decimal::ZERO);
            return Err(self.reject(SimulationError::InsufficientCollateral {
                symbol: symbol.to_string(),
                requested_value: requested_value.to_string(),
                max_borrow_value: max_after.to_string(),
                available_value: withdrawable.to_string(),
            }));
        }

        let position = &mut shared.session.positions[idx];
        position.supplied_qty -= amount;
        position.balance += amount;
        shared.revalue();
        info!(%symbol, %amount, "withdrew");
        self.sink.notify(Notification::success(format!("Withdrew {} {}", amount, symbol)));
        shared.publish();
        Ok(())
    }

    /// Pay back `amount` of debt from the wallet.
    pub fn repay(&self, symbol: &str, amount: Decimal) -> Result<(), SimulationError> {
        let symbol = parse_symbol(symbol).map_err(|e| self.reject(e))?;
        let mut shared = lock(&self.shared);
        let idx = shared
            .session
            .position_index(&symbol)
            .map_err(|e| self.reject(e))?;
        let position = &shared.session.positions[idx];

        if amount <= Decimal::ZERO || amount > position.borrowed_qty {
            return Err(self.reject(SimulationError::InvalidAmount {
                amount: amount.to_string(),
            }));
        }
        if amount > position.balance {
            return Err(self.reject(SimulationError::InsufficientBalance {
                symbol: symbol.to_string(),
                requested: amount.to_string(),
                available: position.balance.to_string(),
            }));
        }

        let position = &mut shared.session.positions[idx];
        position.borrowed_qty -= amount;
        position.balance -= amount;
        shared.revalue();
        info!(%symbol, %amount, "repaid");
        self.sink.notify(Notification::success(format!("Repaid {} {}", amount, symbol)));
        shared.publish();
        Ok(())
    }

    fn reject(&self, err: SimulationError) -> SimulationError {
        warn!(code = err.code(), "{}", err);
        self.sink.notify(Notification::error(err.to_string()));
        err
    }

    // -- subscriptions -----------------------------------------------------

    /// Register a listener called with a `SessionView` after every change.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionView) + Send + 'static,
    {
        let mut shared = lock(&self.shared);
        let id = shared.next_listener_id;
        shared.next_listener_id += 1;
        shared.listeners.insert(id, Box::new(listener));
        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.shared).listeners.len()
    }

    // -- queries -----------------------------------------------------------

    pub fn state(&self) -> SimulationState {
        lock(&self.shared).session.state
    }

    pub fn current_day(&self) -> u32 {
        lock(&self.shared).session.current_day
    }

    pub fn view(&self) -> SessionView {
        lock(&self.shared).session.view()
    }

    /// Full copy of the session, including stats.
    pub fn session(&self) -> SimulationSession {
        lock(&self.shared).session.clone()
    }

    pub fn snapshot(&self) -> PortfolioSnapshot {
        lock(&self.shared).session.snapshot
    }

    pub fn positions(&self) -> Vec<AssetPosition> {
        lock(&self.shared).session.positions.clone()
    }

    pub fn events(&self) -> Vec<SimulationEvent> {
        lock(&self.shared).session.events.clone()
    }

    pub fn asset_risk(&self) -> Vec<AssetRisk> {
        PortfolioValuator::new().asset_risk(&lock(&self.shared).session.positions)
    }

    pub fn health_level(&self) -> HealthLevel {
        lock(&self.shared).health_level
    }

    /// Max additional borrow value under the current snapshot.
    pub fn borrow_headroom(&self) -> Decimal {
        let snapshot = lock(&self.shared).session.snapshot;
        PortfolioValuator::new().borrow_headroom(&snapshot, self.config.collateral_cap)
    }

    pub fn is_ticking(&self) -> bool {
        lock(&self.shared)
            .ticker
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }
}

fn parse_symbol(symbol: &str) -> Result<AssetSymbol, SimulationError> {
    AssetSymbol::try_new(symbol).ok_or_else(|| SimulationError::UnknownAsset {
        symbol: symbol.to_string(),
    })
}

/// Listener registration. Call `unsubscribe` to stop receiving views.
#[must_use = "dropping a Subscription keeps the listener registered; call unsubscribe() to remove it"]
pub struct Subscription {
    id: u64,
    shared: Weak<Mutex<Shared>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(shared) = self.shared.upgrade() {
            lock(&shared).listeners.remove(&self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
