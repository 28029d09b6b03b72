//! Timer-driven lifecycle tests
//!
//! Runs the controller on tokio's paused clock so tick cadence is exact:
//! pause and reset must stop ticks, resume must continue from the same day.

use rust_decimal::Decimal;
use simulation::notify::RecordingSink;
use simulation::{
    ScenarioCatalog, SessionView, SimulationConfig, SimulationController, SimulationState,
    StartingPortfolio,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;
use types::errors::SimulationError;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn timed(seed: u64) -> SimulationController {
    init_tracing();
    let config = SimulationConfig {
        tick_interval_ms: 100,
        auto_tick: true,
        seed: Some(seed),
        ..SimulationConfig::default()
    };
    let catalog = ScenarioCatalog::builtin();
    SimulationController::new(catalog, StartingPortfolio::default(), config).unwrap()
}

fn d(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_ticks_follow_interval() {
    let c = timed(1);
    c.start("bull-run").unwrap();
    assert!(c.is_ticking());
    sleep(Duration::from_millis(350)).await;
    assert_eq!(c.current_day(), 3);
    assert_eq!(c.state(), SimulationState::Running);
}

#[tokio::test(start_paused = true)]
async fn test_no_tick_after_pause() {
    let c = timed(2);
    c.start("bull-run").unwrap();
    sleep(Duration::from_millis(250)).await;
    c.pause().unwrap();
    let paused = c.session();
    assert_eq!(paused.current_day, 2);
    assert!(!c.is_ticking());

    sleep(Duration::from_secs(5)).await;
    assert_eq!(c.session(), paused);
}

#[tokio::test(start_paused = true)]
async fn test_pause_resume_continuity() {
    let c = timed(3);
    c.start("bear-market-crash").unwrap();
    sleep(Duration::from_millis(1_050)).await;
    c.pause().unwrap();
    assert_eq!(c.current_day(), 10);
    let events_at_pause = c.events();

    sleep(Duration::from_secs(3)).await;
    c.resume().unwrap();
    sleep(Duration::from_millis(150)).await;

    assert_eq!(c.current_day(), 11);
    let events = c.events();
    assert_eq!(&events[..events_at_pause.len()], &events_at_pause[..]);
    assert!(events.iter().skip(events_at_pause.len()).all(|e| e.day == 11));
}

#[tokio::test(start_paused = true)]
async fn test_resume_while_running_does_not_double_schedule() {
    let c = timed(4);
    c.start("bull-run").unwrap();
    c.resume().unwrap();
    c.resume().unwrap();
    sleep(Duration::from_millis(550)).await;
    assert_eq!(c.current_day(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_pending_tick() {
    let c = timed(5);
    c.start("bull-run").unwrap();
    sleep(Duration::from_millis(320)).await;
    c.reset();
    sleep(Duration::from_secs(2)).await;

    let view = c.view();
    assert_eq!(view.state, SimulationState::Idle);
    assert_eq!(view.current_day, 0);
    assert!(view.events.is_empty());
    assert_eq!(view.positions, StartingPortfolio::default().positions());
    assert!(!c.is_ticking());
}

#[tokio::test(start_paused = true)]
async fn test_runs_to_completion_and_stops() {
    let c = timed(6);
    c.start("flash-crash").unwrap();
    sleep(Duration::from_millis(1_450)).await;
    assert_eq!(c.state(), SimulationState::Completed);
    assert_eq!(c.current_day(), 14);

    let done = c.session();
    sleep(Duration::from_secs(2)).await;
    assert_eq!(c.session(), done);
    assert!(!c.is_ticking());
    assert!(c.tick().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_completion() {
    let c = timed(7);
    c.start("flash-crash").unwrap();
    sleep(Duration::from_millis(1_500)).await;
    assert_eq!(c.state(), SimulationState::Completed);

    c.start("sideways-chop").unwrap();
    sleep(Duration::from_millis(150)).await;
    let view = c.view();
    assert_eq!(view.state, SimulationState::Running);
    assert_eq!(view.total_days, 30);
    assert_eq!(view.current_day, 1);
}

#[tokio::test(start_paused = true)]
async fn test_listener_sees_each_tick() {
    let c = timed(8);
    let days = Arc::new(Mutex::new(Vec::new()));
    let seen = days.clone();
    let sub = c.subscribe(move |v: &SessionView| {
        if v.state == SimulationState::Running {
            seen.lock().unwrap().push(v.current_day);
        }
    });

    c.start("flash-crash").unwrap();
    sleep(Duration::from_millis(450)).await;
    assert_eq!(*days.lock().unwrap(), vec![0, 1, 2, 3, 4]);

    sub.unsubscribe();
    sleep(Duration::from_millis(300)).await;
    assert_eq!(days.lock().unwrap().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_borrow_does_not_disturb_running_session() {
    let sink = RecordingSink::new();
    let c = timed(9).with_sink(Arc::new(sink.clone()));
    c.start("sideways-chop").unwrap();
    c.supply("USDC", d("1000")).unwrap();

    let before = c.session();
    let err = c.borrow("DAI", d("700")).unwrap_err();
    assert!(matches!(err, SimulationError::InsufficientCollateral { .. }));
    assert_eq!(c.session(), before);

    sleep(Duration::from_millis(250)).await;
    assert_eq!(c.state(), SimulationState::Running);
    assert_eq!(c.current_day(), 2);
    assert!(sink.notifications().iter().any(|n| n.message.contains("Insufficient collateral")));
}

#[tokio::test(start_paused = true)]
async fn test_seeded_restart_is_reproducible() {
    let c = timed(10);
    c.start("bear-market-crash").unwrap();
    sleep(Duration::from_millis(2_050)).await;
    let first = (c.events(), c.positions(), c.snapshot());

    c.reset();
    c.start("bear-market-crash").unwrap();
    sleep(Duration::from_millis(2_050)).await;
    assert_eq!((c.events(), c.positions(), c.snapshot()), first);
}

#[test]
fn test_start_outside_runtime() {
    let c = timed(11);
    assert_eq!(c.start("bull-run"), Err(SimulationError::SchedulerUnavailable));
    assert_eq!(c.state(), SimulationState::Idle);
}
