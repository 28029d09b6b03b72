//! Concurrency test
//!
//! Manual actions from several threads race the timer-driven tick on a
//! multi-threaded runtime. No listener may ever observe a snapshot that
//! disagrees with the positions it was published with.

use rust_decimal::Decimal;
use simulation::valuation::PortfolioValuator;
use simulation::{
    ScenarioCatalog, SessionView, SimulationConfig, SimulationController, SimulationState,
    StartingPortfolio,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_manual_actions_race_ticks() {
    let config = SimulationConfig {
        tick_interval_ms: 2,
        seed: Some(42),
        ..SimulationConfig::default()
    };
    let catalog = ScenarioCatalog::builtin();
    let controller =
        Arc::new(SimulationController::new(catalog, StartingPortfolio::default(), config).unwrap());

    let published = Arc::new(AtomicUsize::new(0));
    let torn = Arc::new(AtomicUsize::new(0));
    let (p, t) = (published.clone(), torn.clone());
    let sub = controller.subscribe(move |v: &SessionView| {
        p.fetch_add(1, Ordering::SeqCst);
        if PortfolioValuator::new().recompute(&v.positions) != v.snapshot {
            t.fetch_add(1, Ordering::SeqCst);
        }
    });

    controller.start("bear-market-crash").unwrap();

    let step = Decimal::new(1, 2);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let c = controller.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    c.supply("ETH", step).unwrap();
                    c.withdraw("ETH", step).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    while controller.state() != SimulationState::Completed {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    sub.unsubscribe();

    assert_eq!(torn.load(Ordering::SeqCst), 0);
    // start + 90 ticks + 800 manual actions
    assert_eq!(published.load(Ordering::SeqCst), 1 + 90 + 800);

    let eth = controller
        .positions()
        .into_iter()
        .find(|p| p.symbol.as_str() == "ETH")
        .unwrap();
    assert_eq!(eth.supplied_qty, Decimal::ZERO);
    assert_eq!(eth.balance, Decimal::from_str_exact("2.5").unwrap());
    assert_eq!(controller.current_day(), 90);
}
