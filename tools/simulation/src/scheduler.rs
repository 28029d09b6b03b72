//! Cancellable tick scheduling
//!
//! A `TickHandle` owns one spawned tokio task that calls a tick callback on
//! a fixed cadence. Cancelling (or dropping) the handle aborts the task, so
//! a session can never be left with an orphaned timer.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// What the scheduled loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// Handle to a running tick loop.
#[derive(Debug)]
pub struct TickHandle {
    task: JoinHandle<()>,
}

impl TickHandle {
    /// Spawn a loop that calls `on_tick` every `period`, first call one
    /// period from now, until it returns `TickControl::Stop`.
    pub fn spawn<F>(runtime: &Handle, period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> TickControl + Send + 'static,
    {
        let task = runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if on_tick() == TickControl::Stop {
                    debug!("tick loop stopped");
                    break;
                }
            }
        });
        Self { task }
    }

    /// Abort the loop. A callback already in progress runs to completion;
    /// no further callback starts.
    pub fn cancel(self) {
        // Drop aborts.
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
