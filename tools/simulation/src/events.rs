//! Daily event generation
//!
//! Each simulated day an event fires with a fixed 30% probability. When it
//! does, one template is picked from the scenario's event table with equal
//! weight, regardless of its impact.

use crate::random::RandomSource;
use tracing::debug;
use types::scenario::{Scenario, SimulationEvent};

/// Probability that a day produces an event.
pub const EVENT_PROBABILITY: f64 = 0.30;

/// Stateless event generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventGenerator;

impl EventGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether an event fires on `day`, and which one.
    ///
    /// Draws once for the firing decision and, only if it fires, once more
    /// for the template index. A scenario with an empty table never fires.
    pub fn maybe_generate_event(
        &self,
        scenario: &Scenario,
        day: u32,
        random: &mut dyn RandomSource,
    ) -> Option<SimulationEvent> {
        let r = random.next_uniform();
        if r >= EVENT_PROBABILITY {
            return None;
        }
        let table = &scenario.event_table;
        if table.is_empty() {
            return None;
        }

        let pick = random.next_uniform();
        let index = pick_index(pick, table.len());
        let event = table[index].realize(day);
        debug!(
            scenario_id = %scenario.id,
            day,
            impact = %event.impact,
            description = %event.description,
            "event fired"
        );
        Some(event)
    }
}

/// Map a uniform draw in `[0, 1)` onto `0..len` with equal weight.
fn pick_index(u: f64, len: usize) -> usize {
    let idx = (u * len as f64).floor() as usize;
    idx.min(len - 1)
}
