//! Injectable randomness
//!
//! Every random draw in the engine goes through `RandomSource`, so a run can
//! be replayed exactly by seeding it. Production uses an OS-seeded source.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send {
    fn next_uniform(&mut self) -> f64;
}

/// Deterministic ChaCha8 source.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn next_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Non-deterministic source seeded from the OS.
#[derive(Debug, Clone)]
pub struct EntropyRandom {
    rng: ChaCha8Rng,
}

impl EntropyRandom {
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRandom {
    fn next_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed script of draws, then a fallback value forever.
///
/// Lets tests force "event fires" / "no event" decisions and exact price
/// deltas without searching for a seed.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRandom {
    /// Values outside `[0, 1)` are clamped into range.
    pub fn new(draws: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            draws: draws.into_iter().map(clamp_unit).collect(),
            fallback: clamp_unit(fallback),
        }
    }

    /// Draws left before the fallback kicks in.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_uniform(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() || v < 0.0 {
        0.0
    } else if v >= 1.0 {
        // largest f64 below 1.0
        1.0 - f64::EPSILON / 2.0
    } else {
        v
    }
}
