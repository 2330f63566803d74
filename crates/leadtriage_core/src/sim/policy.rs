//! Failure-draw policies for the simulated runner.
//!
//! A policy yields a draw in `[0, 1)`; the runner fails when the draw is
//! below the configured failure rate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Source of uniform draws deciding simulated failures.
pub trait OutcomePolicy {
    /// Returns a value in `[0, 1)`. `FixedOutcome::always_succeed` returns
    /// `1.0` so that it passes every failure rate.
    fn draw(&self) -> f64;
}

/// Draws from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOutcome;

impl OutcomePolicy for RandomOutcome {
    fn draw(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible draws from a seeded RNG.
#[derive(Debug)]
pub struct SeededOutcome {
    rng: Mutex<StdRng>,
}

impl SeededOutcome {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl OutcomePolicy for SeededOutcome {
    fn draw(&self) -> f64 {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen::<f64>()
    }
}

/// Always returns the same draw.
#[derive(Debug, Clone, Copy)]
pub struct FixedOutcome {
    value: f64,
}

impl FixedOutcome {
    /// Passes every operation, including those with a failure rate of `1`.
    pub fn always_succeed() -> Self {
        Self { value: 1.0 }
    }

    /// Fails every operation with a non-zero failure rate.
    pub fn always_fail() -> Self {
        Self { value: 0.0 }
    }

    /// Clamps `value` into `[0, 1)`.
    pub fn new(value: f64) -> Self {
        let value = if value.is_finite() {
            value.clamp(0.0, 1.0 - f64::EPSILON)
        } else {
            0.0
        };
        Self { value }
    }
}

impl OutcomePolicy for FixedOutcome {
    fn draw(&self) -> f64 {
        self.value
    }
}

impl<P: OutcomePolicy + ?Sized> OutcomePolicy for &P {
    fn draw(&self) -> f64 {
        (**self).draw()
    }
}
