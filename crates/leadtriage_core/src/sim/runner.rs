//! Simulated operation runner.
//!
//! # Responsibility
//! - Suspend for a configured delay, then resolve or fail.
//!
//! # Invariants
//! - `fail_rate == 0` never fails; `fail_rate == 1` always fails for draws
//!   in `[0, 1)`.
//! - `delay_ms == 0` still yields once to the scheduler.
//! - No retries happen at this layer.

use crate::config::ConfigError;
use crate::sim::policy::{OutcomePolicy, RandomOutcome};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const SIMULATED_ERROR_MESSAGE: &str = "Network error (simulated)";

/// Delay and failure probability for one simulated call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimOptions {
    pub delay_ms: u64,
    pub fail_rate: f64,
}

impl SimOptions {
    /// # Errors
    /// - `InvalidFailRate` when `fail_rate` is outside `[0, 1]` or not finite.
    pub fn new(delay_ms: u64, fail_rate: f64) -> Result<Self, ConfigError> {
        let options = Self {
            delay_ms,
            fail_rate,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fail_rate.is_finite() || !(0.0..=1.0).contains(&self.fail_rate) {
            return Err(ConfigError::InvalidFailRate(self.fail_rate));
        }
        Ok(())
    }
}

/// Failure produced by the simulated runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedNetworkError {
    message: String,
}

impl SimulatedNetworkError {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for SimulatedNetworkError {
    fn default() -> Self {
        Self {
            message: SIMULATED_ERROR_MESSAGE.to_string(),
        }
    }
}

impl Display for SimulatedNetworkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for SimulatedNetworkError {}

/// Runs payloads through a simulated network hop.
#[derive(Debug, Clone, Default)]
pub struct SimulatedRunner<P: OutcomePolicy = RandomOutcome> {
    policy: P,
}

impl<P: OutcomePolicy> SimulatedRunner<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Waits `options.delay_ms`, then returns `payload` or fails.
    ///
    /// Fails when `options.fail_rate > 0` and the policy draw is below it.
    pub async fn run<T>(&self, payload: T, options: SimOptions) -> Result<T, SimulatedNetworkError> {
        if options.delay_ms == 0 {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(Duration::from_millis(options.delay_ms)).await;
        }

        if options.fail_rate > 0.0 && self.policy.draw() < options.fail_rate {
            warn!(
                "event=simulated_call module=sim status=error delay_ms={} fail_rate={}",
                options.delay_ms, options.fail_rate
            );
            return Err(SimulatedNetworkError::default());
        }

        debug!(
            "event=simulated_call module=sim status=ok delay_ms={}",
            options.delay_ms
        );
        Ok(payload)
    }
}
