//! Simulation tuning knobs.
//!
//! # Responsibility
//! - Hold the delay and failure probabilities used by simulated I/O.
//! - Resolve overrides from environment variables or JSON.
//!
//! # Invariants
//! - Every failure rate lies in `[0, 1]` after validation.
//! - Missing fields fall back to defaults (600 ms, 12% save, 0% load).

use crate::sim::runner::SimOptions;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_DELAY_MS: u64 = 600;
pub const DEFAULT_SAVE_FAIL_RATE: f64 = 0.12;
pub const DEFAULT_LOAD_FAIL_RATE: f64 = 0.0;

pub const ENV_DELAY_MS: &str = "LEADTRIAGE_DELAY_MS";
pub const ENV_SAVE_FAIL_RATE: &str = "LEADTRIAGE_SAVE_FAIL_RATE";
pub const ENV_LOAD_FAIL_RATE: &str = "LEADTRIAGE_LOAD_FAIL_RATE";

/// Configuration error for simulation settings.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failure probability outside `[0, 1]`.
    InvalidFailRate(f64),
    /// Environment override could not be parsed.
    InvalidEnv { key: &'static str, value: String },
    /// JSON document could not be decoded.
    Parse(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFailRate(value) => {
                write!(f, "fail rate must be within [0, 1], got {value}")
            }
            Self::InvalidEnv { key, value } => write!(f, "invalid value `{value}` for {key}"),
            Self::Parse(message) => write!(f, "invalid simulation config: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Delay and failure settings for the simulated load and save calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Suspension before every simulated call resolves.
    pub delay_ms: u64,
    /// Failure probability for lead saves.
    pub save_fail_rate: f64,
    /// Failure probability for the initial/retried load.
    pub load_fail_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            save_fail_rate: DEFAULT_SAVE_FAIL_RATE,
            load_fail_rate: DEFAULT_LOAD_FAIL_RATE,
        }
    }
}

impl SimulationConfig {
    /// Zero-delay config with the given save failure rate. Loads never fail.
    pub fn instant(save_fail_rate: f64) -> Self {
        Self {
            delay_ms: 0,
            save_fail_rate,
            load_fail_rate: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.save_options()?;
        self.load_options()?;
        Ok(())
    }

    pub fn save_options(&self) -> Result<SimOptions, ConfigError> {
        SimOptions::new(self.delay_ms, self.save_fail_rate)
    }

    pub fn load_options(&self) -> Result<SimOptions, ConfigError> {
        SimOptions::new(self.delay_ms, self.load_fail_rate)
    }

    /// Defaults overridden by `LEADTRIAGE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`; blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = read_override(&lookup, ENV_DELAY_MS)? {
            config.delay_ms = value;
        }
        if let Some(value) = read_override(&lookup, ENV_SAVE_FAIL_RATE)? {
            config.save_fail_rate = value;
        }
        if let Some(value) = read_override(&lookup, ENV_LOAD_FAIL_RATE)? {
            config.load_fail_rate = value;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON document; absent fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

fn read_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnv {
            key,
            value: trimmed.to_string(),
        })
}
