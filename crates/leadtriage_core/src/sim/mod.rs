//! Simulated asynchronous I/O.
//!
//! # Responsibility
//! - Stand in for network calls with a fixed delay and injectable failure.
//!
//! # Invariants
//! - The only suspension point is the simulated delay.
//! - Failure outcomes come from an `OutcomePolicy`, never from ambient state.

pub mod policy;
pub mod runner;
