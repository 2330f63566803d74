//! Lead edit and conversion workflow.
//!
//! # Responsibility
//! - Run optimistic lead updates with snapshot rollback.
//! - Drive the per-lead edit session state machine.
//! - Convert leads into opportunities.
//!
//! # Invariants
//! - A lead patch is validated before it touches the store.
//! - A failed save leaves the store equal to its pre-save snapshot, unless
//!   the session moved on or the store was reloaded meanwhile.

pub mod edit_session;
pub mod optimistic;

use crate::model::lead::ValidationError;
use crate::sim::runner::SimulatedNetworkError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error surfaced by save/convert actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Local input problem; blocks the action until corrected.
    Validation(ValidationError),
    /// Simulated remote failure; state was rolled back.
    Network(SimulatedNetworkError),
    /// A save is already pending for this session.
    SaveInFlight,
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Network(err) => write!(f, "{err}"),
            Self::SaveInFlight => write!(f, "a save is already in progress"),
        }
    }
}

impl Error for WorkflowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Network(err) => Some(err),
            Self::SaveInFlight => None,
        }
    }
}

impl From<ValidationError> for WorkflowError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SimulatedNetworkError> for WorkflowError {
    fn from(value: SimulatedNetworkError) -> Self {
        Self::Network(value)
    }
}
