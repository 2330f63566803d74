//! Lead domain model.
//!
//! # Responsibility
//! - Define the lead record loaded from the bundled dataset.
//! - Define the edit patch applied by the save workflow.
//! - Validate email syntax before a patch may be persisted.
//!
//! # Invariants
//! - `id` is stable and never reassigned to another lead.
//! - `score` is used for ordering only.
//! - A persisted email always matches `local@domain.tld` (TLD >= 2 chars).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("valid email regex"));

/// Stable lead identifier as provided by the source dataset.
pub type LeadId = String;

/// Triage state of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Not yet contacted.
    New,
    /// Outreach happened, no decision yet.
    Contacted,
    /// Worth converting into an opportunity.
    Qualified,
    /// Not a fit.
    Unqualified,
}

impl LeadStatus {
    /// All statuses in the order offered by status selectors.
    pub const ALL: [LeadStatus; 4] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Unqualified,
    ];

    /// Wire/display label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Unqualified => "unqualified",
        }
    }
}

impl Display for LeadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "qualified" => Ok(Self::Qualified),
            "unqualified" => Ok(Self::Unqualified),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// Prospective contact awaiting triage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub company: String,
    pub email: String,
    pub source: String,
    /// Triage score; higher sorts first.
    pub score: f64,
    pub status: LeadStatus,
}

/// Fields the edit panel may change on one lead.
///
/// `id` selects the target record and is never merged into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadPatch {
    pub id: LeadId,
    pub email: Option<String>,
    pub status: Option<LeadStatus>,
}

impl LeadPatch {
    /// Patch carrying both editable fields, as produced by the edit panel.
    pub fn new(id: impl Into<LeadId>, email: impl Into<String>, status: LeadStatus) -> Self {
        Self {
            id: id.into(),
            email: Some(email.into()),
            status: Some(status),
        }
    }

    /// Patch that only changes status.
    pub fn status_only(id: impl Into<LeadId>, status: LeadStatus) -> Self {
        Self {
            id: id.into(),
            email: None,
            status: Some(status),
        }
    }

    /// Checks the patch can be persisted.
    ///
    /// # Errors
    /// - `InvalidEmail` when `email` is present and fails the syntax check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.email.as_deref() {
            Some(email) if !is_valid_email(email) => {
                Err(ValidationError::InvalidEmail(email.to_string()))
            }
            _ => Ok(()),
        }
    }
}

impl Lead {
    /// Merges the patch fields into this lead.
    pub fn apply(&mut self, patch: &LeadPatch) {
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Local validation failure raised by the edit workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Email does not match `local@domain.tld`.
    InvalidEmail(String),
    /// Status string is not one of the known statuses.
    UnknownStatus(String),
    /// Stage string is not one of the known stages.
    UnknownStage(String),
    /// Action requires a selected lead.
    NoLeadSelected,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(_) => write!(f, "Please enter a valid email."),
            Self::UnknownStatus(value) => write!(f, "unknown lead status `{value}`"),
            Self::UnknownStage(value) => write!(f, "unknown opportunity stage `{value}`"),
            Self::NoLeadSelected => write!(f, "Select a lead from the table."),
        }
    }
}

impl Error for ValidationError {}

/// Returns whether `email` matches `local@domain.tld`.
///
/// Local part and domain are non-empty, no whitespace or extra `@`, and the
/// final label is at least two characters.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}
