//! Opportunity domain model.
//!
//! # Responsibility
//! - Define the deal record produced by converting a lead.
//! - Parse the optional amount entered on the conversion form.
//!
//! # Invariants
//! - Every conversion produces a fresh `id`, even for the same lead.
//! - `amount`, when present, is finite and non-negative.
//! - Opportunities are immutable once created.

use crate::model::lead::{Lead, LeadId, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Sales pipeline stage of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OpportunityStage {
    #[default]
    New,
    Qualification,
    Proposal,
    #[serde(rename = "Closed Won")]
    ClosedWon,
    #[serde(rename = "Closed Lost")]
    ClosedLost,
}

impl OpportunityStage {
    /// All stages in pipeline order.
    pub const ALL: [OpportunityStage; 5] = [
        OpportunityStage::New,
        OpportunityStage::Qualification,
        OpportunityStage::Proposal,
        OpportunityStage::ClosedWon,
        OpportunityStage::ClosedLost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Qualification => "Qualification",
            Self::Proposal => "Proposal",
            Self::ClosedWon => "Closed Won",
            Self::ClosedLost => "Closed Lost",
        }
    }
}

impl Display for OpportunityStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OpportunityStage {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == value)
            .ok_or_else(|| ValidationError::UnknownStage(value.to_string()))
    }
}

/// Business deal created from a qualifying lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    /// `O-` prefixed identifier unique per conversion event.
    pub id: String,
    /// Copied from the source lead.
    pub name: String,
    pub stage: OpportunityStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Copied from the source lead's company.
    pub account_name: String,
    /// Back-reference to the originating lead. Never dereferenced by core.
    pub from_lead_id: LeadId,
}

impl Opportunity {
    /// Builds a new opportunity from `lead` with a freshly generated id.
    ///
    /// Negative or non-finite amounts are dropped.
    pub fn from_lead(lead: &Lead, stage: OpportunityStage, amount: Option<f64>) -> Self {
        Self {
            id: format!("O-{}", Uuid::new_v4()),
            name: lead.name.clone(),
            stage,
            amount: amount.filter(|value| is_valid_amount(*value)),
            account_name: lead.company.clone(),
            from_lead_id: lead.id.clone(),
        }
    }
}

/// Parses the free-text amount field of the conversion form.
///
/// Blank input, unparsable text, non-finite values and negative values all
/// yield `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| is_valid_amount(*value))
}

fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
