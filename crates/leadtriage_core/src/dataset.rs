//! Bundled lead dataset.
//!
//! # Responsibility
//! - Embed the seed leads at build time and decode them on demand.
//! - Describe where a console reads its leads from on every load.
//!
//! # Invariants
//! - The dataset is trusted bulk data; records are not validated beyond
//!   their shape.

use crate::model::lead::Lead;
use std::error::Error;
use std::fmt::{Display, Formatter};

const SEED_LEADS_JSON: &str = include_str!("../data/leads.json");

/// Dataset decoding error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    Parse(String),
}

impl Display for DatasetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid lead dataset: {message}"),
        }
    }
}

impl Error for DatasetError {}

/// Where a console reads its leads from. Read again on every load.
#[derive(Debug, Clone, PartialEq)]
pub enum LeadSource {
    /// The embedded `data/leads.json`.
    Bundled,
    /// Already-decoded records.
    Records(Vec<Lead>),
    /// A JSON array of leads, decoded at load time.
    Json(String),
}

impl LeadSource {
    /// Produces the leads for one load.
    ///
    /// # Errors
    /// - `Parse` when a JSON source is malformed.
    pub fn read(&self) -> Result<Vec<Lead>, DatasetError> {
        match self {
            Self::Bundled => seed_leads(),
            Self::Records(leads) => Ok(leads.clone()),
            Self::Json(raw) => parse_leads(raw),
        }
    }
}

/// Decodes the bundled seed leads.
pub fn seed_leads() -> Result<Vec<Lead>, DatasetError> {
    parse_leads(SEED_LEADS_JSON)
}

/// Decodes a JSON array of leads. An empty array is a valid dataset.
pub fn parse_leads(raw: &str) -> Result<Vec<Lead>, DatasetError> {
    serde_json::from_str(raw).map_err(|err| DatasetError::Parse(err.to_string()))
}
