//! Core logic for the lead triage console.
//! Owns lead/opportunity state, the table view and the edit/convert workflow;
//! presentation is left to callers.

pub mod config;
pub mod dataset;
pub mod logging;
pub mod model;
pub mod service;
pub mod sim;
pub mod store;
pub mod view;
pub mod workflow;

pub use config::{ConfigError, SimulationConfig};
pub use dataset::{parse_leads, seed_leads, DatasetError, LeadSource};
pub use logging::{default_log_level, init_logging, logging_status, LogInitError};
pub use model::lead::{is_valid_email, Lead, LeadId, LeadPatch, LeadStatus, ValidationError};
pub use model::opportunity::{parse_amount, Opportunity, OpportunityStage};
pub use service::console::{ConsoleCounts, LeadConsole, LoadError, LoadState};
pub use sim::policy::{FixedOutcome, OutcomePolicy, RandomOutcome, SeededOutcome};
pub use sim::runner::{SimOptions, SimulatedNetworkError, SimulatedRunner};
pub use store::lead_store::{patch_leads, LeadSnapshot, LeadStore};
pub use store::opportunity_store::OpportunityStore;
pub use view::lead_view::{compute_lead_view, LeadFilter, MemoizedLeadView};
pub use workflow::edit_session::{
    convert_lead, ConversionForm, EditSession, SaveOutcome, SaveTicket, SessionState,
};
pub use workflow::optimistic::{optimistic_update, PendingUpdate};
pub use workflow::WorkflowError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
