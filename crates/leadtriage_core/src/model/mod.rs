//! Domain model for lead triage and conversion.
//!
//! # Responsibility
//! - Define the records owned by the lead and opportunity stores.
//! - Provide syntactic validation used before a lead edit is persisted.
//!
//! # Invariants
//! - A lead `id` uniquely identifies one record within the lead store.
//! - Opportunities only reference leads through `from_lead_id`; they never
//!   own or dereference lead records.

pub mod lead;
pub mod opportunity;
