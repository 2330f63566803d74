//! In-memory state containers for leads and opportunities.
//!
//! # Responsibility
//! - Own the lead and opportunity collections exclusively.
//! - Offer snapshot/restore so callers can run optimistic edits.
//!
//! # Invariants
//! - The two stores share no mutable state.
//! - Snapshots are immutable; restoring one replaces the collection verbatim.

pub mod lead_store;
pub mod opportunity_store;
