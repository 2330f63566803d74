//! Derived, read-only projections over the lead store.
//!
//! # Responsibility
//! - Compute the filtered, score-ordered lead table.
//!
//! # Invariants
//! - View computation never mutates the source collection.

pub mod lead_view;
