//! Lead table filtering and ordering.
//!
//! # Responsibility
//! - Apply the free-text query and status filter to the lead collection.
//! - Order the result by score, highest first.
//! - Optionally memoize the result per (store revision, filter).
//!
//! # Invariants
//! - Every returned lead matches both predicates; every matching lead is
//!   returned exactly once.
//! - Sorting is stable: equal scores keep store order.

use crate::model::lead::{Lead, LeadStatus, ValidationError};
use crate::store::lead_store::LeadStore;
use std::cmp::Ordering;

/// Table filter controlled by the search box and status select.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    /// Raw search text; normalized at compute time.
    pub query: String,
    /// `None` shows every status.
    pub status: Option<LeadStatus>,
}

impl LeadFilter {
    pub fn new(query: impl Into<String>, status: Option<LeadStatus>) -> Self {
        Self {
            query: query.into(),
            status,
        }
    }

    /// Builds a filter from select-widget values where `""` means all.
    ///
    /// # Errors
    /// - `UnknownStatus` when `status` is neither empty nor a known status.
    pub fn from_select(query: impl Into<String>, status: &str) -> Result<Self, ValidationError> {
        let status = match status.trim() {
            "" => None,
            value => Some(value.parse::<LeadStatus>()?),
        };
        Ok(Self::new(query, status))
    }

    /// Applies this filter to `leads`.
    pub fn apply(&self, leads: &[Lead]) -> Vec<Lead> {
        compute_lead_view(leads, &self.query, self.status)
    }
}

/// Computes the visible lead table.
///
/// 1. Trims and lower-cases `query`.
/// 2. Non-empty query keeps leads whose name or company contains it,
///    case-insensitively.
/// 3. `status_filter` keeps leads with exactly that status.
/// 4. Sorts by score descending (stable).
pub fn compute_lead_view(
    leads: &[Lead],
    query: &str,
    status_filter: Option<LeadStatus>,
) -> Vec<Lead> {
    let needle = query.trim().to_lowercase();
    let mut view: Vec<Lead> = leads
        .iter()
        .filter(|lead| needle.is_empty() || matches_query(lead, &needle))
        .filter(|lead| status_filter.map_or(true, |status| lead.status == status))
        .cloned()
        .collect();
    view.sort_by(|a, b| by_score_desc(a, b));
    view
}

fn matches_query(lead: &Lead, needle: &str) -> bool {
    lead.name.to_lowercase().contains(needle) || lead.company.to_lowercase().contains(needle)
}

fn by_score_desc(a: &Lead, b: &Lead) -> Ordering {
    b.score.total_cmp(&a.score)
}

/// Caches the last computed view for one store.
///
/// The cache key is the store's revision and generation plus the filter, so a
/// memo must only ever be fed the same `LeadStore`.
#[derive(Debug, Default)]
pub struct MemoizedLeadView {
    key: Option<(u64, u64, LeadFilter)>,
    items: Vec<Lead>,
}

impl MemoizedLeadView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the view, recomputing only when store or filter changed.
    pub fn get(&mut self, store: &LeadStore, filter: &LeadFilter) -> &[Lead] {
        let fresh = matches!(
            &self.key,
            Some((revision, generation, cached))
                if *revision == store.revision()
                    && *generation == store.generation()
                    && cached == filter
        );
        if !fresh {
            self.items = filter.apply(store.leads());
            self.key = Some((store.revision(), store.generation(), filter.clone()));
        }
        &self.items
    }

    /// Drops the cached view.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.items.clear();
    }
}
