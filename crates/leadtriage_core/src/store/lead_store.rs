//! Ordered lead collection with patch and rollback support.
//!
//! # Responsibility
//! - Hold the loaded leads in dataset order.
//! - Apply id-targeted patches as whole-collection replacements.
//! - Capture and restore snapshots for optimistic updates.
//!
//! # Invariants
//! - Insertion order from `load_all` is preserved by every operation.
//! - Patching an unknown id leaves the collection unchanged.
//! - `revision` increases on every mutation; `generation` only on bulk load.

use crate::model::lead::{Lead, LeadPatch};
use log::debug;
use std::sync::Arc;

/// Immutable copy of the lead collection taken before a tentative mutation.
#[derive(Debug, Clone)]
pub struct LeadSnapshot {
    leads: Arc<Vec<Lead>>,
    generation: u64,
}

impl LeadSnapshot {
    /// Captured leads.
    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    /// Bulk-load generation the snapshot was taken from.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Exclusive owner of lead records.
#[derive(Debug, Clone, Default)]
pub struct LeadStore {
    leads: Arc<Vec<Lead>>,
    revision: u64,
    generation: u64,
}

impl LeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole collection. The source is trusted; no validation.
    pub fn load_all(&mut self, leads: Vec<Lead>) {
        debug!(
            "event=leads_load module=store status=ok count={}",
            leads.len()
        );
        self.leads = Arc::new(leads);
        self.generation += 1;
        self.revision += 1;
    }

    /// Merges `patch` into the record with `patch.id`.
    ///
    /// Returns whether a record matched. On a miss nothing changes, not even
    /// `revision`.
    pub fn patch(&mut self, patch: &LeadPatch) -> bool {
        if !self.leads.iter().any(|lead| lead.id == patch.id) {
            debug!(
                "event=lead_patch module=store status=miss lead_id={}",
                patch.id
            );
            return false;
        }
        self.leads = Arc::new(patch_leads(&self.leads, patch));
        self.revision += 1;
        true
    }

    /// Captures the current collection.
    pub fn snapshot(&self) -> LeadSnapshot {
        LeadSnapshot {
            leads: Arc::clone(&self.leads),
            generation: self.generation,
        }
    }

    /// Restores a previously captured collection verbatim.
    pub fn restore(&mut self, snapshot: &LeadSnapshot) {
        self.leads = Arc::clone(&snapshot.leads);
        self.revision += 1;
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn get(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|lead| lead.id == id)
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    /// Mutation counter, usable as a cache key.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of bulk loads performed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Returns a copy of `leads` with `patch` merged into the matching record.
///
/// An unknown id yields an unchanged copy.
pub fn patch_leads(leads: &[Lead], patch: &LeadPatch) -> Vec<Lead> {
    leads
        .iter()
        .map(|lead| {
            let mut next = lead.clone();
            if next.id == patch.id {
                next.apply(patch);
            }
            next
        })
        .collect()
}
