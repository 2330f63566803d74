//! Snapshot-then-commit-or-revert transaction over the lead store.

use crate::model::lead::LeadPatch;
use crate::sim::policy::OutcomePolicy;
use crate::sim::runner::{SimOptions, SimulatedRunner};
use crate::store::lead_store::{LeadSnapshot, LeadStore};
use crate::workflow::WorkflowError;
use log::{info, warn};

/// Optimistic patch applied to the store and awaiting confirmation.
#[derive(Debug, Clone)]
#[must_use = "a pending update must be committed or rolled back"]
pub struct PendingUpdate {
    patch: LeadPatch,
    snapshot: LeadSnapshot,
    applied_revision: u64,
}

impl PendingUpdate {
    /// Validates `patch`, snapshots `store`, then applies the patch.
    ///
    /// # Errors
    /// - `Validation` when the patch email is malformed; the store is untouched.
    pub fn begin(store: &mut LeadStore, patch: LeadPatch) -> Result<Self, WorkflowError> {
        patch.validate()?;
        let snapshot = store.snapshot();
        store.patch(&patch);
        Ok(Self {
            patch,
            snapshot,
            applied_revision: store.revision(),
        })
    }

    pub fn patch(&self) -> &LeadPatch {
        &self.patch
    }

    /// Accepts the optimistic state and drops the snapshot.
    pub fn commit(self) {
        info!(
            "event=lead_save module=workflow status=ok lead_id={}",
            self.patch.id
        );
    }

    /// Restores the snapshot.
    ///
    /// Returns `false` without touching the store when it was bulk-reloaded
    /// after the snapshot was taken.
    pub fn rollback(self, store: &mut LeadStore) -> bool {
        if store.generation() != self.snapshot.generation() {
            warn!(
                "event=lead_rollback module=workflow status=skipped reason=reloaded lead_id={}",
                self.patch.id
            );
            return false;
        }
        store.restore(&self.snapshot);
        warn!(
            "event=lead_rollback module=workflow status=ok lead_id={}",
            self.patch.id
        );
        true
    }

    /// Restores the snapshot only if nothing but this patch has touched the
    /// store since `begin`.
    ///
    /// Returns `false` without touching the store otherwise.
    pub fn rollback_if_untouched(self, store: &mut LeadStore) -> bool {
        if store.revision() != self.applied_revision {
            warn!(
                "event=lead_rollback module=workflow status=skipped reason=store_changed lead_id={}",
                self.patch.id
            );
            return false;
        }
        self.rollback(store)
    }
}

/// Applies `patch` optimistically, confirms it through the runner, and rolls
/// back on simulated failure.
///
/// # Errors
/// - `Validation` before any mutation when the email is malformed.
/// - `Network` after rollback when the simulated call fails.
pub async fn optimistic_update<P: OutcomePolicy>(
    store: &mut LeadStore,
    runner: &SimulatedRunner<P>,
    patch: LeadPatch,
    options: SimOptions,
) -> Result<(), WorkflowError> {
    let pending = PendingUpdate::begin(store, patch)?;
    match runner.run((), options).await {
        Ok(()) => {
            pending.commit();
            Ok(())
        }
        Err(err) => {
            pending.rollback(store);
            Err(WorkflowError::Network(err))
        }
    }
}
