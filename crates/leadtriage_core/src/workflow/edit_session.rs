//! Edit panel session for one selected lead.
//!
//! # Responsibility
//! - Hold the editable email/status and the conversion sub-form.
//! - Gate Save on selection, email syntax and in-flight state.
//! - Run the optimistic save in two phases so UI loops can interleave events.
//!
//! # Invariants
//! - States move `Idle -> Editing -> Saving -> (Idle | EditingWithError)`.
//! - At most one save is in flight per session.
//! - A failed save from a closed or replaced session still rolls back, unless
//!   the store changed after its optimistic patch; the new session is never
//!   touched.

use crate::model::lead::{is_valid_email, Lead, LeadPatch, LeadStatus, ValidationError};
use crate::model::opportunity::{parse_amount, Opportunity, OpportunityStage};
use crate::sim::policy::OutcomePolicy;
use crate::sim::runner::{SimOptions, SimulatedNetworkError, SimulatedRunner};
use crate::store::lead_store::LeadStore;
use crate::store::opportunity_store::OpportunityStore;
use crate::workflow::optimistic::PendingUpdate;
use crate::workflow::WorkflowError;
use log::{debug, info};

/// Observable state of the edit panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Editing,
    Saving,
    EditingWithError,
}

/// Conversion sub-form. Reset independently each time a lead is opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionForm {
    pub stage: OpportunityStage,
    /// Raw amount text; parsed at conversion time.
    pub amount: String,
}

/// Save started by `EditSession::begin_save`.
#[derive(Debug)]
#[must_use = "a save ticket must be passed to `finish_save`"]
pub struct SaveTicket {
    epoch: u64,
    pending: PendingUpdate,
}

impl SaveTicket {
    pub fn patch(&self) -> &LeadPatch {
        self.pending.patch()
    }
}

/// Result of resolving a save ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Confirmed; the session closed if it was still current.
    Committed,
    /// Failed; the store was restored. The session shows the error if it is
    /// still the one that started the save.
    RolledBack,
    /// Failed after a bulk reload; the store was left as reloaded.
    RollbackSkipped,
    /// Failed after the session moved on and the store changed further;
    /// nothing was touched.
    Discarded,
}

/// Edit panel state machine.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    lead: Option<Lead>,
    email: String,
    status: Option<LeadStatus>,
    conversion: ConversionForm,
    saving: bool,
    error: Option<String>,
    epoch: u64,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts editing `lead`, resetting both forms and any error.
    pub fn open(&mut self, lead: Lead) {
        debug!(
            "event=session_open module=workflow status=ok lead_id={}",
            lead.id
        );
        self.email = lead.email.clone();
        self.status = Some(lead.status);
        self.conversion = ConversionForm::default();
        self.lead = Some(lead);
        self.saving = false;
        self.error = None;
        self.epoch += 1;
    }

    /// Discards in-progress edits and returns to `Idle`.
    pub fn close(&mut self) {
        self.lead = None;
        self.email.clear();
        self.status = None;
        self.conversion = ConversionForm::default();
        self.saving = false;
        self.error = None;
        self.epoch += 1;
    }

    pub fn state(&self) -> SessionState {
        match (&self.lead, self.saving, &self.error) {
            (None, _, _) => SessionState::Idle,
            (Some(_), true, _) => SessionState::Saving,
            (Some(_), false, Some(_)) => SessionState::EditingWithError,
            (Some(_), false, None) => SessionState::Editing,
        }
    }

    pub fn lead(&self) -> Option<&Lead> {
        self.lead.as_ref()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn status(&self) -> Option<LeadStatus> {
        self.status
    }

    pub fn conversion(&self) -> &ConversionForm {
        &self.conversion
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_status(&mut self, status: LeadStatus) {
        self.status = Some(status);
    }

    pub fn set_stage(&mut self, stage: OpportunityStage) {
        self.conversion.stage = stage;
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.conversion.amount = amount.into();
    }

    /// Clears the displayed error message.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn email_is_valid(&self) -> bool {
        is_valid_email(&self.email)
    }

    /// Whether the Save control should be enabled.
    pub fn can_save(&self) -> bool {
        self.lead.is_some() && self.email_is_valid() && !self.saving
    }

    /// Validates the form, snapshots `store` and applies the patch.
    ///
    /// # Errors
    /// - `Validation(NoLeadSelected)` when the session is idle.
    /// - `SaveInFlight` while a previous ticket is unresolved.
    /// - `Validation(InvalidEmail)` when the email is malformed; the error is
    ///   also shown on the session and the store is untouched.
    pub fn begin_save(&mut self, store: &mut LeadStore) -> Result<SaveTicket, WorkflowError> {
        let (Some(lead), Some(status)) = (&self.lead, self.status) else {
            return Err(ValidationError::NoLeadSelected.into());
        };
        if self.saving {
            return Err(WorkflowError::SaveInFlight);
        }

        let patch = LeadPatch::new(lead.id.clone(), self.email.clone(), status);
        match PendingUpdate::begin(store, patch) {
            Ok(pending) => {
                self.error = None;
                self.saving = true;
                Ok(SaveTicket {
                    epoch: self.epoch,
                    pending,
                })
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Resolves a ticket with the simulated call result.
    pub fn finish_save(
        &mut self,
        store: &mut LeadStore,
        ticket: SaveTicket,
        result: Result<(), SimulatedNetworkError>,
    ) -> SaveOutcome {
        let current = ticket.epoch == self.epoch;
        match result {
            Ok(()) => {
                ticket.pending.commit();
                if current {
                    self.close();
                }
                SaveOutcome::Committed
            }
            Err(_) if !current => {
                info!(
                    "event=lead_save module=workflow status=error session=stale lead_id={}",
                    ticket.patch().id
                );
                if ticket.pending.rollback_if_untouched(store) {
                    SaveOutcome::RolledBack
                } else {
                    SaveOutcome::Discarded
                }
            }
            Err(err) => {
                self.saving = false;
                self.error = Some(err.to_string());
                if ticket.pending.rollback(store) {
                    SaveOutcome::RolledBack
                } else {
                    SaveOutcome::RollbackSkipped
                }
            }
        }
    }

    /// Runs the full save: begin, simulated call, finish.
    ///
    /// # Errors
    /// - Everything `begin_save` rejects.
    /// - `Network` when the simulated call fails.
    pub async fn save<P: OutcomePolicy>(
        &mut self,
        store: &mut LeadStore,
        runner: &SimulatedRunner<P>,
        options: SimOptions,
    ) -> Result<(), WorkflowError> {
        let ticket = self.begin_save(store)?;
        let result = runner.run((), options).await;
        let failure = result.clone().err();
        match (self.finish_save(store, ticket, result), failure) {
            (SaveOutcome::Committed, _) => Ok(()),
            (_, Some(err)) => Err(WorkflowError::Network(err)),
            (_, None) => Ok(()),
        }
    }

    /// Converts the selected lead using the conversion sub-form.
    ///
    /// Leaves the session open and never touches the lead store.
    ///
    /// # Errors
    /// - `Validation(NoLeadSelected)` when the session is idle.
    pub fn convert(
        &self,
        opportunities: &mut OpportunityStore,
    ) -> Result<Opportunity, WorkflowError> {
        let lead = self.lead.as_ref().ok_or(ValidationError::NoLeadSelected)?;
        let amount = parse_amount(&self.conversion.amount);
        let opportunity = convert_lead(lead, self.conversion.stage, amount);
        opportunities.append(opportunity.clone());
        Ok(opportunity)
    }
}

/// Builds a new opportunity from `lead`. Always succeeds.
pub fn convert_lead(lead: &Lead, stage: OpportunityStage, amount: Option<f64>) -> Opportunity {
    let opportunity = Opportunity::from_lead(lead, stage, amount);
    info!(
        "event=lead_convert module=workflow status=ok lead_id={} opportunity_id={} stage={}",
        lead.id, opportunity.id, stage
    );
    opportunity
}

#[cfg(test)]
mod tests {
    use super::{EditSession, SaveOutcome, SessionState};
    use crate::model::lead::{Lead, LeadPatch, LeadStatus};
    use crate::sim::runner::SimulatedNetworkError;
    use crate::store::lead_store::LeadStore;
    use crate::workflow::WorkflowError;

    fn lead() -> Lead {
        Lead {
            id: "L-7".to_string(),
            name: "Ada".to_string(),
            company: "Acme".to_string(),
            email: "ada@acme.io".to_string(),
            source: "event".to_string(),
            score: 70.0,
            status: LeadStatus::New,
        }
    }

    fn loaded_store() -> LeadStore {
        let mut store = LeadStore::new();
        store.load_all(vec![lead()]);
        store
    }

    #[test]
    fn second_begin_is_rejected_while_saving() {
        let mut store = loaded_store();
        let mut session = EditSession::new();
        session.open(lead());

        let ticket = session.begin_save(&mut store).unwrap();
        assert_eq!(session.state(), SessionState::Saving);
        assert!(!session.can_save());
        assert_eq!(
            session.begin_save(&mut store).unwrap_err(),
            WorkflowError::SaveInFlight
        );

        let outcome = session.finish_save(&mut store, ticket, Ok(()));
        assert_eq!(outcome, SaveOutcome::Committed);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn failure_after_close_rolls_back_store() {
        let mut store = loaded_store();
        let before = store.snapshot();
        let mut session = EditSession::new();
        session.open(lead());
        session.set_email("rejected@acme.io");
        session.set_status(LeadStatus::Qualified);

        let ticket = session.begin_save(&mut store).unwrap();
        session.close();

        let outcome =
            session.finish_save(&mut store, ticket, Err(SimulatedNetworkError::default()));
        assert_eq!(outcome, SaveOutcome::RolledBack);
        assert_eq!(store.leads(), before.leads());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.error(), None);
    }

    #[test]
    fn failure_after_reopen_leaves_new_session_alone() {
        let mut store = loaded_store();
        let before = store.snapshot();
        let mut session = EditSession::new();
        session.open(lead());
        session.set_status(LeadStatus::Unqualified);

        let ticket = session.begin_save(&mut store).unwrap();
        session.open(lead());

        let outcome =
            session.finish_save(&mut store, ticket, Err(SimulatedNetworkError::default()));
        assert_eq!(outcome, SaveOutcome::RolledBack);
        assert_eq!(store.leads(), before.leads());
        assert_eq!(session.state(), SessionState::Editing);
        assert_eq!(session.error(), None);
    }

    #[test]
    fn stale_failure_is_discarded_when_store_changed_since() {
        let mut store = loaded_store();
        let mut session = EditSession::new();
        session.open(lead());
        session.set_status(LeadStatus::Qualified);

        let ticket = session.begin_save(&mut store).unwrap();
        session.close();
        store.patch(&LeadPatch::new("L-7", "later@acme.io", LeadStatus::Contacted));

        let outcome =
            session.finish_save(&mut store, ticket, Err(SimulatedNetworkError::default()));
        assert_eq!(outcome, SaveOutcome::Discarded);
        assert_eq!(store.get("L-7").unwrap().email, "later@acme.io");
        assert_eq!(store.get("L-7").unwrap().status, LeadStatus::Contacted);
    }

    #[test]
    fn reopening_resets_conversion_form_and_error() {
        let mut store = loaded_store();
        let mut session = EditSession::new();
        session.open(lead());
        session.set_amount("500");
        session.set_email("bad");
        assert!(session.begin_save(&mut store).is_err());
        assert_eq!(session.state(), SessionState::EditingWithError);

        session.open(lead());
        assert_eq!(session.conversion().amount, "");
        assert_eq!(session.error(), None);
        assert_eq!(session.email(), "ada@acme.io");
        assert_eq!(session.state(), SessionState::Editing);
    }

    #[test]
    fn dismiss_error_returns_to_editing() {
        let mut store = loaded_store();
        let mut session = EditSession::new();
        session.open(lead());
        let ticket = session.begin_save(&mut store).unwrap();
        session.finish_save(&mut store, ticket, Err(SimulatedNetworkError::default()));
        assert_eq!(session.state(), SessionState::EditingWithError);

        session.dismiss_error();
        assert_eq!(session.state(), SessionState::Editing);
    }
}
