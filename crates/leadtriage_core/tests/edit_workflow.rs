use leadtriage_core::{
    convert_lead, optimistic_update, EditSession, FixedOutcome, Lead, LeadConsole, LeadPatch,
    LeadStatus, LeadStore, OpportunityStage, OutcomePolicy, SaveOutcome, SessionState,
    SimOptions, SimulatedRunner, SimulationConfig, ValidationError, WorkflowError,
};
use std::cell::Cell;

/// Counts draws so tests can tell whether the simulated call reached its
/// failure check.
struct CountingOutcome {
    value: f64,
    calls: Cell<usize>,
}

impl CountingOutcome {
    fn new(value: f64) -> Self {
        Self {
            value,
            calls: Cell::new(0),
        }
    }
}

impl OutcomePolicy for CountingOutcome {
    fn draw(&self) -> f64 {
        self.calls.set(self.calls.get() + 1);
        self.value
    }
}

fn dataset() -> Vec<Lead> {
    vec![
        Lead {
            id: "L-1".to_string(),
            name: "Aiko Tanaka".to_string(),
            company: "Acme".to_string(),
            email: "aiko@acme.co".to_string(),
            source: "event".to_string(),
            score: 92.0,
            status: LeadStatus::New,
        },
        Lead {
            id: "L-2".to_string(),
            name: "Tom Becker".to_string(),
            company: "Initech".to_string(),
            email: "tom@initech.io".to_string(),
            source: "referral".to_string(),
            score: 64.0,
            status: LeadStatus::Contacted,
        },
    ]
}

async fn loaded_console<P: OutcomePolicy>(save_fail_rate: f64, policy: P) -> LeadConsole<P> {
    let mut console =
        LeadConsole::new(SimulationConfig::instant(save_fail_rate), policy, dataset()).unwrap();
    console.load_leads().await.unwrap();
    console
}

#[tokio::test]
async fn invalid_email_blocks_save_without_calling_runner() {
    let policy = CountingOutcome::new(0.0);
    let mut console = loaded_console(1.0, &policy).await;
    assert!(console.select_lead("L-1"));
    console.session_mut().set_email("not-an-email");
    assert!(!console.session().can_save());

    let started = tokio::time::Instant::now();
    let err = console.save_session().await.unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Validation(ValidationError::InvalidEmail(_))
    ));
    assert_eq!(policy.calls.get(), 0);
    assert!(started.elapsed() < std::time::Duration::from_millis(600));
    assert_eq!(console.leads().leads(), dataset().as_slice());
    assert_eq!(console.session().state(), SessionState::EditingWithError);
    assert_eq!(console.session().error(), Some("Please enter a valid email."));
}

#[tokio::test]
async fn successful_save_updates_store_and_closes_session() {
    let mut console = loaded_console(0.0, FixedOutcome::always_succeed()).await;
    assert!(console.select_lead("L-2"));
    console.session_mut().set_email("tom.becker@initech.io");
    console.session_mut().set_status(LeadStatus::Qualified);
    assert!(console.session().can_save());

    console.save_session().await.unwrap();

    let saved = console.leads().get("L-2").unwrap();
    assert_eq!(saved.email, "tom.becker@initech.io");
    assert_eq!(saved.status, LeadStatus::Qualified);
    assert_eq!(console.session().state(), SessionState::Idle);
}

#[tokio::test]
async fn failed_save_rolls_back_and_keeps_session_open() {
    let mut console = loaded_console(1.0, FixedOutcome::always_fail()).await;
    let before = console.leads().snapshot();
    assert!(console.select_lead("L-1"));
    console.session_mut().set_email("changed@acme.co");
    console.session_mut().set_status(LeadStatus::Unqualified);

    let err = console.save_session().await.unwrap_err();

    assert!(matches!(err, WorkflowError::Network(_)));
    assert_eq!(console.leads().leads(), before.leads());
    assert_eq!(console.session().state(), SessionState::EditingWithError);
    assert_eq!(console.session().error(), Some("Network error (simulated)"));
    assert_eq!(console.session().email(), "changed@acme.co");
    assert!(console.session().can_save());
}

#[tokio::test]
async fn retry_after_failure_uses_fresh_snapshot() {
    let mut store = LeadStore::new();
    store.load_all(dataset());
    let failing = SimulatedRunner::new(FixedOutcome::always_fail());
    let options = SimOptions::new(0, 0.5).unwrap();
    let patch = LeadPatch::new("L-1", "retry@acme.co", LeadStatus::Qualified);

    let err = optimistic_update(&mut store, &failing, patch.clone(), options)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Network(_)));
    assert_eq!(store.leads(), dataset().as_slice());

    let passing = SimulatedRunner::new(FixedOutcome::always_succeed());
    optimistic_update(&mut store, &passing, patch, options)
        .await
        .unwrap();
    assert_eq!(store.get("L-1").unwrap().email, "retry@acme.co");
}

#[tokio::test]
async fn optimistic_patch_is_visible_before_confirmation() {
    let mut store = LeadStore::new();
    store.load_all(dataset());
    let mut session = EditSession::new();
    session.open(store.get("L-1").unwrap().clone());
    session.set_status(LeadStatus::Qualified);

    let ticket = session.begin_save(&mut store).unwrap();
    assert_eq!(store.get("L-1").unwrap().status, LeadStatus::Qualified);
    assert_eq!(ticket.patch().status, Some(LeadStatus::Qualified));

    let runner = SimulatedRunner::new(FixedOutcome::always_fail());
    let result = runner.run((), SimOptions::new(0, 1.0).unwrap()).await;
    session.finish_save(&mut store, ticket, result);
    assert_eq!(store.get("L-1").unwrap().status, LeadStatus::New);
}

#[tokio::test]
async fn convert_without_amount_copies_lead_fields() {
    let mut console = loaded_console(0.0, FixedOutcome::always_succeed()).await;
    assert!(console.select_lead("L-1"));

    let opportunity = console.convert_session().unwrap();

    assert_eq!(opportunity.account_name, "Acme");
    assert_eq!(opportunity.amount, None);
    assert_eq!(opportunity.from_lead_id, "L-1");
    assert_eq!(opportunity.name, "Aiko Tanaka");
    assert_eq!(opportunity.stage, OpportunityStage::New);
    assert_eq!(console.session().state(), SessionState::Editing);
    assert_eq!(console.leads().leads(), dataset().as_slice());
    assert_eq!(console.opportunities().opportunities(), &[opportunity]);
}

#[tokio::test]
async fn repeated_conversions_get_unique_ids_newest_first() {
    let mut console = loaded_console(0.0, FixedOutcome::always_succeed()).await;
    assert!(console.select_lead("L-2"));
    console.session_mut().set_stage(OpportunityStage::Proposal);
    console.session_mut().set_amount(" 5000 ");
    let first = console.convert_session().unwrap();
    console.session_mut().set_amount("lots");
    let second = console.convert_session().unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.amount, Some(5000.0));
    assert_eq!(second.amount, None);
    assert_eq!(console.opportunities().opportunities()[0].id, second.id);
    assert_eq!(console.counts().opportunities, 2);
}

#[test]
fn convert_lead_drops_negative_amounts() {
    let lead = &dataset()[0];
    let opportunity = convert_lead(lead, OpportunityStage::Qualification, Some(-1.0));
    assert_eq!(opportunity.amount, None);
}

#[tokio::test]
async fn convert_and_save_require_a_selected_lead() {
    let mut console = loaded_console(0.0, FixedOutcome::always_succeed()).await;
    assert_eq!(
        console.convert_session().unwrap_err(),
        WorkflowError::Validation(ValidationError::NoLeadSelected)
    );
    assert_eq!(
        console.save_session().await.unwrap_err(),
        WorkflowError::Validation(ValidationError::NoLeadSelected)
    );
    assert!(!console.select_lead("missing"));
}

#[tokio::test]
async fn close_discards_edits() {
    let mut console = loaded_console(0.0, FixedOutcome::always_succeed()).await;
    assert!(console.select_lead("L-1"));
    console.session_mut().set_email("draft@acme.co");
    console.close_session();

    assert_eq!(console.session().state(), SessionState::Idle);
    assert_eq!(console.leads().get("L-1").unwrap().email, "aiko@acme.co");
}

#[tokio::test]
async fn reload_during_failed_save_keeps_reloaded_data_and_shows_error() {
    let mut store = LeadStore::new();
    store.load_all(dataset());
    let mut session = EditSession::new();
    session.open(store.get("L-2").unwrap().clone());
    session.set_email("pending@initech.io");
    session.set_status(LeadStatus::Qualified);

    let ticket = session.begin_save(&mut store).unwrap();
    let mut reloaded = dataset();
    reloaded[1].score = 99.0;
    store.load_all(reloaded.clone());

    let runner = SimulatedRunner::new(FixedOutcome::always_fail());
    let result = runner.run((), SimOptions::new(0, 1.0).unwrap()).await;
    let outcome = session.finish_save(&mut store, ticket, result);

    assert_eq!(outcome, SaveOutcome::RollbackSkipped);
    assert_eq!(store.leads(), reloaded.as_slice());
    assert_eq!(session.state(), SessionState::EditingWithError);
    assert_eq!(session.error(), Some("Network error (simulated)"));
    assert!(session.can_save());
}

#[tokio::test]
async fn failed_save_after_close_still_restores_store() {
    let mut store = LeadStore::new();
    store.load_all(dataset());
    let before = store.snapshot();
    let mut session = EditSession::new();
    session.open(store.get("L-1").unwrap().clone());
    session.set_email("rejected@acme.io");
    session.set_status(LeadStatus::Qualified);

    let ticket = session.begin_save(&mut store).unwrap();
    session.close();

    let runner = SimulatedRunner::new(FixedOutcome::always_fail());
    let result = runner.run((), SimOptions::new(0, 1.0).unwrap()).await;
    let outcome = session.finish_save(&mut store, ticket, result);

    assert_eq!(outcome, SaveOutcome::RolledBack);
    assert_eq!(store.leads(), before.leads());
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.error(), None);
}
