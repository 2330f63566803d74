use leadtriage_core::{
    LeadConsole, LeadSource, LeadStatus, LoadError, LoadState, OutcomePolicy, SimulationConfig,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

/// Replays scripted draws, then passes.
struct ScriptedOutcome {
    draws: RefCell<VecDeque<f64>>,
}

impl ScriptedOutcome {
    fn new(draws: &[f64]) -> Self {
        Self {
            draws: RefCell::new(draws.iter().copied().collect()),
        }
    }
}

impl OutcomePolicy for ScriptedOutcome {
    fn draw(&self) -> f64 {
        self.draws.borrow_mut().pop_front().unwrap_or(0.99)
    }
}

fn flaky_load_config() -> SimulationConfig {
    SimulationConfig {
        delay_ms: 0,
        save_fail_rate: 0.0,
        load_fail_rate: 0.5,
    }
}

#[tokio::test]
async fn seed_console_loads_bundled_dataset() {
    let mut console = LeadConsole::with_seed_dataset(SimulationConfig::instant(0.0)).unwrap();
    assert_eq!(console.load_state(), &LoadState::Idle);

    let count = console.load_leads().await.unwrap();

    assert!(count > 0);
    assert_eq!(console.load_state(), &LoadState::Loaded);
    assert_eq!(console.counts().leads, count);
    assert_eq!(console.counts().opportunities, 0);
}

#[tokio::test]
async fn empty_dataset_is_a_loaded_state() {
    let mut console =
        LeadConsole::new(SimulationConfig::instant(0.0), ScriptedOutcome::new(&[]), Vec::new())
            .unwrap();
    assert_eq!(console.load_leads().await.unwrap(), 0);
    assert_eq!(console.load_state(), &LoadState::Loaded);
    assert!(console.leads().is_empty());
    assert!(console.view().is_empty());
}

#[tokio::test]
async fn failed_load_can_be_retried() {
    let dataset = leadtriage_core::seed_leads().unwrap();
    let mut console =
        LeadConsole::new(flaky_load_config(), ScriptedOutcome::new(&[0.1]), dataset.clone())
            .unwrap();

    let err = console.load_leads().await.unwrap_err();
    assert!(matches!(err, LoadError::Network(_)));
    assert_eq!(
        console.load_state(),
        &LoadState::Failed("Network error (simulated)".to_string())
    );
    assert!(console.leads().is_empty());

    console.load_leads().await.unwrap();
    console.load_leads().await.unwrap();
    assert_eq!(console.leads().leads(), dataset.as_slice());
}

#[tokio::test]
async fn failed_reload_keeps_previous_leads() {
    let dataset = leadtriage_core::seed_leads().unwrap();
    let mut console =
        LeadConsole::new(flaky_load_config(), ScriptedOutcome::new(&[0.9, 0.2]), dataset.clone())
            .unwrap();
    console.load_leads().await.unwrap();

    assert!(console.load_leads().await.is_err());
    assert_eq!(console.leads().leads(), dataset.as_slice());
}

#[tokio::test]
async fn malformed_source_reports_dataset_error_and_keeps_prior_leads() {
    let mut console = LeadConsole::with_source(
        SimulationConfig::instant(0.0),
        ScriptedOutcome::new(&[]),
        LeadSource::Json("[{\"id\": 1}]".to_string()),
    )
    .unwrap();

    let err = console.load_leads().await.unwrap_err();

    assert!(matches!(err, LoadError::Dataset(_)));
    assert!(matches!(
        console.load_state(),
        LoadState::Failed(message) if message.starts_with("invalid lead dataset")
    ));
    assert!(console.leads().is_empty());
}

#[tokio::test]
async fn view_follows_query_and_status_filter() {
    let mut console = LeadConsole::with_seed_dataset(SimulationConfig::instant(0.0)).unwrap();
    console.load_leads().await.unwrap();

    console.set_query("  ACME ");
    let names: Vec<String> = console.view().iter().map(|lead| lead.company.clone()).collect();
    assert!(!names.is_empty());
    assert!(names.iter().all(|company| company.to_lowercase().contains("acme")));

    console.set_status_select("qualified").unwrap();
    assert!(console
        .view()
        .iter()
        .all(|lead| lead.status == LeadStatus::Qualified));

    assert!(console.set_status_select("archived").is_err());
    assert_eq!(console.filter().status, Some(LeadStatus::Qualified));

    console.set_status_select("").unwrap();
    console.set_query("");
    assert_eq!(console.view().len(), console.counts().leads);
}

#[tokio::test(start_paused = true)]
async fn load_waits_for_configured_delay() {
    let config = SimulationConfig {
        delay_ms: 600,
        save_fail_rate: 0.12,
        load_fail_rate: 0.0,
    };
    let mut console = LeadConsole::new(config, ScriptedOutcome::new(&[]), Vec::new()).unwrap();
    let started = tokio::time::Instant::now();
    console.load_leads().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(600));
}

#[test]
fn out_of_range_config_is_rejected() {
    let config = SimulationConfig {
        delay_ms: 0,
        save_fail_rate: 1.2,
        load_fail_rate: 0.0,
    };
    assert!(LeadConsole::new(config, ScriptedOutcome::new(&[]), Vec::new()).is_err());
}
