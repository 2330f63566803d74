//! Lead triage console state container.
//!
//! # Responsibility
//! - Own the lead store, opportunity store, table filter and edit session.
//! - Provide the load/save/convert/view entry points used by the UI.
//!
//! # Invariants
//! - No ambient state: everything the console touches is a field.
//! - A failed load, network or decode, keeps previously loaded leads and
//!   records the failure.
//! - An empty dataset is a successful load, not an error.
//! - Console methods hold `&mut self` across the simulated delay, so a reload
//!   cannot interleave with a save issued through the console.

use crate::config::{ConfigError, SimulationConfig};
use crate::dataset::{DatasetError, LeadSource};
use crate::model::lead::{Lead, LeadPatch, LeadStatus, ValidationError};
use crate::model::opportunity::Opportunity;
use crate::sim::policy::{OutcomePolicy, RandomOutcome};
use crate::sim::runner::{SimOptions, SimulatedNetworkError, SimulatedRunner};
use crate::store::lead_store::LeadStore;
use crate::store::opportunity_store::OpportunityStore;
use crate::view::lead_view::{LeadFilter, MemoizedLeadView};
use crate::workflow::edit_session::EditSession;
use crate::workflow::optimistic::optimistic_update;
use crate::workflow::WorkflowError;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lead table loading state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet.
    Idle,
    Loading,
    /// Load finished; the store may legitimately be empty.
    Loaded,
    /// Load failed with a user-facing message; retry by loading again.
    Failed(String),
}

/// Load failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    Network(SimulatedNetworkError),
    Dataset(DatasetError),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(err) => write!(f, "{err}"),
            Self::Dataset(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Network(err) => Some(err),
            Self::Dataset(err) => Some(err),
        }
    }
}

impl From<SimulatedNetworkError> for LoadError {
    fn from(value: SimulatedNetworkError) -> Self {
        Self::Network(value)
    }
}

impl From<DatasetError> for LoadError {
    fn from(value: DatasetError) -> Self {
        Self::Dataset(value)
    }
}

/// Header counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleCounts {
    pub leads: usize,
    pub opportunities: usize,
}

/// Single-page lead triage console.
pub struct LeadConsole<P: OutcomePolicy = RandomOutcome> {
    source: LeadSource,
    leads: LeadStore,
    opportunities: OpportunityStore,
    session: EditSession,
    filter: LeadFilter,
    view: MemoizedLeadView,
    load_state: LoadState,
    config: SimulationConfig,
    load_options: SimOptions,
    save_options: SimOptions,
    runner: SimulatedRunner<P>,
}

impl LeadConsole<RandomOutcome> {
    /// Console over the bundled seed dataset with random failures.
    ///
    /// # Errors
    /// - `InvalidFailRate` when either failure rate is outside `[0, 1]`.
    pub fn with_seed_dataset(config: SimulationConfig) -> Result<Self, ConfigError> {
        Self::with_source(config, RandomOutcome, LeadSource::Bundled)
    }
}

impl<P: OutcomePolicy> LeadConsole<P> {
    /// Creates a console that loads `dataset` through the simulated runner.
    ///
    /// # Errors
    /// - `InvalidFailRate` when either failure rate is outside `[0, 1]`.
    pub fn new(
        config: SimulationConfig,
        policy: P,
        dataset: Vec<Lead>,
    ) -> Result<Self, ConfigError> {
        Self::with_source(config, policy, LeadSource::Records(dataset))
    }

    /// Creates a console that reads `source` on every load.
    ///
    /// # Errors
    /// - `InvalidFailRate` when either failure rate is outside `[0, 1]`.
    pub fn with_source(
        config: SimulationConfig,
        policy: P,
        source: LeadSource,
    ) -> Result<Self, ConfigError> {
        let load_options = config.load_options()?;
        let save_options = config.save_options()?;
        Ok(Self {
            source,
            leads: LeadStore::new(),
            opportunities: OpportunityStore::new(),
            session: EditSession::new(),
            filter: LeadFilter::default(),
            view: MemoizedLeadView::new(),
            load_state: LoadState::Idle,
            config,
            load_options,
            save_options,
            runner: SimulatedRunner::new(policy),
        })
    }

    /// Loads (or reloads) all leads after the simulated delay.
    ///
    /// Re-invoking after a failure retries the same load; repeated successful
    /// loads leave the same collection in place.
    ///
    /// # Errors
    /// - `Network` when the simulated load fails; prior leads are kept.
    /// - `Dataset` when the source cannot be decoded; prior leads are kept.
    pub async fn load_leads(&mut self) -> Result<usize, LoadError> {
        self.load_state = LoadState::Loading;
        let loaded = match self.runner.run((), self.load_options).await {
            Ok(()) => self.source.read().map_err(LoadError::from),
            Err(err) => Err(LoadError::from(err)),
        };
        match loaded {
            Ok(leads) => {
                let count = leads.len();
                self.leads.load_all(leads);
                self.load_state = LoadState::Loaded;
                info!("event=leads_loaded module=console status=ok count={count}");
                Ok(count)
            }
            Err(err) => {
                error!("event=leads_loaded module=console status=error message={err}");
                self.load_state = LoadState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Applies `patch` optimistically and confirms it through the runner.
    ///
    /// # Errors
    /// - `Validation` when the email is malformed; nothing is applied.
    /// - `Network` when the simulated save fails; the store is rolled back.
    pub async fn save_lead(&mut self, patch: LeadPatch) -> Result<(), WorkflowError> {
        optimistic_update(&mut self.leads, &self.runner, patch, self.save_options).await
    }

    /// Saves the open edit session. Closes it on success.
    ///
    /// # Errors
    /// - See `EditSession::save`.
    pub async fn save_session(&mut self) -> Result<(), WorkflowError> {
        self.session
            .save(&mut self.leads, &self.runner, self.save_options)
            .await
    }

    /// Converts the lead open in the edit session.
    ///
    /// # Errors
    /// - `Validation(NoLeadSelected)` when no session is open.
    pub fn convert_session(&mut self) -> Result<Opportunity, WorkflowError> {
        self.session.convert(&mut self.opportunities)
    }

    /// Opens the edit session for lead `id`. Returns `false` for unknown ids.
    pub fn select_lead(&mut self, id: &str) -> bool {
        match self.leads.get(id) {
            Some(lead) => {
                self.session.open(lead.clone());
                true
            }
            None => false,
        }
    }

    pub fn close_session(&mut self) {
        self.session.close();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
    }

    pub fn set_status_filter(&mut self, status: Option<LeadStatus>) {
        self.filter.status = status;
    }

    /// Sets the status filter from a select value where `""` means all.
    ///
    /// # Errors
    /// - `UnknownStatus` for unrecognized values; the filter is unchanged.
    pub fn set_status_select(&mut self, value: &str) -> Result<(), ValidationError> {
        let parsed = LeadFilter::from_select(String::new(), value)?;
        self.filter.status = parsed.status;
        Ok(())
    }

    /// Filtered, score-ordered leads for the table.
    pub fn view(&mut self) -> &[Lead] {
        self.view.get(&self.leads, &self.filter)
    }

    pub fn counts(&self) -> ConsoleCounts {
        ConsoleCounts {
            leads: self.leads.len(),
            opportunities: self.opportunities.len(),
        }
    }

    pub fn leads(&self) -> &LeadStore {
        &self.leads
    }

    pub fn opportunities(&self) -> &OpportunityStore {
        &self.opportunities
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditSession {
        &mut self.session
    }

    pub fn filter(&self) -> &LeadFilter {
        &self.filter
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}
