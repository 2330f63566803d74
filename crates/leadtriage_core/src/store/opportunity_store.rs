//! Append-only opportunity collection, newest first.

use crate::model::opportunity::Opportunity;
use log::debug;

/// Exclusive owner of opportunity records.
#[derive(Debug, Clone, Default)]
pub struct OpportunityStore {
    opportunities: Vec<Opportunity>,
}

impl OpportunityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `opportunity` so the most recent conversion comes first.
    pub fn append(&mut self, opportunity: Opportunity) {
        debug!(
            "event=opportunity_append module=store status=ok opportunity_id={} lead_id={}",
            opportunity.id, opportunity.from_lead_id
        );
        self.opportunities.insert(0, opportunity);
    }

    pub fn opportunities(&self) -> &[Opportunity] {
        &self.opportunities
    }

    pub fn len(&self) -> usize {
        self.opportunities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opportunities.is_empty()
    }
}
