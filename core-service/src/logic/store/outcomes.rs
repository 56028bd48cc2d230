//! Outcome Ledger
//!
//! Write-once per alert id. The existence check and the write are one
//! critical section.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::logic::feedback::OutcomeRecord;

pub trait OutcomeLedger: Send + Sync {
    /// Run `commit` and store its record, only if the alert has no record
    /// yet. `commit` runs inside the per-alert critical section, so its
    /// side effects happen at most once per alert. On conflict returns
    /// the existing record and does not call `commit`.
    fn commit_with(
        &self,
        alert_id: &str,
        commit: &mut dyn FnMut() -> OutcomeRecord,
    ) -> Result<OutcomeRecord, OutcomeRecord>;

    fn get(&self, alert_id: &str) -> Option<OutcomeRecord>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryOutcomeLedger {
    records: DashMap<String, OutcomeRecord>,
}

impl InMemoryOutcomeLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutcomeLedger for InMemoryOutcomeLedger {
    fn commit_with(
        &self,
        alert_id: &str,
        commit: &mut dyn FnMut() -> OutcomeRecord,
    ) -> Result<OutcomeRecord, OutcomeRecord> {
        match self.records.entry(alert_id.to_string()) {
            Entry::Occupied(entry) => Err(entry.get().clone()),
            Entry::Vacant(entry) => {
                let record = commit();
                entry.insert(record.clone());
                Ok(record)
            }
        }
    }

    fn get(&self, alert_id: &str) -> Option<OutcomeRecord> {
        self.records.get(alert_id).map(|r| r.clone())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
