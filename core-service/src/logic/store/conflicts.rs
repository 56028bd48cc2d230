//! Policy Conflict Log
//!
//! Append-only: at most one resolution per alert, never overwritten.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::logic::policy::PolicyResolution;

pub trait ConflictLog: Send + Sync {
    /// Append a resolution. If the alert already has one, returns it
    /// unchanged and records nothing.
    fn append(&self, resolution: PolicyResolution) -> Result<(), PolicyResolution>;

    fn get(&self, audit_id: &str) -> Option<PolicyResolution>;

    fn by_alert(&self, alert_id: &str) -> Option<PolicyResolution>;

    /// Oldest first
    fn history(&self) -> Vec<PolicyResolution>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryConflictLog {
    /// audit id -> resolution
    records: DashMap<String, PolicyResolution>,
    /// alert id -> audit id
    by_alert: DashMap<String, String>,
}

impl InMemoryConflictLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConflictLog for InMemoryConflictLog {
    fn append(&self, resolution: PolicyResolution) -> Result<(), PolicyResolution> {
        match self.by_alert.entry(resolution.alert_id.clone()) {
            Entry::Occupied(entry) => match self.records.get(entry.get()) {
                Some(existing) => Err(existing.clone()),
                // Index without record cannot happen: records are inserted first
                None => Err(resolution),
            },
            Entry::Vacant(entry) => {
                self.records
                    .insert(resolution.audit_id.clone(), resolution.clone());
                entry.insert(resolution.audit_id);
                Ok(())
            }
        }
    }

    fn get(&self, audit_id: &str) -> Option<PolicyResolution> {
        self.records.get(audit_id).map(|r| r.clone())
    }

    fn by_alert(&self, alert_id: &str) -> Option<PolicyResolution> {
        let audit_id = self.by_alert.get(alert_id)?.clone();
        self.get(&audit_id)
    }

    fn history(&self) -> Vec<PolicyResolution> {
        let mut all: Vec<PolicyResolution> = self.records.iter().map(|r| r.clone()).collect();
        all.sort_by(|a, b| {
            a.resolved_at
                .cmp(&b.resolved_at)
                .then_with(|| a.audit_id.cmp(&b.audit_id))
        });
        all
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
