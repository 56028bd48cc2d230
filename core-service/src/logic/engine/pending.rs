//! Pending Decisions
//!
//! Latest decision per alert, kept until its outcome is reported.
//! Bounded: past capacity the oldest alert is dropped.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

use crate::constants::MAX_PENDING_DECISIONS;
use crate::logic::decision::Decision;

#[derive(Debug, Default)]
struct Inner {
    by_alert: HashMap<String, Decision>,
    /// Alert ids, oldest first
    order: VecDeque<String>,
}

#[derive(Debug)]
pub struct PendingDecisions {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl PendingDecisions {
    pub fn new() -> Self {
        Self::with_capacity(MAX_PENDING_DECISIONS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    /// Store `decision` as the latest for its alert, evicting the oldest
    /// alerts past capacity
    pub fn insert(&self, decision: Decision) {
        let mut inner = self.inner.lock();
        let alert_id = decision.alert_id.clone();
        if inner.by_alert.insert(alert_id.clone(), decision).is_none() {
            inner.order.push_back(alert_id);
        }

        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.by_alert.remove(&oldest);
                log::debug!("Dropped pending decision for alert {} (capacity {})", oldest, self.capacity);
            }
        }
    }

    pub fn get(&self, alert_id: &str) -> Option<Decision> {
        self.inner.lock().by_alert.get(alert_id).cloned()
    }

    pub fn remove(&self, alert_id: &str) -> Option<Decision> {
        let mut inner = self.inner.lock();
        let removed = inner.by_alert.remove(alert_id)?;
        inner.order.retain(|id| id != alert_id);
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().by_alert.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PendingDecisions {
    fn default() -> Self {
        Self::new()
    }
}
