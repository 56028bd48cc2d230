//! Evolution Event Log
//!
//! Append-only, at most one event per triggering decision.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::logic::evolution::EvolutionEvent;

pub trait EvolutionLog: Send + Sync {
    /// Run `build` inside the per-decision critical section and store the
    /// event it returns, if any. If the decision already has an event,
    /// returns it without calling `build`.
    fn record_with(
        &self,
        decision_id: &str,
        build: &mut dyn FnMut() -> Option<EvolutionEvent>,
    ) -> Result<Option<EvolutionEvent>, EvolutionEvent>;

    fn by_decision(&self, decision_id: &str) -> Option<EvolutionEvent>;

    fn get(&self, event_id: &str) -> Option<EvolutionEvent>;

    /// Oldest first
    fn history(&self) -> Vec<EvolutionEvent>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEvolutionLog {
    /// decision id -> event
    events: DashMap<String, EvolutionEvent>,
}

impl InMemoryEvolutionLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EvolutionLog for InMemoryEvolutionLog {
    fn record_with(
        &self,
        decision_id: &str,
        build: &mut dyn FnMut() -> Option<EvolutionEvent>,
    ) -> Result<Option<EvolutionEvent>, EvolutionEvent> {
        match self.events.entry(decision_id.to_string()) {
            Entry::Occupied(entry) => Err(entry.get().clone()),
            Entry::Vacant(entry) => {
                let event = build();
                if let Some(event) = &event {
                    entry.insert(event.clone());
                }
                Ok(event)
            }
        }
    }

    fn by_decision(&self, decision_id: &str) -> Option<EvolutionEvent> {
        self.events.get(decision_id).map(|e| e.clone())
    }

    fn get(&self, event_id: &str) -> Option<EvolutionEvent> {
        self.events
            .iter()
            .find(|e| e.id == event_id)
            .map(|e| e.value().clone())
    }

    fn history(&self) -> Vec<EvolutionEvent> {
        let mut all: Vec<EvolutionEvent> = self.events.iter().map(|e| e.clone()).collect();
        all.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        all
    }

    fn len(&self) -> usize {
        self.events.len()
    }
}
