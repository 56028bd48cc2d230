//! Influence Edge Store
//!
//! Weights keyed by a named causal relation, e.g. "User->TravelContext".

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeight {
    pub relation: String,
    /// [0.50, 0.99]
    pub weight: f64,
}

pub trait EdgeStore: Send + Sync {
    fn get(&self, relation: &str) -> Option<f64>;

    fn upsert(&self, relation: &str, weight: f64);

    /// Write `new` only if the current value equals `expected`.
    /// On mismatch returns the current value.
    fn compare_and_swap(
        &self,
        relation: &str,
        expected: Option<f64>,
        new: f64,
    ) -> Result<(), Option<f64>>;

    /// Sorted by relation name
    fn snapshot(&self) -> Vec<EdgeWeight>;

    /// Atomic read-modify-write, returns (before, after)
    fn update(&self, relation: &str, seed: f64, apply: &mut dyn FnMut(f64) -> f64) -> (f64, f64) {
        let mut current = self.get(relation);
        loop {
            let before = current.unwrap_or(seed);
            let after = apply(before);
            match self.compare_and_swap(relation, current, after) {
                Ok(()) => return (before, after),
                Err(actual) => current = actual,
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEdgeStore {
    edges: DashMap<String, f64>,
}

impl InMemoryEdgeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EdgeStore for InMemoryEdgeStore {
    fn get(&self, relation: &str) -> Option<f64> {
        self.edges.get(relation).map(|w| *w)
    }

    fn upsert(&self, relation: &str, weight: f64) {
        self.edges.insert(relation.to_string(), weight);
    }

    fn compare_and_swap(
        &self,
        relation: &str,
        expected: Option<f64>,
        new: f64,
    ) -> Result<(), Option<f64>> {
        use dashmap::mapref::entry::Entry;

        match (self.edges.entry(relation.to_string()), expected) {
            (Entry::Occupied(mut entry), Some(expected)) if *entry.get() == expected => {
                entry.insert(new);
                Ok(())
            }
            (Entry::Occupied(entry), _) => Err(Some(*entry.get())),
            (Entry::Vacant(entry), None) => {
                entry.insert(new);
                Ok(())
            }
            (Entry::Vacant(_), Some(_)) => Err(None),
        }
    }

    fn snapshot(&self) -> Vec<EdgeWeight> {
        let mut all: Vec<EdgeWeight> = self
            .edges
            .iter()
            .map(|e| EdgeWeight {
                relation: e.key().clone(),
                weight: *e.value(),
            })
            .collect();
        all.sort_by(|a, b| a.relation.cmp(&b.relation));
        all
    }

    fn update(&self, relation: &str, seed: f64, apply: &mut dyn FnMut(f64) -> f64) -> (f64, f64) {
        let mut entry = self.edges.entry(relation.to_string()).or_insert(seed);
        let before = *entry;
        let after = apply(before);
        *entry = after;
        (before, after)
    }
}
