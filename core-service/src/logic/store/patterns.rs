//! Pattern State Store

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Mutable confidence state of one pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternState {
    /// [0.50, 0.99]
    pub confidence: f64,
    /// [0.05, 1.0]
    pub false_positive_rate: f64,
    pub occurrence_count: u64,
}

impl PatternState {
    pub fn new(confidence: f64, false_positive_rate: f64, occurrence_count: u64) -> Self {
        Self {
            confidence,
            false_positive_rate,
            occurrence_count,
        }
    }
}

pub trait PatternStore: Send + Sync {
    fn get(&self, pattern_id: &str) -> Option<PatternState>;

    /// Unconditional write (seeding, admin)
    fn upsert(&self, pattern_id: &str, state: PatternState);

    /// Write `new` only if the current value equals `expected`.
    /// On mismatch returns the current value.
    fn compare_and_swap(
        &self,
        pattern_id: &str,
        expected: Option<PatternState>,
        new: PatternState,
    ) -> Result<(), Option<PatternState>>;

    fn snapshot(&self) -> Vec<(String, PatternState)>;

    /// Atomic read-modify-write. `seed` stands in for a missing entry.
    /// Returns (before, after).
    fn update(
        &self,
        pattern_id: &str,
        seed: PatternState,
        apply: &mut dyn FnMut(&PatternState) -> PatternState,
    ) -> (PatternState, PatternState) {
        let mut current = self.get(pattern_id);
        loop {
            let before = current.unwrap_or(seed);
            let after = apply(&before);
            match self.compare_and_swap(pattern_id, current, after) {
                Ok(()) => return (before, after),
                Err(actual) => current = actual,
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPatternStore {
    patterns: DashMap<String, PatternState>,
}

impl InMemoryPatternStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PatternStore for InMemoryPatternStore {
    fn get(&self, pattern_id: &str) -> Option<PatternState> {
        self.patterns.get(pattern_id).map(|s| *s)
    }

    fn upsert(&self, pattern_id: &str, state: PatternState) {
        self.patterns.insert(pattern_id.to_string(), state);
    }

    fn compare_and_swap(
        &self,
        pattern_id: &str,
        expected: Option<PatternState>,
        new: PatternState,
    ) -> Result<(), Option<PatternState>> {
        use dashmap::mapref::entry::Entry;

        match (self.patterns.entry(pattern_id.to_string()), expected) {
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

    fn snapshot(&self) -> Vec<(String, PatternState)> {
        let mut all: Vec<(String, PatternState)> = self
            .patterns
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    fn update(
        &self,
        pattern_id: &str,
        seed: PatternState,
        apply: &mut dyn FnMut(&PatternState) -> PatternState,
    ) -> (PatternState, PatternState) {
        let mut entry = self.patterns.entry(pattern_id.to_string()).or_insert(seed);
        let before = *entry;
        let after = apply(&before);
        *entry = after;
        (before, after)
    }
}
