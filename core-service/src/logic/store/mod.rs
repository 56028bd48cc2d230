//! Store Module
//!
//! Cross-request shared mutable state behind injectable interfaces.
//! Every store serializes per key (pattern id, relation, alert id,
//! decision id); unrelated keys never contend on one lock.
//!
//! ## Structure
//! - `patterns`: `PatternState` table
//! - `edges`: causal influence edge weights
//! - `conflicts`: append-only policy resolution log
//! - `outcomes`: write-once outcome ledger
//! - `overrides`: active override windows
//! - `evolutions`: append-only evolution events, one per decision
//!
//! ## Usage
//! ```ignore
//! let stores = EngineStores::in_memory();
//! let (before, after) = stores.patterns.update("PAT-TRAVEL-001", seed, &mut |s| bump(s));
//! ```

use std::sync::Arc;

pub mod patterns;
pub mod edges;
pub mod conflicts;
pub mod outcomes;
pub mod overrides;
pub mod evolutions;

pub use patterns::{InMemoryPatternStore, PatternState, PatternStore};
pub use edges::{EdgeStore, EdgeWeight, InMemoryEdgeStore};
pub use conflicts::{ConflictLog, InMemoryConflictLog};
pub use outcomes::{InMemoryOutcomeLedger, OutcomeLedger};
pub use overrides::{InMemoryOverrideStore, OverrideStore};
pub use evolutions::{EvolutionLog, InMemoryEvolutionLog};

/// Bundle of every store the engine mutates
#[derive(Clone)]
pub struct EngineStores {
    pub patterns: Arc<dyn PatternStore>,
    pub edges: Arc<dyn EdgeStore>,
    pub conflicts: Arc<dyn ConflictLog>,
    pub outcomes: Arc<dyn OutcomeLedger>,
    pub overrides: Arc<dyn OverrideStore>,
    pub evolutions: Arc<dyn EvolutionLog>,
}

impl EngineStores {
    /// Fresh, isolated in-memory stores
    pub fn in_memory() -> Self {
        Self {
            patterns: Arc::new(InMemoryPatternStore::new()),
            edges: Arc::new(InMemoryEdgeStore::new()),
            conflicts: Arc::new(InMemoryConflictLog::new()),
            outcomes: Arc::new(InMemoryOutcomeLedger::new()),
            overrides: Arc::new(InMemoryOverrideStore::new()),
            evolutions: Arc::new(InMemoryEvolutionLog::new()),
        }
    }
}

impl Default for EngineStores {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for EngineStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineStores")
            .field("patterns", &self.patterns.snapshot().len())
            .field("edges", &self.edges.snapshot().len())
            .field("conflicts", &self.conflicts.len())
            .field("outcomes", &self.outcomes.len())
            .field("overrides", &self.overrides.active().len())
            .field("evolutions", &self.evolutions.len())
            .finish()
    }
}
