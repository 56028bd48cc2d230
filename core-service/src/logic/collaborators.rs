//! External collaborators
//!
//! The engine does no I/O itself. Context retrieval (graph store) and
//! narration (justification text) are supplied by the caller through
//! these seams.

use std::collections::HashMap;
use parking_lot::RwLock;

use crate::error::{EngineError, EngineResult};
use super::context::Context;
use super::decision::Action;
use super::situation::SituationCategory;

// ============================================================================
// CONTEXT SOURCE
// ============================================================================

/// Fetches the situational snapshot for an alert
pub trait ContextSource: Send + Sync {
    fn fetch_context(&self, alert_id: &str) -> EngineResult<Context>;
}

/// Map-backed source for tests and embedded callers
#[derive(Default)]
pub struct InMemoryContextSource {
    contexts: RwLock<HashMap<String, Context>>,
}

impl InMemoryContextSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_contexts(contexts: impl IntoIterator<Item = Context>) -> Self {
        let source = Self::new();
        for ctx in contexts {
            source.insert(ctx);
        }
        source
    }

    /// Insert or replace the snapshot for `ctx.alert_id`
    pub fn insert(&self, ctx: Context) {
        self.contexts.write().insert(ctx.alert_id.clone(), ctx);
    }

    pub fn len(&self) -> usize {
        self.contexts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.read().is_empty()
    }
}

impl ContextSource for InMemoryContextSource {
    fn fetch_context(&self, alert_id: &str) -> EngineResult<Context> {
        self.contexts
            .read()
            .get(alert_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound {
                alert_id: alert_id.to_string(),
            })
    }
}

// ============================================================================
// NARRATOR
// ============================================================================

/// Produces the free-text justification scored by the Faithfulness gate
pub trait Narrator {
    fn narrate(&self, situation: SituationCategory, action: Action, context: &Context) -> String;
}

impl<F> Narrator for F
where
    F: Fn(SituationCategory, Action, &Context) -> String,
{
    fn narrate(&self, situation: SituationCategory, action: Action, context: &Context) -> String {
        self(situation, action, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_context_is_not_found() {
        let source = InMemoryContextSource::new();
        match source.fetch_context("ALERT-404") {
            Err(EngineError::NotFound { alert_id }) => assert_eq!(alert_id, "ALERT-404"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_returns_snapshot() {
        let source = InMemoryContextSource::from_contexts(vec![
            Context::new("ALERT-1", "phishing"),
            Context::new("ALERT-2", "data_exfiltration"),
        ]);
        assert_eq!(source.len(), 2);
        let ctx = source.fetch_context("ALERT-2").unwrap();
        assert_eq!(ctx.alert_type.as_str(), "data_exfiltration");
    }

    #[test]
    fn test_closure_narrator() {
        let narrator = |s: SituationCategory, a: Action, c: &Context| {
            format!("{} {} {}", s, a, c.alert_id)
        };
        let text = narrator.narrate(
            SituationCategory::Unknown,
            Action::EscalateTier2,
            &Context::new("ALERT-9", "x"),
        );
        assert_eq!(text, "unknown escalate_tier2 ALERT-9");
    }
}
