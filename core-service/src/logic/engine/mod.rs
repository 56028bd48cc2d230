//! Decision Engine
//!
//! Orchestrates one evaluation cycle and owns the shared state:
//!
//! ```text
//! Context -> classify -> evaluate options -> select
//!         -> override window (reroute) -> narrate -> gates
//!         -> policy check (independent) -> evolution (if passed)
//! ```
//!
//! Outcome feedback arrives later, out of band, through `report_outcome`.
//! Classification, option evaluation, selection and gating are pure; the
//! only commit points are override consumption, conflict recording,
//! evolution and feedback, each its own per-key critical section.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::logic::bounds::{Bounds, ClampAudit, ClampEvent};
use crate::logic::collaborators::{ContextSource, Narrator};
use crate::logic::config::EngineConfig;
use crate::logic::context::Context;
use crate::logic::decision::{
    evaluate_options, playbook_for, select_decision, Decision, ResponseOption,
};
use crate::logic::evolution::{EvolutionEvent, EvolutionOutcome, EvolutionTracker, VariantTracker};
use crate::logic::feedback::{
    FeedbackOutcome, FeedbackProcessor, FeedbackStatus, OverrideKey, OverrideWindow, Verdict,
};
use crate::logic::gate::{evaluate_gates, GateResult};
use crate::logic::policy::{
    detect_conflicts, resolve_conflict, PolicyConflict, PolicyRegistry, PolicyResolution,
};
use crate::logic::situation::{classify, SituationClassification};
use crate::logic::store::{EdgeWeight, EngineStores, PatternState};

mod pending;

pub use pending::PendingDecisions;


// ============================================================================
// CYCLE
// ============================================================================

/// Everything one evaluation produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    pub classification: SituationClassification,
    pub options: Vec<ResponseOption>,
    pub decision: Decision,
    pub narration: String,
    pub gate: GateResult,
    pub policy: PolicyConflict,
    pub evolution: EvolutionOutcome,
    /// Window consumed by this cycle, as it stands after the decrement
    pub override_applied: Option<OverrideWindow>,
}

impl Cycle {
    /// Gate-passed decisions may execute; blocked ones must not
    pub fn executable(&self) -> bool {
        self.gate.overall_passed
    }

    /// Policy guidance disagrees with the selected action
    pub fn diverges_from_policy(&self) -> bool {
        self.policy
            .effective_action()
            .map_or(false, |action| action != self.decision.action)
    }
}

/// Pattern and edge tables at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSnapshot {
    pub patterns: Vec<(String, PatternState)>,
    pub edges: Vec<EdgeWeight>,
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct DecisionEngine {
    config: Arc<EngineConfig>,
    policies: PolicyRegistry,
    stores: EngineStores,
    audit: Arc<ClampAudit>,
    variants: VariantTracker,
    tracker: EvolutionTracker,
    feedback: FeedbackProcessor,
    /// Latest decision per alert awaiting feedback
    decisions: PendingDecisions,
}

impl DecisionEngine {
    /// Validates `config` and seeds its initial patterns/edges into
    /// `stores` (entries already present are left alone).
    pub fn new(config: EngineConfig, policies: PolicyRegistry, stores: EngineStores) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self::build(config, policies, stores))
    }

    /// Default config, built-in policies, fresh in-memory stores
    pub fn in_memory() -> Self {
        Self::build(EngineConfig::default(), PolicyRegistry::builtin(), EngineStores::in_memory())
    }

    /// In-memory stores, policies from `config.policy_file` or built-ins
    pub fn from_config(config: EngineConfig) -> EngineResult<Self> {
        let policies = config.load_policies()?;
        Self::new(config, policies, EngineStores::in_memory())
    }

    pub fn from_env() -> EngineResult<Self> {
        Self::from_config(EngineConfig::from_env()?)
    }

    fn build(mut config: EngineConfig, policies: PolicyRegistry, stores: EngineStores) -> Self {
        let audit = Arc::new(ClampAudit::new());

        let seed = &mut config.seed;
        seed.pattern_confidence =
            audit.clamp(Bounds::CONFIDENCE, "seed", "confidence", seed.pattern_confidence);
        seed.false_positive_rate = audit.clamp(
            Bounds::FALSE_POSITIVE_RATE,
            "seed",
            "false_positive_rate",
            seed.false_positive_rate,
        );
        seed.edge_weight = audit.clamp(Bounds::EDGE_WEIGHT, "seed", "weight", seed.edge_weight);

        for (id, state) in &config.seed.patterns {
            let state = clamp_pattern(&audit, id, *state);
            // Err means the store already holds this pattern
            let _ = stores.patterns.compare_and_swap(id, None, state);
        }
        for (relation, weight) in &config.seed.edges {
            let weight = audit.clamp(Bounds::EDGE_WEIGHT, relation, "weight", *weight);
            let _ = stores.edges.compare_and_swap(relation, None, weight);
        }

        let config = Arc::new(config);
        let tracker = EvolutionTracker::new(
            Arc::clone(&stores.patterns),
            Arc::clone(&stores.evolutions),
            Arc::clone(&audit),
            Arc::clone(&config),
        );
        let feedback = FeedbackProcessor::new(
            Arc::clone(&stores.patterns),
            Arc::clone(&stores.edges),
            Arc::clone(&stores.outcomes),
            Arc::clone(&stores.overrides),
            Arc::clone(&audit),
            Arc::clone(&config),
        );

        log::info!(
            "{} v{} ready: {} policies, {} seeded patterns",
            crate::constants::ENGINE_NAME,
            crate::constants::ENGINE_VERSION,
            policies.len(),
            config.seed.patterns.len()
        );

        Self {
            config,
            policies,
            stores,
            audit,
            variants: VariantTracker::with_defaults(),
            tracker,
            feedback,
            decisions: PendingDecisions::new(),
        }
    }

    // ========================================================================
    // EVALUATION
    // ========================================================================

    /// Classify, evaluate and select. Pure apart from the id and timestamp.
    pub fn decide(&self, context: &Context) -> (SituationClassification, Vec<ResponseOption>, Decision) {
        let classification = classify(context);
        let options = evaluate_options(classification.category);
        let mut decision = select_decision(context, &classification, &options);
        decision.prompt_variant = Some(self.variants.active_variant(context.alert_type.as_str()));
        (classification, options, decision)
    }

    pub fn gate(&self, decision: &Decision, context: &Context, narration: &str) -> GateResult {
        evaluate_gates(decision, context, narration, &self.config.pattern_keywords)
    }

    /// Independent policy check; records a resolution on conflict
    pub fn check_policies(&self, context: &Context) -> PolicyConflict {
        detect_conflicts(&self.policies, self.stores.conflicts.as_ref(), context)
    }

    pub fn resolve_conflict(&self, conflict: &PolicyConflict) -> EngineResult<PolicyResolution> {
        resolve_conflict(self.stores.conflicts.as_ref(), conflict)
    }

    /// Full cycle for one Context
    pub fn process(&self, context: &Context, narrator: &dyn Narrator) -> Cycle {
        let (classification, options, mut decision) = self.decide(context);

        let override_applied = self.apply_override(&mut decision, &options);

        let narration = narrator.narrate(classification.category, decision.action, context);
        let gate = self.gate(&decision, context, &narration);
        let policy = self.check_policies(context);
        let evolution = self.tracker.observe(&decision, &gate, context);

        self.decisions.insert(decision.clone());

        let cycle = Cycle {
            classification,
            options,
            decision,
            narration,
            gate,
            policy,
            evolution,
            override_applied,
        };

        if cycle.diverges_from_policy() {
            log::info!(
                "Alert {}: selected {} but policy calls for {:?}",
                cycle.decision.alert_id,
                cycle.decision.action,
                cycle.policy.effective_action()
            );
        }

        cycle
    }

    /// Fetch the Context from `source`, then `process`
    pub fn process_alert(
        &self,
        alert_id: &str,
        source: &dyn ContextSource,
        narrator: &dyn Narrator,
    ) -> EngineResult<Cycle> {
        let context = source.fetch_context(alert_id)?;
        Ok(self.process(&context, narrator))
    }

    /// Pattern window first, then the situation window. A decision that
    /// already escalates to a human keeps its action and still uses a
    /// slot. A rerouted decision takes the playbook of the matching
    /// option, or the generic one for that action.
    fn apply_override(&self, decision: &mut Decision, options: &[ResponseOption]) -> Option<OverrideWindow> {
        let mut keys = Vec::with_capacity(2);
        if let Some(pattern_id) = &decision.pattern_id {
            keys.push(OverrideKey::Pattern(pattern_id.clone()));
        }
        keys.push(OverrideKey::Situation(decision.situation));

        let window = keys
            .iter()
            .find_map(|key| self.stores.overrides.consume(key))?;

        if decision.action == window.action || decision.action.is_escalation() {
            log::info!(
                "Override on {} counted for alert {}: {} kept ({} remaining)",
                window.key,
                decision.alert_id,
                decision.action,
                window.remaining
            );
            return Some(window);
        }

        log::info!(
            "Override on {} applied to alert {}: {} -> {} ({} remaining)",
            window.key,
            decision.alert_id,
            decision.action,
            window.action,
            window.remaining
        );
        decision.reroute(window.action);
        decision.playbook_id = playbook_for(options, window.action);
        Some(window)
    }

    // ========================================================================
    // FEEDBACK
    // ========================================================================

    /// Commit a verdict on `decision`. Also scores the prompt variant the
    /// decision was made under and checks its family for a promotion.
    pub fn report_outcome(&self, decision: &Decision, verdict: Verdict) -> EngineResult<FeedbackOutcome> {
        let outcome = self.feedback.report_outcome(decision, verdict);
        if matches!(outcome, Ok(_) | Err(EngineError::FeedbackAlreadyGiven { .. })) {
            self.decisions.remove(&decision.alert_id);
        }
        let outcome = outcome?;

        if let Some(variant) = &decision.prompt_variant {
            self.variants.record_outcome(variant, verdict.is_correct());
            self.variants.check_for_promotion(decision.alert_type.as_str());
        }

        Ok(outcome)
    }

    /// Verdict on the latest decision this engine made for `alert_id`.
    /// Decisions leave the pending set once their feedback is committed.
    pub fn report_outcome_for(&self, alert_id: &str, verdict: Verdict) -> EngineResult<FeedbackOutcome> {
        match self.decision_for(alert_id) {
            Some(decision) => self.report_outcome(&decision, verdict),
            None => match self.stores.outcomes.get(alert_id) {
                Some(existing) => Err(EngineError::FeedbackAlreadyGiven {
                    alert_id: alert_id.to_string(),
                    existing: Box::new(existing),
                }),
                None => Err(EngineError::NotFound {
                    alert_id: alert_id.to_string(),
                }),
            },
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn policies(&self) -> &PolicyRegistry {
        &self.policies
    }

    pub fn stores(&self) -> &EngineStores {
        &self.stores
    }

    pub fn variants(&self) -> &VariantTracker {
        &self.variants
    }

    pub fn decision_for(&self, alert_id: &str) -> Option<Decision> {
        self.decisions.get(alert_id)
    }

    pub fn feedback_status(&self, alert_id: &str) -> FeedbackStatus {
        self.feedback.status(alert_id)
    }

    pub fn pattern_state(&self, pattern_id: &str) -> Option<PatternState> {
        self.stores.patterns.get(pattern_id)
    }

    pub fn edge_weight(&self, relation: &str) -> Option<f64> {
        self.stores.edges.get(relation)
    }

    pub fn pattern_snapshot(&self) -> PatternSnapshot {
        PatternSnapshot {
            patterns: self.stores.patterns.snapshot(),
            edges: self.stores.edges.snapshot(),
        }
    }

    pub fn active_overrides(&self) -> Vec<OverrideWindow> {
        self.stores.overrides.active()
    }

    pub fn conflict_history(&self) -> Vec<PolicyResolution> {
        self.stores.conflicts.history()
    }

    pub fn conflict(&self, audit_id: &str) -> Option<PolicyResolution> {
        self.stores.conflicts.get(audit_id)
    }

    pub fn conflict_for_alert(&self, alert_id: &str) -> Option<PolicyResolution> {
        self.stores.conflicts.by_alert(alert_id)
    }

    pub fn evolution_history(&self) -> Vec<EvolutionEvent> {
        self.stores.evolutions.history()
    }

    pub fn evolution_for_decision(&self, decision_id: &str) -> Option<EvolutionEvent> {
        self.stores.evolutions.by_decision(decision_id)
    }

    /// Most recent `n` clamp events
    pub fn clamp_events(&self, n: usize) -> Vec<ClampEvent> {
        self.audit.recent(n)
    }

    // ========================================================================
    // ADMIN
    // ========================================================================

    /// Set a pattern's state, clamped into bounds
    pub fn register_pattern(&self, pattern_id: &str, state: PatternState) {
        let state = clamp_pattern(&self.audit, pattern_id, state);
        self.stores.patterns.upsert(pattern_id, state);
    }

    /// Set an edge weight, clamped into bounds
    pub fn set_edge_weight(&self, relation: &str, weight: f64) {
        let weight = self.audit.clamp(Bounds::EDGE_WEIGHT, relation, "weight", weight);
        self.stores.edges.upsert(relation, weight);
    }
}

fn clamp_pattern(audit: &ClampAudit, pattern_id: &str, state: PatternState) -> PatternState {
    PatternState {
        confidence: audit.clamp(Bounds::CONFIDENCE, pattern_id, "confidence", state.confidence),
        false_positive_rate: audit.clamp(
            Bounds::FALSE_POSITIVE_RATE,
            pattern_id,
            "false_positive_rate",
            state.false_positive_rate,
        ),
        occurrence_count: state.occurrence_count,
    }
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("policies", &self.policies.len())
            .field("stores", &self.stores)
            .field("decisions", &self.decisions.len())
            .finish()
    }
}
