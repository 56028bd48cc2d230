//! Evolution Tracker
//!
//! Fires only for a gate-passing, non-rerouted decision whose pattern has
//! more than `min_occurrences` occurrences. At most one event per decision.

use std::sync::Arc;

use chrono::Utc;

use crate::logic::bounds::{Bounds, ClampAudit};
use crate::logic::config::EngineConfig;
use crate::logic::context::Context;
use crate::logic::decision::Decision;
use crate::logic::gate::GateResult;
use crate::logic::store::{EvolutionLog, PatternState, PatternStore};
use super::types::*;

pub struct EvolutionTracker {
    patterns: Arc<dyn PatternStore>,
    log: Arc<dyn EvolutionLog>,
    audit: Arc<ClampAudit>,
    config: Arc<EngineConfig>,
}

impl EvolutionTracker {
    pub fn new(
        patterns: Arc<dyn PatternStore>,
        log: Arc<dyn EvolutionLog>,
        audit: Arc<ClampAudit>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            patterns,
            log,
            audit,
            config,
        }
    }

    /// State assumed for a pattern the store has not seen yet. The
    /// Context's FP rate is caller input and is clamped into bounds.
    pub fn seed_for(&self, context: &Context) -> PatternState {
        let seed = &self.config.seed;
        let fp_rate = if context.fp_rate > 0.0 {
            let entity = context.pattern_id.as_deref().unwrap_or(&context.alert_id);
            self.audit
                .clamp(Bounds::FALSE_POSITIVE_RATE, entity, "false_positive_rate", context.fp_rate)
        } else {
            seed.false_positive_rate
        };
        PatternState::new(seed.pattern_confidence, fp_rate, context.pattern_count)
    }

    pub fn observe(&self, decision: &Decision, gate: &GateResult, context: &Context) -> EvolutionOutcome {
        if !gate.overall_passed {
            return EvolutionOutcome::Skipped(EvolutionSkip::GateBlocked);
        }
        if decision.is_rerouted() {
            return EvolutionOutcome::Skipped(EvolutionSkip::Rerouted);
        }
        let pattern_id = match &decision.pattern_id {
            Some(id) => id.as_str(),
            None => return EvolutionOutcome::Skipped(EvolutionSkip::NoPattern),
        };

        let count = self
            .patterns
            .get(pattern_id)
            .map_or(context.pattern_count, |s| s.occurrence_count);
        let required = self.config.evolution.min_occurrences;
        if count <= required {
            log::debug!(
                "Pattern {} has {} occurrences (needs > {}), no evolution",
                pattern_id,
                count,
                required
            );
            return EvolutionOutcome::Skipped(EvolutionSkip::InsufficientOccurrences { count, required });
        }

        let seed = self.seed_for(context);
        let recorded = self
            .log
            .record_with(&decision.decision_id, &mut || {
                Some(self.evolve(pattern_id, seed, decision))
            });

        match recorded {
            Ok(Some(event)) => {
                log::info!(
                    "Evolution {} on {}: {} ({} impact)",
                    event.id,
                    event.pattern_id,
                    event.description,
                    event.impact
                );
                EvolutionOutcome::Triggered(event)
            }
            // record_with only returns Ok(None) when the builder declines
            Ok(None) => EvolutionOutcome::Skipped(EvolutionSkip::NoPattern),
            Err(existing) => {
                log::warn!(
                    "Decision {} already evolved pattern {} ({})",
                    decision.decision_id,
                    existing.pattern_id,
                    existing.id
                );
                EvolutionOutcome::Skipped(EvolutionSkip::AlreadyEvolved { event_id: existing.id })
            }
        }
    }

    /// Apply the step to the stored state and build the event
    fn evolve(&self, pattern_id: &str, seed: PatternState, decision: &Decision) -> EvolutionEvent {
        let step = &self.config.evolution;
        let (before, after) = self.patterns.update(pattern_id, seed, &mut |current| PatternState {
            confidence: self.audit.step(
                Bounds::CONFIDENCE,
                pattern_id,
                "confidence",
                current.confidence,
                current.confidence + step.confidence_step,
            ),
            false_positive_rate: self.audit.step(
                Bounds::FALSE_POSITIVE_RATE,
                pattern_id,
                "false_positive_rate",
                current.false_positive_rate,
                current.false_positive_rate - step.false_positive_step,
            ),
            occurrence_count: current.occurrence_count,
        });

        let confidence_delta = after.confidence - before.confidence;
        let fp_delta = after.false_positive_rate - before.false_positive_rate;
        let magnitude = confidence_delta.abs().max(fp_delta.abs());

        EvolutionEvent {
            id: EvolutionEvent::generate_id(),
            event_type: EvolutionKind::PatternConfidence,
            pattern_id: pattern_id.to_string(),
            triggered_by: decision.decision_id.clone(),
            alert_id: decision.alert_id.clone(),
            before,
            after,
            magnitude,
            impact: ImpactTier::from_magnitude(magnitude),
            description: format!(
                "Pattern {} confidence increased: {:.0}% -> {:.0}% ({:+.0} pts), FP rate {:.0}% -> {:.0}%",
                pattern_id,
                before.confidence * 100.0,
                after.confidence * 100.0,
                confidence_delta * 100.0,
                before.false_positive_rate * 100.0,
                after.false_positive_rate * 100.0
            ),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::decision::{evaluate_options, select_decision, Action};
    use crate::logic::gate::evaluate_gates;
    use crate::logic::situation::classify;
    use crate::logic::store::{EngineStores, InMemoryEvolutionLog, InMemoryPatternStore};

    fn tracker() -> (EvolutionTracker, EngineStores) {
        let stores = EngineStores::in_memory();
        let tracker = EvolutionTracker::new(
            Arc::clone(&stores.patterns),
            Arc::clone(&stores.evolutions),
            Arc::new(ClampAudit::new()),
            Arc::new(EngineConfig::default()),
        );
        (tracker, stores)
    }

    fn travel(occurrences: u64) -> Context {
        Context::new("ALERT-7823", "anomalous_login")
            .with_travel("Singapore")
            .with_vpn_match(true)
            .with_mfa(true)
            .with_known_device(true)
            .with_pattern("PAT-TRAVEL-NEW", occurrences, 0.20)
    }

    fn run(ctx: &Context) -> (Decision, GateResult) {
        let classification = classify(ctx);
        let decision =
            select_decision(ctx, &classification, &evaluate_options(classification.category));
        let config = EngineConfig::default();
        let gate = evaluate_gates(
            &decision,
            ctx,
            "Traveling to Singapore, VPN location matches, MFA passed.",
            &config.pattern_keywords,
        );
        (decision, gate)
    }

    #[test]
    fn test_evolution_fires_above_threshold() {
        let (tracker, stores) = tracker();
        let ctx = travel(127);
        let (decision, gate) = run(&ctx);
        assert!(gate.overall_passed);

        let outcome = tracker.observe(&decision, &gate, &ctx);
        let event = outcome.event().expect("event");
        assert_eq!(event.before.confidence, 0.91);
        assert!((event.after.confidence - 0.94).abs() < 1e-9);
        assert!((event.after.false_positive_rate - 0.17).abs() < 1e-9);
        assert_eq!(event.impact, ImpactTier::Medium);
        assert_eq!(event.triggered_by, decision.decision_id);
        assert_eq!(stores.patterns.get("PAT-TRAVEL-NEW"), Some(event.after));
    }

    #[test]
    fn test_threshold_is_strict() {
        let (tracker, stores) = tracker();
        let ctx = travel(100);
        let (decision, gate) = run(&ctx);

        let outcome = tracker.observe(&decision, &gate, &ctx);
        assert_eq!(
            outcome,
            EvolutionOutcome::Skipped(EvolutionSkip::InsufficientOccurrences { count: 100, required: 100 })
        );
        assert!(stores.patterns.get("PAT-TRAVEL-NEW").is_none());
        assert!(stores.evolutions.is_empty());
    }

    #[test]
    fn test_blocked_gate_never_evolves() {
        let (tracker, stores) = tracker();
        let ctx = Context::new("A-2", "phishing")
            .with_known_campaign(true)
            .with_asset("dc-01", "critical")
            .with_pattern("PAT-PHISH-KNOWN", 500, 0.10);
        let (decision, gate) = run(&ctx);
        assert_eq!(decision.action, Action::AutoRemediate);
        assert!(!gate.overall_passed);

        assert_eq!(
            tracker.observe(&decision, &gate, &ctx),
            EvolutionOutcome::Skipped(EvolutionSkip::GateBlocked)
        );
        assert!(stores.evolutions.is_empty());
    }

    #[test]
    fn test_rerouted_decision_never_evolves() {
        let (tracker, _) = tracker();
        let ctx = travel(500);
        let (mut decision, gate) = run(&ctx);
        decision.reroute(Action::EscalateTier2);

        assert_eq!(
            tracker.observe(&decision, &gate, &ctx),
            EvolutionOutcome::Skipped(EvolutionSkip::Rerouted)
        );
    }

    #[test]
    fn test_one_event_per_decision() {
        let (tracker, stores) = tracker();
        let ctx = travel(500);
        let (decision, gate) = run(&ctx);

        let first = tracker.observe(&decision, &gate, &ctx);
        let second = tracker.observe(&decision, &gate, &ctx);
        let first_id = first.event().map(|e| e.id.clone()).expect("event");

        assert_eq!(
            second,
            EvolutionOutcome::Skipped(EvolutionSkip::AlreadyEvolved { event_id: first_id })
        );
        assert_eq!(stores.evolutions.len(), 1);
        assert!((stores.patterns.get("PAT-TRAVEL-NEW").map(|s| s.confidence).unwrap_or(0.0) - 0.94).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_context_fp_rate_is_clamped() {
        let audit = Arc::new(ClampAudit::new());
        let stores = EngineStores::in_memory();
        let tracker = EvolutionTracker::new(
            Arc::clone(&stores.patterns),
            Arc::clone(&stores.evolutions),
            Arc::clone(&audit),
            Arc::new(EngineConfig::default()),
        );

        let ctx = travel(500).with_pattern("PAT-TRAVEL-NEW", 500, 1.7);
        let (decision, gate) = run(&ctx);
        let event = tracker.observe(&decision, &gate, &ctx).event().cloned().expect("event");

        assert_eq!(event.before.false_positive_rate, 1.0);
        assert!(Bounds::FALSE_POSITIVE_RATE.contains(event.after.false_positive_rate));
        assert_eq!(audit.len(), 1);
        assert_eq!(audit.recent(1)[0].attempted, 1.7);
    }

    #[test]
    fn test_bounds_hold_at_cap_and_floor() {
        let patterns = Arc::new(InMemoryPatternStore::new());
        patterns.upsert("PAT-TRAVEL-NEW", PatternState::new(0.98, 0.06, 900));
        let audit = Arc::new(ClampAudit::new());
        let tracker = EvolutionTracker::new(
            patterns.clone(),
            Arc::new(InMemoryEvolutionLog::new()),
            Arc::clone(&audit),
            Arc::new(EngineConfig::default()),
        );

        let ctx = travel(900);
        let (decision, gate) = run(&ctx);
        let outcome = tracker.observe(&decision, &gate, &ctx);

        let event = outcome.event().expect("event");
        assert_eq!(event.after.confidence, 0.99);
        assert_eq!(event.after.false_positive_rate, 0.05);
        // saturating at the cap and floor is expected, not a violation
        assert!(audit.is_empty());
    }
}
