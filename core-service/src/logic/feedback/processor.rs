//! Outcome Feedback Processor
//!
//! All state changes for one verdict happen inside the outcome ledger's
//! per-alert critical section: a rejected duplicate leaves pattern, edge
//! and override state exactly as the first verdict left them.

use std::sync::Arc;

use chrono::Utc;

use crate::error::{EngineError, EngineResult};
use crate::logic::bounds::{Bounds, ClampAudit};
use crate::logic::config::EngineConfig;
use crate::logic::decision::Decision;
use crate::logic::store::{EdgeStore, OutcomeLedger, OverrideStore, PatternState, PatternStore};
use super::types::*;

pub struct FeedbackProcessor {
    patterns: Arc<dyn PatternStore>,
    edges: Arc<dyn EdgeStore>,
    outcomes: Arc<dyn OutcomeLedger>,
    overrides: Arc<dyn OverrideStore>,
    audit: Arc<ClampAudit>,
    config: Arc<EngineConfig>,
}

impl FeedbackProcessor {
    pub fn new(
        patterns: Arc<dyn PatternStore>,
        edges: Arc<dyn EdgeStore>,
        outcomes: Arc<dyn OutcomeLedger>,
        overrides: Arc<dyn OverrideStore>,
        audit: Arc<ClampAudit>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            patterns,
            edges,
            outcomes,
            overrides,
            audit,
            config,
        }
    }

    /// Commit a verdict for `decision.alert_id`. Fails with
    /// `FeedbackAlreadyGiven` (carrying the original record) on repeat.
    pub fn report_outcome(&self, decision: &Decision, verdict: Verdict) -> EngineResult<FeedbackOutcome> {
        let mut consequence = String::new();
        let mut narrative = String::new();
        let mut installed: Option<OverrideWindow> = None;

        let committed = self.outcomes.commit_with(&decision.alert_id, &mut || {
            let graph_updates = match verdict {
                Verdict::Correct => {
                    let (updates, text) = self.reinforce(decision);
                    consequence = text;
                    updates
                }
                Verdict::Incorrect => {
                    let (updates, window) = self.penalize(decision);
                    consequence = format!(
                        "Pattern weakened. Threshold review triggered. Next {} similar alerts routed to {}.",
                        window.total, window.action
                    );
                    installed = Some(window);
                    updates
                }
            };
            narrative = narrate(decision, verdict, &graph_updates, installed.as_ref());

            OutcomeRecord {
                alert_id: decision.alert_id.clone(),
                decision_id: decision.decision_id.clone(),
                verdict,
                recorded_at: Utc::now(),
                graph_updates,
            }
        });

        match committed {
            Ok(record) => {
                log::info!(
                    "Feedback {} committed for alert {} (decision {}, {} updates)",
                    verdict,
                    record.alert_id,
                    record.decision_id,
                    record.graph_updates.len()
                );
                Ok(FeedbackOutcome {
                    record,
                    consequence,
                    override_installed: installed,
                    narrative,
                })
            }
            Err(existing) => {
                log::warn!(
                    "Rejected duplicate feedback for alert {} (already {} at {})",
                    existing.alert_id,
                    existing.verdict,
                    existing.recorded_at
                );
                Err(EngineError::FeedbackAlreadyGiven {
                    alert_id: decision.alert_id.clone(),
                    existing: Box::new(existing),
                })
            }
        }
    }

    pub fn status(&self, alert_id: &str) -> FeedbackStatus {
        FeedbackStatus::from_record(alert_id, self.outcomes.get(alert_id).as_ref())
    }

    // ========================================================================
    // VERDICT EFFECTS
    // ========================================================================

    fn seed(&self) -> PatternState {
        PatternState::new(
            self.config.seed.pattern_confidence,
            self.config.seed.false_positive_rate,
            0,
        )
    }

    /// Correct: small confidence + edge gain, one more precedent
    fn reinforce(&self, decision: &Decision) -> (Vec<GraphUpdate>, String) {
        let pattern_id = match &decision.pattern_id {
            Some(id) => id.as_str(),
            None => {
                return (
                    Vec::new(),
                    "Outcome recorded. No pattern linked, nothing to reinforce.".to_string(),
                )
            }
        };
        let step = &self.config.feedback;

        let (before, after) = self.patterns.update(pattern_id, self.seed(), &mut |s| PatternState {
            confidence: self.audit.step(
                Bounds::CONFIDENCE,
                pattern_id,
                "confidence",
                s.confidence,
                s.confidence + step.confidence_reward,
            ),
            occurrence_count: s.occurrence_count + 1,
            ..*s
        });

        let relation = self.config.edge_for(pattern_id);
        let (weight_before, weight_after) =
            self.edges
                .update(&relation, self.config.seed.edge_weight, &mut |w| {
                    self.audit
                        .step(Bounds::EDGE_WEIGHT, &relation, "weight", w, w + step.edge_reward)
                });

        let updates = vec![
            GraphUpdate {
                entity: pattern_id.to_string(),
                field: "confidence".to_string(),
                before: before.confidence,
                after: after.confidence,
                direction: Direction::Strengthened,
            },
            GraphUpdate {
                entity: relation.clone(),
                field: "weight".to_string(),
                before: weight_before,
                after: weight_after,
                direction: Direction::Strengthened,
            },
            GraphUpdate {
                entity: pattern_id.to_string(),
                field: "precedent_count".to_string(),
                before: before.occurrence_count as f64,
                after: after.occurrence_count as f64,
                direction: Direction::Strengthened,
            },
        ];

        (updates, "Pattern strengthened. Added to precedent library.".to_string())
    }

    /// Incorrect: steep confidence + edge loss, then an override window
    fn penalize(&self, decision: &Decision) -> (Vec<GraphUpdate>, OverrideWindow) {
        let step = &self.config.feedback;
        let mut updates = Vec::new();

        let key = match &decision.pattern_id {
            Some(pattern_id) => {
                let (before, after) =
                    self.patterns.update(pattern_id, self.seed(), &mut |s| PatternState {
                        confidence: self.audit.step(
                            Bounds::CONFIDENCE,
                            pattern_id,
                            "confidence",
                            s.confidence,
                            s.confidence - step.confidence_penalty,
                        ),
                        ..*s
                    });

                let relation = self.config.edge_for(pattern_id);
                let (weight_before, weight_after) =
                    self.edges
                        .update(&relation, self.config.seed.edge_weight, &mut |w| {
                            self.audit
                                .step(Bounds::EDGE_WEIGHT, &relation, "weight", w, w - step.edge_penalty)
                        });

                updates.push(GraphUpdate {
                    entity: pattern_id.clone(),
                    field: "confidence".to_string(),
                    before: before.confidence,
                    after: after.confidence,
                    direction: Direction::Weakened,
                });
                updates.push(GraphUpdate {
                    entity: relation,
                    field: "weight".to_string(),
                    before: weight_before,
                    after: weight_after,
                    direction: Direction::Weakened,
                });

                OverrideKey::Pattern(pattern_id.clone())
            }
            None => OverrideKey::Situation(decision.situation),
        };

        let window = OverrideWindow {
            key,
            action: step.override_action,
            remaining: step.override_window,
            total: step.override_window,
            reason: "Confidence drop after incorrect outcome".to_string(),
            installed_by_alert: decision.alert_id.clone(),
            installed_by_decision: decision.decision_id.clone(),
            installed_at: Utc::now(),
        };

        if let Some(previous) = self.overrides.install(window.clone()) {
            log::info!(
                "Override on {} refreshed ({} of {} remaining replaced)",
                previous.key,
                previous.remaining,
                previous.total
            );
        }
        log::info!(
            "Override installed on {}: next {} alerts -> {}",
            window.key,
            window.remaining,
            window.action
        );

        (updates, window)
    }
}

fn narrate(
    decision: &Decision,
    verdict: Verdict,
    updates: &[GraphUpdate],
    window: Option<&OverrideWindow>,
) -> String {
    let confidence = updates.iter().find(|u| u.field == "confidence");
    match (verdict, confidence) {
        (Verdict::Correct, Some(u)) => format!(
            "Decision confirmed correct. Pattern {} confidence increased to {:.1}% ({:+.1} points).",
            u.entity,
            u.after * 100.0,
            (u.after - u.before) * 100.0
        ),
        (Verdict::Incorrect, Some(u)) => format!(
            "Decision outcome negative. Pattern {} confidence dropped to {:.1}% ({:+.1} points). \
             The next {} similar alerts go to manual review.",
            u.entity,
            u.after * 100.0,
            (u.after - u.before) * 100.0,
            window.map_or(0, |w| w.total)
        ),
        (Verdict::Correct, None) => format!("Decision {} confirmed correct.", decision.decision_id),
        (Verdict::Incorrect, None) => format!(
            "Decision {} marked incorrect. The next {} {} alerts go to manual review.",
            decision.decision_id,
            window.map_or(0, |w| w.total),
            decision.situation
        ),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::context::Context;
    use crate::logic::decision::{evaluate_options, select_decision, Action};
    use crate::logic::situation::{classify, SituationCategory};
    use crate::logic::store::EngineStores;
    use proptest::prelude::*;
    use std::thread;

    fn processor(stores: &EngineStores) -> FeedbackProcessor {
        FeedbackProcessor::new(
            Arc::clone(&stores.patterns),
            Arc::clone(&stores.edges),
            Arc::clone(&stores.outcomes),
            Arc::clone(&stores.overrides),
            Arc::new(ClampAudit::new()),
            Arc::new(EngineConfig::default()),
        )
    }

    fn travel_decision(alert_id: &str) -> Decision {
        let ctx = Context::new(alert_id, "anomalous_login")
            .with_travel("Singapore")
            .with_vpn_match(true)
            .with_pattern("PAT-TRAVEL-001", 127, 0.20);
        let classification = classify(&ctx);
        select_decision(&ctx, &classification, &evaluate_options(classification.category))
    }

    fn seeded() -> EngineStores {
        let stores = EngineStores::in_memory();
        stores.patterns.upsert("PAT-TRAVEL-001", PatternState::new(0.94, 0.20, 127));
        stores.edges.upsert("User->TravelContext", 0.91);
        stores
    }

    #[test]
    fn test_correct_reinforces_gently() {
        let stores = seeded();
        let processor = processor(&stores);

        let outcome = processor
            .report_outcome(&travel_decision("ALERT-7823"), Verdict::Correct)
            .unwrap();

        let state = stores.patterns.get("PAT-TRAVEL-001").unwrap();
        assert!((state.confidence - 0.943).abs() < 1e-9);
        assert_eq!(state.occurrence_count, 128);
        assert!((stores.edges.get("User->TravelContext").unwrap() - 0.93).abs() < 1e-9);
        assert_eq!(outcome.record.graph_updates.len(), 3);
        assert!(outcome
            .record
            .graph_updates
            .iter()
            .all(|u| u.direction == Direction::Strengthened));
        assert!(outcome.override_installed.is_none());
        assert!(stores.overrides.active().is_empty());
    }

    #[test]
    fn test_incorrect_penalizes_and_installs_override() {
        let stores = seeded();
        let processor = processor(&stores);
        let decision = travel_decision("ALERT-7823");

        let outcome = processor.report_outcome(&decision, Verdict::Incorrect).unwrap();

        let state = stores.patterns.get("PAT-TRAVEL-001").unwrap();
        assert!((state.confidence - 0.88).abs() < 1e-9);
        assert_eq!(state.occurrence_count, 127);
        assert!((stores.edges.get("User->TravelContext").unwrap() - 0.86).abs() < 1e-9);

        let window = outcome.override_installed.expect("override");
        assert_eq!(window.key, OverrideKey::Pattern("PAT-TRAVEL-001".to_string()));
        assert_eq!(window.action, Action::EscalateTier2);
        assert_eq!(window.remaining, 5);
        assert_eq!(stores.overrides.active(), vec![window]);
    }

    #[test]
    fn test_repeat_is_rejected_without_mutation() {
        let stores = seeded();
        let processor = processor(&stores);
        let decision = travel_decision("ALERT-7823");

        let first = processor.report_outcome(&decision, Verdict::Incorrect).unwrap();
        let after_first = stores.patterns.get("PAT-TRAVEL-001");
        let edge_after_first = stores.edges.get("User->TravelContext");

        let err = processor.report_outcome(&decision, Verdict::Correct).unwrap_err();
        match err {
            EngineError::FeedbackAlreadyGiven { alert_id, existing } => {
                assert_eq!(alert_id, "ALERT-7823");
                assert_eq!(*existing, first.record);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(stores.patterns.get("PAT-TRAVEL-001"), after_first);
        assert_eq!(stores.edges.get("User->TravelContext"), edge_after_first);
        assert_eq!(processor.status("ALERT-7823").verdict, Some(Verdict::Incorrect));
        assert!(!processor.status("ALERT-7823").can_modify);
    }

    #[test]
    fn test_incorrect_without_pattern_keys_override_by_situation() {
        let stores = EngineStores::in_memory();
        let processor = processor(&stores);
        let ctx = Context::new("ALERT-9", "data_exfiltration");
        let classification = classify(&ctx);
        let decision =
            select_decision(&ctx, &classification, &evaluate_options(classification.category));

        let outcome = processor.report_outcome(&decision, Verdict::Incorrect).unwrap();
        assert!(outcome.record.graph_updates.is_empty());
        assert_eq!(
            outcome.override_installed.map(|w| w.key),
            Some(OverrideKey::Situation(SituationCategory::DataExfilAttempt))
        );
        assert!(stores.patterns.snapshot().is_empty());
    }

    #[test]
    fn test_unseen_pattern_uses_seed() {
        let stores = EngineStores::in_memory();
        let processor = processor(&stores);
        let mut decision = travel_decision("ALERT-10");
        decision.pattern_id = Some("PAT-NEW".to_string());

        processor.report_outcome(&decision, Verdict::Incorrect).unwrap();
        let state = stores.patterns.get("PAT-NEW").unwrap();
        assert!((state.confidence - 0.85).abs() < 1e-9);
        assert!((stores.edges.get("User->PAT-NEW").unwrap() - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_concurrent_reports_commit_exactly_once() {
        let stores = seeded();
        let processor = Arc::new(processor(&stores));
        let decision = Arc::new(travel_decision("ALERT-RACE"));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let processor = Arc::clone(&processor);
                let decision = Arc::clone(&decision);
                thread::spawn(move || {
                    let verdict = if i % 2 == 0 { Verdict::Incorrect } else { Verdict::Correct };
                    processor.report_outcome(&decision, verdict).is_ok()
                })
            })
            .collect();

        let committed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(committed, 1);

        let confidence = stores.patterns.get("PAT-TRAVEL-001").unwrap().confidence;
        let verdict = processor.status("ALERT-RACE").verdict.unwrap();
        let expected = if verdict.is_correct() { 0.943 } else { 0.88 };
        assert!((confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn test_saturating_penalties_leave_no_clamp_events() {
        let stores = seeded();
        let audit = Arc::new(ClampAudit::new());
        let processor = FeedbackProcessor::new(
            Arc::clone(&stores.patterns),
            Arc::clone(&stores.edges),
            Arc::clone(&stores.outcomes),
            Arc::clone(&stores.overrides),
            Arc::clone(&audit),
            Arc::new(EngineConfig::default()),
        );

        for i in 0..10 {
            processor
                .report_outcome(&travel_decision(&format!("ALERT-S{}", i)), Verdict::Incorrect)
                .unwrap();
        }

        assert_eq!(stores.patterns.get("PAT-TRAVEL-001").unwrap().confidence, 0.50);
        assert_eq!(stores.edges.get("User->TravelContext"), Some(0.50));
        assert!(audit.is_empty());
    }

    proptest! {
        #[test]
        fn prop_state_stays_bounded(verdicts in proptest::collection::vec(any::<bool>(), 1..120)) {
            let stores = seeded();
            let processor = processor(&stores);

            for (i, correct) in verdicts.iter().enumerate() {
                let decision = travel_decision(&format!("ALERT-{}", i));
                let verdict = if *correct { Verdict::Correct } else { Verdict::Incorrect };
                processor.report_outcome(&decision, verdict).unwrap();

                let state = stores.patterns.get("PAT-TRAVEL-001").unwrap();
                let weight = stores.edges.get("User->TravelContext").unwrap();
                prop_assert!(Bounds::CONFIDENCE.contains(state.confidence));
                prop_assert!(Bounds::EDGE_WEIGHT.contains(weight));
            }
        }
    }
}
