//! Decision Selector
//!
//! Picks the highest-scoring option. Ties keep the earlier option.

use chrono::Utc;

use crate::logic::context::Context;
use crate::logic::situation::SituationClassification;
use super::types::{Action, Decision, ResponseOption};

/// Confidence recorded when no option is available
pub const MANUAL_REVIEW_CONFIDENCE: f64 = 0.50;

pub fn select_decision(
    context: &Context,
    classification: &SituationClassification,
    options: &[ResponseOption],
) -> Decision {
    let mut best: Option<&ResponseOption> = None;
    for option in options {
        match best {
            Some(current) if option.score <= current.score => {}
            _ => best = Some(option),
        }
    }

    let (action, confidence, playbook_id) = match best {
        Some(option) => (option.action, option.score, option.playbook_id.clone()),
        None => {
            log::warn!(
                "No options for alert {} ({}) - falling back to manual review",
                context.alert_id,
                classification.category
            );
            (Action::EscalateTier2, MANUAL_REVIEW_CONFIDENCE, None)
        }
    };

    let decision = Decision {
        decision_id: Decision::generate_id(),
        alert_id: context.alert_id.clone(),
        alert_type: context.alert_type.clone(),
        situation: classification.category,
        action,
        confidence,
        pattern_id: context.pattern_id.clone(),
        playbook_id,
        prompt_variant: None,
        rerouted_from: None,
        decided_at: Utc::now(),
    };

    log::debug!(
        "Decision {} for alert {}: {} ({:.2})",
        decision.decision_id,
        decision.alert_id,
        decision.action,
        decision.confidence
    );

    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::decision::evaluate_options;
    use crate::logic::situation::{classify, SituationCategory};

    #[test]
    fn test_selects_top_option() {
        let ctx = Context::new("ALERT-1", "phishing")
            .with_known_campaign(true)
            .with_pattern("PAT-PHISH-KNOWN", 340, 0.11);
        let classification = classify(&ctx);
        let options = evaluate_options(classification.category);

        let decision = select_decision(&ctx, &classification, &options);
        assert_eq!(decision.action, Action::AutoRemediate);
        assert_eq!(decision.confidence, 0.94);
        assert_eq!(decision.playbook_id.as_deref(), Some("PB-PHISH-AUTO"));
        assert_eq!(decision.pattern_id.as_deref(), Some("PAT-PHISH-KNOWN"));
        assert_eq!(decision.situation, SituationCategory::KnownPhishingCampaign);
    }

    #[test]
    fn test_tie_keeps_first() {
        let ctx = Context::new("ALERT-2", "other");
        let classification = classify(&ctx);
        let options = vec![
            ResponseOption::new(Action::EnrichAndWait, 0.6, &[], Some("PB-A")),
            ResponseOption::new(Action::EscalateTier2, 0.6, &[], Some("PB-B")),
        ];
        let decision = select_decision(&ctx, &classification, &options);
        assert_eq!(decision.action, Action::EnrichAndWait);
    }

    #[test]
    fn test_empty_options_fall_back_to_manual_review() {
        let ctx = Context::new("ALERT-3", "other");
        let classification = classify(&ctx);
        let decision = select_decision(&ctx, &classification, &[]);
        assert_eq!(decision.action, Action::EscalateTier2);
        assert_eq!(decision.confidence, MANUAL_REVIEW_CONFIDENCE);
        assert!(decision.playbook_id.is_none());
    }

    #[test]
    fn test_reroute_keeps_original() {
        let ctx = Context::new("ALERT-4", "anomalous_login").with_travel("Paris");
        let classification = classify(&ctx);
        let mut decision =
            select_decision(&ctx, &classification, &evaluate_options(classification.category));
        assert_eq!(decision.action, Action::FalsePositiveClose);

        decision.reroute(Action::EscalateTier2);
        assert_eq!(decision.action, Action::EscalateTier2);
        assert_eq!(decision.rerouted_from, Some(Action::FalsePositiveClose));
        assert!(decision.is_rerouted());
    }
}
