//! Situation Classifier
//!
//! Input: Context. Output: SituationClassification.
//! Deterministic - no randomness, no clock, no shared state.

use crate::logic::context::Context;
use super::rules::{self, ClassificationRule, CLASSIFICATION_RULES};
use super::types::SituationClassification;

/// Classify with the built-in precedence table
pub fn classify(context: &Context) -> SituationClassification {
    classify_with_rules(context, CLASSIFICATION_RULES)
}

/// Classify with a caller-supplied rule table (first match wins)
pub fn classify_with_rules(
    context: &Context,
    rules: &[ClassificationRule],
) -> SituationClassification {
    for rule in rules {
        if (rule.matches)(context) {
            let result = (rule.classify)(context);
            log::debug!(
                "Alert {} classified as {} ({:.2}) by rule {}",
                context.alert_id,
                result.category,
                result.confidence,
                rule.name
            );
            return result;
        }
    }

    log::debug!("Alert {} matched no situation rule", context.alert_id);
    rules::unknown(context)
}

// ============================================================================
// TESTS
// ============================================================================
