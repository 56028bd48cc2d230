//! Faithfulness Scoring
//!
//! Keyword heuristic: does the narration mention what the decision is
//! based on. Later stages overwrite earlier ones, they do not accumulate.

use std::collections::HashMap;

use crate::logic::context::Context;
use crate::logic::decision::{Action, Decision};
use crate::logic::situation::SituationCategory;
use super::rules::*;

pub fn faithfulness_score(
    decision: &Decision,
    context: &Context,
    narration: &str,
    pattern_keywords: &HashMap<String, Vec<String>>,
) -> f64 {
    let text = narration.to_lowercase();
    let mut score = FAITHFULNESS_BASE;

    // Stage 1: action keyword
    if action_keywords(decision.action).iter().any(|k| text.contains(k)) {
        score = FAITHFULNESS_ACTION_MATCH;
    }

    // Stage 2: pattern keyword
    if let Some(keywords) = decision
        .pattern_id
        .as_ref()
        .and_then(|id| pattern_keywords.get(id))
    {
        if keywords.iter().any(|k| text.contains(&k.to_lowercase())) {
            score = FAITHFULNESS_PATTERN_MATCH;
        }
    }

    // Stage 3: travel evidence for a travel false-positive close
    if decision.situation == SituationCategory::TravelLoginAnomaly
        && decision.action == Action::FalsePositiveClose
    {
        match travel_indicators(context, &text) {
            0 => {}
            1 => score = FAITHFULNESS_TRAVEL_ONE,
            2 => score = FAITHFULNESS_TRAVEL_TWO,
            _ => score = FAITHFULNESS_TRAVEL_THREE,
        }
    }

    log::debug!(
        "Faithfulness for {} ({}): {:.2}",
        decision.decision_id,
        decision.action,
        score
    );
    score
}

/// Count of travel evidence groups mentioned (0-4)
fn travel_indicators(context: &Context, text: &str) -> usize {
    let destination = context
        .travel_destination
        .as_deref()
        .map(str::to_lowercase)
        .filter(|d| !d.is_empty())
        .map_or(false, |d| text.contains(&d));

    [
        destination,
        text.contains("travel"),
        text.contains("vpn") || text.contains("location"),
        text.contains("mfa") || text.contains("auth"),
    ]
    .iter()
    .filter(|hit| **hit)
    .count()
}
