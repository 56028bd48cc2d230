//! Gate Rules
//!
//! Thresholds and calibrated scores. These are reproduced constants, not
//! derived values.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::logic::decision::Action;

// ============================================================================
// THRESHOLDS
// ============================================================================

pub const FAITHFULNESS_THRESHOLD: f64 = 0.85;
pub const SAFE_ACTION_THRESHOLD: f64 = 1.0;
pub const PLAYBOOK_THRESHOLD: f64 = 0.80;
pub const SLA_THRESHOLD: f64 = 0.90;

// ============================================================================
// FAITHFULNESS SCORES
// ============================================================================

pub const FAITHFULNESS_BASE: f64 = 0.60;
/// Narration mentions an action keyword
pub const FAITHFULNESS_ACTION_MATCH: f64 = 0.88;
/// Narration mentions a keyword of the decision's pattern
pub const FAITHFULNESS_PATTERN_MATCH: f64 = 0.94;

/// Travel false-positive close, by count of travel evidence terms (1, 2, 3+)
pub const FAITHFULNESS_TRAVEL_ONE: f64 = 0.88;
pub const FAITHFULNESS_TRAVEL_TWO: f64 = 0.92;
pub const FAITHFULNESS_TRAVEL_THREE: f64 = 0.96;

// ============================================================================
// OTHER CHECK SCORES
// ============================================================================

pub const PLAYBOOK_ATTACHED: f64 = 0.94;
pub const PLAYBOOK_MISSING: f64 = 0.70;

pub const SLA_AUTOMATED: f64 = 0.98;
pub const SLA_MANUAL: f64 = 0.92;

// ============================================================================
// KEYWORD TABLES
// ============================================================================

/// Lower-case terms that show the narration supports the action
pub fn action_keywords(action: Action) -> &'static [&'static str] {
    match action {
        Action::FalsePositiveClose => &["false positive", "legitimate", "expected", "travel", "authorized"],
        Action::AutoRemediate => &["remediate", "isolate", "quarantine", "contain"],
        Action::EscalateIncident => &["incident", "critical", "escalate", "security team"],
        Action::EscalateTier2 => &["review", "investigate", "analyst", "tier 2"],
        Action::EnrichAndWait => &["context", "information", "gather", "enrich"],
    }
}

/// Built-in pattern keyword table, copied into `EngineConfig::default()`
pub static DEFAULT_PATTERN_KEYWORDS: Lazy<HashMap<String, Vec<String>>> = Lazy::new(|| {
    let table: [(&str, &[&str]); 4] = [
        (
            "PAT-TRAVEL-001",
            &["travel", "traveling", "trip", "location", "destination"],
        ),
        ("PAT-PHISH-KNOWN", &["phishing", "campaign", "known", "signature"]),
        ("PAT-PHISH-001", &["phishing", "campaign", "known", "signature"]),
        ("PAT-MALWARE-ISOLATE", &["malware", "isolate", "infected"]),
    ];

    table
        .iter()
        .map(|(id, words)| {
            (
                id.to_string(),
                words.iter().map(|w| w.to_string()).collect(),
            )
        })
        .collect()
});
