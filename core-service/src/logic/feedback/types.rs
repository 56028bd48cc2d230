//! Feedback Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::decision::Action;
use crate::logic::situation::SituationCategory;

// ============================================================================
// VERDICT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Correct => "correct",
            Verdict::Incorrect => "incorrect",
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// GRAPH UPDATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Strengthened,
    Weakened,
}

/// One entity field changed by a verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphUpdate {
    /// Pattern id or relation name
    pub entity: String,
    pub field: String,
    pub before: f64,
    pub after: f64,
    pub direction: Direction,
}

// ============================================================================
// OVERRIDE WINDOW
// ============================================================================

/// What an override window matches on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "value", rename_all = "snake_case")]
pub enum OverrideKey {
    Pattern(String),
    /// Used when the wrong decision had no pattern
    Situation(SituationCategory),
}

impl std::fmt::Display for OverrideKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverrideKey::Pattern(id) => write!(f, "pattern {}", id),
            OverrideKey::Situation(category) => write!(f, "situation {}", category),
        }
    }
}

/// Reroute the next `remaining` matching alerts to `action`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideWindow {
    pub key: OverrideKey,
    pub action: Action,
    pub remaining: u32,
    pub total: u32,
    pub reason: String,
    pub installed_by_alert: String,
    pub installed_by_decision: String,
    pub installed_at: DateTime<Utc>,
}

// ============================================================================
// OUTCOME RECORD
// ============================================================================

/// Write-once verdict on one alert's decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub alert_id: String,
    pub decision_id: String,
    pub verdict: Verdict,
    pub recorded_at: DateTime<Utc>,
    pub graph_updates: Vec<GraphUpdate>,
}

/// Returned to the caller that committed a verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackOutcome {
    pub record: OutcomeRecord,
    pub consequence: String,
    pub override_installed: Option<OverrideWindow>,
    pub narrative: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStatus {
    pub alert_id: String,
    pub has_feedback: bool,
    pub verdict: Option<Verdict>,
    pub decision_id: Option<String>,
    pub recorded_at: Option<DateTime<Utc>>,
    /// Always false once feedback exists
    pub can_modify: bool,
}

impl FeedbackStatus {
    pub fn from_record(alert_id: &str, record: Option<&OutcomeRecord>) -> Self {
        match record {
            Some(record) => Self {
                alert_id: alert_id.to_string(),
                has_feedback: true,
                verdict: Some(record.verdict),
                decision_id: Some(record.decision_id.clone()),
                recorded_at: Some(record.recorded_at),
                can_modify: false,
            },
            None => Self {
                alert_id: alert_id.to_string(),
                has_feedback: false,
                verdict: None,
                decision_id: None,
                recorded_at: None,
                can_modify: true,
            },
        }
    }
}
