//! Evolution Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::store::PatternState;

// ============================================================================
// IMPACT TIER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactTier {
    Low,
    Medium,
    High,
}

impl ImpactTier {
    pub fn from_magnitude(magnitude: f64) -> Self {
        let magnitude = magnitude.abs();
        if magnitude >= 0.05 {
            ImpactTier::High
        } else if magnitude >= 0.02 {
            ImpactTier::Medium
        } else {
            ImpactTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactTier::Low => "low",
            ImpactTier::Medium => "medium",
            ImpactTier::High => "high",
        }
    }
}

impl std::fmt::Display for ImpactTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// EVOLUTION EVENT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionKind {
    PatternConfidence,
}

/// Immutable audit record of one bounded pattern adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionEvent {
    /// "EVO-XXXXXXXX"
    pub id: String,
    pub event_type: EvolutionKind,
    pub pattern_id: String,
    /// Decision that triggered the adjustment
    pub triggered_by: String,
    pub alert_id: String,
    pub before: PatternState,
    pub after: PatternState,
    pub magnitude: f64,
    pub impact: ImpactTier,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl EvolutionEvent {
    pub fn generate_id() -> String {
        let raw = uuid::Uuid::new_v4().simple().to_string();
        format!("EVO-{}", raw[..8].to_uppercase())
    }
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Why a decision did not evolve its pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum EvolutionSkip {
    GateBlocked,
    /// Action came from an override window
    Rerouted,
    NoPattern,
    InsufficientOccurrences { count: u64, required: u64 },
    AlreadyEvolved { event_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum EvolutionOutcome {
    Triggered(EvolutionEvent),
    Skipped(EvolutionSkip),
}

impl EvolutionOutcome {
    pub fn event(&self) -> Option<&EvolutionEvent> {
        match self {
            EvolutionOutcome::Triggered(event) => Some(event),
            EvolutionOutcome::Skipped(_) => None,
        }
    }

    pub fn is_triggered(&self) -> bool {
        matches!(self, EvolutionOutcome::Triggered(_))
    }
}
