//! Gate Types

use serde::{Deserialize, Serialize};

use super::rules;

// ============================================================================
// GATE KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    Faithfulness,
    SafeAction,
    PlaybookMatch,
    SlaCompliance,
}

impl GateKind {
    pub const ALL: [GateKind; 4] = [
        GateKind::Faithfulness,
        GateKind::SafeAction,
        GateKind::PlaybookMatch,
        GateKind::SlaCompliance,
    ];

    /// Position in `GateKind::ALL` and in `GateResult::checks`
    pub fn index(&self) -> usize {
        match self {
            GateKind::Faithfulness => 0,
            GateKind::SafeAction => 1,
            GateKind::PlaybookMatch => 2,
            GateKind::SlaCompliance => 3,
        }
    }

    /// Display name used in audit output
    pub fn name(&self) -> &'static str {
        match self {
            GateKind::Faithfulness => "Faithfulness",
            GateKind::SafeAction => "Safe Action",
            GateKind::PlaybookMatch => "Playbook Match",
            GateKind::SlaCompliance => "SLA Compliance",
        }
    }

    pub fn threshold(&self) -> f64 {
        match self {
            GateKind::Faithfulness => rules::FAITHFULNESS_THRESHOLD,
            GateKind::SafeAction => rules::SAFE_ACTION_THRESHOLD,
            GateKind::PlaybookMatch => rules::PLAYBOOK_THRESHOLD,
            GateKind::SlaCompliance => rules::SLA_THRESHOLD,
        }
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// GATE CHECK
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateCheck {
    pub kind: GateKind,
    pub name: String,
    pub score: f64,
    pub threshold: f64,
    /// score >= threshold
    pub passed: bool,
    pub message: String,
}

impl GateCheck {
    pub fn new(kind: GateKind, score: f64, message: impl Into<String>) -> Self {
        let threshold = kind.threshold();
        Self {
            kind,
            name: kind.name().to_string(),
            score,
            threshold,
            passed: score >= threshold,
            message: message.into(),
        }
    }
}

// ============================================================================
// GATE RESULT
// ============================================================================

/// Exactly four checks, in `GateKind::ALL` order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
    pub checks: [GateCheck; 4],
    pub overall_passed: bool,
    pub overall_score: f64,
}

impl GateResult {
    /// One check per kind, in any order; stored in `GateKind::ALL` order
    pub fn from_checks(mut checks: [GateCheck; 4]) -> Self {
        checks.sort_by_key(|c| c.kind.index());
        let overall_passed = checks.iter().all(|c| c.passed);
        let overall_score = checks.iter().map(|c| c.score).sum::<f64>() / checks.len() as f64;
        Self {
            checks,
            overall_passed,
            overall_score,
        }
    }

    pub fn check(&self, kind: GateKind) -> &GateCheck {
        &self.checks[kind.index()]
    }

    pub fn failed_checks(&self) -> Vec<&GateCheck> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }
}
