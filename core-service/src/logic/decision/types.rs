//! Decision Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::context::AlertType;
use crate::logic::situation::SituationCategory;

// ============================================================================
// ACTION
// ============================================================================

/// Response action the engine can recommend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    FalsePositiveClose,
    AutoRemediate,
    EnrichAndWait,
    EscalateTier2,
    EscalateIncident,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::FalsePositiveClose => "false_positive_close",
            Action::AutoRemediate => "auto_remediate",
            Action::EnrichAndWait => "enrich_and_wait",
            Action::EscalateTier2 => "escalate_tier2",
            Action::EscalateIncident => "escalate_incident",
        }
    }

    /// Actions executed without a human in the loop
    pub fn is_automated(&self) -> bool {
        matches!(self, Action::FalsePositiveClose | Action::AutoRemediate)
    }

    /// Actions that hand the alert to a human
    pub fn is_escalation(&self) -> bool {
        matches!(self, Action::EscalateTier2 | Action::EscalateIncident)
    }

    /// Static cost / time / risk table for reporting
    pub fn estimate(&self) -> ResolutionEstimate {
        match self {
            Action::FalsePositiveClose => ResolutionEstimate::new(8.0, 2, RiskTier::Low),
            Action::AutoRemediate => ResolutionEstimate::new(25.0, 5, RiskTier::Medium),
            Action::EnrichAndWait => ResolutionEstimate::new(40.0, 30, RiskTier::Medium),
            Action::EscalateTier2 => ResolutionEstimate::new(127.0, 45, RiskTier::Low),
            Action::EscalateIncident => ResolutionEstimate::new(450.0, 240, RiskTier::High),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RESOLUTION ESTIMATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionEstimate {
    pub cost_usd: f64,
    pub minutes: u32,
    pub risk: RiskTier,
}

impl ResolutionEstimate {
    pub const fn new(cost_usd: f64, minutes: u32, risk: RiskTier) -> Self {
        Self {
            cost_usd,
            minutes,
            risk,
        }
    }
}

// ============================================================================
// RESPONSE OPTION
// ============================================================================

/// One scored candidate action for a situation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseOption {
    pub action: Action,
    /// 0.0 - 1.0
    pub score: f64,
    pub factors: Vec<String>,
    pub playbook_id: Option<String>,
    pub estimate: ResolutionEstimate,
}

impl ResponseOption {
    pub fn new(action: Action, score: f64, factors: &[&str], playbook_id: Option<&str>) -> Self {
        Self {
            action,
            score,
            factors: factors.iter().map(|f| f.to_string()).collect(),
            playbook_id: playbook_id.map(str::to_string),
            estimate: action.estimate(),
        }
    }
}

// ============================================================================
// DECISION
// ============================================================================

/// Selected action for one alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// "DEC-XXXXXXXX"
    pub decision_id: String,
    pub alert_id: String,
    pub alert_type: AlertType,
    pub situation: SituationCategory,
    pub action: Action,
    /// Score of the selected option
    pub confidence: f64,
    pub pattern_id: Option<String>,
    pub playbook_id: Option<String>,
    /// Prompt variant active for this situation when the decision was made
    #[serde(default)]
    pub prompt_variant: Option<String>,
    /// Set when an override window replaced the selected action
    #[serde(default)]
    pub rerouted_from: Option<Action>,
    pub decided_at: DateTime<Utc>,
}

impl Decision {
    pub fn generate_id() -> String {
        let raw = uuid::Uuid::new_v4().simple().to_string();
        format!("DEC-{}", raw[..8].to_uppercase())
    }

    pub fn is_rerouted(&self) -> bool {
        self.rerouted_from.is_some()
    }

    /// Replace the action with an override, keeping the original for audit
    pub fn reroute(&mut self, action: Action) {
        if self.action == action {
            return;
        }
        if self.rerouted_from.is_none() {
            self.rerouted_from = Some(self.action);
        }
        self.action = action;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serde_names() {
        let json = serde_json::to_string(&Action::EscalateTier2).unwrap();
        assert_eq!(json, "\"escalate_tier2\"");
        let back: Action = serde_json::from_str("\"false_positive_close\"").unwrap();
        assert_eq!(back, Action::FalsePositiveClose);
    }

    #[test]
    fn test_estimates() {
        assert_eq!(Action::EscalateTier2.estimate().cost_usd, 127.0);
        assert_eq!(Action::EscalateTier2.estimate().minutes, 45);
        assert_eq!(Action::EscalateIncident.estimate().risk, RiskTier::High);
        assert!(Action::FalsePositiveClose.is_automated());
        assert!(!Action::EnrichAndWait.is_automated());
    }

    #[test]
    fn test_decision_id_format() {
        let id = Decision::generate_id();
        assert!(id.starts_with("DEC-"));
        assert_eq!(id.len(), 12);
    }
}
