//! Policy Registry
//!
//! Static configuration: read-only once constructed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::logic::context::{Context, ContextField};
use crate::logic::decision::Action;
use super::types::{Condition, PolicyDefinition};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyRegistry {
    policies: Vec<PolicyDefinition>,
}

impl PolicyRegistry {
    /// Policies in declaration order. Equal priorities resolve in this order.
    pub fn new(policies: Vec<PolicyDefinition>) -> EngineResult<Self> {
        for (i, policy) in policies.iter().enumerate() {
            if policy.priority == 0 {
                return Err(EngineError::Config(format!(
                    "policy {} has priority 0 (1 is highest)",
                    policy.id
                )));
            }
            if policies[..i].iter().any(|p| p.id == policy.id) {
                return Err(EngineError::Config(format!("duplicate policy id {}", policy.id)));
            }
        }
        Ok(Self { policies })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in governance set
    pub fn builtin() -> Self {
        Self {
            policies: builtin_policies(),
        }
    }

    /// JSON array of policy definitions
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let policies: Vec<PolicyDefinition> = serde_json::from_str(json)?;
        Self::new(policies)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let registry = Self::from_json_str(&json)?;
        log::info!("Loaded {} policies from {}", registry.len(), path.display());
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&PolicyDefinition> {
        self.policies.iter().find(|p| p.id == id)
    }

    pub fn policies(&self) -> &[PolicyDefinition] {
        &self.policies
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Matching policies ordered by priority, ties in declaration order
    pub fn applicable(&self, context: &Context) -> Vec<PolicyDefinition> {
        let mut matched: Vec<PolicyDefinition> = self
            .policies
            .iter()
            .filter(|p| p.matches(context))
            .cloned()
            .collect();
        matched.sort_by_key(|p| p.priority);
        matched
    }
}

fn builtin_policies() -> Vec<PolicyDefinition> {
    vec![
        PolicyDefinition::new(
            "POL-AUTO-CLOSE-TRAVEL",
            "Auto-Close Travel Anomalies",
            Action::FalsePositiveClose,
            3,
        )
        .with_description(
            "Close login anomaly alerts when the user is traveling and VPN matches the destination",
        )
        .with_condition(Condition::equals(ContextField::AlertType, "anomalous_login"))
        .with_condition(Condition::equals(ContextField::UserTraveling, true))
        .with_condition(Condition::equals(ContextField::VpnMatchesLocation, true)),
        PolicyDefinition::new(
            "POL-ESCALATE-HIGH-RISK",
            "Escalate High-Risk Users",
            Action::EscalateTier2,
            1,
        )
        .with_description("Escalate all alerts for users with risk score above 0.80 to Tier 2")
        .with_scope("high_risk_users")
        .with_condition(Condition::above(ContextField::UserRiskScore, 0.80)),
        PolicyDefinition::new(
            "POL-REMEDIATE-KNOWN-PHISH",
            "Auto-Remediate Known Phishing",
            Action::AutoRemediate,
            2,
        )
        .with_description("Remediate phishing alerts that match known campaign signatures")
        .with_condition(Condition::equals(ContextField::AlertType, "phishing"))
        .with_condition(Condition::equals(ContextField::KnownCampaignSignature, true)),
        PolicyDefinition::new(
            "POL-ISOLATE-CRITICAL-ASSETS",
            "Isolate Critical Assets",
            Action::AutoRemediate,
            1,
        )
        .with_description("Isolate any malware detection on critical infrastructure")
        .with_scope("critical_assets")
        .with_condition(Condition::equals(ContextField::AlertType, "malware_detection"))
        .with_condition(Condition::equals(ContextField::AssetCriticality, "critical")),
    ]
}
