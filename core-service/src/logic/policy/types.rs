//! Policy Types
//!
//! Data structures only - matching lives in `registry`, resolution in
//! `resolver`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::context::{Context, ContextField, FieldValue};
use crate::logic::decision::Action;

// ============================================================================
// CONDITION
// ============================================================================

/// One predicate over a named Context field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// Field equals value (text compared case-insensitively)
    Equals { field: ContextField, value: FieldValue },
    /// Numeric field strictly above threshold
    Above { field: ContextField, threshold: f64 },
}

impl Condition {
    pub fn equals(field: ContextField, value: impl Into<FieldValue>) -> Self {
        Condition::Equals {
            field,
            value: value.into(),
        }
    }

    pub fn above(field: ContextField, threshold: f64) -> Self {
        Condition::Above { field, threshold }
    }

    pub fn holds(&self, context: &Context) -> bool {
        match self {
            Condition::Equals { field, value } => match (context.field(*field), value) {
                (FieldValue::Text(actual), FieldValue::Text(expected)) => {
                    actual.eq_ignore_ascii_case(expected)
                }
                (actual, expected) => actual == *expected,
            },
            Condition::Above { field, threshold } => context
                .field(*field)
                .as_number()
                .map_or(false, |n| n > *threshold),
        }
    }
}

// ============================================================================
// POLICY DEFINITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub action: Action,
    /// 1 = highest
    pub priority: u8,
    #[serde(default)]
    pub scope: String,
    /// All must hold for the policy to match
    pub conditions: Vec<Condition>,
}

impl PolicyDefinition {
    pub fn new(id: &str, name: &str, action: Action, priority: u8) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            action,
            priority,
            scope: "all_users".to_string(),
            conditions: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = scope.to_string();
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn matches(&self, context: &Context) -> bool {
        self.conditions.iter().all(|c| c.holds(context))
    }
}

// ============================================================================
// RESOLUTION + CONFLICT
// ============================================================================

/// Permanent audit record of one resolved conflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyResolution {
    /// "CON-YYYY-XXXXXXXX"
    pub audit_id: String,
    pub alert_id: String,
    pub winning_policy: String,
    /// Highest-priority policy whose action was overruled
    pub losing_policy: String,
    /// All policies whose action was overruled, by priority
    pub overruled_policies: Vec<String>,
    /// Action of the losing policy
    pub original_action: Action,
    /// Action of the winning policy
    pub action_adjusted: Action,
    pub reason: String,
    pub narrative: String,
    pub resolved_at: DateTime<Utc>,
}

impl PolicyResolution {
    pub fn generate_audit_id(at: DateTime<Utc>) -> String {
        let raw = uuid::Uuid::new_v4().simple().to_string();
        format!("CON-{}-{}", at.format("%Y"), raw[..8].to_uppercase())
    }
}

/// Result of matching the registry against one Context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConflict {
    pub alert_id: String,
    pub has_conflict: bool,
    /// Matching policies, by priority
    pub policies_applied: Vec<PolicyDefinition>,
    /// Empty unless `has_conflict`
    pub conflicting_policies: Vec<PolicyDefinition>,
    pub resolution: Option<PolicyResolution>,
}

impl PolicyConflict {
    /// Action the policies call for, if any policy matched
    pub fn effective_action(&self) -> Option<Action> {
        match &self.resolution {
            Some(resolution) => Some(resolution.action_adjusted),
            None => self.policies_applied.first().map(|p| p.action),
        }
    }
}
