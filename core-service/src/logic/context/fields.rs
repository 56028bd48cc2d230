//! Named Context fields for declarative policy predicates.

use serde::{Deserialize, Serialize};

use super::types::Context;

/// A Context field a policy condition can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextField {
    AlertType,
    AssetCriticality,
    UserTraveling,
    VpnMatchesLocation,
    MfaCompleted,
    DeviceFingerprintMatch,
    KnownCampaignSignature,
    AfterHours,
    UserRiskScore,
    PatternCount,
    FpRate,
}

/// Value of a Context field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl Context {
    /// Read a named field
    pub fn field(&self, field: ContextField) -> FieldValue {
        match field {
            ContextField::AlertType => FieldValue::Text(self.alert_type.as_str().to_string()),
            ContextField::AssetCriticality => {
                FieldValue::Text(self.asset_criticality.as_str().to_string())
            }
            ContextField::UserTraveling => FieldValue::Bool(self.user_traveling),
            ContextField::VpnMatchesLocation => FieldValue::Bool(self.vpn_matches_location),
            ContextField::MfaCompleted => FieldValue::Bool(self.mfa_completed),
            ContextField::DeviceFingerprintMatch => FieldValue::Bool(self.device_fingerprint_match),
            ContextField::KnownCampaignSignature => FieldValue::Bool(self.known_campaign_signature),
            ContextField::AfterHours => FieldValue::Bool(self.after_hours),
            ContextField::UserRiskScore => FieldValue::Number(self.user_risk_score),
            ContextField::PatternCount => FieldValue::Number(self.pattern_count as f64),
            ContextField::FpRate => FieldValue::Number(self.fp_rate),
        }
    }
}
