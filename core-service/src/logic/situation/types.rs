//! Situation Types

use serde::{Deserialize, Serialize};

// ============================================================================
// SITUATION CATEGORY
// ============================================================================

/// Closed set of situations the engine recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SituationCategory {
    TravelLoginAnomaly,
    KnownPhishingCampaign,
    MalwareOnCriticalAsset,
    DataExfilAttempt,
    VipAfterHours,
    Unknown,
}

impl SituationCategory {
    pub const ALL: [SituationCategory; 6] = [
        SituationCategory::TravelLoginAnomaly,
        SituationCategory::KnownPhishingCampaign,
        SituationCategory::MalwareOnCriticalAsset,
        SituationCategory::DataExfilAttempt,
        SituationCategory::VipAfterHours,
        SituationCategory::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SituationCategory::TravelLoginAnomaly => "travel_login_anomaly",
            SituationCategory::KnownPhishingCampaign => "known_phishing_campaign",
            SituationCategory::MalwareOnCriticalAsset => "malware_on_critical_asset",
            SituationCategory::DataExfilAttempt => "data_exfil_attempt",
            SituationCategory::VipAfterHours => "vip_after_hours",
            SituationCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SituationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

/// Derived per cycle, never persisted on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SituationClassification {
    pub category: SituationCategory,
    /// 0.0 - 1.0
    pub confidence: f64,
    /// Evidence factors in detection order
    pub factors: Vec<String>,
}

impl SituationClassification {
    pub fn new(category: SituationCategory, confidence: f64, factors: Vec<String>) -> Self {
        Self {
            category,
            confidence,
            factors,
        }
    }
}
