//! Situation Classification Rules
//!
//! Calibrated confidences and the ordered (predicate, result) table.
//! Do not reorder: travel must win over the generic login rules and
//! phishing must be decided before the VIP fallback.

use crate::logic::context::{AlertType, Context};
use super::types::{SituationCategory, SituationClassification};

// ============================================================================
// CALIBRATED CONFIDENCES
// ============================================================================

pub const TRAVEL_LOGIN_CONFIDENCE: f64 = 0.94;

pub const KNOWN_PHISHING_CONFIDENCE: f64 = 0.96;

/// Phishing without a known campaign signature
pub const NOVEL_PHISHING_CONFIDENCE: f64 = 0.72;

pub const MALWARE_CRITICAL_CONFIDENCE: f64 = 0.97;

pub const DATA_EXFIL_CONFIDENCE: f64 = 0.95;

pub const VIP_AFTER_HOURS_CONFIDENCE: f64 = 0.78;

pub const UNKNOWN_CONFIDENCE: f64 = 0.45;

// ============================================================================
// RULE TABLE
// ============================================================================

/// One precedence-ordered classification rule
#[derive(Clone, Copy)]
pub struct ClassificationRule {
    pub name: &'static str,
    pub matches: fn(&Context) -> bool,
    pub classify: fn(&Context) -> SituationClassification,
}

impl std::fmt::Debug for ClassificationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationRule").field("name", &self.name).finish()
    }
}

/// Evaluated top to bottom, first match wins
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "travel_login_anomaly",
        matches: is_travel_login,
        classify: travel_login,
    },
    ClassificationRule {
        name: "phishing_campaign",
        matches: is_phishing,
        classify: phishing,
    },
    ClassificationRule {
        name: "malware_on_critical_asset",
        matches: is_malware_on_critical,
        classify: malware_on_critical,
    },
    ClassificationRule {
        name: "data_exfil_attempt",
        matches: is_data_exfil,
        classify: data_exfil,
    },
    ClassificationRule {
        name: "vip_after_hours",
        matches: is_vip_after_hours,
        classify: vip_after_hours,
    },
];

/// Fallback when no rule matches
pub fn unknown(ctx: &Context) -> SituationClassification {
    SituationClassification::new(
        SituationCategory::Unknown,
        UNKNOWN_CONFIDENCE,
        vec![
            "insufficient_context".to_string(),
            format!("alert_type_{}", ctx.alert_type),
        ],
    )
}

// ============================================================================
// PREDICATES + RESULTS
// ============================================================================

fn is_travel_login(ctx: &Context) -> bool {
    ctx.alert_type == AlertType::AnomalousLogin && ctx.user_traveling
}

fn travel_login(ctx: &Context) -> SituationClassification {
    let mut factors = vec![
        "active_travel_record".to_string(),
        format!(
            "destination_matches ({})",
            ctx.travel_destination.as_deref().unwrap_or("Unknown")
        ),
    ];
    if ctx.vpn_matches_location {
        factors.push("vpn_location_match".to_string());
    }
    if ctx.mfa_completed {
        factors.push("mfa_completed".to_string());
    }
    if ctx.device_fingerprint_match {
        factors.push("device_known".to_string());
    }
    SituationClassification::new(
        SituationCategory::TravelLoginAnomaly,
        TRAVEL_LOGIN_CONFIDENCE,
        factors,
    )
}

fn is_phishing(ctx: &Context) -> bool {
    ctx.alert_type == AlertType::Phishing
}

fn phishing(ctx: &Context) -> SituationClassification {
    let mut factors = vec!["phishing_alert".to_string()];
    let confidence = if ctx.known_campaign_signature {
        factors.push("known_campaign_signature".to_string());
        factors.push("similar_emails_blocked".to_string());
        KNOWN_PHISHING_CONFIDENCE
    } else {
        factors.push("novel_phishing_attempt".to_string());
        NOVEL_PHISHING_CONFIDENCE
    };
    SituationClassification::new(SituationCategory::KnownPhishingCampaign, confidence, factors)
}

fn is_malware_on_critical(ctx: &Context) -> bool {
    ctx.alert_type == AlertType::MalwareDetection && ctx.asset_criticality.is_critical()
}

fn malware_on_critical(ctx: &Context) -> SituationClassification {
    let host = if ctx.asset_hostname.is_empty() {
        "Unknown"
    } else {
        ctx.asset_hostname.as_str()
    };
    SituationClassification::new(
        SituationCategory::MalwareOnCriticalAsset,
        MALWARE_CRITICAL_CONFIDENCE,
        vec![
            "malware_detected".to_string(),
            format!("critical_asset ({})", host),
            "production_system".to_string(),
        ],
    )
}

fn is_data_exfil(ctx: &Context) -> bool {
    ctx.alert_type == AlertType::DataExfiltration
}

fn data_exfil(_ctx: &Context) -> SituationClassification {
    SituationClassification::new(
        SituationCategory::DataExfilAttempt,
        DATA_EXFIL_CONFIDENCE,
        vec![
            "unusual_data_transfer".to_string(),
            "external_destination".to_string(),
            "volume_threshold_exceeded".to_string(),
        ],
    )
}

fn is_vip_after_hours(ctx: &Context) -> bool {
    ctx.is_vip() && ctx.after_hours
}

fn vip_after_hours(ctx: &Context) -> SituationClassification {
    let name = if ctx.user_name.is_empty() {
        "Unknown"
    } else {
        ctx.user_name.as_str()
    };
    SituationClassification::new(
        SituationCategory::VipAfterHours,
        VIP_AFTER_HOURS_CONFIDENCE,
        vec![
            format!("vip_user ({})", name),
            "after_hours_activity".to_string(),
            "unusual_timing".to_string(),
        ],
    )
}
