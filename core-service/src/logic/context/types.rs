//! Context Types
//!
//! Data structures and builder helpers only - no classification logic.

use serde::{Deserialize, Serialize};

/// Title fragments that mark a user as VIP
pub const VIP_TITLE_TERMS: [&str; 6] = ["ceo", "cfo", "ciso", "vp", "chief", "executive"];

// ============================================================================
// ALERT TYPE
// ============================================================================

/// Alert type reported by the detection source.
/// Unrecognised types are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertType {
    AnomalousLogin,
    Phishing,
    MalwareDetection,
    DataExfiltration,
    Other(String),
}

impl AlertType {
    pub fn as_str(&self) -> &str {
        match self {
            AlertType::AnomalousLogin => "anomalous_login",
            AlertType::Phishing => "phishing",
            AlertType::MalwareDetection => "malware_detection",
            AlertType::DataExfiltration => "data_exfiltration",
            AlertType::Other(name) => name.as_str(),
        }
    }
}

impl Default for AlertType {
    fn default() -> Self {
        AlertType::Other("unknown".to_string())
    }
}

impl From<String> for AlertType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "anomalous_login" => AlertType::AnomalousLogin,
            "phishing" => AlertType::Phishing,
            "malware_detection" => AlertType::MalwareDetection,
            "data_exfiltration" => AlertType::DataExfiltration,
            _ => AlertType::Other(value),
        }
    }
}

impl From<&str> for AlertType {
    fn from(value: &str) -> Self {
        AlertType::from(value.to_string())
    }
}

impl From<AlertType> for String {
    fn from(value: AlertType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ASSET CRITICALITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetCriticality {
    Critical,
    High,
    /// Also accepts "standard"
    Medium,
    Low,
    Other(String),
}

impl AssetCriticality {
    pub fn as_str(&self) -> &str {
        match self {
            AssetCriticality::Critical => "critical",
            AssetCriticality::High => "high",
            AssetCriticality::Medium => "medium",
            AssetCriticality::Low => "low",
            AssetCriticality::Other(name) => name.as_str(),
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, AssetCriticality::Critical)
    }
}

impl Default for AssetCriticality {
    fn default() -> Self {
        AssetCriticality::Medium
    }
}

impl From<String> for AssetCriticality {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "critical" => AssetCriticality::Critical,
            "high" => AssetCriticality::High,
            "medium" | "standard" => AssetCriticality::Medium,
            "low" => AssetCriticality::Low,
            _ => AssetCriticality::Other(value),
        }
    }
}

impl From<&str> for AssetCriticality {
    fn from(value: &str) -> Self {
        AssetCriticality::from(value.to_string())
    }
}

impl From<AssetCriticality> for String {
    fn from(value: AssetCriticality) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for AssetCriticality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CONTEXT
// ============================================================================

/// Facts about one security event, keyed by alert id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    pub alert_id: String,
    pub alert_type: AlertType,

    // Actor
    pub user_id: String,
    pub user_name: String,
    pub user_title: String,
    pub user_risk_score: f64,

    // Asset
    pub asset_id: String,
    pub asset_hostname: String,
    pub asset_criticality: AssetCriticality,

    // Travel / authentication signals
    pub user_traveling: bool,
    pub travel_destination: Option<String>,
    pub vpn_matches_location: bool,
    pub vpn_provider: Option<String>,
    pub mfa_completed: bool,
    pub device_fingerprint_match: bool,
    pub after_hours: bool,

    // Pattern / campaign hints
    pub known_campaign_signature: bool,
    pub pattern_id: Option<String>,
    pub pattern_count: u64,
    pub fp_rate: f64,

    /// Graph nodes the context collaborator consulted
    pub nodes_consulted: u32,
}

impl Context {
    pub fn new(alert_id: &str, alert_type: impl Into<AlertType>) -> Self {
        Self {
            alert_id: alert_id.to_string(),
            alert_type: alert_type.into(),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, name: &str, title: &str, risk_score: f64) -> Self {
        self.user_name = name.to_string();
        self.user_title = title.to_string();
        self.user_risk_score = risk_score;
        self
    }

    pub fn with_asset(mut self, hostname: &str, criticality: impl Into<AssetCriticality>) -> Self {
        self.asset_hostname = hostname.to_string();
        self.asset_criticality = criticality.into();
        self
    }

    /// Mark an active travel record to `destination`
    pub fn with_travel(mut self, destination: &str) -> Self {
        self.user_traveling = true;
        self.travel_destination = Some(destination.to_string());
        self
    }

    pub fn with_vpn_match(mut self, matches: bool) -> Self {
        self.vpn_matches_location = matches;
        self
    }

    pub fn with_mfa(mut self, completed: bool) -> Self {
        self.mfa_completed = completed;
        self
    }

    pub fn with_known_device(mut self, known: bool) -> Self {
        self.device_fingerprint_match = known;
        self
    }

    pub fn with_known_campaign(mut self, known: bool) -> Self {
        self.known_campaign_signature = known;
        self
    }

    pub fn with_after_hours(mut self, after_hours: bool) -> Self {
        self.after_hours = after_hours;
        self
    }

    /// Link the event to a recurring pattern
    pub fn with_pattern(mut self, pattern_id: &str, occurrences: u64, fp_rate: f64) -> Self {
        self.pattern_id = Some(pattern_id.to_string());
        self.pattern_count = occurrences;
        self.fp_rate = fp_rate;
        self
    }

    /// Title contains one of the VIP terms (case-insensitive)
    pub fn is_vip(&self) -> bool {
        let title = self.user_title.to_lowercase();
        VIP_TITLE_TERMS.iter().any(|term| title.contains(term))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let ctx = Context::new("ALERT-7823", "anomalous_login")
            .with_user("John Smith", "Sales Director", 0.85)
            .with_travel("Singapore")
            .with_vpn_match(true)
            .with_pattern("PAT-TRAVEL-001", 127, 0.2);

        assert_eq!(ctx.alert_type, AlertType::AnomalousLogin);
        assert!(ctx.user_traveling);
        assert_eq!(ctx.travel_destination.as_deref(), Some("Singapore"));
        assert_eq!(ctx.pattern_count, 127);
        assert!(!ctx.mfa_completed);
    }

    #[test]
    fn test_unknown_alert_type_kept_verbatim() {
        let t = AlertType::from("ransomware_note");
        assert_eq!(t, AlertType::Other("ransomware_note".to_string()));
        assert_eq!(t.as_str(), "ransomware_note");
    }

    #[test]
    fn test_standard_criticality_is_medium() {
        assert_eq!(AssetCriticality::from("standard"), AssetCriticality::Medium);
        assert!(AssetCriticality::from("CRITICAL").is_critical());
    }

    #[test]
    fn test_vip_detection() {
        let ceo = Context::default().with_user("Ann", "Chief Executive Officer", 0.1);
        let analyst = Context::default().with_user("Bob", "Security Analyst", 0.1);
        assert!(ceo.is_vip());
        assert!(!analyst.is_vip());
    }

    #[test]
    fn test_context_deserializes_from_collaborator_json() {
        let json = r#"{
            "alert_id": "ALERT-7824",
            "alert_type": "phishing",
            "asset_criticality": "standard",
            "known_campaign_signature": true,
            "user_risk_score": 0.45
        }"#;
        let ctx: Context = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.alert_type, AlertType::Phishing);
        assert_eq!(ctx.asset_criticality, AssetCriticality::Medium);
        assert!(ctx.known_campaign_signature);
        assert!(ctx.pattern_id.is_none());
    }
}
