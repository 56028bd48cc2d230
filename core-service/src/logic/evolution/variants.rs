//! Prompt Variant Tracker
//!
//! Per-variant success statistics and the active variant per alert type.
//! A variant is promoted over the active one when it belongs to the same
//! family (name minus the trailing `_vN`), has at least
//! `MIN_PROMOTION_SAMPLES` outcomes and beats the active success rate by
//! more than `MIN_PROMOTION_IMPROVEMENT`.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Variant used for alert types with no registered variant
pub const DEFAULT_VARIANT: &str = "DEFAULT_v1";

pub const MIN_PROMOTION_SAMPLES: u64 = 10;

/// Success-rate improvement (absolute) required for promotion
pub const MIN_PROMOTION_IMPROVEMENT: f64 = 0.05;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantStats {
    pub success: u64,
    pub total: u64,
}

impl VariantStats {
    pub fn new(success: u64, total: u64) -> Self {
        Self { success, total }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.success as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantPromotion {
    pub alert_type: String,
    pub old_variant: String,
    pub new_variant: String,
    pub old_rate: f64,
    pub new_rate: f64,
    pub reason: String,
    pub promoted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantComparison {
    pub alert_type: String,
    pub active_variant: String,
    pub active_stats: VariantStats,
    /// Other variants of the active family, by name
    pub family: Vec<(String, VariantStats)>,
    pub recent_promotion: Option<VariantPromotion>,
}

/// Family prefix of a variant name: "TRAVEL_CONTEXT_v2" -> "TRAVEL_CONTEXT"
pub fn family_of(variant: &str) -> &str {
    match variant.rfind('_') {
        Some(idx) => &variant[..idx],
        None => variant,
    }
}

// ============================================================================
// TRACKER
// ============================================================================

#[derive(Debug, Default)]
pub struct VariantTracker {
    stats: DashMap<String, VariantStats>,
    /// alert type -> active variant
    active: DashMap<String, String>,
    /// alert type -> last promotion
    promotions: DashMap<String, VariantPromotion>,
}

impl VariantTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Travel and phishing families with their recorded history
    pub fn with_defaults() -> Self {
        let tracker = Self::new();
        tracker.register("TRAVEL_CONTEXT_v1", VariantStats::new(24, 34));
        tracker.register("TRAVEL_CONTEXT_v2", VariantStats::new(42, 47));
        tracker.register("PHISHING_RESPONSE_v1", VariantStats::new(31, 38));
        tracker.register("PHISHING_RESPONSE_v2", VariantStats::new(12, 15));
        tracker.set_active("anomalous_login", "TRAVEL_CONTEXT_v2");
        tracker.set_active("phishing", "PHISHING_RESPONSE_v1");
        tracker
    }

    pub fn register(&self, variant: &str, stats: VariantStats) {
        self.stats.insert(variant.to_string(), stats);
    }

    pub fn set_active(&self, alert_type: &str, variant: &str) {
        self.active.insert(alert_type.to_string(), variant.to_string());
    }

    pub fn active_variant(&self, alert_type: &str) -> String {
        self.active
            .get(alert_type)
            .map(|v| v.clone())
            .unwrap_or_else(|| DEFAULT_VARIANT.to_string())
    }

    pub fn stats(&self, variant: &str) -> Option<VariantStats> {
        self.stats.get(variant).map(|s| *s)
    }

    /// All variants, by name
    pub fn all_stats(&self) -> Vec<(String, VariantStats)> {
        let mut all: Vec<(String, VariantStats)> = self
            .stats
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    pub fn record_outcome(&self, variant: &str, success: bool) -> VariantStats {
        let mut stats = self.stats.entry(variant.to_string()).or_default();
        stats.total += 1;
        if success {
            stats.success += 1;
        }
        log::debug!(
            "Variant {}: {}/{} ({:.1}%)",
            variant,
            stats.success,
            stats.total,
            stats.success_rate() * 100.0
        );
        *stats
    }

    /// Promote the best qualifying same-family variant, if any
    pub fn check_for_promotion(&self, alert_type: &str) -> Option<VariantPromotion> {
        let mut active = self.active.get_mut(alert_type)?;
        let current = active.clone();
        let current_rate = self.stats(&current).unwrap_or_default().success_rate();
        let family = family_of(&current).to_string();

        let (candidate, rate) = self
            .family_members(&family, &current)
            .into_iter()
            .filter(|(_, s)| s.total >= MIN_PROMOTION_SAMPLES)
            .map(|(name, s)| (name, s.success_rate()))
            .filter(|(_, rate)| rate - current_rate > MIN_PROMOTION_IMPROVEMENT)
            .max_by(|a, b| a.1.total_cmp(&b.1))?;

        *active = candidate.clone();
        drop(active);

        let promotion = VariantPromotion {
            alert_type: alert_type.to_string(),
            old_variant: current.clone(),
            new_variant: candidate.clone(),
            old_rate: current_rate,
            new_rate: rate,
            reason: format!(
                "Variant {} outperformed {} by {:.1} pts ({:.1}% vs {:.1}%)",
                candidate,
                current,
                (rate - current_rate) * 100.0,
                rate * 100.0,
                current_rate * 100.0
            ),
            promoted_at: Utc::now(),
        };

        log::info!(
            "Promoted {} -> {} for {}",
            promotion.old_variant,
            promotion.new_variant,
            alert_type
        );
        self.promotions.insert(alert_type.to_string(), promotion.clone());
        Some(promotion)
    }

    pub fn recent_promotion(&self, alert_type: &str) -> Option<VariantPromotion> {
        self.promotions.get(alert_type).map(|p| p.clone())
    }

    pub fn comparison(&self, alert_type: &str) -> VariantComparison {
        let active_variant = self.active_variant(alert_type);
        let family = family_of(&active_variant).to_string();
        VariantComparison {
            alert_type: alert_type.to_string(),
            active_stats: self.stats(&active_variant).unwrap_or_default(),
            family: self.family_members(&family, &active_variant),
            recent_promotion: self.recent_promotion(alert_type),
            active_variant,
        }
    }

    fn family_members(&self, family: &str, exclude: &str) -> Vec<(String, VariantStats)> {
        self.all_stats()
            .into_iter()
            .filter(|(name, _)| name != exclude && family_of(name) == family)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_of() {
        assert_eq!(family_of("TRAVEL_CONTEXT_v2"), "TRAVEL_CONTEXT");
        assert_eq!(family_of("PLAIN"), "PLAIN");
    }

    #[test]
    fn test_defaults() {
        let tracker = VariantTracker::with_defaults();
        assert_eq!(tracker.active_variant("anomalous_login"), "TRAVEL_CONTEXT_v2");
        assert_eq!(tracker.active_variant("data_exfiltration"), DEFAULT_VARIANT);
        // v1 is worse than active v2
        assert!(tracker.check_for_promotion("anomalous_login").is_none());
        // v2 (0.80) is not better than active v1 (0.816)
        assert!(tracker.check_for_promotion("phishing").is_none());
    }

    #[test]
    fn test_record_outcome_updates_rate() {
        let tracker = VariantTracker::new();
        tracker.record_outcome("X_v1", true);
        let stats = tracker.record_outcome("X_v1", false);
        assert_eq!(stats, VariantStats::new(1, 2));
        assert_eq!(stats.success_rate(), 0.5);
    }

    #[test]
    fn test_promotion_requires_samples_and_margin() {
        let tracker = VariantTracker::new();
        tracker.register("FAM_v1", VariantStats::new(7, 10));
        tracker.register("FAM_v2", VariantStats::new(9, 9));
        tracker.register("FAM_v3", VariantStats::new(8, 10));
        tracker.register("OTHER_v1", VariantStats::new(100, 100));
        tracker.set_active("phishing", "FAM_v1");

        // v2 lacks samples; v3 is 0.80 vs 0.70 -> promoted; OTHER is a different family
        let promotion = tracker.check_for_promotion("phishing").expect("promotion");
        assert_eq!(promotion.old_variant, "FAM_v1");
        assert_eq!(promotion.new_variant, "FAM_v3");
        assert_eq!(tracker.active_variant("phishing"), "FAM_v3");
        assert_eq!(tracker.recent_promotion("phishing"), Some(promotion));

        let cmp = tracker.comparison("phishing");
        assert_eq!(cmp.active_variant, "FAM_v3");
        let names: Vec<&str> = cmp.family.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["FAM_v1", "FAM_v2"]);
    }

    #[test]
    fn test_margin_must_exceed_threshold() {
        let tracker = VariantTracker::new();
        tracker.register("FAM_v1", VariantStats::new(70, 100));
        tracker.register("FAM_v2", VariantStats::new(74, 100));
        tracker.set_active("x", "FAM_v1");
        assert!(tracker.check_for_promotion("x").is_none());
    }
}
