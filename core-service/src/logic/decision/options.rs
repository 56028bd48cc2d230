//! Option Tables
//!
//! Fixed scored options per situation. Scores are calibrated constants.

use crate::logic::situation::SituationCategory;
use super::types::{Action, ResponseOption};

/// Raw option table for a situation, in declaration order
pub fn option_table(category: SituationCategory) -> Vec<ResponseOption> {
    use Action::*;

    match category {
        SituationCategory::TravelLoginAnomaly => vec![
            ResponseOption::new(
                FalsePositiveClose,
                0.92,
                &["travel_match", "mfa_ok", "device_known"],
                Some("PB-LOGIN-FP"),
            ),
            ResponseOption::new(EscalateTier2, 0.06, &["verify_travel_legitimacy"], Some("PB-LOGIN-T2")),
            ResponseOption::new(EnrichAndWait, 0.02, &["monitor_additional_activity"], None),
        ],
        SituationCategory::KnownPhishingCampaign => vec![
            ResponseOption::new(
                AutoRemediate,
                0.94,
                &["known_signature", "playbook_exists", "low_risk"],
                Some("PB-PHISH-AUTO"),
            ),
            ResponseOption::new(EscalateTier2, 0.04, &["verify_campaign_match"], Some("PB-PHISH-T2")),
            ResponseOption::new(EnrichAndWait, 0.02, &["gather_more_samples"], None),
        ],
        SituationCategory::MalwareOnCriticalAsset => vec![
            ResponseOption::new(
                EscalateIncident,
                0.97,
                &["critical_asset", "production_impact", "high_risk"],
                Some("PB-MALWARE-CRIT"),
            ),
            ResponseOption::new(AutoRemediate, 0.02, &["isolate_system"], Some("PB-MALWARE-AUTO")),
            ResponseOption::new(EnrichAndWait, 0.01, &["assess_blast_radius"], None),
        ],
        SituationCategory::DataExfilAttempt => vec![
            ResponseOption::new(
                EscalateIncident,
                0.96,
                &["data_loss_risk", "external_connection", "volume_anomaly"],
                Some("PB-DLP-INCIDENT"),
            ),
            ResponseOption::new(EnrichAndWait, 0.03, &["identify_data_type"], None),
            ResponseOption::new(AutoRemediate, 0.01, &["block_connection"], None),
        ],
        SituationCategory::VipAfterHours => vec![
            ResponseOption::new(
                EnrichAndWait,
                0.76,
                &["vip_caution", "verify_legitimacy", "context_needed"],
                Some("PB-VIP-VERIFY"),
            ),
            ResponseOption::new(EscalateTier2, 0.18, &["manual_review"], Some("PB-VIP-T2")),
            ResponseOption::new(FalsePositiveClose, 0.06, &["workaholic_pattern"], None),
        ],
        SituationCategory::Unknown => vec![
            ResponseOption::new(
                EscalateTier2,
                0.60,
                &["insufficient_confidence", "manual_review_needed"],
                Some("PB-DEFAULT-T2"),
            ),
            ResponseOption::new(EnrichAndWait, 0.30, &["gather_more_context"], None),
            ResponseOption::new(EscalateIncident, 0.10, &["err_on_caution"], Some("PB-INCIDENT")),
        ],
    }
}

/// Options for a situation, sorted by score descending (stable)
pub fn evaluate_options(category: SituationCategory) -> Vec<ResponseOption> {
    let mut options = option_table(category);
    options.sort_by(|a, b| b.score.total_cmp(&a.score));
    options
}

/// Playbook for `action` in `options`, else the generic playbook the
/// unknown-situation table attaches to it
pub fn playbook_for(options: &[ResponseOption], action: Action) -> Option<String> {
    let generic = option_table(SituationCategory::Unknown);
    options
        .iter()
        .chain(generic.iter())
        .find(|o| o.action == action && o.playbook_id.is_some())
        .and_then(|o| o.playbook_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_situation_has_options_sorted() {
        for category in SituationCategory::ALL {
            let options = evaluate_options(category);
            assert_eq!(options.len(), 3, "{} option count", category);
            let total: f64 = options.iter().map(|o| o.score).sum();
            assert!((total - 1.0).abs() < 1e-9, "{} scores sum to {}", category, total);
            for pair in options.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
        }
    }

    #[test]
    fn test_travel_options() {
        let options = evaluate_options(SituationCategory::TravelLoginAnomaly);
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].action, Action::FalsePositiveClose);
        assert_eq!(options[0].score, 0.92);
        assert_eq!(options[0].playbook_id.as_deref(), Some("PB-LOGIN-FP"));
        assert_eq!(options[2].playbook_id, None);
    }

    #[test]
    fn test_unknown_prefers_human() {
        let options = evaluate_options(SituationCategory::Unknown);
        assert_eq!(options[0].action, Action::EscalateTier2);
        assert_eq!(options[0].score, 0.60);
    }

    #[test]
    fn test_playbook_for_falls_back_to_generic() {
        let exfil = evaluate_options(SituationCategory::DataExfilAttempt);
        assert_eq!(playbook_for(&exfil, Action::EscalateIncident).as_deref(), Some("PB-DLP-INCIDENT"));
        assert_eq!(playbook_for(&exfil, Action::EscalateTier2).as_deref(), Some("PB-DEFAULT-T2"));

        let travel = evaluate_options(SituationCategory::TravelLoginAnomaly);
        assert_eq!(playbook_for(&travel, Action::EscalateTier2).as_deref(), Some("PB-LOGIN-T2"));
        assert_eq!(playbook_for(&travel, Action::EscalateIncident).as_deref(), Some("PB-INCIDENT"));
        assert_eq!(playbook_for(&travel, Action::EnrichAndWait), None);
    }
}
