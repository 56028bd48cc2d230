//! Conflict Resolver
//!
//! Conflict iff two or more matching policies call for different actions.
//! Winner is the lowest priority number; ties go to registry order.

use chrono::Utc;

use crate::error::{EngineError, EngineResult};
use crate::logic::context::Context;
use crate::logic::store::ConflictLog;
use super::registry::PolicyRegistry;
use super::types::{PolicyConflict, PolicyDefinition, PolicyResolution};

/// Match the registry against a Context without touching the log
pub fn find_conflict(registry: &PolicyRegistry, context: &Context) -> PolicyConflict {
    let applied = registry.applicable(context);
    let has_conflict = applied
        .first()
        .map_or(false, |first| applied.iter().any(|p| p.action != first.action));

    PolicyConflict {
        alert_id: context.alert_id.clone(),
        has_conflict,
        conflicting_policies: if has_conflict { applied.clone() } else { Vec::new() },
        policies_applied: applied,
        resolution: None,
    }
}

/// Match, and resolve + record any conflict. A conflict already recorded
/// for this alert is reused, never re-minted.
pub fn detect_conflicts(registry: &PolicyRegistry, conflicts: &dyn ConflictLog, context: &Context) -> PolicyConflict {
    let mut conflict = find_conflict(registry, context);
    if !conflict.has_conflict {
        if conflict.policies_applied.len() > 1 {
            log::debug!(
                "Alert {}: {} policies agree on {}",
                conflict.alert_id,
                conflict.policies_applied.len(),
                conflict.policies_applied[0].action
            );
        }
        return conflict;
    }

    let resolution = match resolve_conflict(conflicts, &conflict) {
        Ok(resolution) => resolution,
        Err(EngineError::ConflictAlreadyResolved { existing, .. }) => *existing,
        Err(e) => {
            // resolve_conflict only fails with the two variants above for a real conflict
            log::warn!("Unexpected conflict resolution failure: {}", e);
            return conflict;
        }
    };
    conflict.resolution = Some(resolution);
    conflict
}

/// Resolve and append to the log.
///
/// Errors: `NoConflict` when the policies agree, `ConflictAlreadyResolved`
/// (with the recorded resolution) when the alert already has one.
pub fn resolve_conflict(conflicts: &dyn ConflictLog, conflict: &PolicyConflict) -> EngineResult<PolicyResolution> {
    if !conflict.has_conflict {
        return Err(EngineError::NoConflict {
            alert_id: conflict.alert_id.clone(),
        });
    }

    let already = conflict
        .resolution
        .clone()
        .or_else(|| conflicts.by_alert(&conflict.alert_id));
    if let Some(existing) = already {
        return Err(EngineError::ConflictAlreadyResolved {
            alert_id: conflict.alert_id.clone(),
            existing: Box::new(existing),
        });
    }

    let resolution = build_resolution(&conflict.alert_id, &conflict.conflicting_policies).ok_or_else(|| {
        EngineError::NoConflict {
            alert_id: conflict.alert_id.clone(),
        }
    })?;

    match conflicts.append(resolution.clone()) {
        Ok(()) => {
            log::info!(
                "Policy conflict {} on alert {}: {} overrides {} ({} -> {})",
                resolution.audit_id,
                resolution.alert_id,
                resolution.winning_policy,
                resolution.losing_policy,
                resolution.original_action,
                resolution.action_adjusted
            );
            Ok(resolution)
        }
        Err(existing) => Err(EngineError::ConflictAlreadyResolved {
            alert_id: conflict.alert_id.clone(),
            existing: Box::new(existing),
        }),
    }
}

fn build_resolution(alert_id: &str, policies: &[PolicyDefinition]) -> Option<PolicyResolution> {
    let mut sorted: Vec<&PolicyDefinition> = policies.iter().collect();
    sorted.sort_by_key(|p| p.priority);

    let winner = *sorted.first()?;
    let overruled: Vec<&PolicyDefinition> = sorted
        .iter()
        .copied()
        .filter(|p| p.action != winner.action)
        .collect();
    let loser = *overruled.first()?;

    let resolved_at = Utc::now();
    let audit_id = PolicyResolution::generate_audit_id(resolved_at);

    let reason = format!(
        "Policy {} (priority {}) takes precedence over Policy {} (priority {}). \
         Higher priority policies override lower priority ones.",
        winner.id, winner.priority, loser.id, loser.priority
    );
    let narrative = format!(
        "{} (priority {}) conflicts with {} (priority {}). {} wins. \
         Original action would have been '{}', adjusted to '{}'. Logged for audit as {}.",
        winner.name,
        winner.priority,
        loser.name,
        loser.priority,
        winner.name,
        loser.action,
        winner.action,
        audit_id
    );

    Some(PolicyResolution {
        audit_id,
        alert_id: alert_id.to_string(),
        winning_policy: winner.id.clone(),
        losing_policy: loser.id.clone(),
        overruled_policies: overruled.iter().map(|p| p.id.clone()).collect(),
        original_action: loser.action,
        action_adjusted: winner.action,
        reason,
        narrative,
        resolved_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::decision::Action;
    use crate::logic::store::InMemoryConflictLog;

    fn travel_high_risk() -> Context {
        Context::new("ALERT-7823", "anomalous_login")
            .with_travel("Singapore")
            .with_vpn_match(true)
            .with_user("John", "Engineer", 0.85)
    }

    #[test]
    fn test_two_policies_conflict_priority_wins() {
        let registry = PolicyRegistry::builtin();
        let log = InMemoryConflictLog::new();

        let conflict = detect_conflicts(&registry, &log, &travel_high_risk());
        assert!(conflict.has_conflict);
        assert_eq!(conflict.conflicting_policies.len(), 2);

        let resolution = conflict.resolution.clone().expect("resolution");
        assert_eq!(resolution.winning_policy, "POL-ESCALATE-HIGH-RISK");
        assert_eq!(resolution.losing_policy, "POL-AUTO-CLOSE-TRAVEL");
        assert_eq!(resolution.original_action, Action::FalsePositiveClose);
        assert_eq!(resolution.action_adjusted, Action::EscalateTier2);
        assert_eq!(conflict.effective_action(), Some(Action::EscalateTier2));
        assert_eq!(log.get(&resolution.audit_id), Some(resolution));
    }

    #[test]
    fn test_single_policy_no_conflict() {
        let registry = PolicyRegistry::builtin();
        let log = InMemoryConflictLog::new();
        let ctx = Context::new("A-1", "phishing").with_known_campaign(true);

        let conflict = detect_conflicts(&registry, &log, &ctx);
        assert!(!conflict.has_conflict);
        assert_eq!(conflict.policies_applied.len(), 1);
        assert_eq!(conflict.effective_action(), Some(Action::AutoRemediate));
        assert!(log.is_empty());
    }

    #[test]
    fn test_same_action_is_not_a_conflict() {
        let registry = PolicyRegistry::new(vec![
            PolicyDefinition::new("P-A", "a", Action::EscalateTier2, 1),
            PolicyDefinition::new("P-B", "b", Action::EscalateTier2, 2),
        ])
        .unwrap();
        let log = InMemoryConflictLog::new();

        let conflict = detect_conflicts(&registry, &log, &Context::new("A-2", "other"));
        assert!(!conflict.has_conflict);
        assert_eq!(conflict.policies_applied.len(), 2);
        assert!(conflict.conflicting_policies.is_empty());
        assert!(matches!(
            resolve_conflict(&log, &conflict),
            Err(EngineError::NoConflict { .. })
        ));
    }

    #[test]
    fn test_redetection_reuses_audit_id() {
        let registry = PolicyRegistry::builtin();
        let log = InMemoryConflictLog::new();
        let ctx = travel_high_risk();

        let first = detect_conflicts(&registry, &log, &ctx).resolution.unwrap();
        let second = detect_conflicts(&registry, &log, &ctx).resolution.unwrap();
        assert_eq!(first.audit_id, second.audit_id);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_explicit_resolve_on_resolved_conflict() {
        let registry = PolicyRegistry::builtin();
        let log = InMemoryConflictLog::new();
        let ctx = travel_high_risk();

        let unresolved = find_conflict(&registry, &ctx);
        let resolution = resolve_conflict(&log, &unresolved).unwrap();

        match resolve_conflict(&log, &unresolved) {
            Err(EngineError::ConflictAlreadyResolved { existing, .. }) => {
                assert_eq!(*existing, resolution)
            }
            other => panic!("expected ConflictAlreadyResolved, got {:?}", other),
        }
        assert_eq!(log.history().len(), 1);
    }

    #[test]
    fn test_three_way_records_all_overruled() {
        let registry = PolicyRegistry::new(vec![
            PolicyDefinition::new("P-LOW", "low", Action::FalsePositiveClose, 3),
            PolicyDefinition::new("P-TOP", "top", Action::EscalateIncident, 1),
            PolicyDefinition::new("P-MID", "mid", Action::AutoRemediate, 2),
            PolicyDefinition::new("P-AGREE", "agree", Action::EscalateIncident, 2),
        ])
        .unwrap();
        let log = InMemoryConflictLog::new();

        let resolution = detect_conflicts(&registry, &log, &Context::new("A-3", "other"))
            .resolution
            .unwrap();
        assert_eq!(resolution.winning_policy, "P-TOP");
        assert_eq!(resolution.losing_policy, "P-MID");
        assert_eq!(resolution.overruled_policies, vec!["P-MID", "P-LOW"]);
    }

    #[test]
    fn test_equal_priority_uses_registry_order() {
        let registry = PolicyRegistry::builtin();
        let log = InMemoryConflictLog::new();
        let ctx = Context::new("A-4", "malware_detection")
            .with_asset("db-prod-01", "critical")
            .with_user("x", "dba", 0.9);

        let resolution = detect_conflicts(&registry, &log, &ctx).resolution.unwrap();
        assert_eq!(resolution.winning_policy, "POL-ESCALATE-HIGH-RISK");
        assert_eq!(resolution.losing_policy, "POL-ISOLATE-CRITICAL-ASSETS");
    }
}
