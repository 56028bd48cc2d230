//! Gate Checks
//!
//! Input: Decision + Context + narration text.
//! Output: GateResult with all four checks populated.

use std::collections::HashMap;

use crate::logic::context::Context;
use crate::logic::decision::{Action, Decision};
use super::faithfulness::faithfulness_score;
use super::rules::*;
use super::types::{GateCheck, GateKind, GateResult};

// ============================================================================
// MAIN GATE FUNCTION
// ============================================================================

pub fn evaluate_gates(
    decision: &Decision,
    context: &Context,
    narration: &str,
    pattern_keywords: &HashMap<String, Vec<String>>,
) -> GateResult {
    let result = GateResult::from_checks([
        faithfulness_check(decision, context, narration, pattern_keywords),
        safe_action_check(decision, context),
        playbook_check(decision),
        sla_check(decision),
    ]);

    if result.overall_passed {
        log::debug!(
            "Gates passed for {} (score {:.3})",
            decision.decision_id,
            result.overall_score
        );
    } else {
        let failed: Vec<&str> = result.failed_checks().iter().map(|c| c.name.as_str()).collect();
        log::info!(
            "Decision {} blocked by gates: {}",
            decision.decision_id,
            failed.join(", ")
        );
    }

    result
}

// ============================================================================
// INDIVIDUAL CHECKS
// ============================================================================

pub fn faithfulness_check(
    decision: &Decision,
    context: &Context,
    narration: &str,
    pattern_keywords: &HashMap<String, Vec<String>>,
) -> GateCheck {
    let score = faithfulness_score(decision, context, narration, pattern_keywords);
    let message = if score >= FAITHFULNESS_THRESHOLD {
        "Reasoning matches recommended action and context"
    } else {
        "Reasoning does not support the recommended action"
    };
    GateCheck::new(GateKind::Faithfulness, score, message)
}

/// Binary: auto-remediation on a critical asset is never safe
pub fn safe_action_check(decision: &Decision, context: &Context) -> GateCheck {
    if decision.action == Action::AutoRemediate && context.asset_criticality.is_critical() {
        GateCheck::new(
            GateKind::SafeAction,
            0.0,
            format!(
                "Auto-remediation blocked on critical asset {}",
                context.asset_hostname
            ),
        )
    } else {
        GateCheck::new(GateKind::SafeAction, 1.0, "Action is safe for asset criticality")
    }
}

pub fn playbook_check(decision: &Decision) -> GateCheck {
    match &decision.playbook_id {
        Some(id) => GateCheck::new(
            GateKind::PlaybookMatch,
            PLAYBOOK_ATTACHED,
            format!("Decision follows approved playbook {}", id),
        ),
        None => GateCheck::new(
            GateKind::PlaybookMatch,
            PLAYBOOK_MISSING,
            "No approved playbook for this action",
        ),
    }
}

pub fn sla_check(decision: &Decision) -> GateCheck {
    let score = if decision.action.is_automated() {
        SLA_AUTOMATED
    } else {
        SLA_MANUAL
    };
    GateCheck::new(GateKind::SlaCompliance, score, "Action meets SLA requirements")
}

// ============================================================================
// TESTS
// ============================================================================
