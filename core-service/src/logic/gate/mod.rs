//! Gate Module
//!
//! Four deterministic safety checks run against a Decision before it may
//! execute. Every check is computed; none short-circuits another.
//!
//! ## Structure
//! - `types`: `GateKind`, `GateCheck`, `GateResult`
//! - `rules`: thresholds, calibrated scores, keyword tables
//! - `faithfulness`: narration vs decision alignment score
//! - `checks`: the four checks + `evaluate_gates`
//!
//! ## Usage
//! ```ignore
//! let gate = gate::evaluate_gates(&decision, &ctx, &narration, &config.pattern_keywords);
//! if !gate.overall_passed {
//!     // blocked, never reaches evolution
//! }
//! ```

pub mod types;
pub mod rules;
pub mod faithfulness;
pub mod checks;

pub use types::{GateCheck, GateKind, GateResult};

pub use rules::{action_keywords, DEFAULT_PATTERN_KEYWORDS};

pub use faithfulness::faithfulness_score;

pub use checks::{
    evaluate_gates, faithfulness_check, playbook_check, safe_action_check, sla_check,
};
