//! Decision Module
//!
//! Option Evaluator + Decision Selector.
//!
//! ## Structure
//! - `types`: `Action`, `RiskTier`, `ResolutionEstimate`, `ResponseOption`, `Decision`
//! - `options`: fixed per-situation option tables (score + playbook)
//! - `selector`: highest-score selection, manual review fallback
//!
//! ## Usage
//! ```ignore
//! let classification = situation::classify(&ctx);
//! let options = decision::evaluate_options(classification.category);
//! let decision = decision::select_decision(&ctx, &classification, &options);
//! ```

pub mod types;
pub mod options;
pub mod selector;

pub use types::{Action, Decision, ResolutionEstimate, ResponseOption, RiskTier};

pub use options::{evaluate_options, option_table, playbook_for};

pub use selector::{select_decision, MANUAL_REVIEW_CONFIDENCE};
