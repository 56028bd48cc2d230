//! Feedback Module
//!
//! Human verdicts on past decisions. Each alert accepts exactly one
//! verdict (`NoFeedback -> FeedbackGiven`, terminal). Rewards are gentle,
//! penalties steep, and an incorrect verdict installs an explicit
//! override window that reroutes the next N matching alerts.
//!
//! ## Structure
//! - `types`: `Verdict`, `OutcomeRecord`, `GraphUpdate`, `OverrideWindow`, `FeedbackOutcome`
//! - `processor`: `FeedbackProcessor`
//!
//! ## Usage
//! ```ignore
//! match processor.report_outcome(&decision, Verdict::Incorrect) {
//!     Ok(outcome) => show(outcome.override_installed),
//!     Err(EngineError::FeedbackAlreadyGiven { existing, .. }) => show_existing(existing),
//!     Err(e) => return Err(e),
//! }
//! ```

pub mod types;
pub mod processor;

pub use types::{
    Direction, FeedbackOutcome, FeedbackStatus, GraphUpdate, OutcomeRecord, OverrideKey,
    OverrideWindow, Verdict,
};

pub use processor::FeedbackProcessor;
