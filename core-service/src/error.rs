//! Error handling
//!
//! Gate blocking is not an error: callers branch on
//! `GateResult::overall_passed`. Clamp events are logged and audited,
//! never raised.

use thiserror::Error;

use crate::logic::feedback::OutcomeRecord;
use crate::logic::policy::PolicyResolution;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Context unavailable for the alert
    #[error("context not found for alert {alert_id}")]
    NotFound { alert_id: String },

    /// Write-once outcome already committed; carries the original record
    #[error("feedback already given for alert {alert_id}")]
    FeedbackAlreadyGiven {
        alert_id: String,
        existing: Box<OutcomeRecord>,
    },

    /// Append-only conflict record already exists; carries the original record
    #[error("policy conflict for alert {alert_id} already resolved")]
    ConflictAlreadyResolved {
        alert_id: String,
        existing: Box<PolicyResolution>,
    },

    #[error("no policy conflict to resolve for alert {alert_id}")]
    NoConflict { alert_id: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
