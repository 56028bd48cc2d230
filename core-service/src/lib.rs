//! SOC Decision Core
//!
//! Decision & evolution engine for security alert triage:
//! Context → situation classify → option evaluate → select → eval gates
//! → (if passed) bounded pattern evolution. Human outcome feedback and
//! policy conflict arbitration run against the same shared state.
//!
//! Transport, persistence and narration are owned by the caller; the engine
//! only consumes a [`Context`] snapshot and a narration string.

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{EngineError, EngineResult};

pub use logic::context::{AlertType, AssetCriticality, Context, ContextField, FieldValue};
pub use logic::collaborators::{ContextSource, InMemoryContextSource, Narrator};
pub use logic::situation::{classify, SituationCategory, SituationClassification};
pub use logic::decision::{
    evaluate_options, select_decision, Action, Decision, ResolutionEstimate, ResponseOption,
    RiskTier,
};
pub use logic::gate::{evaluate_gates, GateCheck, GateKind, GateResult};
pub use logic::policy::{
    Condition, PolicyConflict, PolicyDefinition, PolicyRegistry, PolicyResolution,
};
pub use logic::evolution::{
    EvolutionEvent, EvolutionOutcome, EvolutionSkip, ImpactTier, VariantTracker,
};
pub use logic::feedback::{
    FeedbackOutcome, FeedbackStatus, GraphUpdate, OutcomeRecord, OverrideKey, OverrideWindow,
    Verdict,
};
pub use logic::store::{EdgeWeight, EngineStores, PatternState};
pub use logic::bounds::{Bounds, ClampAudit, ClampEvent};
pub use logic::config::EngineConfig;
pub use logic::engine::{Cycle, DecisionEngine, PatternSnapshot};
