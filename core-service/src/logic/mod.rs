//! Logic Module - Decision & Evolution Engines
//!
//! Pure stages (context, situation, decision, gate, policy matching) and the
//! stateful ones (store, evolution, feedback) wired together by `engine`.
//!
//! ## Structure
//! - `context/` - Alert context snapshot and field access
//! - `situation/` - Ordered classification rules
//! - `decision/` - Response option tables and selection
//! - `gate/` - Faithfulness, safe action, playbook and SLA checks
//! - `policy/` - Policy registry and conflict arbitration
//! - `store/` - Shared state traits + in-memory backends
//! - `evolution/` - Bounded pattern evolution, prompt variants
//! - `feedback/` - Analyst verdicts and override windows
//! - `engine/` - Full evaluation cycle

// Inputs + collaborators
pub mod context;
pub mod collaborators;
pub mod config;

// Pure stages
pub mod situation;
pub mod decision;
pub mod gate;
pub mod policy;

// Shared state
pub mod bounds;
pub mod store;

// Learning
pub mod evolution;
pub mod feedback;

pub mod engine;
