//! Policy Module
//!
//! Declarative condition -> action rules, matched against the Context
//! independently of the decision path. Disagreement between matching
//! policies is a conflict, resolved by priority (1 = highest) and
//! recorded permanently for audit.
//!
//! ## Structure
//! - `types`: `Condition`, `PolicyDefinition`, `PolicyConflict`, `PolicyResolution`
//! - `registry`: `PolicyRegistry` (built-in set, JSON loading, matching)
//! - `resolver`: conflict detection + resolution against a `ConflictLog`
//!
//! ## Usage
//! ```ignore
//! use crate::logic::policy::{detect_conflicts, PolicyRegistry};
//!
//! let registry = PolicyRegistry::builtin();
//! let conflict = detect_conflicts(&registry, log.as_ref(), &ctx);
//! if let Some(action) = conflict.effective_action() {
//!     // policy guidance for this alert
//! }
//! ```

pub mod types;
pub mod registry;
pub mod resolver;

pub use types::{Condition, PolicyConflict, PolicyDefinition, PolicyResolution};

pub use registry::PolicyRegistry;

pub use resolver::{detect_conflicts, find_conflict, resolve_conflict};
