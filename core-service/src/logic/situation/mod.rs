//! Situation Module
//!
//! Maps a Context to a situation category + confidence + evidence factors.
//! Rule precedence is significant: conditions overlap, first match wins.
//!
//! ## Structure
//! - `types`: `SituationCategory`, `SituationClassification`
//! - `rules`: calibrated confidences and the ordered rule table
//! - `classifier`: table walk
//!
//! ## Usage
//! ```ignore
//! use crate::logic::situation::{classify, SituationCategory};
//!
//! let result = classify(&context);
//! if result.category == SituationCategory::Unknown {
//!     // manual review path
//! }
//! ```

pub mod types;
pub mod rules;
pub mod classifier;

pub use types::{SituationCategory, SituationClassification};

pub use rules::{ClassificationRule, CLASSIFICATION_RULES};

pub use classifier::{classify, classify_with_rules};
