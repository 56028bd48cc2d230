//! Evolution Module
//!
//! Two adaptation loops:
//! - within decisions: a gate-passing decision on an established pattern
//!   nudges that pattern's confidence and false-positive rate
//! - across decisions: prompt variants compete on recorded outcomes and
//!   the better one in a family is promoted
//!
//! Both are bounded, deterministic arithmetic over named state.
//!
//! ## Structure
//! - `types`: `EvolutionEvent`, `EvolutionOutcome`, `ImpactTier`
//! - `tracker`: `EvolutionTracker` (pattern state)
//! - `variants`: `VariantTracker` (prompt variants)

pub mod types;
pub mod tracker;
pub mod variants;

pub use types::{EvolutionEvent, EvolutionKind, EvolutionOutcome, EvolutionSkip, ImpactTier};

pub use tracker::EvolutionTracker;

pub use variants::{
    VariantComparison, VariantPromotion, VariantStats, VariantTracker, DEFAULT_VARIANT,
};
