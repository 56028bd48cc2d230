//! Context Module
//!
//! Situational fact snapshot for one security event (actor, asset,
//! travel/authentication signals, pattern and campaign hints).
//! Immutable per decision cycle - the engine only reads it.
//!
//! ## Structure
//! - `types`: `Context`, `AlertType`, `AssetCriticality`
//! - `fields`: named field access used by policy predicates

pub mod types;
pub mod fields;

pub use types::{AlertType, AssetCriticality, Context, VIP_TITLE_TERMS};
pub use fields::{ContextField, FieldValue};
