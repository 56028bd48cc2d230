//! Bounds Module
//!
//! Hard clamp ranges for mutable pattern and edge state. A value outside
//! its range means a caller or logic bug: it is clamped, logged and kept
//! in a bounded in-memory audit trail, never raised as an error.
//! Learning steps that merely reach a bound saturate quietly (`step`).

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Clamp events kept in memory
pub const MAX_CLAMP_EVENTS: usize = 1_000;

// ============================================================================
// BOUNDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const CONFIDENCE: Bounds = Bounds { min: 0.50, max: 0.99 };
    pub const FALSE_POSITIVE_RATE: Bounds = Bounds { min: 0.05, max: 1.0 };
    pub const EDGE_WEIGHT: Bounds = Bounds { min: 0.50, max: 0.99 };

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// NaN maps to `min`
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

// ============================================================================
// CLAMP AUDIT
// ============================================================================

/// One out-of-range write that was clamped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClampEvent {
    /// Pattern id or relation name
    pub entity: String,
    pub field: String,
    pub attempted: f64,
    pub clamped: f64,
    pub bounds: Bounds,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ClampAudit {
    events: RwLock<VecDeque<ClampEvent>>,
    capacity: usize,
}

impl ClampAudit {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CLAMP_EVENTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Clamp `value` into `bounds`, recording an event when it was outside.
    /// Boundary values (== min or == max) are not clamp events.
    pub fn clamp(&self, bounds: Bounds, entity: &str, field: &str, value: f64) -> f64 {
        let clamped = bounds.clamp(value);
        if clamped == value {
            return value;
        }

        log::warn!(
            "Clamped {}.{} from {:.4} to {:.4} (bounds {:.2}-{:.2})",
            entity,
            field,
            value,
            clamped,
            bounds.min,
            bounds.max
        );

        let mut events = self.events.write();
        events.push_back(ClampEvent {
            entity: entity.to_string(),
            field: field.to_string(),
            attempted: value,
            clamped,
            bounds,
            timestamp: Utc::now(),
        });
        while events.len() > self.capacity {
            events.pop_front();
        }

        clamped
    }

    /// Bound the result of a step taken from `current`. A step from an
    /// in-range value that runs past a bound saturates without an event;
    /// only an out-of-range `current` or a NaN result is recorded.
    pub fn step(&self, bounds: Bounds, entity: &str, field: &str, current: f64, next: f64) -> f64 {
        if !bounds.contains(current) || next.is_nan() {
            return self.clamp(bounds, entity, field, next);
        }

        let saturated = bounds.clamp(next);
        if saturated != next {
            log::debug!(
                "{}.{} saturated at {:.2} (step to {:.4})",
                entity,
                field,
                saturated,
                next
            );
        }
        saturated
    }

    /// Most recent `n` events, newest last
    pub fn recent(&self, n: usize) -> Vec<ClampEvent> {
        let events = self.events.read();
        let skip = events.len().saturating_sub(n);
        events.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl Default for ClampAudit {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_is_not_an_event() {
        let audit = ClampAudit::new();
        assert_eq!(audit.clamp(Bounds::CONFIDENCE, "P", "confidence", 0.99), 0.99);
        assert_eq!(audit.clamp(Bounds::CONFIDENCE, "P", "confidence", 0.50), 0.50);
        assert!(audit.is_empty());
    }

    #[test]
    fn test_out_of_range_is_clamped_and_recorded() {
        let audit = ClampAudit::new();
        assert_eq!(audit.clamp(Bounds::CONFIDENCE, "P", "confidence", 1.02), 0.99);
        assert_eq!(audit.clamp(Bounds::FALSE_POSITIVE_RATE, "P", "fp", 0.01), 0.05);
        assert_eq!(audit.clamp(Bounds::EDGE_WEIGHT, "R", "weight", f64::NAN), 0.50);

        let events = audit.recent(10);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].attempted, 1.02);
        assert_eq!(events[2].entity, "R");
    }

    #[test]
    fn test_step_saturation_is_not_an_event() {
        let audit = ClampAudit::new();
        assert_eq!(audit.step(Bounds::CONFIDENCE, "P", "confidence", 0.98, 1.01), 0.99);
        assert_eq!(audit.step(Bounds::FALSE_POSITIVE_RATE, "P", "fp", 0.06, 0.03), 0.05);
        assert_eq!(audit.step(Bounds::EDGE_WEIGHT, "R", "weight", 0.52, 0.47), 0.50);
        assert!(audit.is_empty());
    }

    #[test]
    fn test_step_from_out_of_range_is_recorded() {
        let audit = ClampAudit::new();
        assert_eq!(audit.step(Bounds::CONFIDENCE, "P", "confidence", 0.20, 0.26), 0.50);
        assert_eq!(audit.step(Bounds::CONFIDENCE, "P", "confidence", 0.90, f64::NAN), 0.50);
        assert_eq!(audit.len(), 2);
        assert_eq!(audit.recent(1)[0].field, "confidence");
    }

    #[test]
    fn test_ring_capacity() {
        let audit = ClampAudit::with_capacity(3);
        for i in 0..5 {
            audit.clamp(Bounds::CONFIDENCE, &format!("P{}", i), "confidence", 2.0);
        }
        assert_eq!(audit.len(), 3);
        let entities: Vec<String> = audit.recent(2).into_iter().map(|e| e.entity).collect();
        assert_eq!(entities, vec!["P3", "P4"]);
    }
}
