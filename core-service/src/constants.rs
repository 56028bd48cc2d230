//! Central Configuration Constants
//!
//! Single source of truth for engine-wide defaults.
//! Per-module calibrated scores live next to the module that uses them
//! (`situation::rules`, `gate::rules`).

use std::path::PathBuf;

/// Engine version
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name
pub const ENGINE_NAME: &str = "SOC Decision Core";

/// Pattern must have strictly more occurrences than this to evolve
pub const DEFAULT_EVOLUTION_MIN_OCCURRENCES: u64 = 100;

/// Alerts rerouted to manual review after a confirmed wrong decision
pub const DEFAULT_OVERRIDE_WINDOW: u32 = 5;

/// Decisions held for feedback by alert id; oldest dropped past this
pub const MAX_PENDING_DECISIONS: usize = 10_000;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get evolution occurrence threshold from environment or use default
pub fn get_evolution_min_occurrences() -> u64 {
    std::env::var("SOC_EVOLUTION_MIN_OCCURRENCES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_EVOLUTION_MIN_OCCURRENCES)
}

/// Get override window size from environment or use default
pub fn get_override_window() -> u32 {
    std::env::var("SOC_OVERRIDE_WINDOW")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_OVERRIDE_WINDOW)
}

/// Policy registry file (JSON), if configured
pub fn get_policy_file() -> Option<PathBuf> {
    std::env::var("SOC_POLICY_FILE")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

/// Engine config file (JSON), if configured
pub fn get_config_file() -> Option<PathBuf> {
    std::env::var("SOC_CONFIG_FILE")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}
