//! Engine Configuration
//!
//! Step sizes, override window, seed state and pattern lookup tables.
//! Loaded from JSON or built from defaults + environment overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{EngineError, EngineResult};
use crate::logic::decision::Action;
use crate::logic::gate::DEFAULT_PATTERN_KEYWORDS;
use crate::logic::policy::PolicyRegistry;
use crate::logic::store::PatternState;

// ============================================================================
// SECTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Pattern must have strictly more occurrences than this
    pub min_occurrences: u64,
    pub confidence_step: f64,
    pub false_positive_step: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            min_occurrences: constants::DEFAULT_EVOLUTION_MIN_OCCURRENCES,
            confidence_step: 0.03,
            false_positive_step: 0.03,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub confidence_reward: f64,
    pub confidence_penalty: f64,
    pub edge_reward: f64,
    pub edge_penalty: f64,
    /// Alerts rerouted after an incorrect outcome
    pub override_window: u32,
    pub override_action: Action,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            confidence_reward: 0.003,
            confidence_penalty: 0.06,
            edge_reward: 0.02,
            edge_penalty: 0.05,
            override_window: constants::DEFAULT_OVERRIDE_WINDOW,
            override_action: Action::EscalateTier2,
        }
    }
}

/// State assumed for a pattern or edge on first touch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub pattern_confidence: f64,
    pub false_positive_rate: f64,
    pub edge_weight: f64,
    /// Patterns loaded into the store at engine start
    pub patterns: HashMap<String, PatternState>,
    /// Edge weights loaded into the store at engine start
    pub edges: HashMap<String, f64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        let patterns = HashMap::from([
            ("PAT-TRAVEL-001".to_string(), PatternState::new(0.94, 0.20, 127)),
            ("PAT-PHISH-001".to_string(), PatternState::new(0.89, 0.20, 89)),
        ]);
        let edges = HashMap::from([
            ("User->TravelContext".to_string(), 0.91),
            ("User->PhishingCampaign".to_string(), 0.87),
        ]);

        Self {
            pattern_confidence: 0.91,
            false_positive_rate: 0.20,
            edge_weight: 0.90,
            patterns,
            edges,
        }
    }
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub evolution: EvolutionConfig,
    pub feedback: FeedbackConfig,
    pub seed: SeedConfig,
    /// Pattern id -> causal relation adjusted by feedback
    pub pattern_edges: HashMap<String, String>,
    /// Pattern id -> faithfulness keywords
    pub pattern_keywords: HashMap<String, Vec<String>>,
    /// Policy registry JSON; built-in policies when unset
    pub policy_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let pattern_edges = HashMap::from([
            ("PAT-TRAVEL-001".to_string(), "User->TravelContext".to_string()),
            ("PAT-PHISH-001".to_string(), "User->PhishingCampaign".to_string()),
            ("PAT-PHISH-KNOWN".to_string(), "User->PhishingCampaign".to_string()),
        ]);

        Self {
            evolution: EvolutionConfig::default(),
            feedback: FeedbackConfig::default(),
            seed: SeedConfig::default(),
            pattern_edges,
            pattern_keywords: DEFAULT_PATTERN_KEYWORDS.clone(),
            policy_file: None,
        }
    }
}

impl EngineConfig {
    /// Conservative mode - longer safety window, steeper penalty
    pub fn conservative() -> Self {
        let mut config = Self::default();
        config.feedback.confidence_penalty = 0.10;
        config.feedback.edge_penalty = 0.08;
        config.feedback.override_window = 10;
        config.evolution.min_occurrences = 250;
        config
    }

    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// `SOC_CONFIG_FILE` (or defaults), then the env overrides
    pub fn from_env() -> EngineResult<Self> {
        let mut config = match constants::get_config_file() {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };

        if std::env::var("SOC_EVOLUTION_MIN_OCCURRENCES").is_ok() {
            config.evolution.min_occurrences = constants::get_evolution_min_occurrences();
        }
        if std::env::var("SOC_OVERRIDE_WINDOW").is_ok() {
            config.feedback.override_window = constants::get_override_window();
        }
        if let Some(path) = constants::get_policy_file() {
            config.policy_file = Some(path);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let steps = [
            ("evolution.confidence_step", self.evolution.confidence_step),
            ("evolution.false_positive_step", self.evolution.false_positive_step),
            ("feedback.confidence_reward", self.feedback.confidence_reward),
            ("feedback.confidence_penalty", self.feedback.confidence_penalty),
            ("feedback.edge_reward", self.feedback.edge_reward),
            ("feedback.edge_penalty", self.feedback.edge_penalty),
        ];
        for (name, value) in steps {
            if !(value.is_finite() && value > 0.0) {
                return Err(EngineError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        if self.feedback.override_window == 0 {
            return Err(EngineError::Config(
                "feedback.override_window must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Causal relation adjusted by feedback on `pattern_id`
    pub fn edge_for(&self, pattern_id: &str) -> String {
        self.pattern_edges
            .get(pattern_id)
            .cloned()
            .unwrap_or_else(|| format!("User->{}", pattern_id))
    }

    /// Registry from `policy_file`, or the built-in set
    pub fn load_policies(&self) -> EngineResult<PolicyRegistry> {
        match &self.policy_file {
            Some(path) => PolicyRegistry::from_json_file(path),
            None => Ok(PolicyRegistry::builtin()),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
