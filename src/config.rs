//! Model and fit configuration
//!
//! Loaded from a JSON file where every field is optional:
//!
//! ```json
//! {
//!   "evaluator": { "noise": 0.05, "complexity_penalty": 0.7 },
//!   "num_chains": 50,
//!   "seed": 0,
//!   "grid": { "p_add": [0.1, 0.5, 0.9], "steps": [100, 500], "temperature": [1.0] },
//!   "reference_condition": "normal",
//!   "objective": "kl",
//!   "parallel": true
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::concept::ConceptEvaluator;
use crate::distribution::Objective;
use crate::experiment::{ExperimentRunner, DEFAULT_NUM_CHAINS};
use crate::fit::{GridSearch, ParameterGrid};
use crate::{Error, Result};

/// Human condition used as the fitting target unless configured otherwise.
pub const DEFAULT_REFERENCE_CONDITION: &str = "normal";

/// Everything needed to simulate and fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Evaluator constants
    pub evaluator: ConceptEvaluator,
    /// Chains per trial at each parameter point
    pub num_chains: u32,
    /// Base seed for every chain stream
    pub seed: u64,
    /// Search grid
    pub grid: ParameterGrid,
    /// Human condition providing the target distribution
    pub reference_condition: String,
    /// Loss minimized by the search
    pub objective: Objective,
    /// Fan chains out on the rayon pool when available
    pub parallel: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            evaluator: ConceptEvaluator::default(),
            num_chains: DEFAULT_NUM_CHAINS,
            seed: 0,
            grid: ParameterGrid::default(),
            reference_condition: DEFAULT_REFERENCE_CONDITION.to_string(),
            objective: Objective::Kl,
            parallel: true,
        }
    }
}

impl ModelConfig {
    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns error if the file is unreadable, malformed, or fails validation.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::StorageError(format!(
                "Failed to read config {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or fails validation.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] or [`Error::EmptyGrid`].
    pub fn validate(&self) -> Result<()> {
        self.evaluator.validate()?;
        if self.num_chains == 0 {
            return Err(Error::InvalidInput("num_chains must be positive".to_string()));
        }
        if self.reference_condition.is_empty() {
            return Err(Error::InvalidInput(
                "reference_condition must not be empty".to_string(),
            ));
        }
        self.grid.points()?;
        Ok(())
    }

    /// Set the evaluator constants.
    #[must_use]
    pub const fn with_evaluator(mut self, evaluator: ConceptEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Set the chains per trial.
    #[must_use]
    pub const fn with_num_chains(mut self, num_chains: u32) -> Self {
        self.num_chains = num_chains;
        self
    }

    /// Set the base seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the search grid.
    #[must_use]
    pub fn with_grid(mut self, grid: ParameterGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Set the reference condition.
    #[must_use]
    pub fn with_reference_condition(mut self, condition: impl Into<String>) -> Self {
        self.reference_condition = condition.into();
        self
    }

    /// Set the objective.
    #[must_use]
    pub const fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Enable or disable parallel fan-out.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Runner configured from these settings.
    #[must_use]
    pub fn runner(&self) -> ExperimentRunner {
        ExperimentRunner::new()
            .evaluator(self.evaluator)
            .num_chains(self.num_chains)
            .seed(self.seed)
            .parallel(self.parallel)
    }

    /// Grid search configured from these settings.
    #[must_use]
    pub fn grid_search(&self) -> GridSearch {
        GridSearch::new(self.runner(), self.grid.clone()).objective(self.objective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = ModelConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ModelConfig::default());
        assert_eq!(config.num_chains, 50);
        assert_eq!(config.reference_condition, "normal");
        assert_eq!(config.grid.len(), 80);
        assert!((config.evaluator.noise() - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_override() {
        let config = ModelConfig::from_json_str(
            r#"{"num_chains": 5, "objective": "l2", "evaluator": {"noise": 0.1}}"#,
        )
        .unwrap();
        assert_eq!(config.num_chains, 5);
        assert_eq!(config.objective, Objective::L2);
        assert!((config.evaluator.noise() - 0.1).abs() < f64::EPSILON);
        assert!((config.evaluator.complexity_penalty() - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validation_failures() {
        assert!(matches!(
            ModelConfig::from_json_str(r#"{"num_chains": 0}"#),
            Err(Error::InvalidInput(_))
        ));
        // Evaluator constants are checked while deserializing
        assert!(matches!(
            ModelConfig::from_json_str(r#"{"evaluator": {"noise": 1.5}}"#),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            ModelConfig::from_json_str(r#"{"grid": {"p_add": [], "steps": [1], "temperature": [1.0]}}"#),
            Err(Error::EmptyGrid)
        ));
        assert!(matches!(
            ModelConfig::from_json_str(r#"{"objective": "hinge"}"#),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_builders_reach_runner() {
        let config = ModelConfig::default()
            .with_num_chains(7)
            .with_seed(42)
            .with_parallel(false)
            .with_objective(Objective::CrossEntropy)
            .with_reference_condition("load");
        let runner = config.runner();
        assert_eq!(runner.chains_per_trial(), 7);
        assert_eq!(runner.base_seed(), 42);
        assert_eq!(config.reference_condition, "load");
        assert_eq!(config.grid_search().grid(), &ParameterGrid::default());
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"seed": 9}"#).unwrap();
        assert_eq!(ModelConfig::from_path(&path).unwrap().seed, 9);
        assert!(ModelConfig::from_path(dir.path().join("missing.json")).is_err());
    }
}
