//! Experiment runner: independent chains fanned out over trials
//!
//! Each (trial, chain) unit draws from its own `StdRng`, seeded from the base
//! seed, trial ID, chain index and parameter point. Results are therefore
//! identical whether units run sequentially or on the rayon pool, and always
//! come back trial-major, chain-minor.

use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHasher;
use tracing::{debug, info};

use super::{ExperimentPreset, OutcomeRecord};
use crate::concept::ConceptEvaluator;
use crate::sampler::{ChainSampler, FitParameters};
use crate::stimulus::Trial;
use crate::{Error, Result};

/// Default number of chains per trial.
pub const DEFAULT_NUM_CHAINS: u32 = 50;

/// Derive the seed of one chain's random stream.
#[must_use]
pub fn chain_seed(base_seed: u64, trial_id: &str, chain_index: u32, params: &FitParameters) -> u64 {
    let mut hasher = FxHasher::default();
    base_seed.hash(&mut hasher);
    trial_id.hash(&mut hasher);
    chain_index.hash(&mut hasher);
    params.p_add.to_bits().hash(&mut hasher);
    params.steps.hash(&mut hasher);
    params.temperature.to_bits().hash(&mut hasher);
    hasher.finish()
}

/// Runs `num_chains` chains per trial for a parameter point.
#[derive(Debug, Clone)]
pub struct ExperimentRunner {
    evaluator: ConceptEvaluator,
    num_chains: u32,
    seed: u64,
    parallel: bool,
}

impl Default for ExperimentRunner {
    fn default() -> Self {
        Self {
            evaluator: ConceptEvaluator::default(),
            num_chains: DEFAULT_NUM_CHAINS,
            seed: 0,
            parallel: cfg!(feature = "rayon"),
        }
    }
}

impl ExperimentRunner {
    /// Create a runner with default evaluator, 50 chains and seed 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concept evaluator.
    #[must_use]
    pub const fn evaluator(mut self, evaluator: ConceptEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Set the number of chains per trial.
    #[must_use]
    pub const fn num_chains(mut self, num_chains: u32) -> Self {
        self.num_chains = num_chains;
        self
    }

    /// Set the base seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Run chains on the rayon pool. Ignored without the `rayon` feature.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Configured chains per trial.
    #[must_use]
    pub const fn chains_per_trial(&self) -> u32 {
        self.num_chains
    }

    /// Configured base seed.
    #[must_use]
    pub const fn base_seed(&self) -> u64 {
        self.seed
    }

    /// Configured evaluator.
    #[must_use]
    pub const fn concept_evaluator(&self) -> &ConceptEvaluator {
        &self.evaluator
    }

    /// Run every trial under `params`, labeling records with the parameter
    /// point's condition label.
    ///
    /// # Errors
    ///
    /// Returns error if the parameters are invalid.
    pub fn run(&self, trials: &[Trial], params: FitParameters) -> Result<Vec<OutcomeRecord>> {
        self.run_with_condition(trials, params, &params.condition_label())
    }

    /// Run every trial under `params` with an explicit condition label.
    ///
    /// # Errors
    ///
    /// Returns error if the parameters are invalid or `num_chains` is zero.
    pub fn run_with_condition(
        &self,
        trials: &[Trial],
        params: FitParameters,
        condition: &str,
    ) -> Result<Vec<OutcomeRecord>> {
        params.validate()?;
        self.evaluator.validate()?;
        if self.num_chains == 0 {
            return Err(Error::InvalidInput(
                "num_chains must be at least 1".to_string(),
            ));
        }

        debug!(
            trials = trials.len(),
            chains = self.num_chains,
            %params,
            "running parameter point"
        );

        let units: Vec<(&Trial, u32)> = trials
            .iter()
            .flat_map(|trial| (0..self.num_chains).map(move |chain| (trial, chain)))
            .collect();

        if self.parallel {
            return self.run_parallel(&units, params, condition);
        }
        units
            .iter()
            .map(|&(trial, chain)| self.run_chain(trial, chain, params, condition))
            .collect()
    }

    fn run_chain(
        &self,
        trial: &Trial,
        chain: u32,
        params: FitParameters,
        condition: &str,
    ) -> Result<OutcomeRecord> {
        let mut rng = StdRng::seed_from_u64(chain_seed(self.seed, trial.id(), chain, &params));
        ChainSampler::new(trial, &self.evaluator, params)?.run(condition, chain, &mut rng)
    }

    #[cfg(feature = "rayon")]
    fn run_parallel(
        &self,
        units: &[(&Trial, u32)],
        params: FitParameters,
        condition: &str,
    ) -> Result<Vec<OutcomeRecord>> {
        use rayon::prelude::*;
        units
            .par_iter()
            .map(|&(trial, chain)| self.run_chain(trial, chain, params, condition))
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn run_parallel(
        &self,
        units: &[(&Trial, u32)],
        params: FitParameters,
        condition: &str,
    ) -> Result<Vec<OutcomeRecord>> {
        units
            .iter()
            .map(|&(trial, chain)| self.run_chain(trial, chain, params, condition))
            .collect()
    }

    /// Run every point of a preset experiment and concatenate the records.
    ///
    /// # Errors
    ///
    /// Returns error if any point fails.
    pub fn run_preset(&self, trials: &[Trial], preset: ExperimentPreset) -> Result<Vec<OutcomeRecord>> {
        let runner = self.clone().num_chains(preset.num_chains());
        let points = preset.points();
        info!(
            preset = %preset,
            points = points.len(),
            trials = trials.len(),
            chains = runner.num_chains,
            "running preset experiment"
        );

        let mut records = Vec::new();
        for params in points {
            records.extend(runner.run(trials, params)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stimulus::{Example, Feature, Hypothesis, StimulusObject};

    fn trials() -> Vec<Trial> {
        let a = StimulusObject::new(1, Feature::Circle, Feature::Red, Feature::Solid, Feature::Big)
            .unwrap();
        let b =
            StimulusObject::new(2, Feature::Square, Feature::Red, Feature::Striped, Feature::Small)
                .unwrap();
        vec![
            Trial::new(
                "sub",
                "subtractive",
                Hypothesis::parse(&["red", "big"]).unwrap(),
                vec![Example::new(a, true), Example::new(b, true)],
            )
            .unwrap(),
            Trial::new(
                "add",
                "additive",
                Hypothesis::parse(&["red"]).unwrap(),
                vec![Example::new(a, true), Example::new(b, false)],
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_record_count_and_order() {
        let params = FitParameters::new(0.5, 20, 1.0).unwrap();
        let records = ExperimentRunner::new().num_chains(3).run(&trials(), params).unwrap();
        assert_eq!(records.len(), 6);
        let order: Vec<(&str, u32)> = records
            .iter()
            .map(|r| (r.trial_id(), r.chain_index()))
            .collect();
        assert_eq!(
            order,
            vec![("sub", 0), ("sub", 1), ("sub", 2), ("add", 0), ("add", 1), ("add", 2)]
        );
        assert!(records.iter().all(|r| r.condition() == "p_add=0.5_steps=20_temp=1.0"));
    }

    #[test]
    fn test_same_seed_same_records() {
        let params = FitParameters::new(0.3, 100, 1.5).unwrap();
        let runner = ExperimentRunner::new().num_chains(5).seed(42);
        assert_eq!(
            runner.run(&trials(), params).unwrap(),
            runner.run(&trials(), params).unwrap()
        );
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let params = FitParameters::new(0.7, 80, 1.0).unwrap();
        let runner = ExperimentRunner::new().num_chains(8).seed(9);
        assert_eq!(
            runner.clone().parallel(false).run(&trials(), params).unwrap(),
            runner.parallel(true).run(&trials(), params).unwrap()
        );
    }

    #[test]
    fn test_chain_seeds_differ() {
        let params = FitParameters::new(0.5, 10, 1.0).unwrap();
        assert_ne!(chain_seed(0, "t1", 0, &params), chain_seed(0, "t1", 1, &params));
        assert_ne!(chain_seed(0, "t1", 0, &params), chain_seed(0, "t2", 0, &params));
        assert_ne!(chain_seed(0, "t1", 0, &params), chain_seed(1, "t1", 0, &params));
    }

    #[test]
    fn test_zero_chains_rejected() {
        let params = FitParameters::new(0.5, 10, 1.0).unwrap();
        assert!(ExperimentRunner::new().num_chains(0).run(&trials(), params).is_err());
    }

    #[test]
    fn test_field_built_parameters_validated() {
        let params = FitParameters {
            p_add: 0.5,
            steps: 10,
            temperature: -1.0,
        };
        let result = ExperimentRunner::new().num_chains(2).run(&trials(), params);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
