//! Fit Artifact - persisted outcome of a parameter search

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FitReport;
use crate::distribution::{Distribution, Objective};
use crate::sampler::FitParameters;

/// Fit Artifact records the fitted parameters and how they were obtained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FitArtifact {
    best: FitParameters,
    loss: f64,
    objective: Objective,
    reference_condition: String,
    target: Distribution,
    num_chains: u32,
    seed: u64,
    grid_points: usize,
    fitted_at: DateTime<Utc>,
}

impl FitArtifact {
    /// Create an artifact from a finished search, stamped with the current time.
    ///
    /// # Arguments
    ///
    /// * `report` - Result of the grid search
    /// * `objective` - Objective that was minimized
    /// * `reference_condition` - Human condition the target came from
    /// * `target` - Target distribution
    #[must_use]
    pub fn new(
        report: &FitReport,
        objective: Objective,
        reference_condition: impl Into<String>,
        target: Distribution,
    ) -> Self {
        FitArtifactBuilder::new(report, objective, reference_condition, target).build()
    }

    /// Create a builder for setting run metadata.
    #[must_use]
    pub fn builder(
        report: &FitReport,
        objective: Objective,
        reference_condition: impl Into<String>,
        target: Distribution,
    ) -> FitArtifactBuilder {
        FitArtifactBuilder::new(report, objective, reference_condition, target)
    }

    /// Get the best-fit parameters.
    #[must_use]
    pub const fn best(&self) -> FitParameters {
        self.best
    }

    /// Get the loss at the best-fit point.
    #[must_use]
    pub const fn loss(&self) -> f64 {
        self.loss
    }

    /// Get the minimized objective.
    #[must_use]
    pub const fn objective(&self) -> Objective {
        self.objective
    }

    /// Get the reference condition.
    #[must_use]
    pub fn reference_condition(&self) -> &str {
        &self.reference_condition
    }

    /// Get the target distribution.
    #[must_use]
    pub const fn target(&self) -> &Distribution {
        &self.target
    }

    /// Get the chains-per-trial used at each point.
    #[must_use]
    pub const fn num_chains(&self) -> u32 {
        self.num_chains
    }

    /// Get the base seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Get the number of grid points evaluated.
    #[must_use]
    pub const fn grid_points(&self) -> usize {
        self.grid_points
    }

    /// Get the fit timestamp.
    #[must_use]
    pub const fn fitted_at(&self) -> DateTime<Utc> {
        self.fitted_at
    }
}

/// Builder for `FitArtifact`.
#[derive(Debug)]
pub struct FitArtifactBuilder {
    best: FitParameters,
    loss: f64,
    objective: Objective,
    reference_condition: String,
    target: Distribution,
    num_chains: u32,
    seed: u64,
    grid_points: usize,
    fitted_at: DateTime<Utc>,
}

impl FitArtifactBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        report: &FitReport,
        objective: Objective,
        reference_condition: impl Into<String>,
        target: Distribution,
    ) -> Self {
        Self {
            best: report.best_params(),
            loss: report.best().loss,
            objective,
            reference_condition: reference_condition.into(),
            target,
            num_chains: 0,
            seed: 0,
            grid_points: report.points().len(),
            fitted_at: Utc::now(),
        }
    }

    /// Set the chains-per-trial.
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

    /// Set a custom timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn fitted_at(mut self, fitted_at: DateTime<Utc>) -> Self {
        self.fitted_at = fitted_at;
        self
    }

    /// Build the `FitArtifact`.
    #[must_use]
    pub fn build(self) -> FitArtifact {
        FitArtifact {
            best: self.best,
            loss: self.loss,
            objective: self.objective,
            reference_condition: self.reference_condition,
            target: self.target,
            num_chains: self.num_chains,
            seed: self.seed,
            grid_points: self.grid_points,
            fitted_at: self.fitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::GridPoint;

    fn report() -> FitReport {
        FitReport::from_points(vec![
            GridPoint {
                p_add: 0.3,
                steps: 100,
                temperature: 1.0,
                loss: 0.8,
            },
            GridPoint {
                p_add: 0.7,
                steps: 500,
                temperature: 1.5,
                loss: 0.05,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_artifact_from_report() {
        let target = Distribution::from_array([0.6, 0.4, 0.0, 0.0]);
        let artifact = FitArtifact::builder(&report(), Objective::Kl, "normal", target)
            .num_chains(50)
            .seed(7)
            .build();
        assert_eq!(artifact.best(), FitParameters::new(0.7, 500, 1.5).unwrap());
        assert!((artifact.loss() - 0.05).abs() < f64::EPSILON);
        assert_eq!(artifact.reference_condition(), "normal");
        assert_eq!(artifact.grid_points(), 2);
        assert_eq!(artifact.num_chains(), 50);
        assert_eq!(artifact.seed(), 7);
        assert_eq!(artifact.target(), &target);
    }

    #[test]
    fn test_artifact_serialization() {
        let target = Distribution::from_array([0.5, 0.5, 0.0, 0.0]);
        let artifact = FitArtifact::new(&report(), Objective::L2, "normal", target);
        let json = serde_json::to_string(&artifact).unwrap();
        let back: FitArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, artifact);
        assert_eq!(back.fitted_at(), artifact.fitted_at());
    }
}
