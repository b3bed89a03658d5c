//! Grid search over `p_add x steps x temperature`

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::rank::lowest_k;
use crate::distribution::{compute_distribution, Distribution, Objective};
use crate::experiment::ExperimentRunner;
use crate::sampler::FitParameters;
use crate::stimulus::Trial;
use crate::{Error, Result};

/// Finite grid of sampler parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGrid {
    /// Candidate additive-proposal probabilities
    pub p_add: Vec<f64>,
    /// Candidate step budgets
    pub steps: Vec<u32>,
    /// Candidate temperatures
    pub temperature: Vec<f64>,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            p_add: vec![0.1, 0.3, 0.5, 0.7, 0.9],
            steps: vec![100, 200, 500, 800],
            temperature: vec![0.5, 1.0, 1.5, 2.0],
        }
    }
}

impl ParameterGrid {
    /// Create a grid from explicit axes.
    #[must_use]
    pub fn new(p_add: Vec<f64>, steps: Vec<u32>, temperature: Vec<f64>) -> Self {
        Self {
            p_add,
            steps,
            temperature,
        }
    }

    /// Number of grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.p_add.len() * self.steps.len() * self.temperature.len()
    }

    /// True if any axis is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cartesian product, `p_add` outermost and temperature innermost.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyGrid`] if any axis is empty, or
    /// [`Error::InvalidInput`] if a point is out of range.
    pub fn points(&self) -> Result<Vec<FitParameters>> {
        if self.is_empty() {
            return Err(Error::EmptyGrid);
        }
        let mut points = Vec::with_capacity(self.len());
        for &p_add in &self.p_add {
            for &steps in &self.steps {
                for &temperature in &self.temperature {
                    points.push(FitParameters::new(p_add, steps, temperature)?);
                }
            }
        }
        Ok(points)
    }
}

/// One evaluated grid point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Additive-proposal probability
    pub p_add: f64,
    /// Step budget
    pub steps: u32,
    /// Temperature
    pub temperature: f64,
    /// Objective value against the target distribution
    pub loss: f64,
}

impl GridPoint {
    /// Parameters of this point.
    #[must_use]
    pub const fn params(&self) -> FitParameters {
        FitParameters {
            p_add: self.p_add,
            steps: self.steps,
            temperature: self.temperature,
        }
    }
}

/// Every evaluated point plus the minimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    points: Vec<GridPoint>,
    best: GridPoint,
}

impl FitReport {
    /// Build a report, selecting the first point with minimum loss.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyGrid`] if `points` is empty.
    pub fn from_points(points: Vec<GridPoint>) -> Result<Self> {
        let best = points
            .iter()
            .copied()
            .reduce(|best, p| if p.loss < best.loss { p } else { best })
            .ok_or(Error::EmptyGrid)?;
        Ok(Self { points, best })
    }

    /// Evaluated points in grid order.
    #[must_use]
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    /// Minimum-loss point.
    #[must_use]
    pub const fn best(&self) -> GridPoint {
        self.best
    }

    /// Fitted parameters.
    #[must_use]
    pub const fn best_params(&self) -> FitParameters {
        self.best.params()
    }

    /// The `k` lowest-loss points, ascending by loss.
    #[must_use]
    pub fn top_k(&self, k: usize) -> Vec<GridPoint> {
        lowest_k(&self.points, k)
    }

    /// Loss recorded for `params`, if it was on the grid.
    #[must_use]
    pub fn loss_at(&self, params: &FitParameters) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.params() == *params)
            .map(|p| p.loss)
    }
}

/// Fits sampler parameters to a target distribution by exhaustive search.
#[derive(Debug, Clone)]
pub struct GridSearch {
    runner: ExperimentRunner,
    grid: ParameterGrid,
    objective: Objective,
}

impl GridSearch {
    /// Search `grid` with `runner`, minimizing KL divergence.
    #[must_use]
    pub fn new(runner: ExperimentRunner, grid: ParameterGrid) -> Self {
        Self {
            runner,
            grid,
            objective: Objective::Kl,
        }
    }

    /// Use a different objective.
    #[must_use]
    pub const fn objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// The grid being searched.
    #[must_use]
    pub const fn grid(&self) -> &ParameterGrid {
        &self.grid
    }

    /// Simulate one point and score it against `target`.
    ///
    /// # Errors
    ///
    /// Returns error if the simulation fails or produces no records.
    pub fn evaluate(
        &self,
        trials: &[Trial],
        params: FitParameters,
        target: &Distribution,
    ) -> Result<f64> {
        let records = self.runner.run(trials, params)?;
        let model = compute_distribution(&records)?;
        let loss = target.divergence(&model, self.objective);
        debug!(%params, %model, loss, "evaluated grid point");
        Ok(loss)
    }

    /// Evaluate every grid point and pick the minimizer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyGrid`] for an empty grid, or any simulation error.
    pub fn fit(&self, trials: &[Trial], target: &Distribution) -> Result<FitReport> {
        let points = self.grid.points()?;
        info!(
            points = points.len(),
            trials = trials.len(),
            chains = self.runner.chains_per_trial(),
            objective = %self.objective,
            "beginning grid search"
        );

        let mut evaluated = Vec::with_capacity(points.len());
        for params in points {
            let loss = self.evaluate(trials, params, target)?;
            info!(%params, loss, "tested");
            evaluated.push(GridPoint {
                p_add: params.p_add,
                steps: params.steps,
                temperature: params.temperature,
                loss,
            });
        }

        let report = FitReport::from_points(evaluated)?;
        info!(best = %report.best_params(), loss = report.best().loss, "grid search complete");
        Ok(report)
    }
}
