//! Concept evaluator: noisy-channel likelihood plus description-length prior
//!
//! ```text
//! log_prior(h)          = -complexity_penalty * |h|
//! log_likelihood(h, E)  = sum over E of  ln(1 - noise)  if h predicts the label
//!                                        ln(noise)      otherwise
//! log_posterior         = log_prior + log_likelihood
//! ```
//!
//! Mispredicted examples are penalized, never forbidden.

use serde::{Deserialize, Serialize};

use crate::stimulus::{Example, Hypothesis, StimulusObject};
use crate::{Error, Result};

/// Default label-noise level.
pub const DEFAULT_NOISE: f64 = 0.05;

/// Default per-feature complexity cost.
pub const DEFAULT_COMPLEXITY_PENALTY: f64 = 0.7;

/// Scores hypotheses against labeled examples.
///
/// * `noise` controls likelihood sharpness: lower values punish
///   mispredictions harder.
/// * `complexity_penalty` controls how strongly the prior prefers short
///   hypotheses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EvaluatorFields")]
pub struct ConceptEvaluator {
    noise: f64,
    complexity_penalty: f64,
}

// Wire form; every deserialized evaluator passes through `validate`
#[derive(Deserialize)]
#[serde(default)]
struct EvaluatorFields {
    noise: f64,
    complexity_penalty: f64,
}

impl Default for EvaluatorFields {
    fn default() -> Self {
        Self {
            noise: DEFAULT_NOISE,
            complexity_penalty: DEFAULT_COMPLEXITY_PENALTY,
        }
    }
}

impl TryFrom<EvaluatorFields> for ConceptEvaluator {
    type Error = Error;

    fn try_from(fields: EvaluatorFields) -> Result<Self> {
        Self::new(fields.noise, fields.complexity_penalty)
    }
}

impl Default for ConceptEvaluator {
    fn default() -> Self {
        Self {
            noise: DEFAULT_NOISE,
            complexity_penalty: DEFAULT_COMPLEXITY_PENALTY,
        }
    }
}

impl ConceptEvaluator {
    /// Create an evaluator with explicit constants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] unless `0 < noise < 1` and
    /// `complexity_penalty >= 0`.
    pub fn new(noise: f64, complexity_penalty: f64) -> Result<Self> {
        let evaluator = Self {
            noise,
            complexity_penalty,
        };
        evaluator.validate()?;
        Ok(evaluator)
    }

    /// Check the constants are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if !(self.noise > 0.0 && self.noise < 1.0) {
            return Err(Error::InvalidInput(format!(
                "noise must be in (0, 1), got {}",
                self.noise
            )));
        }
        if !self.complexity_penalty.is_finite() || self.complexity_penalty < 0.0 {
            return Err(Error::InvalidInput(format!(
                "complexity_penalty must be finite and >= 0, got {}",
                self.complexity_penalty
            )));
        }
        Ok(())
    }

    /// Label-noise level.
    #[must_use]
    pub const fn noise(&self) -> f64 {
        self.noise
    }

    /// Per-feature prior cost.
    #[must_use]
    pub const fn complexity_penalty(&self) -> f64 {
        self.complexity_penalty
    }

    /// True iff every feature of `hypothesis` is present on `object`.
    #[must_use]
    pub fn satisfies(hypothesis: &Hypothesis, object: &StimulusObject) -> bool {
        hypothesis.features().iter().all(|f| object.has(*f))
    }

    /// Description-length prior.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn log_prior(&self, hypothesis: &Hypothesis) -> f64 {
        -self.complexity_penalty * hypothesis.len() as f64
    }

    /// Noisy-channel log-likelihood of the labels under `hypothesis`.
    #[must_use]
    pub fn log_likelihood(&self, hypothesis: &Hypothesis, examples: &[Example]) -> f64 {
        let hit = (1.0 - self.noise).ln();
        let miss = self.noise.ln();
        examples
            .iter()
            .map(|ex| {
                if Self::predicts(hypothesis, ex) {
                    hit
                } else {
                    miss
                }
            })
            .sum()
    }

    /// Unnormalized log-posterior.
    #[must_use]
    pub fn log_posterior(&self, hypothesis: &Hypothesis, examples: &[Example]) -> f64 {
        self.log_prior(hypothesis) + self.log_likelihood(hypothesis, examples)
    }

    /// Fraction of examples whose label `hypothesis` predicts correctly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `examples` is empty.
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(hypothesis: &Hypothesis, examples: &[Example]) -> Result<f64> {
        if examples.is_empty() {
            return Err(Error::InvalidInput(
                "accuracy needs at least one example".to_string(),
            ));
        }
        let correct = examples
            .iter()
            .filter(|ex| Self::predicts(hypothesis, ex))
            .count();
        Ok(correct as f64 / examples.len() as f64)
    }

    fn predicts(hypothesis: &Hypothesis, example: &Example) -> bool {
        Self::satisfies(hypothesis, example.object()) == example.is_member()
    }
}
