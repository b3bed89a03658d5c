//! Distribution comparator: response-type tallies and divergences
//!
//! Vectors are always ordered `[additive, subtractive, mixed, nochange]`.
//! Divergences add [`SMOOTHING`] to every entry so a category with zero
//! observations never produces `log(0)`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::experiment::OutcomeRecord;
use crate::sampler::ResponseType;
use crate::{Error, Result};

/// Additive smoothing applied inside every divergence.
pub const SMOOTHING: f64 = 1e-9;

/// Anything that carries a classified response and a condition label.
pub trait Observation {
    /// Classified response.
    fn response_type(&self) -> ResponseType;

    /// Condition the observation was made under.
    fn condition(&self) -> &str;
}

impl Observation for OutcomeRecord {
    fn response_type(&self) -> ResponseType {
        Self::response_type(self)
    }

    fn condition(&self) -> &str {
        Self::condition(self)
    }
}

/// Categorical distribution over the four response types.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Distribution {
    /// P(additive)
    pub additive: f64,
    /// P(subtractive)
    pub subtractive: f64,
    /// P(mixed)
    pub mixed: f64,
    /// P(nochange)
    pub nochange: f64,
}

impl Distribution {
    /// Normalize raw category counts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDistribution`] if every count is zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counts(counts: [usize; 4]) -> Result<Self> {
        let total: usize = counts.iter().sum();
        if total == 0 {
            return Err(Error::EmptyDistribution(
                "no observations to normalize".to_string(),
            ));
        }
        let p = |i: usize| counts[i] as f64 / total as f64;
        Ok(Self {
            additive: p(0),
            subtractive: p(1),
            mixed: p(2),
            nochange: p(3),
        })
    }

    /// Build from a probability vector.
    #[must_use]
    pub const fn from_array(p: [f64; 4]) -> Self {
        Self {
            additive: p[0],
            subtractive: p[1],
            mixed: p[2],
            nochange: p[3],
        }
    }

    /// Probability vector in canonical order.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 4] {
        [self.additive, self.subtractive, self.mixed, self.nochange]
    }

    /// Probability of one category.
    #[must_use]
    pub const fn get(&self, response: ResponseType) -> f64 {
        self.as_array()[response.index()]
    }

    /// Sum of all probabilities.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Divergence of `model` from `self` under `objective`.
    #[must_use]
    pub fn divergence(&self, model: &Self, objective: Objective) -> f64 {
        objective.evaluate(&self.as_array(), &model.as_array())
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "additive={:.3} subtractive={:.3} mixed={:.3} nochange={:.3}",
            self.additive, self.subtractive, self.mixed, self.nochange
        )
    }
}

/// Count response types in a collection.
pub fn tally<'a, I, O>(observations: I) -> [usize; 4]
where
    I: IntoIterator<Item = &'a O>,
    O: Observation + 'a,
{
    let mut counts = [0usize; 4];
    for obs in observations {
        counts[obs.response_type().index()] += 1;
    }
    counts
}

/// Tally and normalize a collection of observations.
///
/// # Errors
///
/// Returns [`Error::EmptyDistribution`] for an empty collection.
pub fn compute_distribution<'a, I, O>(observations: I) -> Result<Distribution>
where
    I: IntoIterator<Item = &'a O>,
    O: Observation + 'a,
{
    Distribution::from_counts(tally(observations))
}

/// One distribution per condition label, ordered by label.
#[must_use]
pub fn distributions_by_condition<'a, I, O>(observations: I) -> BTreeMap<String, Distribution>
where
    I: IntoIterator<Item = &'a O>,
    O: Observation + 'a,
{
    let mut counts: BTreeMap<String, [usize; 4]> = BTreeMap::new();
    for obs in observations {
        counts
            .entry(obs.condition().to_string())
            .or_default()[obs.response_type().index()] += 1;
    }
    counts
        .into_iter()
        .filter_map(|(condition, c)| Distribution::from_counts(c).ok().map(|d| (condition, d)))
        .collect()
}

/// Kullback-Leibler divergence `sum p * ln(p / q)`.
#[must_use]
pub fn kl_divergence(p: &[f64; 4], q: &[f64; 4]) -> f64 {
    p.iter()
        .zip(q)
        .map(|(&p, &q)| {
            let (p, q) = (p + SMOOTHING, q + SMOOTHING);
            p * (p / q).ln()
        })
        .sum()
}

/// Squared Euclidean distance `sum (p - q)^2`.
#[must_use]
pub fn l2_distance(p: &[f64; 4], q: &[f64; 4]) -> f64 {
    p.iter().zip(q).map(|(&p, &q)| (p - q).powi(2)).sum()
}

/// Cross-entropy `-sum p * ln(q)`.
#[must_use]
pub fn cross_entropy(p: &[f64; 4], q: &[f64; 4]) -> f64 {
    -p.iter()
        .zip(q)
        .map(|(&p, &q)| (p + SMOOTHING) * (q + SMOOTHING).ln())
        .sum::<f64>()
}

/// Signature shared by every divergence.
pub type DivergenceFn = fn(&[f64; 4], &[f64; 4]) -> f64;

/// Fitting objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// [`kl_divergence`]
    #[default]
    Kl,
    /// [`l2_distance`]
    L2,
    /// [`cross_entropy`]
    CrossEntropy,
}

impl Objective {
    /// The divergence function.
    #[must_use]
    pub const fn function(self) -> DivergenceFn {
        match self {
            Self::Kl => kl_divergence,
            Self::L2 => l2_distance,
            Self::CrossEntropy => cross_entropy,
        }
    }

    /// Loss of model vector `q` against target vector `p`.
    #[must_use]
    pub fn evaluate(self, p: &[f64; 4], q: &[f64; 4]) -> f64 {
        (self.function())(p, q)
    }

    /// Name used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kl => "kl",
            Self::L2 => "l2",
            Self::CrossEntropy => "cross_entropy",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Objective {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kl" => Ok(Self::Kl),
            "l2" => Ok(Self::L2),
            "cross_entropy" | "cross-entropy" => Ok(Self::CrossEntropy),
            other => Err(Error::InvalidInput(format!(
                "Unknown objective '{other}' (expected kl, l2 or cross_entropy)"
            ))),
        }
    }
}

/// Aggregate view of the records sharing one condition label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSummary {
    /// Condition label
    pub condition: String,
    /// Number of records
    pub count: usize,
    /// Response distribution
    pub distribution: Distribution,
    /// Mean final-hypothesis accuracy
    pub mean_accuracy: f64,
    /// Mean final-hypothesis length
    pub mean_final_length: f64,
}

/// Summarize outcome records per condition, ordered by condition label.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize_by_condition(records: &[OutcomeRecord]) -> Vec<ConditionSummary> {
    let mut groups: BTreeMap<&str, Vec<&OutcomeRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.condition()).or_default().push(record);
    }

    groups
        .into_iter()
        .filter_map(|(condition, group)| {
            let count = group.len();
            let distribution = compute_distribution(group.iter().copied()).ok()?;
            let n = count as f64;
            Some(ConditionSummary {
                condition: condition.to_string(),
                count,
                distribution,
                mean_accuracy: group.iter().map(|r| r.accuracy()).sum::<f64>() / n,
                mean_final_length: group.iter().map(|r| r.final_length() as f64).sum::<f64>() / n,
            })
        })
        .collect()
}
