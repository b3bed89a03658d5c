//! Chain sampler: fixed-length Metropolis random walk over hypotheses
//!
//! ## State Machine
//!
//! ```text
//! Running(h, lp) --step--> Running(h', lp')   (accepted move)
//!                --step--> Running(h, lp)     (rejected, or no move possible)
//! after `steps` steps -> Done -> classify(initial, final)
//! ```
//!
//! Acceptance is `min(1, exp((lp' - lp) / temperature))`. High temperature
//! approaches a blind random walk; low temperature is greedy hill climbing.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::concept::ConceptEvaluator;
use crate::experiment::OutcomeRecord;
use crate::proposal::{propose, MoveKind, Proposal};
use crate::stimulus::{Hypothesis, Trial};
use crate::{Error, Result};

/// Net change of a chain relative to the trial's initial hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Features added, none removed
    Additive,
    /// Features removed, none added
    Subtractive,
    /// Features both added and removed
    Mixed,
    /// Final hypothesis has the same features as the initial one
    NoChange,
}

impl ResponseType {
    /// Categories in distribution-vector order.
    pub const ALL: [Self; 4] = [Self::Additive, Self::Subtractive, Self::Mixed, Self::NoChange];

    /// Position in a distribution vector.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Additive => 0,
            Self::Subtractive => 1,
            Self::Mixed => 2,
            Self::NoChange => 3,
        }
    }

    /// Name as stored in outcome and response files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Additive => "additive",
            Self::Subtractive => "subtractive",
            Self::Mixed => "mixed",
            Self::NoChange => "nochange",
        }
    }

    /// Classify the net change from `initial` to `final_h`.
    #[must_use]
    pub fn classify(initial: &Hypothesis, final_h: &Hypothesis) -> Self {
        let removed = !initial.difference(final_h).is_empty();
        let added = !final_h.difference(initial).is_empty();
        match (added, removed) {
            (false, true) => Self::Subtractive,
            (true, false) => Self::Additive,
            (true, true) => Self::Mixed,
            (false, false) => Self::NoChange,
        }
    }
}

impl FromStr for ResponseType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown response type '{s}'")))
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunable sampler parameters for one simulation point.
///
/// Deserialization and [`FitParameters::new`] validate; [`ChainSampler::new`]
/// re-checks values built field by field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParameterFields")]
pub struct FitParameters {
    /// Probability of proposing an additive move when both kinds are possible
    pub p_add: f64,
    /// Step budget per chain
    pub steps: u32,
    /// Acceptance temperature
    pub temperature: f64,
}

#[derive(Deserialize)]
struct ParameterFields {
    p_add: f64,
    steps: u32,
    temperature: f64,
}

impl TryFrom<ParameterFields> for FitParameters {
    type Error = Error;

    fn try_from(fields: ParameterFields) -> Result<Self> {
        Self::new(fields.p_add, fields.steps, fields.temperature)
    }
}

impl FitParameters {
    /// Create validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] unless `p_add` is in `[0, 1]` and
    /// `temperature` is finite and positive.
    pub fn new(p_add: f64, steps: u32, temperature: f64) -> Result<Self> {
        let params = Self {
            p_add,
            steps,
            temperature,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.p_add) {
            return Err(Error::InvalidInput(format!(
                "p_add must be in [0, 1], got {}",
                self.p_add
            )));
        }
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(Error::InvalidInput(format!(
                "temperature must be positive, got {}",
                self.temperature
            )));
        }
        Ok(())
    }

    /// Condition label, e.g. `p_add=0.5_steps=500_temp=1.0`.
    #[must_use]
    pub fn condition_label(&self) -> String {
        format!(
            "p_add={:?}_steps={}_temp={:?}",
            self.p_add, self.steps, self.temperature
        )
    }

    /// Parse a label produced by [`Self::condition_label`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the label is not in that format.
    pub fn from_condition_label(label: &str) -> Result<Self> {
        let bad = || Error::InvalidInput(format!("Not a parameter condition label: '{label}'"));
        let rest = label.strip_prefix("p_add=").ok_or_else(bad)?;
        let (p_add, rest) = rest.split_once("_steps=").ok_or_else(bad)?;
        let (steps, temperature) = rest.split_once("_temp=").ok_or_else(bad)?;
        Self::new(
            p_add.parse().map_err(|_| bad())?,
            steps.parse().map_err(|_| bad())?,
            temperature.parse().map_err(|_| bad())?,
        )
    }
}

impl fmt::Display for FitParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.condition_label())
    }
}

/// Running state of one chain.
#[derive(Debug, Clone)]
pub struct ChainState {
    current: Hypothesis,
    log_posterior: f64,
    additive_moves: u32,
    subtractive_moves: u32,
    steps_taken: u32,
}

impl ChainState {
    /// Current hypothesis.
    #[must_use]
    pub const fn current(&self) -> &Hypothesis {
        &self.current
    }

    /// Log-posterior of the current hypothesis.
    #[must_use]
    pub const fn log_posterior(&self) -> f64 {
        self.log_posterior
    }

    /// Accepted additive moves so far.
    #[must_use]
    pub const fn additive_moves(&self) -> u32 {
        self.additive_moves
    }

    /// Accepted subtractive moves so far.
    #[must_use]
    pub const fn subtractive_moves(&self) -> u32 {
        self.subtractive_moves
    }

    /// Steps consumed, including rejected and degenerate ones.
    #[must_use]
    pub const fn steps_taken(&self) -> u32 {
        self.steps_taken
    }
}

/// Metropolis sampler bound to one trial.
///
/// Owns no randomness: the caller passes the chain's own stream.
#[derive(Debug, Clone, Copy)]
pub struct ChainSampler<'a> {
    trial: &'a Trial,
    evaluator: &'a ConceptEvaluator,
    params: FitParameters,
}

impl<'a> ChainSampler<'a> {
    /// Bind a sampler to a trial.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `params` or `evaluator` is out of range.
    pub fn new(
        trial: &'a Trial,
        evaluator: &'a ConceptEvaluator,
        params: FitParameters,
    ) -> Result<Self> {
        params.validate()?;
        evaluator.validate()?;
        Ok(Self {
            trial,
            evaluator,
            params,
        })
    }

    /// State before the first step.
    #[must_use]
    pub fn initial_state(&self) -> ChainState {
        let current = self.trial.hypothesis().clone();
        let log_posterior = self.evaluator.log_posterior(&current, self.trial.examples());
        ChainState {
            current,
            log_posterior,
            additive_moves: 0,
            subtractive_moves: 0,
            steps_taken: 0,
        }
    }

    /// Advance one step.
    ///
    /// A degenerate proposal still consumes the step but draws no acceptance
    /// number.
    pub fn step<R: Rng + ?Sized>(&self, state: &mut ChainState, rng: &mut R) {
        let proposal = propose(&state.current, self.params.p_add, rng);
        self.advance(state, proposal, rng);
    }

    // Consume one step on `proposal`; the acceptance draw is the only RNG use
    pub(crate) fn advance<R: Rng + ?Sized>(
        &self,
        state: &mut ChainState,
        proposal: Proposal,
        rng: &mut R,
    ) {
        state.steps_taken += 1;
        if proposal.kind == MoveKind::None {
            return;
        }

        let proposal_lp = self
            .evaluator
            .log_posterior(&proposal.hypothesis, self.trial.examples());
        let delta = proposal_lp - state.log_posterior;
        let accept = (delta / self.params.temperature).exp().min(1.0);

        if rng.gen::<f64>() < accept {
            state.current = proposal.hypothesis;
            state.log_posterior = proposal_lp;
            match proposal.kind {
                MoveKind::Additive => state.additive_moves += 1,
                MoveKind::Subtractive => state.subtractive_moves += 1,
                MoveKind::None => {}
            }
        }
    }

    /// Run the full step budget and classify the result.
    ///
    /// # Errors
    ///
    /// Returns error only if the trial has no examples, which validated
    /// trials never do.
    pub fn run<R: Rng + ?Sized>(
        &self,
        condition: &str,
        chain_index: u32,
        rng: &mut R,
    ) -> Result<OutcomeRecord> {
        let mut state = self.initial_state();
        for _ in 0..self.params.steps {
            self.step(&mut state, rng);
        }

        let record = OutcomeRecord::from_final_state(self.trial, condition, chain_index, &state)?;
        trace!(
            trial = self.trial.id(),
            chain = chain_index,
            response = %record.response_type(),
            final_hypothesis = %record.final_hypothesis(),
            "chain done"
        );
        Ok(record)
    }
}
