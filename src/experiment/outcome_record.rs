//! Outcome Record - result of one completed chain

use serde::{Deserialize, Serialize};

use crate::concept::ConceptEvaluator;
use crate::sampler::{ChainState, ResponseType};
use crate::stimulus::{Hypothesis, Trial};
use crate::Result;

/// Outcome Record captures how one chain revised one trial's hypothesis.
///
/// Serializes as a flat key-value record with hypotheses as feature lists.
/// Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutcomeRecord {
    trial_id: String,
    trial_type: String,
    condition: String,
    chain_index: u32,
    initial_hypothesis: Hypothesis,
    final_hypothesis: Hypothesis,
    final_length: usize,
    response_type: ResponseType,
    additive_moves: u32,
    subtractive_moves: u32,
    accuracy: f64,
}

impl OutcomeRecord {
    /// Classify a finished chain.
    ///
    /// # Errors
    ///
    /// Returns error if the trial has no examples.
    pub fn from_final_state(
        trial: &Trial,
        condition: impl Into<String>,
        chain_index: u32,
        state: &ChainState,
    ) -> Result<Self> {
        let final_hypothesis = state.current().clone();
        Ok(Self {
            trial_id: trial.id().to_string(),
            trial_type: trial.trial_type().to_string(),
            condition: condition.into(),
            chain_index,
            initial_hypothesis: trial.hypothesis().clone(),
            final_length: final_hypothesis.len(),
            response_type: ResponseType::classify(trial.hypothesis(), &final_hypothesis),
            accuracy: ConceptEvaluator::accuracy(&final_hypothesis, trial.examples())?,
            additive_moves: state.additive_moves(),
            subtractive_moves: state.subtractive_moves(),
            final_hypothesis,
        })
    }

    /// Get the trial ID.
    #[must_use]
    pub fn trial_id(&self) -> &str {
        &self.trial_id
    }

    /// Get the trial type tag.
    #[must_use]
    pub fn trial_type(&self) -> &str {
        &self.trial_type
    }

    /// Get the condition label.
    #[must_use]
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Get the chain index within its trial.
    #[must_use]
    pub const fn chain_index(&self) -> u32 {
        self.chain_index
    }

    /// Get the trial's starting hypothesis.
    #[must_use]
    pub const fn initial_hypothesis(&self) -> &Hypothesis {
        &self.initial_hypothesis
    }

    /// Get the hypothesis the chain ended on.
    #[must_use]
    pub const fn final_hypothesis(&self) -> &Hypothesis {
        &self.final_hypothesis
    }

    /// Get the number of features in the final hypothesis.
    #[must_use]
    pub const fn final_length(&self) -> usize {
        self.final_length
    }

    /// Get the classified response type.
    #[must_use]
    pub const fn response_type(&self) -> ResponseType {
        self.response_type
    }

    /// Get the number of accepted additive moves.
    #[must_use]
    pub const fn additive_moves(&self) -> u32 {
        self.additive_moves
    }

    /// Get the number of accepted subtractive moves.
    #[must_use]
    pub const fn subtractive_moves(&self) -> u32 {
        self.subtractive_moves
    }

    /// Get the fraction of the trial's examples the final hypothesis predicts.
    #[must_use]
    pub const fn accuracy(&self) -> f64 {
        self.accuracy
    }
}
