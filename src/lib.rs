//! # Concept Revision: Metropolis Sampler for Conjunctive Hypotheses
//!
//! **Version**: 0.1.0
//!
//! Models how people revise a rule such as `{red, circle}` after seeing
//! labeled examples. Each chain starts from a trial's initial hypothesis and
//! takes single-feature add/remove steps under a Metropolis acceptance rule.
//! The end state is classified as additive, subtractive, mixed or no change,
//! and the resulting response-type distribution is fitted to human data by
//! grid search over `(p_add, steps, temperature)`.
//!
//! ## Pipeline
//!
//! ```text
//! StimulusSet ──trials──> ExperimentRunner ──OutcomeRecords──> Distribution
//!                              ▲                                    │
//!                  FitParameters (grid point)         KL vs human target
//!                              │                                    ▼
//!                          GridSearch <────────────── loss per point ──> FitReport
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use concept_revision::experiment::ExperimentRunner;
//! use concept_revision::sampler::{FitParameters, ResponseType};
//! use concept_revision::stimulus::StimulusSet;
//!
//! let stimuli = StimulusSet::from_json_str(r#"{
//!     "objects": [
//!         {"id": 1, "shape": "circle", "color": "red", "fill": "solid", "size": "big"},
//!         {"id": 2, "shape": "square", "color": "blue", "fill": "striped", "size": "small"}
//!     ],
//!     "trials": [{"id": "t1", "type": "baseline", "hypothesis": ["red"],
//!                 "examples": [{"object_id": 1, "label": 1}, {"object_id": 2, "label": 0}]}]
//! }"#)?;
//!
//! // Zero steps: every chain reports its starting hypothesis
//! let params = FitParameters::new(0.5, 0, 1.0)?;
//! let records = ExperimentRunner::new().num_chains(10).run(stimuli.trials(), params)?;
//!
//! assert_eq!(records.len(), 10);
//! assert!(records.iter().all(|r| r.response_type() == ResponseType::NoChange));
//! # Ok::<(), concept_revision::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod concept;
pub mod config;
pub mod distribution;
pub mod error;
pub mod experiment;
pub mod fit;
pub mod human;
pub mod proposal;
pub mod sampler;
pub mod stimulus;
pub mod storage;

pub use error::{Error, Result};
