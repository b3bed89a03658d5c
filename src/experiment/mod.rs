//! Simulation experiments: chain fan-out and outcome records
//!
//! ## Record Flow
//!
//! ```text
//! Trial (N) x chain (num_chains) ──> OutcomeRecord (N * num_chains)
//!                                        │
//!                                        └──> OutcomeStore ──> Distribution
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use concept_revision::experiment::{ExperimentRunner, OutcomeStore};
//! use concept_revision::sampler::FitParameters;
//! use concept_revision::stimulus::StimulusSet;
//!
//! let stimuli = StimulusSet::from_json_str(r#"{
//!     "objects": [{"id": 1, "shape": "circle", "color": "red", "fill": "solid", "size": "big"}],
//!     "trials": [{"id": "t1", "type": "baseline", "hypothesis": ["red"],
//!                 "examples": [{"object_id": 1, "label": 1}]}]
//! }"#)?;
//!
//! let runner = ExperimentRunner::new().num_chains(10).seed(7);
//! let params = FitParameters::new(0.5, 100, 1.0)?;
//! let store = OutcomeStore::from(runner.run(stimuli.trials(), params)?);
//!
//! assert_eq!(store.len(), 10);
//! let dist = store.distribution()?;
//! assert!((dist.total() - 1.0).abs() < 1e-9);
//! # Ok::<(), concept_revision::Error>(())
//! ```

mod outcome_record;
mod preset;
mod runner;
mod store;

pub use outcome_record::OutcomeRecord;
pub use preset::ExperimentPreset;
pub use runner::{chain_seed, ExperimentRunner, DEFAULT_NUM_CHAINS};
pub use store::OutcomeStore;
