//! Parameter search: fit sampler parameters to a target distribution
//!
//! ```text
//! ParameterGrid ──points──> ExperimentRunner ──records──> Distribution
//!                                                             │
//!                        target Distribution ──objective──> loss
//!                                                             │
//!                                       FitReport (all points, best) ──> FitArtifact
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use concept_revision::distribution::Distribution;
//! use concept_revision::experiment::ExperimentRunner;
//! use concept_revision::fit::{GridSearch, ParameterGrid};
//! use concept_revision::stimulus::StimulusSet;
//!
//! let stimuli = StimulusSet::from_json_str(r#"{
//!     "objects": [{"id": 1, "shape": "circle", "color": "red", "fill": "solid", "size": "big"}],
//!     "trials": [{"id": "t1", "type": "baseline", "hypothesis": ["red"],
//!                 "examples": [{"object_id": 1, "label": 1}]}]
//! }"#)?;
//!
//! let target = Distribution::from_array([0.0, 0.0, 0.0, 1.0]);
//! let grid = ParameterGrid::new(vec![0.5], vec![0, 50], vec![1.0]);
//! let search = GridSearch::new(ExperimentRunner::new().num_chains(5), grid);
//! let report = search.fit(stimuli.trials(), &target)?;
//!
//! assert_eq!(report.points().len(), 2);
//! assert_eq!(report.best_params().steps, 0);
//! # Ok::<(), concept_revision::Error>(())
//! ```

mod artifact;
mod grid;
mod rank;

pub use artifact::{FitArtifact, FitArtifactBuilder};
pub use grid::{FitReport, GridPoint, GridSearch, ParameterGrid};
pub use rank::lowest_k;
