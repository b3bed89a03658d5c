//! Human behavioral data: one JSON file of responses per participant
//!
//! ```text
//! behavioral_responses/
//!   2025-01-10T14-03-11.json   {"responses": [{"trial_id": "t1",
//!                                               "response_type": "additive",
//!                                               "condition": "normal", ...}]}
//! ```
//!
//! The participant ID is the file stem. A response without a condition is
//! filed under `"unknown"`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::distribution::{compute_distribution, distributions_by_condition, Distribution, Observation};
use crate::sampler::ResponseType;
use crate::{Error, Result};

/// Condition assigned when a response does not name one.
pub const UNKNOWN_CONDITION: &str = "unknown";

fn unknown_condition() -> String {
    UNKNOWN_CONDITION.to_string()
}

/// One participant's answer to one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanResponse {
    /// Participant ID (file stem)
    #[serde(default)]
    pub participant: String,
    /// Trial answered
    pub trial_id: String,
    /// Classified response
    pub response_type: ResponseType,
    /// Experimental condition
    #[serde(default = "unknown_condition")]
    pub condition: String,
    /// Hypothesis shown
    #[serde(default)]
    pub initial_hypothesis: Vec<String>,
    /// Hypothesis submitted
    #[serde(default)]
    pub response_hypothesis: Vec<String>,
    /// Reaction time in milliseconds
    #[serde(default)]
    pub rt_ms: Option<f64>,
}

impl Observation for HumanResponse {
    fn response_type(&self) -> ResponseType {
        self.response_type
    }

    fn condition(&self) -> &str {
        &self.condition
    }
}

#[derive(Deserialize)]
struct ParticipantFile {
    responses: Vec<HumanResponse>,
}

/// All loaded human responses.
#[derive(Debug, Clone, Default)]
pub struct HumanDataset {
    responses: Vec<HumanResponse>,
}

impl HumanDataset {
    /// Wrap already-parsed responses.
    #[must_use]
    pub fn new(responses: Vec<HumanResponse>) -> Self {
        Self { responses }
    }

    /// Parse one participant file's JSON text.
    ///
    /// # Errors
    ///
    /// Returns error if `responses` is missing or a response is malformed.
    pub fn parse_participant(participant: &str, text: &str) -> Result<Vec<HumanResponse>> {
        let file: ParticipantFile = serde_json::from_str(text).map_err(|e| {
            Error::InvalidInput(format!("Participant '{participant}': {e}"))
        })?;
        Ok(file
            .responses
            .into_iter()
            .map(|mut r| {
                r.participant = participant.to_string();
                r
            })
            .collect())
    }

    /// Load every `*.json` file in `dir`, in file-name order.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be read or any file is malformed.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths = std::fs::read_dir(dir)
            .map_err(|e| {
                Error::StorageError(format!("Failed to read {}: {e}", dir.display()))
            })?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        paths.retain(|p| p.extension().is_some_and(|ext| ext == "json"));
        paths.sort();

        let mut responses = Vec::new();
        for path in &paths {
            let participant = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let text = std::fs::read_to_string(path)?;
            let parsed = Self::parse_participant(&participant, &text)?;
            debug!(participant = %participant, responses = parsed.len(), "loaded participant");
            responses.extend(parsed);
        }

        info!(
            participants = paths.len(),
            responses = responses.len(),
            dir = %dir.display(),
            "loaded human data"
        );
        Ok(Self { responses })
    }

    /// All responses.
    #[must_use]
    pub fn responses(&self) -> &[HumanResponse] {
        &self.responses
    }

    /// Number of responses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// True if nothing was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Response distribution under one condition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDistribution`] if no response has that condition.
    pub fn distribution_for(&self, condition: &str) -> Result<Distribution> {
        compute_distribution(self.responses.iter().filter(|r| r.condition == condition)).map_err(
            |_| Error::EmptyDistribution(format!("no human responses for condition '{condition}'")),
        )
    }

    /// One distribution per condition.
    #[must_use]
    pub fn distributions_by_condition(&self) -> BTreeMap<String, Distribution> {
        distributions_by_condition(&self.responses)
    }
}
