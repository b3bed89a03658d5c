//! Preset simulation experiments: baseline, cognitive load, cueing

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sampler::FitParameters;
use crate::Error;

/// Named parameter sweeps modeling the behavioral manipulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperimentPreset {
    /// Unbiased proposals, ample deliberation
    Baseline,
    /// Step-budget sweep followed by a temperature sweep
    CognitiveLoad,
    /// `p_add` sweep (add/subtract reminders)
    Cueing,
}

impl ExperimentPreset {
    /// All presets.
    pub const ALL: [Self; 3] = [Self::Baseline, Self::CognitiveLoad, Self::Cueing];

    /// Chains per trial at each point.
    #[must_use]
    pub const fn num_chains(self) -> u32 {
        match self {
            Self::Baseline => 50,
            Self::CognitiveLoad | Self::Cueing => 30,
        }
    }

    /// Parameter points in run order.
    #[must_use]
    pub fn points(self) -> Vec<FitParameters> {
        let point = |p_add, steps, temperature| FitParameters {
            p_add,
            steps,
            temperature,
        };
        match self {
            Self::Baseline => vec![point(0.5, 500, 1.0)],
            Self::CognitiveLoad => [50, 150, 300, 500, 800]
                .into_iter()
                .map(|steps| point(0.5, steps, 1.0))
                .chain(
                    [1.0, 1.5, 2.0, 3.0]
                        .into_iter()
                        .map(|temp| point(0.5, 500, temp)),
                )
                .collect(),
            Self::Cueing => [0.1, 0.3, 0.5, 0.7, 0.9]
                .into_iter()
                .map(|p_add| point(p_add, 500, 1.0))
                .collect(),
        }
    }

    /// Short name used in file names and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::CognitiveLoad => "cognitive-load",
            Self::Cueing => "cueing",
        }
    }
}

impl fmt::Display for ExperimentPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperimentPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Unknown preset '{s}' (expected baseline, cognitive-load or cueing)"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_points() {
        assert_eq!(ExperimentPreset::Baseline.points().len(), 1);
        assert_eq!(ExperimentPreset::CognitiveLoad.points().len(), 9);
        assert_eq!(ExperimentPreset::Cueing.points().len(), 5);
        for preset in ExperimentPreset::ALL {
            assert!(preset.points().iter().all(|p| p.validate().is_ok()));
        }
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(
            "cognitive-load".parse::<ExperimentPreset>().unwrap(),
            ExperimentPreset::CognitiveLoad
        );
        assert!("stress".parse::<ExperimentPreset>().is_err());
    }
}
