//! Proposal generator: single add/remove moves on a hypothesis
//!
//! Random draws happen in a fixed order: direction (only when both move kinds
//! are possible), then the feature. A degenerate proposal consumes no draws.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::stimulus::{Dimension, Feature, Hypothesis};

/// Kind of move a proposal makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    /// One feature appended
    Additive,
    /// One feature removed
    Subtractive,
    /// No move possible; the proposal equals the current hypothesis
    None,
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Additive => write!(f, "additive"),
            Self::Subtractive => write!(f, "subtractive"),
            Self::None => write!(f, "none"),
        }
    }
}

/// A neighboring hypothesis and how it was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Proposed hypothesis
    pub hypothesis: Hypothesis,
    /// Move that produced it
    pub kind: MoveKind,
}

/// Features whose dimension is not yet constrained, in vocabulary order.
#[must_use]
pub fn addable_features(hypothesis: &Hypothesis) -> Vec<Feature> {
    let used: Vec<Dimension> = hypothesis.used_dimensions().collect();
    Feature::ALL
        .into_iter()
        .filter(|f| !used.contains(&f.dimension()))
        .collect()
}

/// Draw a neighbor of `current`.
///
/// With both kinds available the move is additive with probability `p_add`.
/// When only one kind is available it is forced.
pub fn propose<R: Rng + ?Sized>(current: &Hypothesis, p_add: f64, rng: &mut R) -> Proposal {
    let addable = addable_features(current);
    let removable = current.features();

    let additive = match (addable.is_empty(), removable.is_empty()) {
        (true, true) => {
            return Proposal {
                hypothesis: current.clone(),
                kind: MoveKind::None,
            }
        }
        (true, false) => false,
        (false, true) => true,
        (false, false) => rng.gen::<f64>() < p_add,
    };

    if additive {
        let feature = addable[rng.gen_range(0..addable.len())];
        Proposal {
            hypothesis: current.with_feature(feature),
            kind: MoveKind::Additive,
        }
    } else {
        let feature = removable[rng.gen_range(0..removable.len())];
        Proposal {
            hypothesis: current.without_feature(feature),
            kind: MoveKind::Subtractive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_hypothesis_forces_add() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let p = propose(&Hypothesis::empty(), 0.0, &mut rng);
            assert_eq!(p.kind, MoveKind::Additive);
            assert_eq!(p.hypothesis.len(), 1);
        }
    }

    #[test]
    fn test_full_hypothesis_forces_remove() {
        let full = Hypothesis::parse(&["circle", "red", "solid", "big"]).unwrap();
        assert!(addable_features(&full).is_empty());
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let p = propose(&full, 1.0, &mut rng);
            assert_eq!(p.kind, MoveKind::Subtractive);
            assert_eq!(p.hypothesis.len(), 3);
        }
    }

    #[test]
    fn test_addable_excludes_used_dimensions() {
        let h = Hypothesis::parse(&["red"]).unwrap();
        let addable = addable_features(&h);
        assert_eq!(addable.len(), 6);
        assert!(!addable.contains(&Feature::Red));
        assert!(!addable.contains(&Feature::Blue));
    }

    #[test]
    fn test_p_add_extremes() {
        let h = Hypothesis::parse(&["red"]).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            assert_eq!(propose(&h, 1.0, &mut rng).kind, MoveKind::Additive);
            assert_eq!(propose(&h, 0.0, &mut rng).kind, MoveKind::Subtractive);
        }
    }

    fn every_hypothesis() -> Vec<Hypothesis> {
        let mut all = vec![Hypothesis::empty()];
        for dim in Dimension::ALL {
            let options: Vec<Feature> =
                Feature::ALL.into_iter().filter(|f| f.dimension() == dim).collect();
            all = all
                .iter()
                .flat_map(|h| {
                    std::iter::once(h.clone())
                        .chain(options.iter().map(move |&f| h.with_feature(f)))
                })
                .collect();
        }
        all
    }

    #[test]
    fn test_every_hypothesis_has_a_move() {
        let all = every_hypothesis();
        assert_eq!(all.len(), 81);

        for h in &all {
            assert!(!addable_features(h).is_empty() || !h.is_empty());
            for (seed, p_add) in [(1, 0.0), (2, 0.5), (3, 1.0)] {
                let mut rng = StdRng::seed_from_u64(seed);
                for _ in 0..20 {
                    let p = propose(h, p_add, &mut rng);
                    assert_ne!(p.kind, MoveKind::None, "{h} with p_add={p_add}");
                    assert_eq!(p.hypothesis.len().abs_diff(h.len()), 1);
                }
            }
        }
    }
}
