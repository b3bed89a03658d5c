//! Property-based tests for concept-revision
//!
//! - Hypotheses stay well formed under any sequence of moves
//! - Distributions are normalized
//! - Divergences behave like divergences
//! - Proposal sequences run with ProptestConfig::with_cases(10_000)
//! - Everything else runs with ProptestConfig::with_cases(100)

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use concept_revision::concept::ConceptEvaluator;
use concept_revision::distribution::{
    cross_entropy, kl_divergence, l2_distance, Distribution, Objective,
};
use concept_revision::proposal::{propose, MoveKind};
use concept_revision::sampler::{ChainSampler, FitParameters, ResponseType};
use concept_revision::stimulus::{Dimension, Example, Feature, Hypothesis, StimulusObject, Trial};

// ============================================================================
// Strategies
// ============================================================================

/// Hypothesis with at most one feature per dimension, in random order
fn arb_hypothesis() -> impl Strategy<Value = Hypothesis> {
    (
        proptest::collection::vec(0u8..3, 4),
        Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
    )
        .prop_map(|(choices, order)| {
            let features = order.iter().filter_map(|&d| {
                let dim = Dimension::ALL[d];
                let options: Vec<Feature> =
                    Feature::ALL.into_iter().filter(|f| f.dimension() == dim).collect();
                match choices[d] {
                    0 => None,
                    c => Some(options[usize::from(c) - 1]),
                }
            });
            Hypothesis::new(features).unwrap()
        })
}

fn arb_object(id: u32) -> impl Strategy<Value = StimulusObject> {
    proptest::collection::vec(any::<bool>(), 4).prop_map(move |bits| {
        let pick = |dim: Dimension, second: bool| {
            let options: Vec<Feature> =
                Feature::ALL.into_iter().filter(|f| f.dimension() == dim).collect();
            options[usize::from(second)]
        };
        StimulusObject::new(
            id,
            pick(Dimension::Shape, bits[0]),
            pick(Dimension::Color, bits[1]),
            pick(Dimension::Fill, bits[2]),
            pick(Dimension::Size, bits[3]),
        )
        .unwrap()
    })
}

fn arb_trial() -> impl Strategy<Value = Trial> {
    (
        arb_hypothesis(),
        proptest::collection::vec((arb_object(1), any::<bool>()), 1..8),
    )
        .prop_map(|(hypothesis, examples)| {
            let examples = examples
                .into_iter()
                .map(|(object, member)| Example::new(object, member))
                .collect();
            Trial::new("t", "generated", hypothesis, examples).unwrap()
        })
}

fn arb_counts() -> impl Strategy<Value = [usize; 4]> {
    proptest::collection::vec(0usize..500, 4)
        .prop_filter("at least one observation", |c| c.iter().sum::<usize>() > 0)
        .prop_map(|c| [c[0], c[1], c[2], c[3]])
}

fn is_well_formed(h: &Hypothesis) -> bool {
    Dimension::ALL
        .iter()
        .all(|&dim| h.features().iter().filter(|f| f.dimension() == dim).count() <= 1)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10_000))]

    /// Property: every proposal is a well-formed neighbor of its source
    #[test]
    fn prop_proposals_stay_well_formed(
        start in arb_hypothesis(),
        p_add in 0.0f64..=1.0,
        seed in any::<u64>()
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut current = start;
        for _ in 0..200 {
            let proposal = propose(&current, p_add, &mut rng);
            prop_assert!(is_well_formed(&proposal.hypothesis));
            let added = proposal.hypothesis.difference(&current);
            let removed = current.difference(&proposal.hypothesis);
            match proposal.kind {
                MoveKind::Additive => prop_assert_eq!((added.len(), removed.len()), (1, 0)),
                MoveKind::Subtractive => prop_assert_eq!((added.len(), removed.len()), (0, 1)),
                MoveKind::None => prop_assert_eq!(&proposal.hypothesis, &current),
            }
            current = proposal.hypothesis;
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: a chain takes exactly `steps` steps and ends well formed
    #[test]
    fn prop_chain_respects_budget(
        trial in arb_trial(),
        p_add in 0.0f64..=1.0,
        steps in 0u32..300,
        temperature in 0.1f64..5.0,
        seed in any::<u64>()
    ) {
        let evaluator = ConceptEvaluator::default();
        let params = FitParameters::new(p_add, steps, temperature).unwrap();
        let sampler = ChainSampler::new(&trial, &evaluator, params).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);

        let mut state = sampler.initial_state();
        for _ in 0..steps {
            sampler.step(&mut state, &mut rng);
        }
        prop_assert_eq!(state.steps_taken(), steps);
        prop_assert!(state.additive_moves() + state.subtractive_moves() <= steps);
        prop_assert!(is_well_formed(state.current()));

        let recomputed = evaluator.log_posterior(state.current(), trial.examples());
        prop_assert!((recomputed - state.log_posterior()).abs() < 1e-9);
    }

    /// Property: classification agrees with set differences
    #[test]
    fn prop_classification_matches_difference(a in arb_hypothesis(), b in arb_hypothesis()) {
        let added = !b.difference(&a).is_empty();
        let removed = !a.difference(&b).is_empty();
        let expected = match (added, removed) {
            (false, false) => ResponseType::NoChange,
            (true, false) => ResponseType::Additive,
            (false, true) => ResponseType::Subtractive,
            (true, true) => ResponseType::Mixed,
        };
        prop_assert_eq!(ResponseType::classify(&a, &b), expected);
        prop_assert_eq!(ResponseType::classify(&a, &a), ResponseType::NoChange);
    }

    /// Property: proportions sum to one
    #[test]
    fn prop_distribution_normalized(counts in arb_counts()) {
        let dist = Distribution::from_counts(counts).unwrap();
        prop_assert!((dist.total() - 1.0).abs() < 1e-9);
        prop_assert!(dist.as_array().iter().all(|p| (0.0..=1.0).contains(p)));
    }

    /// Property: KL is non-negative and zero on identical inputs
    #[test]
    fn prop_kl_nonnegative(p in arb_counts(), q in arb_counts()) {
        let p = Distribution::from_counts(p).unwrap().as_array();
        let q = Distribution::from_counts(q).unwrap().as_array();
        prop_assert!(kl_divergence(&p, &q) >= -1e-9);
        prop_assert!(kl_divergence(&p, &p).abs() < 1e-12);
    }

    /// Property: L2 is a symmetric non-negative distance
    #[test]
    fn prop_l2_symmetric(p in arb_counts(), q in arb_counts()) {
        let p = Distribution::from_counts(p).unwrap().as_array();
        let q = Distribution::from_counts(q).unwrap().as_array();
        prop_assert!(l2_distance(&p, &q) >= 0.0);
        prop_assert!((l2_distance(&p, &q) - l2_distance(&q, &p)).abs() < 1e-12);
        prop_assert!(l2_distance(&p, &p).abs() < 1e-12);
    }

    /// Property: cross-entropy is minimized by the target itself
    #[test]
    fn prop_cross_entropy_lower_bound(p in arb_counts(), q in arb_counts()) {
        let p = Distribution::from_counts(p).unwrap().as_array();
        let q = Distribution::from_counts(q).unwrap().as_array();
        prop_assert!(cross_entropy(&p, &q) >= cross_entropy(&p, &p) - 1e-6);
        prop_assert!(
            (Objective::CrossEntropy.evaluate(&p, &q) - cross_entropy(&p, &q)).abs() < 1e-12
        );
    }
}
