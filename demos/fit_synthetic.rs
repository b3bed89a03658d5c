//! Synthetic Fit Example
//!
//! Builds a small stimulus set in code, simulates "participants" at known
//! parameters, then recovers those parameters by grid search.
//!
//! Run with: cargo run --example fit_synthetic

use concept_revision::distribution::{compute_distribution, summarize_by_condition, Objective};
use concept_revision::experiment::ExperimentRunner;
use concept_revision::fit::{FitArtifact, GridSearch, ParameterGrid};
use concept_revision::sampler::FitParameters;
use concept_revision::stimulus::{Example, Feature, Hypothesis, StimulusObject, StimulusSet, Trial};

fn object(id: u32, shape: Feature, color: Feature, fill: Feature, size: Feature) -> StimulusObject {
    StimulusObject::new(id, shape, color, fill, size).expect("features match their dimensions")
}

fn main() -> concept_revision::Result<()> {
    use Feature::{Big, Blue, Circle, Red, Small, Solid, Square, Striped};

    println!("=== Concept Revision: Synthetic Fit ===\n");

    // -------------------------------------------------------------------------
    // 1. Stimuli
    // -------------------------------------------------------------------------
    let red_circle = object(1, Circle, Red, Solid, Big);
    let red_square = object(2, Square, Red, Solid, Big);
    let blue_circle = object(3, Circle, Blue, Solid, Big);
    let small_red_circle = object(4, Circle, Red, Striped, Small);

    let trials = vec![
        Trial::new(
            "drop-shape",
            "subtractive",
            Hypothesis::new([Red, Circle])?,
            vec![
                Example::new(red_circle, true),
                Example::new(red_square, true),
                Example::new(blue_circle, false),
            ],
        )?,
        Trial::new(
            "add-shape",
            "additive",
            Hypothesis::new([Red])?,
            vec![
                Example::new(red_circle, true),
                Example::new(small_red_circle, true),
                Example::new(red_square, false),
            ],
        )?,
    ];
    let stimuli = StimulusSet::from_parts(
        vec![red_circle, red_square, blue_circle, small_red_circle],
        trials,
    )?;
    println!("1. {} objects, {} trials", stimuli.objects().len(), stimuli.trials().len());

    // -------------------------------------------------------------------------
    // 2. Synthetic participants
    // -------------------------------------------------------------------------
    let truth = FitParameters::new(0.7, 200, 1.0)?;
    let participants = ExperimentRunner::new()
        .num_chains(200)
        .seed(2024)
        .run(stimuli.trials(), truth)?;
    let target = compute_distribution(&participants)?;
    println!("\n2. Target from {truth}: {target}");

    for summary in summarize_by_condition(&participants) {
        println!(
            "   mean accuracy {:.3}, mean length {:.2}",
            summary.mean_accuracy, summary.mean_final_length
        );
    }

    // -------------------------------------------------------------------------
    // 3. Grid search
    // -------------------------------------------------------------------------
    let grid = ParameterGrid::new(vec![0.3, 0.7], vec![5, 200], vec![1.0, 3.0]);
    println!("\n3. Searching {} grid points...", grid.len());

    let search = GridSearch::new(ExperimentRunner::new().num_chains(100), grid);
    let report = search.fit(stimuli.trials(), &target)?;

    for point in report.top_k(3) {
        println!("   {}  loss={:.4}", point.params(), point.loss);
    }

    let artifact = FitArtifact::builder(&report, Objective::Kl, "synthetic", target)
        .num_chains(100)
        .build();
    println!("\n4. Best fit: {} (loss {:.4})", artifact.best(), artifact.loss());
    println!("   Fitted at: {}", artifact.fitted_at());

    Ok(())
}
