//! Parameter recovery: data simulated at a known grid point is fitted back
//! to that point.

use std::path::PathBuf;

use concept_revision::config::ModelConfig;
use concept_revision::distribution::{compute_distribution, Objective};
use concept_revision::experiment::ExperimentRunner;
use concept_revision::fit::{FitArtifact, GridSearch, ParameterGrid};
use concept_revision::sampler::FitParameters;
use concept_revision::stimulus::StimulusSet;
use concept_revision::storage;

fn stimuli() -> StimulusSet {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/stimuli.json");
    StimulusSet::load(path).unwrap()
}

fn small_grid() -> ParameterGrid {
    ParameterGrid::new(vec![0.5], vec![0, 2, 200], vec![1.0, 25.0])
}

#[test]
fn test_recovers_generating_parameters() {
    let set = stimuli();
    let truth = FitParameters::new(0.5, 200, 1.0).unwrap();

    // Target from an independent seed so the fit is not an exact replay
    let target_records = ExperimentRunner::new()
        .num_chains(300)
        .seed(99)
        .run(set.trials(), truth)
        .unwrap();
    let target = compute_distribution(&target_records).unwrap();

    let search = GridSearch::new(ExperimentRunner::new().num_chains(200).seed(1), small_grid());
    let report = search.fit(set.trials(), &target).unwrap();

    assert_eq!(report.points().len(), 6);
    assert_eq!(report.best_params(), truth);
    assert!(report.best().loss < 0.05);

    let ranked = report.top_k(6);
    assert_eq!(ranked[0], report.best());
    assert!(ranked.windows(2).all(|w| w[0].loss <= w[1].loss));
}

#[test]
fn test_every_objective_prefers_truth() {
    let set = stimuli();
    let truth = FitParameters::new(0.5, 200, 1.0).unwrap();
    let target = compute_distribution(
        &ExperimentRunner::new()
            .num_chains(300)
            .seed(7)
            .run(set.trials(), truth)
            .unwrap(),
    )
    .unwrap();

    for objective in [Objective::Kl, Objective::L2, Objective::CrossEntropy] {
        let report = ModelConfig::default()
            .with_num_chains(200)
            .with_seed(2)
            .with_grid(small_grid())
            .with_objective(objective)
            .grid_search()
            .fit(set.trials(), &target)
            .unwrap();
        assert_eq!(report.best_params(), truth, "objective {objective}");
    }
}

#[test]
fn test_fit_outputs_written() {
    let dir = tempfile::tempdir().unwrap();
    let set = stimuli();
    let target = compute_distribution(
        &ExperimentRunner::new()
            .num_chains(50)
            .run(set.trials(), FitParameters::new(0.5, 200, 1.0).unwrap())
            .unwrap(),
    )
    .unwrap();

    let grid = ParameterGrid::new(vec![0.3, 0.7], vec![0, 100], vec![1.0]);
    let report = GridSearch::new(ExperimentRunner::new().num_chains(20), grid)
        .fit(set.trials(), &target)
        .unwrap();
    let artifact = FitArtifact::builder(&report, Objective::Kl, "normal", target)
        .num_chains(20)
        .build();
    storage::save_fit(&report, &artifact, dir.path()).unwrap();

    let batches = storage::read_parquet(dir.path().join("model_fit_grid.parquet")).unwrap();
    assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 4);

    let best: FitParameters = storage::load_json(dir.path().join("best_model_params.json")).unwrap();
    assert_eq!(best, report.best_params());
    assert_ne!(best.steps, 0);
}
