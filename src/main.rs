use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use concept_revision::config::ModelConfig;
use concept_revision::distribution::summarize_by_condition;
use concept_revision::experiment::{ExperimentPreset, ExperimentRunner};
use concept_revision::fit::FitArtifact;
use concept_revision::human::HumanDataset;
use concept_revision::stimulus::StimulusSet;
use concept_revision::storage;

#[derive(Parser)]
#[command(name = "concept-fit", about = "Simulate hypothesis revision and fit it to human data")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a preset experiment and save the chain outcomes
    Simulate(SimulateArgs),
    /// Grid-search sampler parameters against human responses
    Fit(FitArgs),
}

#[derive(Args)]
struct SimulateArgs {
    /// Stimulus file (objects and trials)
    #[arg(long)]
    stimuli: PathBuf,

    /// Experiment preset
    #[arg(long, default_value = "baseline")]
    preset: ExperimentPreset,

    /// Output directory
    #[arg(long, default_value = "results")]
    out: PathBuf,

    /// Base seed for the chain streams
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Args)]
struct FitArgs {
    /// Stimulus file (objects and trials)
    #[arg(long)]
    stimuli: PathBuf,

    /// Directory of per-participant response files
    #[arg(long)]
    human: PathBuf,

    /// Output directory
    #[arg(long, default_value = "results")]
    out: PathBuf,

    /// Model configuration (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Simulate(args) => simulate(&args),
        Commands::Fit(args) => fit(&args),
    }
}

fn simulate(args: &SimulateArgs) -> Result<()> {
    let stimuli = StimulusSet::load(&args.stimuli)
        .with_context(|| format!("loading stimuli from {}", args.stimuli.display()))?;
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let runner = ExperimentRunner::new()
        .num_chains(args.preset.num_chains())
        .seed(args.seed);
    let records = runner.run_preset(stimuli.trials(), args.preset)?;

    for summary in summarize_by_condition(&records) {
        info!(
            condition = %summary.condition,
            count = summary.count,
            distribution = %summary.distribution,
            mean_accuracy = summary.mean_accuracy,
            "condition summary"
        );
    }

    storage::save_outcomes(&records, &args.out, &format!("results_{}", args.preset))
        .context("saving simulation results")?;
    Ok(())
}

fn fit(args: &FitArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ModelConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ModelConfig::default(),
    };
    let stimuli = StimulusSet::load(&args.stimuli)
        .with_context(|| format!("loading stimuli from {}", args.stimuli.display()))?;
    let human = HumanDataset::load_dir(&args.human)
        .with_context(|| format!("loading human data from {}", args.human.display()))?;

    for (condition, distribution) in human.distributions_by_condition() {
        info!(%condition, %distribution, "human distribution");
    }
    let target = human
        .distribution_for(&config.reference_condition)
        .with_context(|| {
            format!(
                "no human responses for reference condition '{}'",
                config.reference_condition
            )
        })?;

    let report = config.grid_search().fit(stimuli.trials(), &target)?;
    for (rank, point) in report.top_k(5).iter().enumerate() {
        info!(rank = rank + 1, params = %point.params(), loss = point.loss, "top fit");
    }

    let artifact = FitArtifact::builder(
        &report,
        config.objective,
        config.reference_condition.clone(),
        target,
    )
    .num_chains(config.num_chains)
    .seed(config.seed)
    .build();

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    storage::save_fit(&report, &artifact, &args.out).context("saving fit results")?;
    Ok(())
}
