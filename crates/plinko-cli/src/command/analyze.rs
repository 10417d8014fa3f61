use std::path::PathBuf;

use anyhow::Context;
use plinko_board::DropPlan;
use plinko_knn::{AnalysisConfig, AnalysisMode, ObservationStore, SplitPolicy, run_analysis};
use rand_pcg::Pcg64;

use super::simulate::{BallArg, drop_and_settle};
use crate::util;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub(crate) enum SplitArg {
    #[default]
    Reshuffle,
    Pinned,
}

impl From<SplitArg> for SplitPolicy {
    fn from(value: SplitArg) -> Self {
        match value {
            SplitArg::Reshuffle => SplitPolicy::Reshuffle,
            SplitArg::Pinned => SplitPolicy::Pinned,
        }
    }
}

/// Where the observations come from.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DataArg {
    /// Observation log written by `plinko simulate`; a fresh scan is simulated when omitted
    #[arg(long)]
    observations: Option<PathBuf>,
    /// Distance in pixels between drop positions of the simulated scan
    #[arg(long, default_value_t = 10.0)]
    scan_spacing: f64,
    /// Balls per position of the simulated scan
    #[arg(long, default_value_t = 5)]
    scan_quantity: usize,
    #[clap(flatten)]
    ball: BallArg,
    /// Seed for the simulation and the test/training splits
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvalArg {
    /// Number of observations held out for testing
    #[arg(long, default_value_t = 50)]
    test_size: usize,
    /// `reshuffle` draws a new split per evaluation, `pinned` one per trial
    #[arg(long, default_value = "reshuffle")]
    split: SplitArg,
    /// Evaluations averaged per reported accuracy
    #[arg(long, default_value_t = 1)]
    trials: usize,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PredictArg {
    #[clap(flatten)]
    data: DataArg,
    /// Query point, one value per selected feature
    #[arg(long, value_delimiter = ',', default_values_t = [300.0])]
    position: Vec<f64>,
    /// Feature indices (0: drop position, 1: bounciness, 2: size)
    #[arg(long, value_delimiter = ',', default_values_t = [0])]
    features: Vec<usize>,
    /// Number of neighbors
    #[arg(short, default_value_t = 10)]
    k: usize,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SweepKArg {
    #[clap(flatten)]
    data: DataArg,
    #[clap(flatten)]
    eval: EvalArg,
    #[arg(long, default_value_t = 1)]
    k_min: usize,
    #[arg(long, default_value_t = 20)]
    k_max: usize,
    /// Feature indices (0: drop position, 1: bounciness, 2: size)
    #[arg(long, value_delimiter = ',', default_values_t = [0])]
    features: Vec<usize>,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SweepFeaturesArg {
    #[clap(flatten)]
    data: DataArg,
    #[clap(flatten)]
    eval: EvalArg,
    /// Number of neighbors
    #[arg(short, default_value_t = 10)]
    k: usize,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AnalyzeArg {
    #[clap(flatten)]
    data: DataArg,
    /// JSON file holding an analysis config; missing fields take their defaults
    #[arg(long)]
    config: PathBuf,
}

impl EvalArg {
    fn apply(&self, config: &mut AnalysisConfig) {
        config.test_size = self.test_size;
        config.split = self.split.into();
        config.trials = self.trials;
    }
}

pub(crate) fn run_predict(arg: &PredictArg) -> anyhow::Result<()> {
    let config = AnalysisConfig {
        mode: AnalysisMode::Predict,
        features: arg.features.clone(),
        k: arg.k,
        point_of_interest: arg.position.clone(),
        seed: arg.data.seed,
        ..AnalysisConfig::default()
    };
    run(&arg.data, &config)
}

pub(crate) fn run_sweep_k(arg: &SweepKArg) -> anyhow::Result<()> {
    let mut config = AnalysisConfig {
        mode: AnalysisMode::KSweep,
        features: arg.features.clone(),
        k_min: arg.k_min,
        k_max: arg.k_max,
        seed: arg.data.seed,
        ..AnalysisConfig::default()
    };
    arg.eval.apply(&mut config);
    run(&arg.data, &config)
}

pub(crate) fn run_sweep_features(arg: &SweepFeaturesArg) -> anyhow::Result<()> {
    let mut config = AnalysisConfig {
        mode: AnalysisMode::FeatureSweep,
        k: arg.k,
        seed: arg.data.seed,
        ..AnalysisConfig::default()
    };
    arg.eval.apply(&mut config);
    run(&arg.data, &config)
}

pub(crate) fn run_config(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let config = load_config(arg)?;
    run(&arg.data, &config)
}

/// Reads the config file of `arg`; `--seed` overrides the file's seed.
fn load_config(arg: &AnalyzeArg) -> anyhow::Result<AnalysisConfig> {
    let mut config: AnalysisConfig = util::read_json_file("analysis config", &arg.config)?;
    if arg.data.seed.is_some() {
        config.seed = arg.data.seed;
    }
    Ok(config)
}

fn run(data: &DataArg, config: &AnalysisConfig) -> anyhow::Result<()> {
    let mut rng = util::rng(config.seed);
    let store = load_observations(data, &mut rng)?;
    eprintln!("Analyzing {} observations", store.len());

    let report = run_analysis(store.all(), config, &mut rng).context("Analysis failed")?;
    print!("{report}");
    Ok(())
}

fn load_observations(data: &DataArg, rng: &mut Pcg64) -> anyhow::Result<ObservationStore> {
    if let Some(path) = &data.observations {
        let log = util::read_observations_file(path)?;
        tracing::info!(
            path = %path.display(),
            generated_at = %log.generated_at,
            "loaded observation log"
        );
        return Ok(log.into_store());
    }

    if data.scan_spacing <= 0.0 {
        anyhow::bail!("--scan-spacing must be positive");
    }
    let plan = DropPlan::Scan {
        spacing: data.scan_spacing,
        quantity: data.scan_quantity,
    };
    Ok(drop_and_settle(&plan, &data.ball.to_spec()?, rng))
}
