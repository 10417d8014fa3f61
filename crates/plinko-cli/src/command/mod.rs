use clap::{Parser, Subcommand};

use self::{
    analyze::{AnalyzeArg, PredictArg, SweepFeaturesArg, SweepKArg},
    simulate::SimulateArg,
};
use crate::logging;

mod analyze;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Drop balls on the board and record where they land
    Simulate(#[clap(flatten)] SimulateArg),
    /// Predict the bucket for one drop position
    Predict(#[clap(flatten)] PredictArg),
    /// Report accuracy for a range of k
    SweepK(#[clap(flatten)] SweepKArg),
    /// Report the accuracy of each feature on its own
    SweepFeatures(#[clap(flatten)] SweepFeaturesArg),
    /// Run an analysis described by a JSON config file
    Analyze(#[clap(flatten)] AnalyzeArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    logging::init(args.verbose);
    match args.mode {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Predict(arg) => analyze::run_predict(&arg)?,
        Mode::SweepK(arg) => analyze::run_sweep_k(&arg)?,
        Mode::SweepFeatures(arg) => analyze::run_sweep_features(&arg)?,
        Mode::Analyze(arg) => analyze::run_config(&arg)?,
    }
    Ok(())
}
