use std::path::PathBuf;

use anyhow::Context;
use plinko_board::{BallSpec, Board, DropPlan};
use plinko_knn::{BUCKET_COUNT, ObservationLog, ObservationStore};
use plinko_stats::descriptive::DescriptiveStats;
use rand::Rng;

use crate::util::{self, Output};

/// Ball property ranges shared by every command that drops balls.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BallArg {
    /// Bounciness range of new balls as `start,end` (clamped to [0, 1])
    #[arg(long, value_delimiter = ',', default_values_t = [0.2, 0.8])]
    pub bounciness: Vec<f64>,
    /// Size range of new balls in pixels as `start,end`
    #[arg(long, value_delimiter = ',', default_values_t = [12.0, 20.0])]
    pub size: Vec<f64>,
}

impl BallArg {
    pub fn to_spec(&self) -> anyhow::Result<BallSpec> {
        let pair = |name: &str, values: &[f64]| match values {
            [start, end] => Ok((*start, *end)),
            _ => Err(anyhow::anyhow!(
                "--{name} takes exactly two values, got {}",
                values.len()
            )),
        };
        Ok(BallSpec {
            bounciness: pair("bounciness", &self.bounciness)?,
            size: pair("size", &self.size)?,
        })
    }
}

/// Where to drop balls.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DropArg {
    /// Drop every ball on this position instead of scanning across the board
    #[arg(long)]
    pub spot: Option<f64>,
    /// Distance in pixels between scan positions
    #[arg(long, default_value_t = 10.0)]
    pub scan_spacing: f64,
    /// Balls per position
    #[arg(long, default_value_t = 5)]
    pub quantity: usize,
}

impl DropArg {
    pub fn to_plan(&self) -> anyhow::Result<DropPlan> {
        let plan = match self.spot {
            Some(position) => {
                if !position.is_finite() {
                    anyhow::bail!("--spot must be a finite position, got {position}");
                }
                DropPlan::Spot {
                    position,
                    quantity: self.quantity,
                }
            }
            None => {
                if !(self.scan_spacing.is_finite() && self.scan_spacing > 0.0) {
                    anyhow::bail!("--scan-spacing must be positive and finite");
                }
                DropPlan::Scan {
                    spacing: self.scan_spacing,
                    quantity: self.quantity,
                }
            }
        };
        Ok(plan)
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    drop: DropArg,
    #[clap(flatten)]
    ball: BallArg,
    /// Seed for reproducible drops
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path for the observation log (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        drop,
        ball,
        seed,
        output,
    } = arg;

    let mut rng = util::rng(*seed);
    let store = drop_and_settle(&drop.to_plan()?, &ball.to_spec()?, &mut rng);

    print_bucket_counts(&store);

    let log = ObservationLog::from_store(&store);
    let path = Output::save_json(&log, output.clone()).context("Failed to save observations")?;
    eprintln!("Saved {} observations to {path}", store.len());
    Ok(())
}

/// Drops the balls of `plan` on a fresh board and collects every outcome.
pub(crate) fn drop_and_settle<R>(plan: &DropPlan, spec: &BallSpec, rng: &mut R) -> ObservationStore
where
    R: Rng + ?Sized,
{
    let mut board = Board::new();
    let mut store = ObservationStore::new();
    let dropped = board.drop_plan(plan, spec, rng);
    board.settle(&mut store, rng);
    tracing::info!(dropped, ?plan, "simulated drops");
    store
}

fn print_bucket_counts(store: &ObservationStore) {
    let mut counts = [0_usize; BUCKET_COUNT];
    for observation in store.all() {
        counts[observation.bucket.index()] += 1;
    }

    eprintln!("Bucket counts:");
    for (bucket, count) in counts.iter().enumerate() {
        eprintln!("  Bucket #{bucket}: {count}");
    }

    #[expect(clippy::cast_precision_loss)]
    let stats = DescriptiveStats::new(counts.iter().map(|&c| c as f64));
    if let Some(stats) = stats {
        eprintln!(
            "  Mean: {:.1}  StdDev: {:.1}  Min: {}  Max: {}",
            stats.mean, stats.std_dev, stats.min, stats.max
        );
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn ball_arg(bounciness: Vec<f64>, size: Vec<f64>) -> BallArg {
        BallArg { bounciness, size }
    }

    #[test]
    fn test_ball_ranges_need_two_values() {
        let spec = ball_arg(vec![0.1, 0.9], vec![10.0, 14.0])
            .to_spec()
            .unwrap();
        assert_eq!(spec.bounciness, (0.1, 0.9));
        assert_eq!(spec.size, (10.0, 14.0));

        assert!(ball_arg(vec![0.5], vec![10.0, 14.0]).to_spec().is_err());
        assert!(ball_arg(vec![0.1, 0.9], vec![1.0, 2.0, 3.0]).to_spec().is_err());
    }

    #[test]
    fn test_spot_overrides_scan() {
        let arg = DropArg {
            spot: Some(120.0),
            scan_spacing: 10.0,
            quantity: 3,
        };
        let plan = arg.to_plan().unwrap();
        assert!(matches!(plan, DropPlan::Spot { quantity: 3, .. }));

        let arg = DropArg {
            spot: None,
            scan_spacing: 0.0,
            quantity: 3,
        };
        assert!(arg.to_plan().is_err());
    }

    #[test]
    fn test_non_finite_drops_are_rejected() {
        for spot in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let arg = DropArg {
                spot: Some(spot),
                scan_spacing: 10.0,
                quantity: 1,
            };
            assert!(arg.to_plan().is_err(), "--spot {spot} was accepted");
        }
        for scan_spacing in [f64::INFINITY, f64::NAN] {
            let arg = DropArg {
                spot: None,
                scan_spacing,
                quantity: 1,
            };
            assert!(arg.to_plan().is_err(), "--scan-spacing {scan_spacing} was accepted");
        }

        let arg = DropArg {
            spot: Some(1e20),
            scan_spacing: 10.0,
            quantity: 2,
        };
        let store = drop_and_settle(
            &arg.to_plan().unwrap(),
            &BallSpec::default(),
            &mut Pcg64::seed_from_u64(1),
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_drop_and_settle_records_every_ball() {
        let mut rng = Pcg64::seed_from_u64(7);
        let plan = DropPlan::Spot {
            position: 300.0,
            quantity: 25,
        };
        let store = drop_and_settle(&plan, &BallSpec::default(), &mut rng);
        assert_eq!(store.len(), 25);
        assert!(
            store
                .all()
                .iter()
                .all(|o| (o.drop_position - 300.0).abs() < f64::EPSILON)
        );
    }
}
