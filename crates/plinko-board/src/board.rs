use plinko_knn::{Observation, ObservationSink};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::{Ball, BallSpec, BoardGeometry};

/// Upper bound on balls in flight at once.
pub const MAX_BALLS_IN_FLIGHT: usize = 785;

/// Standard deviation of the per-row horizontal jitter for a nominal-size ball.
const JITTER_PX: f64 = 2.0;

/// Where and how many balls to release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DropPlan {
    /// `quantity` balls at every multiple of `spacing` strictly inside the board.
    Scan { spacing: f64, quantity: usize },
    /// `quantity` balls at one position.
    Spot { position: f64, quantity: usize },
}

impl DropPlan {
    /// Release positions of the plan on `geometry`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn positions(&self, geometry: &BoardGeometry) -> Vec<f64> {
        match *self {
            Self::Scan { spacing, .. } if spacing > 0.0 => {
                let limit = geometry.width / spacing;
                (1_usize..)
                    .take_while(|&i| (i as f64) < limit)
                    .map(|i| i as f64 * spacing)
                    .collect()
            }
            Self::Scan { .. } => Vec::new(),
            Self::Spot { position, .. } => vec![position],
        }
    }

    #[must_use]
    pub fn quantity(&self) -> usize {
        match *self {
            Self::Scan { quantity, .. } | Self::Spot { quantity, .. } => quantity,
        }
    }
}

/// The board and the balls currently falling through it.
#[derive(Debug, Clone, Default)]
pub struct Board {
    geometry: BoardGeometry,
    in_flight: Vec<Ball>,
}

impl Board {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_geometry(geometry: BoardGeometry) -> Self {
        Self {
            geometry,
            in_flight: Vec::new(),
        }
    }

    #[must_use]
    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Releases up to `quantity` balls at `position`.
    ///
    /// Stops early once [`MAX_BALLS_IN_FLIGHT`] is reached and returns the
    /// number of balls actually released. Non-finite positions release
    /// nothing.
    pub fn drop_balls<R>(
        &mut self,
        position: f64,
        quantity: usize,
        spec: &BallSpec,
        rng: &mut R,
    ) -> usize
    where
        R: Rng + ?Sized,
    {
        if !position.is_finite() {
            tracing::warn!(position, "ignoring drop at non-finite position");
            return 0;
        }
        let accepted = quantity.min(MAX_BALLS_IN_FLIGHT - self.in_flight.len());
        if accepted < quantity {
            tracing::warn!(
                position,
                requested = quantity,
                accepted,
                "in-flight ball limit reached"
            );
        }
        self.in_flight
            .extend((0..accepted).map(|_| spec.sample(position, rng)));
        accepted
    }

    /// Releases every ball of `plan`; returns how many were accepted.
    pub fn drop_plan<R>(&mut self, plan: &DropPlan, spec: &BallSpec, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        plan.positions(&self.geometry)
            .into_iter()
            .map(|position| self.drop_balls(position, plan.quantity(), spec, &mut *rng))
            .sum()
    }

    /// Lets every in-flight ball fall into a bucket, reporting each to `sink`.
    ///
    /// Returns the number of balls settled.
    pub fn settle<S, R>(&mut self, sink: &mut S, rng: &mut R) -> usize
    where
        S: ObservationSink + ?Sized,
        R: Rng + ?Sized,
    {
        let balls = std::mem::take(&mut self.in_flight);
        for ball in &balls {
            let x = self.fall(ball, rng);
            let bucket = self.geometry.bucket_at(x);
            sink.on_observation(Observation::new(
                ball.drop_position.round(),
                ball.bounciness,
                ball.size,
                bucket,
            ));
        }
        tracing::debug!(settled = balls.len(), "balls settled");
        balls.len()
    }

    /// Random walk through the peg rows; returns the final horizontal position.
    ///
    /// A ball close enough to a row's nearest peg is pushed away from it by up
    /// to half a peg spacing, scaled by `0.5 + bounciness`. Every row adds
    /// Gaussian jitter proportional to the ball's size.
    fn fall<R>(&self, ball: &Ball, rng: &mut R) -> f64
    where
        R: Rng + ?Sized,
    {
        let geometry = &self.geometry;
        let sigma = JITTER_PX * ball.size / geometry.ball_size;
        let mut x = geometry.reflect(ball.drop_position, ball.size);
        for row in 1..=geometry.peg_rows() {
            if let Some(peg) = geometry.nearest_peg(row, x) {
                let offset = x - peg;
                if offset.abs() < geometry.peg_radius() + ball.size {
                    let direction = if offset > 0.0 {
                        1.0
                    } else if offset < 0.0 {
                        -1.0
                    } else if rng.random::<bool>() {
                        1.0
                    } else {
                        -1.0
                    };
                    let strength = 0.5 + 0.5 * rng.random::<f64>();
                    x += direction
                        * geometry.peg_spacing_x
                        * 0.5
                        * (0.5 + ball.bounciness)
                        * strength;
                }
            }
            let jitter: f64 = rng.sample(StandardNormal);
            x = geometry.reflect(x + jitter * sigma, ball.size);
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use plinko_knn::{BUCKET_COUNT, ObservationStore};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(0xb0a2d)
    }

    #[test]
    fn test_scan_positions() {
        let geometry = BoardGeometry::default();
        let plan = DropPlan::Scan {
            spacing: 10.0,
            quantity: 1,
        };
        let positions = plan.positions(&geometry);
        assert_eq!(positions.len(), 79);
        assert_eq!(positions[0], 10.0);
        assert_eq!(positions[78], 790.0);

        let degenerate = DropPlan::Scan {
            spacing: 0.0,
            quantity: 1,
        };
        assert!(degenerate.positions(&geometry).is_empty());
    }

    #[test]
    fn test_in_flight_cap() {
        let mut rng = rng();
        let mut board = Board::new();
        let spec = BallSpec::default();
        assert_eq!(board.drop_balls(100.0, 700, &spec, &mut rng), 700);
        assert_eq!(board.drop_balls(200.0, 100, &spec, &mut rng), 85);
        assert_eq!(board.drop_balls(300.0, 1, &spec, &mut rng), 0);
        assert_eq!(board.in_flight(), MAX_BALLS_IN_FLIGHT);

        let mut store = ObservationStore::new();
        board.settle(&mut store, &mut rng);
        assert_eq!(board.in_flight(), 0);
        assert_eq!(board.drop_balls(300.0, 1, &spec, &mut rng), 1);
    }

    #[test]
    fn test_one_observation_per_ball() {
        let mut rng = rng();
        let mut board = Board::new();
        let mut store = ObservationStore::new();
        let plan = DropPlan::Scan {
            spacing: 50.0,
            quantity: 3,
        };
        let dropped = board.drop_plan(&plan, &BallSpec::default(), &mut rng);
        assert_eq!(dropped, 15 * 3);
        assert_eq!(board.settle(&mut store, &mut rng), dropped);
        assert_eq!(store.len(), dropped);
        assert!(store.all().iter().all(|o| o.bucket.index() < BUCKET_COUNT));
    }

    #[test]
    fn test_drop_position_is_rounded() {
        let mut rng = rng();
        let mut board = Board::new();
        let mut observations = Vec::new();
        board.drop_balls(123.6, 5, &BallSpec::default(), &mut rng);
        board.settle(&mut observations, &mut rng);
        assert!(observations.iter().all(|o| o.drop_position == 124.0));
    }

    #[test]
    fn test_left_drops_land_left() {
        let mut rng = rng();
        let mut board = Board::new();
        let mut observations = Vec::new();
        board.drop_balls(40.0, 200, &BallSpec::default(), &mut rng);
        board.settle(&mut observations, &mut rng);
        let left = observations.iter().filter(|o| o.bucket.index() <= 1).count();
        assert!(left > 100, "only {left} of 200 balls landed in buckets 0-1");
    }

    #[test]
    fn test_far_off_board_drops_settle() {
        let mut rng = rng();
        let mut board = Board::new();
        let mut observations = Vec::new();
        let spec = BallSpec::default();
        assert_eq!(board.drop_balls(1e20, 3, &spec, &mut rng), 3);
        assert_eq!(board.drop_balls(-1e20, 3, &spec, &mut rng), 3);
        assert_eq!(board.drop_balls(f64::INFINITY, 3, &spec, &mut rng), 0);
        assert_eq!(board.drop_balls(f64::NAN, 3, &spec, &mut rng), 0);
        assert_eq!(board.settle(&mut observations, &mut rng), 6);
        assert_eq!(observations.len(), 6);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let run = || {
            let mut rng = rng();
            let mut board = Board::new();
            let mut observations = Vec::new();
            board.drop_balls(400.0, 50, &BallSpec::default(), &mut rng);
            board.settle(&mut observations, &mut rng);
            observations
        };
        assert_eq!(run(), run());
    }
}
