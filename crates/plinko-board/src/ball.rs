use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ranges new balls draw their physical properties from.
///
/// Each ball draws `start + U[0, 1) * (end - start)` independently for
/// bounciness and size. Bounciness bounds are clamped to `min(|x|, 1)` when
/// sampled; sizes below [`BallSpec::MIN_SIZE`] are raised to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallSpec {
    /// Restitution range as `(start, end)`
    pub bounciness: (f64, f64),
    /// Radius range in pixels as `(start, end)`
    pub size: (f64, f64),
}

impl Default for BallSpec {
    fn default() -> Self {
        Self {
            bounciness: (0.2, 0.8),
            size: (12.0, 20.0),
        }
    }
}

impl BallSpec {
    pub const MIN_SIZE: f64 = 1.0;

    /// Draws a ball released at `drop_position`.
    pub fn sample<R>(&self, drop_position: f64, rng: &mut R) -> Ball
    where
        R: Rng + ?Sized,
    {
        let clamp_restitution = |x: f64| x.abs().min(1.0);
        let (start, end) = (
            clamp_restitution(self.bounciness.0),
            clamp_restitution(self.bounciness.1),
        );
        let bounciness = start + rng.random::<f64>() * (end - start);

        let (start, end) = self.size;
        let size = (start + rng.random::<f64>() * (end - start)).max(Self::MIN_SIZE);

        Ball {
            drop_position,
            bounciness,
            size,
        }
    }
}

/// A ball released on the board that has not settled yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub drop_position: f64,
    pub bounciness: f64,
    pub size: f64,
}
