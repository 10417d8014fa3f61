use plinko_knn::{BUCKET_COUNT, BucketLabel};

/// Canvas, peg grid and bucket layout of the board, in pixels.
///
/// Pegs sit on rows `peg_spacing_y` apart. Within a row they are
/// `peg_spacing_x` apart, and every second row is shifted left by half a
/// spacing. Buckets split the full width into equal slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    pub width: f64,
    pub height: f64,
    pub peg_spacing_x: f64,
    pub peg_spacing_y: f64,
    /// Nominal ball radius; also offsets the peg grid.
    pub ball_size: f64,
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self {
            width: 794.0,
            height: 600.0,
            peg_spacing_x: 70.0,
            peg_spacing_y: 70.0,
            ball_size: 16.0,
        }
    }
}

impl BoardGeometry {
    /// Radius of a single peg.
    #[must_use]
    pub fn peg_radius(&self) -> f64 {
        self.ball_size / 4.0
    }

    /// Number of peg rows between the drop line and the buckets.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn peg_rows(&self) -> usize {
        let limit = self.height / self.peg_spacing_y - 1.0;
        (1_usize..).take_while(|&row| (row as f64) < limit).count()
    }

    /// Horizontal peg positions of `row` (1-based), left to right.
    #[expect(clippy::cast_precision_loss)]
    pub fn row_pegs(&self, row: usize) -> impl Iterator<Item = f64> + '_ {
        let limit = self.width / self.peg_spacing_x + 1.0;
        let shift = if row % 2 == 0 {
            self.peg_spacing_x / 2.0
        } else {
            0.0
        };
        (1_usize..)
            .take_while(move |&column| (column as f64) < limit)
            .map(move |column| {
                column as f64 * self.peg_spacing_x - self.ball_size * 1.5 - shift
            })
    }

    /// Position of the peg in `row` closest to `x`.
    #[must_use]
    pub fn nearest_peg(&self, row: usize, x: f64) -> Option<f64> {
        self.row_pegs(row)
            .min_by(|a, b| (a - x).abs().total_cmp(&(b - x).abs()))
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn bucket_width(&self) -> f64 {
        self.width / BUCKET_COUNT as f64
    }

    /// Bucket whose slot contains `x`; positions off the edges fall into the
    /// outermost buckets.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    #[must_use]
    pub fn bucket_at(&self, x: f64) -> BucketLabel {
        let slot = (x / self.bucket_width()).floor().clamp(0.0, (BUCKET_COUNT - 1) as f64) as u8;
        BucketLabel::new(slot).unwrap_or_else(|| unreachable!("slot clamped to bucket range"))
    }

    /// Keeps a ball of radius `size` inside the side walls by reflecting it.
    #[must_use]
    pub fn reflect(&self, x: f64, size: f64) -> f64 {
        let (lo, hi) = (size, self.width - size);
        if lo >= hi || x.is_nan() {
            return self.width / 2.0;
        }
        if x.is_infinite() {
            return x.clamp(lo, hi);
        }
        // Repeated reflection between two walls is a triangle wave with
        // period `2 * (hi - lo)`.
        let period = 2.0 * (hi - lo);
        let t = (x - lo).rem_euclid(period);
        lo + t.min(period - t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let geometry = BoardGeometry::default();
        assert_eq!(geometry.peg_rows(), 7);
        assert_eq!(geometry.row_pegs(1).count(), 12);

        let first_row = geometry.row_pegs(1).collect::<Vec<_>>();
        assert_eq!(first_row[0], 46.0);
        let second_row = geometry.row_pegs(2).collect::<Vec<_>>();
        assert_eq!(second_row[0], 11.0);
    }

    #[test]
    fn test_bucket_at() {
        let geometry = BoardGeometry::default();
        assert_eq!(geometry.bucket_at(0.0).index(), 0);
        assert_eq!(geometry.bucket_at(79.3).index(), 0);
        assert_eq!(geometry.bucket_at(79.5).index(), 1);
        assert_eq!(geometry.bucket_at(793.9).index(), 9);
        assert_eq!(geometry.bucket_at(-20.0).index(), 0);
        assert_eq!(geometry.bucket_at(900.0).index(), 9);
    }

    #[test]
    fn test_nearest_peg() {
        let geometry = BoardGeometry::default();
        assert_eq!(geometry.nearest_peg(1, 50.0), Some(46.0));
        assert_eq!(geometry.nearest_peg(2, 50.0), Some(81.0));
    }

    #[test]
    fn test_reflect_stays_inside() {
        let geometry = BoardGeometry::default();
        assert_eq!(geometry.reflect(10.0, 16.0), 22.0);
        assert_eq!(geometry.reflect(790.0, 16.0), 766.0);
        assert_eq!(geometry.reflect(400.0, 16.0), 400.0);
        let x = geometry.reflect(-5000.0, 16.0);
        assert!((16.0..=778.0).contains(&x));
    }

    #[test]
    fn test_reflect_far_off_board() {
        let geometry = BoardGeometry::default();
        for x in [1e6, -1e6, 1e20, -1e20, f64::MAX, f64::MIN] {
            let reflected = geometry.reflect(x, 16.0);
            assert!(
                (16.0..=778.0).contains(&reflected),
                "reflect({x}) = {reflected}"
            );
        }
        assert_eq!(geometry.reflect(f64::INFINITY, 16.0), 778.0);
        assert_eq!(geometry.reflect(f64::NEG_INFINITY, 16.0), 16.0);
        assert_eq!(geometry.reflect(f64::NAN, 16.0), 397.0);
    }

    #[test]
    fn test_reflect_matches_repeated_folding() {
        let geometry = BoardGeometry::default();
        // 16 + 2 * 762 = 1540 folds back onto the left wall; 1540 + 100 onto 116.
        assert_eq!(geometry.reflect(1540.0, 16.0), 16.0);
        assert_eq!(geometry.reflect(1640.0, 16.0), 116.0);
        assert_eq!(geometry.reflect(-90.0, 16.0), 122.0);
    }
}
