//! Dissimilarity between feature vectors.

use serde::{Deserialize, Serialize};

use crate::{error::KnnError, feature::FeatureSelection};

/// Distance metric used by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Absolute difference of two one-element vectors.
    Scalar,
    /// Square root of the summed squared per-feature differences.
    #[default]
    Euclidean,
}

impl DistanceMetric {
    /// Scalar for a single feature, Euclidean for anything wider.
    #[must_use]
    pub fn for_selection(selection: &FeatureSelection) -> Self {
        if selection.len() == 1 {
            Self::Scalar
        } else {
            Self::Euclidean
        }
    }

    pub fn distance(self, a: &[f64], b: &[f64]) -> Result<f64, KnnError> {
        match self {
            Self::Scalar => match (a, b) {
                ([a], [b]) => Ok(scalar_distance(*a, *b)),
                _ if a.len() != 1 => Err(KnnError::DimensionMismatch {
                    left: a.len(),
                    right: 1,
                }),
                _ => Err(KnnError::DimensionMismatch {
                    left: 1,
                    right: b.len(),
                }),
            },
            Self::Euclidean => euclidean_distance(a, b),
        }
    }
}

#[must_use]
pub fn scalar_distance(a: f64, b: f64) -> f64 {
    (a - b).abs()
}

/// Euclidean distance between two equal-length vectors.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> Result<f64, KnnError> {
    if a.len() != b.len() {
        return Err(KnnError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const VECTORS: [[f64; 3]; 4] = [
        [0.0, 0.0, 0.0],
        [3.0, 4.0, 12.0],
        [0.25, 0.5, 0.75],
        [-120.0, 0.9, 17.0],
    ];

    #[test]
    fn test_euclidean_hand_computed() {
        assert_abs_diff_eq!(
            euclidean_distance(&VECTORS[0], &VECTORS[1]).unwrap(),
            13.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_scalar() {
        assert_abs_diff_eq!(scalar_distance(105.0, 100.0), 5.0);
        assert_abs_diff_eq!(
            DistanceMetric::Scalar.distance(&[105.0], &[510.0]).unwrap(),
            405.0
        );
    }

    #[test]
    fn test_symmetric_and_non_negative() {
        for a in &VECTORS {
            for b in &VECTORS {
                let ab = euclidean_distance(a, b).unwrap();
                let ba = euclidean_distance(b, a).unwrap();
                assert_eq!(ab.to_bits(), ba.to_bits());
                assert!(ab >= 0.0);

                let (x, y) = (a[0], b[0]);
                assert_eq!(scalar_distance(x, y), scalar_distance(y, x));
                assert!(scalar_distance(x, y) >= 0.0);
            }
            assert_eq!(euclidean_distance(a, a).unwrap(), 0.0);
            assert_eq!(scalar_distance(a[1], a[1]), 0.0);
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        assert_eq!(
            euclidean_distance(&[1.0, 2.0], &[1.0]),
            Err(KnnError::DimensionMismatch { left: 2, right: 1 })
        );
        assert_eq!(
            DistanceMetric::Scalar.distance(&[1.0, 2.0], &[1.0]),
            Err(KnnError::DimensionMismatch { left: 2, right: 1 })
        );
        assert_eq!(
            DistanceMetric::Scalar.distance(&[1.0], &[]),
            Err(KnnError::DimensionMismatch { left: 1, right: 0 })
        );
    }

    #[test]
    fn test_metric_for_selection() {
        assert_eq!(
            DistanceMetric::for_selection(&FeatureSelection::position_only()),
            DistanceMetric::Scalar
        );
        assert_eq!(
            DistanceMetric::for_selection(&FeatureSelection::all()),
            DistanceMetric::Euclidean
        );
    }
}
