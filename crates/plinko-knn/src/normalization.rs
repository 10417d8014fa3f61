//! Min-max rescaling of feature columns.
//!
//! [`min_max_normalize`] maps each of the leading feature columns of a dataset
//! into `[0, 1]` using the column's observed minimum and maximum:
//!
//! ```text
//! v' = (v - min) / (max - min)
//! ```
//!
//! The caller's dataset is never modified; a rescaled copy is returned along
//! with the [`NormalizationParams`] that produced it. The parameters belong to
//! one analysis run. Use [`NormalizationParams::apply`] to bring a query point
//! into the same space before predicting.
//!
//! # Example
//!
//! ```
//! use plinko_knn::{
//!     feature::{FeatureVector, LabeledPoint},
//!     normalization::min_max_normalize,
//!     observation::BucketLabel,
//! };
//!
//! let label = BucketLabel::new(0).unwrap();
//! let dataset = [10.0, 20.0, 30.0]
//!     .map(|v| LabeledPoint::new(FeatureVector::from_iter([v]), label));
//!
//! let (normalized, params) = min_max_normalize(&dataset, 1).unwrap();
//! assert_eq!(normalized[1].features.as_slice(), &[0.5]);
//! assert_eq!(params.columns()[0].max, 30.0);
//! ```

use crate::{
    error::KnnError,
    feature::{FeatureVector, LabeledPoint},
};

/// Observed range of one feature column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnRange {
    pub min: f64,
    pub max: f64,
}

impl ColumnRange {
    #[must_use]
    pub fn scale(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }
}

/// Per-column ranges computed by one normalization pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationParams {
    columns: Vec<ColumnRange>,
}

impl NormalizationParams {
    #[must_use]
    pub fn columns(&self) -> &[ColumnRange] {
        &self.columns
    }

    /// Rescales the leading columns of `features` with these ranges.
    ///
    /// Columns beyond the parameter count are copied unchanged. Values outside
    /// the original range map outside `[0, 1]`.
    pub fn apply(&self, features: &[f64]) -> Result<FeatureVector, KnnError> {
        if features.len() < self.columns.len() {
            return Err(KnnError::DimensionMismatch {
                left: features.len(),
                right: self.columns.len(),
            });
        }
        Ok(features
            .iter()
            .enumerate()
            .map(|(i, &value)| match self.columns.get(i) {
                Some(range) => range.scale(value),
                None => value,
            })
            .collect())
    }
}

/// Rescales the first `feature_count` columns of `dataset` into `[0, 1]`.
///
/// # Errors
///
/// - [`KnnError::DimensionMismatch`] if a point has fewer than
///   `feature_count` features
/// - [`KnnError::DegenerateFeature`] if a column holds a single distinct value
///
/// An empty dataset yields an empty dataset and empty parameters.
pub fn min_max_normalize(
    dataset: &[LabeledPoint],
    feature_count: usize,
) -> Result<(Vec<LabeledPoint>, NormalizationParams), KnnError> {
    if dataset.is_empty() {
        return Ok((Vec::new(), NormalizationParams::default()));
    }
    if let Some(short) = dataset.iter().find(|p| p.features.len() < feature_count) {
        return Err(KnnError::DimensionMismatch {
            left: short.features.len(),
            right: feature_count,
        });
    }

    let columns = (0..feature_count)
        .map(|column| {
            let (min, max) = dataset.iter().map(|p| p.features[column]).fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(min, max), v| (min.min(v), max.max(v)),
            );
            if max <= min {
                return Err(KnnError::DegenerateFeature { column, value: min });
            }
            Ok(ColumnRange { min, max })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let params = NormalizationParams { columns };

    let normalized = dataset
        .iter()
        .map(|point| {
            let features = params.apply(&point.features)?;
            Ok(LabeledPoint::new(features, point.label))
        })
        .collect::<Result<Vec<_>, KnnError>>()?;

    Ok((normalized, params))
}
