//! Majority-vote k-nearest-neighbor classification.
//!
//! # Algorithm
//!
//! ```text
//! predict()
//!   ├─ validate k against the training set
//!   ├─ distance from every training point to the query
//!   ├─ stable sort by ascending distance
//!   ├─ keep the first k points
//!   └─ majority vote over their labels
//! ```
//!
//! # Tie-breaking
//!
//! - **Distance ties**: the sort is stable, so training points at equal
//!   distance keep their order in the training set. This decides which points
//!   enter the k-window.
//! - **Vote ties**: when several labels share the top count, the smallest
//!   bucket label wins.

use crate::{
    distance::DistanceMetric,
    error::KnnError,
    feature::LabeledPoint,
    observation::{BUCKET_COUNT, BucketLabel},
};

/// Classifier over a borrowed training set.
///
/// Nothing is precomputed: every call to [`predict`](Self::predict) scans the
/// whole training set.
#[derive(Debug, Clone, Copy)]
pub struct KnnClassifier<'a> {
    training: &'a [LabeledPoint],
    metric: DistanceMetric,
}

impl<'a> KnnClassifier<'a> {
    #[must_use]
    pub fn new(training: &'a [LabeledPoint], metric: DistanceMetric) -> Self {
        Self { training, metric }
    }

    #[must_use]
    pub fn training(&self) -> &'a [LabeledPoint] {
        self.training
    }

    #[must_use]
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Predicts the bucket of `query` from its `k` nearest training points.
    ///
    /// # Errors
    ///
    /// - [`KnnError::InvalidK`] if `k == 0`
    /// - [`KnnError::InsufficientData`] if the training set has fewer than `k` points
    /// - [`KnnError::DimensionMismatch`] if `query` does not fit the metric or
    ///   the training vectors
    pub fn predict(&self, query: &[f64], k: usize) -> Result<BucketLabel, KnnError> {
        if k == 0 {
            return Err(KnnError::InvalidK);
        }
        if self.training.len() < k {
            return Err(KnnError::InsufficientData {
                k,
                available: self.training.len(),
            });
        }

        let mut neighbors = self
            .training
            .iter()
            .map(|point| {
                let distance = self.metric.distance(&point.features, query)?;
                Ok((distance, point.label))
            })
            .collect::<Result<Vec<_>, KnnError>>()?;
        // `sort_by` is stable; equal distances keep training order.
        neighbors.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(majority_label(neighbors[..k].iter().map(|&(_, label)| label)))
    }
}

/// Predicts the bucket of `query` from its `k` nearest points in `training`.
///
/// Shorthand for [`KnnClassifier::predict`].
///
/// # Example
///
/// ```
/// use plinko_knn::{
///     classifier::predict,
///     distance::DistanceMetric,
///     feature::{FeatureVector, LabeledPoint},
///     observation::BucketLabel,
/// };
///
/// let point = |position: f64, label: u8| {
///     LabeledPoint::new(FeatureVector::from_iter([position]), BucketLabel::new(label).unwrap())
/// };
/// let training = [point(100.0, 0), point(110.0, 0), point(500.0, 1), point(510.0, 1)];
///
/// let label = predict(&training, &[105.0], 1, DistanceMetric::Scalar).unwrap();
/// assert_eq!(label.index(), 0);
/// ```
pub fn predict(
    training: &[LabeledPoint],
    query: &[f64],
    k: usize,
    metric: DistanceMetric,
) -> Result<BucketLabel, KnnError> {
    KnnClassifier::new(training, metric).predict(query, k)
}

/// Returns the most frequent label, preferring the smallest label on ties.
///
/// # Panics
///
/// Panics if `labels` is empty.
fn majority_label<I>(labels: I) -> BucketLabel
where
    I: IntoIterator<Item = BucketLabel>,
{
    let mut counts = [0_usize; BUCKET_COUNT];
    for label in labels {
        counts[label.index()] += 1;
    }
    // Ascending scan with a strict comparison keeps the first (smallest)
    // label among equal counts.
    let mut best: Option<(BucketLabel, usize)> = None;
    for label in BucketLabel::all() {
        let count = counts[label.index()];
        if count > 0 && best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label)
        .expect("majority vote over an empty neighbor window")
}
