//! Classification accuracy over a held-out test set.

use std::fmt;

use crate::{
    classifier::KnnClassifier, distance::DistanceMetric, error::KnnError, feature::LabeledPoint,
};

/// Number of correct predictions out of the test points evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accuracy {
    pub correct: usize,
    pub total: usize,
}

impl Accuracy {
    /// Fraction of correct predictions in `[0, 1]`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.correct as f64 / self.total as f64
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ratio())
    }
}

/// Predicts every test point from `training` and counts exact label matches.
///
/// # Errors
///
/// - [`KnnError::EmptyTestSet`] if `test` is empty
/// - any error raised by [`KnnClassifier::predict`]
pub fn evaluate(
    test: &[LabeledPoint],
    training: &[LabeledPoint],
    k: usize,
    metric: DistanceMetric,
) -> Result<Accuracy, KnnError> {
    if test.is_empty() {
        return Err(KnnError::EmptyTestSet);
    }
    let classifier = KnnClassifier::new(training, metric);
    let mut correct = 0;
    for point in test {
        let predicted = classifier.predict(&point.features, k)?;
        if predicted == point.label {
            correct += 1;
        } else {
            tracing::trace!(
                features = ?point.features.as_slice(),
                expected = %point.label,
                %predicted,
                "misprediction"
            );
        }
    }
    let accuracy = Accuracy {
        correct,
        total: test.len(),
    };
    tracing::debug!(k, correct, total = accuracy.total, "evaluated test set");
    Ok(accuracy)
}
