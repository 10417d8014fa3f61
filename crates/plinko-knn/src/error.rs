//! Error type shared by every fallible operation of the classifier.

use crate::feature::FeatureField;

/// Errors raised by feature selection, normalization, splitting,
/// classification and evaluation.
///
/// All variants describe deterministic misconfigurations; none of them is
/// worth retrying.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum KnnError {
    #[display("test set size {requested} is out of range for {available} records")]
    InvalidSplitSize { requested: usize, available: usize },
    #[display("feature vectors differ in length ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },
    #[display("k = {k} needs at least {k} training records, got {available}")]
    InsufficientData { k: usize, available: usize },
    #[display("accuracy requested over an empty test set")]
    EmptyTestSet,
    #[display("feature column {column} has zero range (every value is {value})")]
    DegenerateFeature { column: usize, value: f64 },
    #[display("feature '{field}' has zero range (every value is {value})")]
    DegenerateField { field: FeatureField, value: f64 },
    #[display("k must be at least 1")]
    InvalidK,
    #[display("k range {min}..={max} is empty or starts at zero")]
    InvalidKRange { min: usize, max: usize },
    #[display("feature index {index} is out of range (expected 0..=2)")]
    FeatureIndexOutOfRange { index: usize },
    #[display("feature '{field}' selected more than once")]
    DuplicateFeature { field: FeatureField },
    #[display("feature selection is empty")]
    EmptyFeatureSelection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = KnnError::InvalidSplitSize {
            requested: 30,
            available: 20,
        };
        assert_eq!(
            e.to_string(),
            "test set size 30 is out of range for 20 records"
        );

        let e = KnnError::InsufficientData { k: 5, available: 3 };
        assert_eq!(
            e.to_string(),
            "k = 5 needs at least 5 training records, got 3"
        );

        let e = KnnError::DuplicateFeature {
            field: FeatureField::Size,
        };
        assert_eq!(e.to_string(), "feature 'size' selected more than once");

        let e = KnnError::DegenerateField {
            field: FeatureField::Bounciness,
            value: 0.5,
        };
        assert_eq!(
            e.to_string(),
            "feature 'bounciness' has zero range (every value is 0.5)"
        );
    }

    #[test]
    fn test_is_std_error() {
        fn assert_impl<T: std::error::Error + Send + Sync>() {}
        assert_impl::<KnnError>();
    }
}
