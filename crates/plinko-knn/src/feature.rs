//! Projection of observations onto classifier inputs.
//!
//! A [`FeatureSelection`] names which observation fields feed the distance
//! metric and in which order. Projecting an [`Observation`] through it yields
//! a fixed-capacity [`FeatureVector`]; pairing that with the recorded bucket
//! gives a [`LabeledPoint`], the unit the splitter, classifier and evaluator
//! work on.
//!
//! | Index | Field           |
//! |-------|-----------------|
//! | 0     | `drop_position` |
//! | 1     | `bounciness`    |
//! | 2     | `size`          |
//!
//! The bucket label is never a feature.

use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{
    error::KnnError,
    observation::{BucketLabel, Observation},
};

/// Maximum number of features a vector can hold.
pub const MAX_FEATURES: usize = FeatureField::ALL.len();

/// Numeric classifier input drawn from one or more observation fields.
pub type FeatureVector = ArrayVec<f64, MAX_FEATURES>;

/// Observation field usable as a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureField {
    DropPosition,
    Bounciness,
    Size,
}

impl FeatureField {
    pub const ALL: [Self; 3] = [Self::DropPosition, Self::Bounciness, Self::Size];

    /// Maps a positional index (0–2) to its field.
    pub fn from_index(index: usize) -> Result<Self, KnnError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(KnnError::FeatureIndexOutOfRange { index })
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::DropPosition => 0,
            Self::Bounciness => 1,
            Self::Size => 2,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DropPosition => "drop_position",
            Self::Bounciness => "bounciness",
            Self::Size => "size",
        }
    }

    #[must_use]
    pub fn extract(self, observation: &Observation) -> f64 {
        match self {
            Self::DropPosition => observation.drop_position,
            Self::Bounciness => observation.bounciness,
            Self::Size => observation.size,
        }
    }
}

impl fmt::Display for FeatureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

/// Ordered, duplicate-free, non-empty list of feature fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSelection {
    fields: ArrayVec<FeatureField, MAX_FEATURES>,
}

impl FeatureSelection {
    /// Builds a selection from fields in the order they should appear.
    pub fn new<I>(fields: I) -> Result<Self, KnnError>
    where
        I: IntoIterator<Item = FeatureField>,
    {
        let mut selected = ArrayVec::new();
        for field in fields {
            if selected.contains(&field) {
                return Err(KnnError::DuplicateFeature { field });
            }
            // Cannot overflow: the three fields are distinct at this point.
            selected.push(field);
        }
        if selected.is_empty() {
            return Err(KnnError::EmptyFeatureSelection);
        }
        Ok(Self { fields: selected })
    }

    /// Builds a selection from positional indices (see the module table).
    pub fn from_indices(indices: &[usize]) -> Result<Self, KnnError> {
        let fields = indices
            .iter()
            .map(|&index| FeatureField::from_index(index))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(fields)
    }

    #[must_use]
    pub fn single(field: FeatureField) -> Self {
        let mut fields = ArrayVec::new();
        fields.push(field);
        Self { fields }
    }

    /// Drop position only, the default feature space.
    #[must_use]
    pub fn position_only() -> Self {
        Self::single(FeatureField::DropPosition)
    }

    #[must_use]
    pub fn all() -> Self {
        Self {
            fields: ArrayVec::from(FeatureField::ALL),
        }
    }

    #[must_use]
    pub fn fields(&self) -> &[FeatureField] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FeatureSelection {
    fn default() -> Self {
        Self::position_only()
    }
}

impl fmt::Display for FeatureSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            fmt::Display::fmt(field, f)?;
        }
        Ok(())
    }
}

/// Feature vector paired with the bucket the ball actually landed in.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledPoint {
    pub features: FeatureVector,
    pub label: BucketLabel,
}

impl LabeledPoint {
    #[must_use]
    pub fn new(features: FeatureVector, label: BucketLabel) -> Self {
        Self { features, label }
    }

    #[must_use]
    pub fn from_observation(observation: &Observation, selection: &FeatureSelection) -> Self {
        Self {
            features: select_features(observation, selection),
            label: observation.bucket,
        }
    }
}

/// Projects an observation onto the selected fields, preserving their order.
#[must_use]
pub fn select_features(observation: &Observation, selection: &FeatureSelection) -> FeatureVector {
    selection
        .fields
        .iter()
        .map(|field| field.extract(observation))
        .collect()
}

/// Projects an observation onto fields given by positional index.
///
/// Fails with [`KnnError::FeatureIndexOutOfRange`] for an index above 2.
pub fn select_features_by_index(
    observation: &Observation,
    indices: &[usize],
) -> Result<FeatureVector, KnnError> {
    let selection = FeatureSelection::from_indices(indices)?;
    Ok(select_features(observation, &selection))
}

/// Converts observations into labeled points using `selection`.
#[must_use]
pub fn labeled_points(observations: &[Observation], selection: &FeatureSelection) -> Vec<LabeledPoint> {
    observations
        .iter()
        .map(|observation| LabeledPoint::from_observation(observation, selection))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Observation {
        Observation::new(412.0, 0.35, 18.5, BucketLabel::new(5).unwrap())
    }

    #[test]
    fn test_select_preserves_requested_order() {
        let vector = select_features_by_index(&sample(), &[2, 0]).unwrap();
        assert_eq!(vector.as_slice(), &[18.5, 412.0]);

        let vector = select_features(&sample(), &FeatureSelection::all());
        assert_eq!(vector.as_slice(), &[412.0, 0.35, 18.5]);
    }

    #[test]
    fn test_index_out_of_range() {
        assert_eq!(
            select_features_by_index(&sample(), &[0, 3]),
            Err(KnnError::FeatureIndexOutOfRange { index: 3 })
        );
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        assert_eq!(
            FeatureSelection::from_indices(&[1, 1]),
            Err(KnnError::DuplicateFeature {
                field: FeatureField::Bounciness
            })
        );
        assert_eq!(
            FeatureSelection::from_indices(&[]),
            Err(KnnError::EmptyFeatureSelection)
        );
    }

    #[test]
    fn test_index_roundtrip() {
        for field in FeatureField::ALL {
            assert_eq!(FeatureField::from_index(field.index()), Ok(field));
        }
    }

    #[test]
    fn test_labeled_points_carry_bucket() {
        let points = labeled_points(&[sample()], &FeatureSelection::position_only());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].features.as_slice(), &[412.0]);
        assert_eq!(points[0].label.index(), 5);
    }

    #[test]
    fn test_display() {
        let selection = FeatureSelection::from_indices(&[0, 2]).unwrap();
        assert_eq!(selection.to_string(), "drop_position,size");
    }
}
