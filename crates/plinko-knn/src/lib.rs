//! Nearest-neighbor bucket prediction for a Plinko board.
//!
//! Balls dropped through a field of pegs settle in one of ten buckets. This
//! crate records those outcomes and predicts where a new ball will land from
//! its drop position, and optionally its bounciness and size, using a
//! majority-vote k-nearest-neighbor classifier.
//!
//! # Architecture
//!
//! ```text
//! ObservationStore            (observation.rs)
//!   └─ labeled_points()       (feature.rs)
//!       └─ min_max_normalize() (normalization.rs)
//!           └─ split()        (split.rs)
//!               ├─ training ─┐
//!               └─ test ─────┴─ evaluate()   (accuracy.rs)
//!                                 └─ predict() (classifier.rs, distance.rs)
//! run_analysis()              (analysis.rs)
//! ```
//!
//! The classifier is retrained from the full observation set on every call;
//! there is no incremental model.
//!
//! # Quick start
//!
//! ```
//! use plinko_knn::{
//!     AnalysisConfig, AnalysisMode, AnalysisReport, BucketLabel, Observation, ObservationStore,
//!     run_analysis,
//! };
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64;
//!
//! let mut store = ObservationStore::new();
//! for (position, bucket) in [(100.0, 0), (110.0, 0), (500.0, 1), (510.0, 1)] {
//!     store.record(Observation::new(position, 0.5, 16.0, BucketLabel::new(bucket).unwrap()));
//! }
//!
//! let config = AnalysisConfig {
//!     mode: AnalysisMode::Predict,
//!     k: 1,
//!     point_of_interest: vec![105.0],
//!     ..AnalysisConfig::default()
//! };
//! let mut rng = Pcg64::seed_from_u64(0);
//! let report = run_analysis(store.all(), &config, &mut rng).unwrap();
//! assert_eq!(
//!     report,
//!     AnalysisReport::Prediction { bucket: BucketLabel::new(0).unwrap() }
//! );
//! ```

pub mod accuracy;
pub mod analysis;
pub mod classifier;
pub mod distance;
pub mod error;
pub mod feature;
pub mod normalization;
pub mod observation;
pub mod split;

pub use accuracy::{Accuracy, evaluate};
pub use analysis::{
    AnalysisConfig, AnalysisMode, AnalysisReport, AnalysisSession, SplitPolicy, run_analysis,
};
pub use classifier::{KnnClassifier, predict};
pub use distance::DistanceMetric;
pub use error::KnnError;
pub use feature::{FeatureField, FeatureSelection, FeatureVector, LabeledPoint};
pub use normalization::{NormalizationParams, min_max_normalize};
pub use observation::{
    BUCKET_COUNT, BucketLabel, Observation, ObservationLog, ObservationSink, ObservationStore,
    SharedObservationStore,
};
pub use split::{DatasetSplit, SplitIndices, split};
