//! Analysis driver: point prediction, k-sweep and feature sweep.
//!
//! # Modes
//!
//! | Mode | What runs | Report line |
//! |------|-----------|-------------|
//! | [`AnalysisMode::Predict`] | classify `point_of_interest` with `k` | `Based on our analysis, your ball is likely to land in Bucket #4` |
//! | [`AnalysisMode::KSweep`] | split + evaluate for each k in `k_min..=k_max` | `K: 7\tAccuracy: 0.82` |
//! | [`AnalysisMode::FeatureSweep`] | normalize + split + evaluate each field alone | `Feature: size\tAccuracy: 0.14` |
//!
//! Every mode retrains from the full observation set on each call.
//!
//! # Split policy
//!
//! With [`SplitPolicy::Reshuffle`] every evaluation draws a fresh split, so
//! accuracies of neighboring sweep entries are measured on different test
//! sets. [`SplitPolicy::Pinned`] draws one index permutation per trial at the
//! start of the run and reuses it for every sweep entry, which makes the
//! entries directly comparable. Setting `seed` makes either policy
//! reproducible.
//!
//! # Example
//!
//! ```
//! use plinko_knn::{
//!     analysis::{AnalysisConfig, AnalysisMode, AnalysisSession},
//!     observation::BucketLabel,
//! };
//!
//! let config = AnalysisConfig {
//!     mode: AnalysisMode::Predict,
//!     k: 1,
//!     point_of_interest: vec![105.0],
//!     seed: Some(1),
//!     ..AnalysisConfig::default()
//! };
//! let mut session = AnalysisSession::new(config);
//! session.on_observation(100.0, 0.5, 16.0, BucketLabel::new(0).unwrap());
//! session.on_observation(500.0, 0.5, 16.0, BucketLabel::new(1).unwrap());
//!
//! let mut out = Vec::new();
//! session.run_analysis(&mut out).unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "Based on our analysis, your ball is likely to land in Bucket #0\n"
//! );
//! ```

use std::{fmt, io};

use plinko_stats::descriptive::DescriptiveStats;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::{
    accuracy::{Accuracy, evaluate},
    classifier::predict,
    distance::DistanceMetric,
    error::KnnError,
    feature::{FeatureField, FeatureSelection, FeatureVector, LabeledPoint, labeled_points},
    normalization::{NormalizationParams, min_max_normalize},
    observation::{BucketLabel, Observation, ObservationSink, ObservationStore},
    split::{DatasetSplit, SplitIndices, split},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    #[default]
    Predict,
    KSweep,
    FeatureSweep,
}

/// How test/training splits are drawn within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Fresh split for every evaluation.
    #[default]
    Reshuffle,
    /// One split per trial, shared by every sweep entry.
    Pinned,
}

/// Parameters of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub mode: AnalysisMode,
    /// Feature indices (0: drop position, 1: bounciness, 2: size)
    pub features: Vec<usize>,
    /// Number of observations held out for testing
    pub test_size: usize,
    /// Neighbor count for prediction and the feature sweep
    pub k: usize,
    /// First k of the k-sweep (inclusive)
    pub k_min: usize,
    /// Last k of the k-sweep (inclusive)
    pub k_max: usize,
    /// Query for prediction, one value per selected feature
    pub point_of_interest: Vec<f64>,
    pub split: SplitPolicy,
    /// Evaluations per sweep entry; zero is treated as one
    pub trials: usize,
    pub seed: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::default(),
            features: vec![FeatureField::DropPosition.index()],
            test_size: 50,
            k: 10,
            k_min: 1,
            k_max: 20,
            point_of_interest: vec![300.0],
            split: SplitPolicy::default(),
            trials: 1,
            seed: None,
        }
    }
}

impl AnalysisConfig {
    pub fn selection(&self) -> Result<FeatureSelection, KnnError> {
        FeatureSelection::from_indices(&self.features)
    }

    fn trial_count(&self) -> usize {
        self.trials.max(1)
    }
}

/// Mean accuracy over the trials of one sweep entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialSummary {
    pub trials: usize,
    pub accuracy: f64,
    pub std_dev: f64,
}

impl TrialSummary {
    fn from_ratios(ratios: &[f64]) -> Self {
        let stats = DescriptiveStats::new(ratios.iter().copied())
            .expect("at least one trial per sweep entry");
        Self {
            trials: stats.count,
            accuracy: stats.mean,
            std_dev: stats.std_dev,
        }
    }
}

impl fmt::Display for TrialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accuracy: {}", self.accuracy)?;
        if self.trials > 1 {
            write!(f, "\tStdDev: {}", self.std_dev)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KAccuracy {
    pub k: usize,
    pub summary: TrialSummary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureAccuracy {
    pub field: FeatureField,
    pub summary: TrialSummary,
}

/// Outcome of one analysis run.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum AnalysisReport {
    Prediction { bucket: BucketLabel },
    KSweep(Vec<KAccuracy>),
    FeatureSweep(Vec<FeatureAccuracy>),
}

impl AnalysisReport {
    /// The swept k with the highest mean accuracy; the smallest k wins ties.
    #[must_use]
    pub fn best_k(&self) -> Option<KAccuracy> {
        let Self::KSweep(entries) = self else {
            return None;
        };
        entries.iter().copied().reduce(|best, entry| {
            if entry.summary.accuracy > best.summary.accuracy {
                entry
            } else {
                best
            }
        })
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prediction { bucket } => writeln!(
                f,
                "Based on our analysis, your ball is likely to land in Bucket #{bucket}"
            ),
            Self::KSweep(entries) => {
                for KAccuracy { k, summary } in entries {
                    writeln!(f, "K: {k}\t{summary}")?;
                }
                if let Some(KAccuracy { k, summary }) = self.best_k() {
                    writeln!(f, "Best K: {k}\t{summary}")?;
                }
                Ok(())
            }
            Self::FeatureSweep(entries) => {
                for FeatureAccuracy { field, summary } in entries {
                    writeln!(f, "Feature: {field}\t{summary}")?;
                }
                Ok(())
            }
        }
    }
}

/// Runs the mode selected by `config` over `observations`.
///
/// Any error aborts the whole run; partial sweep results are discarded.
pub fn run_analysis<R>(
    observations: &[Observation],
    config: &AnalysisConfig,
    rng: &mut R,
) -> Result<AnalysisReport, KnnError>
where
    R: Rng + ?Sized,
{
    tracing::info!(
        mode = ?config.mode,
        observations = observations.len(),
        "running analysis"
    );
    match config.mode {
        AnalysisMode::Predict => predict_point(observations, config),
        AnalysisMode::KSweep => sweep_k(observations, config, rng),
        AnalysisMode::FeatureSweep => sweep_features(observations, config, rng),
    }
}

fn predict_point(
    observations: &[Observation],
    config: &AnalysisConfig,
) -> Result<AnalysisReport, KnnError> {
    let selection = config.selection()?;
    if config.point_of_interest.len() != selection.len() {
        return Err(KnnError::DimensionMismatch {
            left: config.point_of_interest.len(),
            right: selection.len(),
        });
    }
    let points = labeled_points(observations, &selection);
    let query = config
        .point_of_interest
        .iter()
        .copied()
        .collect::<FeatureVector>();

    // Wider selections mix pixel and unit-interval scales; bring the training
    // set and the query into the same normalized space first.
    let (training, query) = if selection.len() > 1 {
        let (normalized, params) = normalize_selection(&points, &selection)?;
        let query = params.apply(&query)?;
        (normalized, query)
    } else {
        (points, query)
    };

    let metric = DistanceMetric::for_selection(&selection);
    let bucket = predict(&training, &query, config.k, metric)?;
    tracing::debug!(%selection, ?query, %bucket, "predicted bucket");
    Ok(AnalysisReport::Prediction { bucket })
}

fn sweep_k<R>(
    observations: &[Observation],
    config: &AnalysisConfig,
    rng: &mut R,
) -> Result<AnalysisReport, KnnError>
where
    R: Rng + ?Sized,
{
    if config.k_min == 0 || config.k_min > config.k_max {
        return Err(KnnError::InvalidKRange {
            min: config.k_min,
            max: config.k_max,
        });
    }
    let selection = config.selection()?;
    let points = labeled_points(observations, &selection);
    let points = if selection.len() > 1 {
        normalize_selection(&points, &selection)?.0
    } else {
        points
    };
    let metric = DistanceMetric::for_selection(&selection);
    let mut splitter = Splitter::new(config, points.len(), rng)?;

    let entries = (config.k_min..=config.k_max)
        .map(|k| {
            let summary = splitter.summarize(&points, config, |split| {
                evaluate(&split.test, &split.training, k, metric)
            })?;
            tracing::debug!(k, accuracy = summary.accuracy, "k-sweep entry");
            Ok(KAccuracy { k, summary })
        })
        .collect::<Result<Vec<_>, KnnError>>()?;
    Ok(AnalysisReport::KSweep(entries))
}

fn sweep_features<R>(
    observations: &[Observation],
    config: &AnalysisConfig,
    rng: &mut R,
) -> Result<AnalysisReport, KnnError>
where
    R: Rng + ?Sized,
{
    let mut splitter = Splitter::new(config, observations.len(), rng)?;
    let entries = FeatureField::ALL
        .into_iter()
        .map(|field| {
            let selection = FeatureSelection::single(field);
            let points = labeled_points(observations, &selection);
            let (points, _) = normalize_selection(&points, &selection)?;
            let metric = DistanceMetric::for_selection(&selection);
            let summary = splitter.summarize(&points, config, |split| {
                evaluate(&split.test, &split.training, config.k, metric)
            })?;
            tracing::debug!(%field, accuracy = summary.accuracy, "feature-sweep entry");
            Ok(FeatureAccuracy { field, summary })
        })
        .collect::<Result<Vec<_>, KnnError>>()?;
    Ok(AnalysisReport::FeatureSweep(entries))
}

/// Min-max normalizes `points`, naming the offending field when a column has
/// zero range.
fn normalize_selection(
    points: &[LabeledPoint],
    selection: &FeatureSelection,
) -> Result<(Vec<LabeledPoint>, NormalizationParams), KnnError> {
    min_max_normalize(points, selection.len()).map_err(|e| match e {
        KnnError::DegenerateFeature { column, value } => match selection.fields().get(column) {
            Some(&field) => KnnError::DegenerateField { field, value },
            None => e,
        },
        e => e,
    })
}

/// Source of splits for the sweep modes, honoring [`SplitPolicy`].
struct Splitter<'r, R: ?Sized> {
    rng: &'r mut R,
    pinned: Option<Vec<SplitIndices>>,
}

impl<'r, R> Splitter<'r, R>
where
    R: Rng + ?Sized,
{
    fn new(config: &AnalysisConfig, len: usize, rng: &'r mut R) -> Result<Self, KnnError> {
        let pinned = match config.split {
            SplitPolicy::Reshuffle => None,
            SplitPolicy::Pinned => Some(
                (0..config.trial_count())
                    .map(|_| SplitIndices::shuffled(len, config.test_size, &mut *rng))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };
        Ok(Self { rng, pinned })
    }

    fn split(
        &mut self,
        trial: usize,
        points: &[LabeledPoint],
        test_size: usize,
    ) -> Result<DatasetSplit<LabeledPoint>, KnnError> {
        match &self.pinned {
            Some(indices) => indices[trial].apply(points),
            None => split(points, test_size, &mut *self.rng),
        }
    }

    fn summarize<F>(
        &mut self,
        points: &[LabeledPoint],
        config: &AnalysisConfig,
        mut measure: F,
    ) -> Result<TrialSummary, KnnError>
    where
        F: FnMut(&DatasetSplit<LabeledPoint>) -> Result<Accuracy, KnnError>,
    {
        let ratios = (0..config.trial_count())
            .map(|trial| {
                let split = self.split(trial, points, config.test_size)?;
                Ok(measure(&split)?.ratio())
            })
            .collect::<Result<Vec<_>, KnnError>>()?;
        Ok(TrialSummary::from_ratios(&ratios))
    }
}

/// Collaborator-facing facade: owns the observation store, the configuration
/// and the random source of one in-memory session.
#[derive(Debug, Clone)]
pub struct AnalysisSession<R = Pcg64> {
    store: ObservationStore,
    config: AnalysisConfig,
    rng: R,
}

impl AnalysisSession<Pcg64> {
    /// Creates a session seeded from `config.seed`, or from the OS when unset.
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R> AnalysisSession<R>
where
    R: Rng,
{
    pub fn with_rng(config: AnalysisConfig, rng: R) -> Self {
        Self {
            store: ObservationStore::new(),
            config,
            rng,
        }
    }

    /// Records one settled ball.
    pub fn on_observation(
        &mut self,
        drop_position: f64,
        bounciness: f64,
        size: f64,
        bucket: BucketLabel,
    ) {
        self.store
            .record(Observation::new(drop_position, bounciness, size, bucket));
    }

    #[must_use]
    pub fn store(&self) -> &ObservationStore {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.config = config;
    }

    pub fn reset(&mut self) {
        self.store.reset();
    }

    /// Runs the configured mode and returns its report.
    pub fn analyze(&mut self) -> Result<AnalysisReport, KnnError> {
        run_analysis(self.store.all(), &self.config, &mut self.rng)
    }

    /// Runs the configured mode and writes its report lines to `out`.
    ///
    /// Analysis errors are reported as a single `Analysis failed: ...` line;
    /// only write errors are returned.
    pub fn run_analysis<W>(&mut self, out: &mut W) -> io::Result<()>
    where
        W: io::Write + ?Sized,
    {
        match self.analyze() {
            Ok(report) => write!(out, "{report}"),
            Err(e) => {
                tracing::warn!(error = %e, "analysis aborted");
                writeln!(out, "Analysis failed: {e}")
            }
        }
    }
}

impl<R> ObservationSink for AnalysisSession<R>
where
    R: Rng,
{
    fn on_observation(&mut self, observation: Observation) {
        self.store.record(observation);
    }
}
