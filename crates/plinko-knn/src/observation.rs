//! Recorded drop outcomes and the store that collects them.
//!
//! Every ball that settles in a bucket produces exactly one [`Observation`].
//! Producers push observations through the [`ObservationSink`] trait, which is
//! the only ingestion path into an [`ObservationStore`].
//!
//! # Serialization
//!
//! An [`ObservationLog`] is the JSON document exchanged with the CLI:
//!
//! ```json
//! {
//!   "generated_at": "2026-10-19T12:00:00Z",
//!   "observations": [
//!     { "drop_position": 300.0, "bounciness": 0.52, "size": 16.0, "bucket": 3 }
//!   ]
//! }
//! ```

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of scoring buckets at the bottom of the board.
pub const BUCKET_COUNT: usize = 10;

/// Index of the bucket a ball settled in, always in `0..BUCKET_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BucketLabel(u8);

impl BucketLabel {
    /// Creates a label, or `None` if `index` is not a valid bucket.
    #[must_use]
    pub fn new(index: u8) -> Option<Self> {
        (usize::from(index) < BUCKET_COUNT).then_some(Self(index))
    }

    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Iterates over every bucket label in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..).take(BUCKET_COUNT).map(Self)
    }
}

impl fmt::Display for BucketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u8> for BucketLabel {
    type Error = InvalidBucketLabel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidBucketLabel(value))
    }
}

impl From<BucketLabel> for u8 {
    fn from(label: BucketLabel) -> Self {
        label.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("bucket label {_0} is out of range (expected 0..=9)")]
pub struct InvalidBucketLabel(#[error(not(source))] pub u8);

/// One recorded outcome of a single ball's drop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Horizontal pixel coordinate the ball was released from
    pub drop_position: f64,
    /// Restitution coefficient in `[0, 1]`
    pub bounciness: f64,
    /// Ball radius in pixels
    pub size: f64,
    /// Bucket the ball settled in
    pub bucket: BucketLabel,
}

impl Observation {
    #[must_use]
    pub fn new(drop_position: f64, bounciness: f64, size: f64, bucket: BucketLabel) -> Self {
        Self {
            drop_position,
            bounciness,
            size,
            bucket,
        }
    }
}

/// Receiver of settled-ball observations.
pub trait ObservationSink {
    fn on_observation(&mut self, observation: Observation);
}

impl ObservationSink for Vec<Observation> {
    fn on_observation(&mut self, observation: Observation) {
        self.push(observation);
    }
}

/// Append-only, ordered collection of observations for one session.
///
/// Order is arrival order. Consumers treat the contents as an unordered set;
/// the order only matters when reproducing a run.
#[derive(Debug, Clone, Default)]
pub struct ObservationStore {
    observations: Vec<Observation>,
}

impl ObservationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    #[must_use]
    pub fn all(&self) -> &[Observation] {
        &self.observations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Clears every recorded observation.
    pub fn reset(&mut self) {
        self.observations.clear();
    }
}

impl ObservationSink for ObservationStore {
    fn on_observation(&mut self, observation: Observation) {
        self.record(observation);
    }
}

impl From<Vec<Observation>> for ObservationStore {
    fn from(observations: Vec<Observation>) -> Self {
        Self { observations }
    }
}

impl Extend<Observation> for ObservationStore {
    fn extend<T: IntoIterator<Item = Observation>>(&mut self, iter: T) {
        self.observations.extend(iter);
    }
}

/// An [`ObservationStore`] that can be fed by several producers at once.
///
/// Clones share the same underlying store. Appends are serialized by a mutex,
/// so each producer's observations keep their relative order.
#[derive(Debug, Clone, Default)]
pub struct SharedObservationStore {
    inner: Arc<Mutex<ObservationStore>>,
}

impl SharedObservationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, observation: Observation) {
        self.lock().record(observation);
    }

    /// Copies the current contents out of the store.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Observation> {
        self.lock().all().to_vec()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    // A panicking producer cannot leave a half-appended Vec behind, so a
    // poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, ObservationStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ObservationSink for SharedObservationStore {
    fn on_observation(&mut self, observation: Observation) {
        self.record(observation);
    }
}

/// Serialized form of a recorded session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationLog {
    /// When the observations were written out
    pub generated_at: DateTime<Utc>,
    /// Observations in arrival order
    pub observations: Vec<Observation>,
}

impl ObservationLog {
    /// Captures the current contents of `store`, stamped with the current time.
    #[must_use]
    pub fn from_store(store: &ObservationStore) -> Self {
        Self {
            generated_at: Utc::now(),
            observations: store.all().to_vec(),
        }
    }

    #[must_use]
    pub fn into_store(self) -> ObservationStore {
        ObservationStore::from(self.observations)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn obs(position: f64, bucket: u8) -> Observation {
        Observation::new(position, 0.5, 16.0, BucketLabel::new(bucket).unwrap())
    }

    mod bucket_label {
        use super::*;

        #[test]
        fn test_range() {
            assert!(BucketLabel::new(0).is_some());
            assert!(BucketLabel::new(9).is_some());
            assert!(BucketLabel::new(10).is_none());
            assert_eq!(BucketLabel::all().count(), BUCKET_COUNT);
        }

        #[test]
        fn test_deserialize_rejects_out_of_range() {
            let label: BucketLabel = serde_json::from_str("4").unwrap();
            assert_eq!(label.index(), 4);

            let result: Result<BucketLabel, _> = serde_json::from_str("12");
            let err_msg = result.unwrap_err().to_string();
            assert!(err_msg.contains("out of range"));
        }
    }

    mod store {
        use super::*;

        #[test]
        fn test_record_keeps_arrival_order() {
            let mut store = ObservationStore::new();
            store.record(obs(300.0, 3));
            store.record(obs(100.0, 1));
            store.on_observation(obs(700.0, 8));

            let positions = store
                .all()
                .iter()
                .map(|o| o.drop_position)
                .collect::<Vec<_>>();
            assert_eq!(positions, [300.0, 100.0, 700.0]);
        }

        #[test]
        fn test_no_deduplication() {
            let mut store = ObservationStore::new();
            store.record(obs(300.0, 3));
            store.record(obs(300.0, 3));
            assert_eq!(store.len(), 2);
        }

        #[test]
        fn test_reset_clears() {
            let mut store = ObservationStore::from(vec![obs(1.0, 0), obs(2.0, 0)]);
            store.reset();
            assert!(store.is_empty());
        }

        #[test]
        fn test_log_roundtrip_preserves_order() {
            let store = ObservationStore::from(vec![obs(10.0, 0), obs(790.0, 9)]);
            let log = ObservationLog::from_store(&store);
            let json = serde_json::to_string(&log).unwrap();
            let restored = serde_json::from_str::<ObservationLog>(&json)
                .unwrap()
                .into_store();
            assert_eq!(restored.all(), store.all());
        }
    }

    mod shared_store {
        use super::*;

        #[test]
        fn test_concurrent_producers_keep_their_own_order() {
            let store = SharedObservationStore::new();
            let handles = (0..4u8)
                .map(|producer| {
                    let mut sink = store.clone();
                    thread::spawn(move || {
                        for i in 0..100 {
                            sink.on_observation(obs(f64::from(i), producer));
                        }
                    })
                })
                .collect::<Vec<_>>();
            for handle in handles {
                handle.join().unwrap();
            }

            let snapshot = store.snapshot();
            assert_eq!(snapshot.len(), 400);
            for producer in 0..4u8 {
                let positions = snapshot
                    .iter()
                    .filter(|o| o.bucket.index() == usize::from(producer))
                    .map(|o| o.drop_position)
                    .collect::<Vec<_>>();
                let expected = (0..100).map(f64::from).collect::<Vec<_>>();
                assert_eq!(positions, expected);
            }
        }
    }
}
