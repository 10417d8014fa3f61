//! Randomized partition of a dataset into test and training sets.
//!
//! [`split`] shuffles a copy of the data with a uniform Fisher–Yates shuffle
//! and cuts it after `test_count` elements. [`SplitIndices`] draws the same
//! kind of permutation over indices only, so one split can be reused across
//! several derived datasets of the same length (e.g. every step of a k-sweep).

use rand::{Rng, seq::SliceRandom as _};

use crate::error::KnnError;

/// Disjoint test and training sets covering the original data once.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSplit<T> {
    pub test: Vec<T>,
    pub training: Vec<T>,
}

/// Shuffles `data` and returns the first `test_count` elements as the test set.
///
/// Fails with [`KnnError::InvalidSplitSize`] if `test_count > data.len()`.
pub fn split<T, R>(data: &[T], test_count: usize, rng: &mut R) -> Result<DatasetSplit<T>, KnnError>
where
    T: Clone,
    R: Rng + ?Sized,
{
    check_split_size(test_count, data.len())?;
    let mut shuffled = data.to_vec();
    shuffled.shuffle(rng);
    let training = shuffled.split_off(test_count);
    Ok(DatasetSplit {
        test: shuffled,
        training,
    })
}

/// A pinned split expressed as positions into a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    len: usize,
    test: Vec<usize>,
    training: Vec<usize>,
}

impl SplitIndices {
    /// Draws a random permutation of `0..len` and cuts it after `test_count`.
    pub fn shuffled<R>(len: usize, test_count: usize, rng: &mut R) -> Result<Self, KnnError>
    where
        R: Rng + ?Sized,
    {
        check_split_size(test_count, len)?;
        let mut order = (0..len).collect::<Vec<_>>();
        order.shuffle(rng);
        let training = order.split_off(test_count);
        Ok(Self {
            len,
            test: order,
            training,
        })
    }

    #[must_use]
    pub fn test(&self) -> &[usize] {
        &self.test
    }

    #[must_use]
    pub fn training(&self) -> &[usize] {
        &self.training
    }

    /// Materializes the split over `data`.
    ///
    /// Fails with [`KnnError::InvalidSplitSize`] if `data` is not the length
    /// the indices were drawn for.
    pub fn apply<T>(&self, data: &[T]) -> Result<DatasetSplit<T>, KnnError>
    where
        T: Clone,
    {
        if data.len() != self.len {
            return Err(KnnError::InvalidSplitSize {
                requested: self.test.len(),
                available: data.len(),
            });
        }
        let pick = |indices: &[usize]| indices.iter().map(|&i| data[i].clone()).collect();
        Ok(DatasetSplit {
            test: pick(&self.test),
            training: pick(&self.training),
        })
    }
}

fn check_split_size(test_count: usize, available: usize) -> Result<(), KnnError> {
    if test_count > available {
        return Err(KnnError::InvalidSplitSize {
            requested: test_count,
            available,
        });
    }
    Ok(())
}
