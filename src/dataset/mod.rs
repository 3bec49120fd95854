//! Dataset Module
//!
//! Index-based access to (signal, label) pairs:
//! - The `Dataset` trait and its iterator
//! - The TUT-SED 2017 adapter
//! - Signal transforms applied on fetch
//! - The opt-in validation pass

pub mod adapter;
pub mod transform;
pub mod validation;

use std::sync::Arc;

use crate::error::Result;

pub use adapter::{SoundEventItem, TutSedDataset, TutSedDatasetBuilder};
pub use transform::{SignalTransform, ToMono};
pub use validation::{validate_table, RowIssue, ValidationMode, ValidationReport};

/// A fixed-size collection of items fetched by ordinal index.
///
/// Implementations must be safe to read from several threads at once.
pub trait Dataset<I>: Send + Sync {
    /// Gets the item at the given index.
    fn get(&self, index: usize) -> Result<I>;

    /// Gets the number of items in the dataset.
    fn len(&self) -> usize;

    /// Checks if the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the dataset in index order.
    fn iter(&self) -> DatasetIterator<'_, I>
    where
        Self: Sized,
    {
        DatasetIterator::new(self)
    }
}

impl<D, I> Dataset<I> for Arc<D>
where
    D: Dataset<I>,
{
    fn get(&self, index: usize) -> Result<I> {
        self.as_ref().get(index)
    }

    fn len(&self) -> usize {
        self.as_ref().len()
    }
}

/// Iterates a dataset from index 0 to `len - 1`, yielding each fetch result.
pub struct DatasetIterator<'a, I> {
    current: usize,
    dataset: &'a dyn Dataset<I>,
}

impl<'a, I> DatasetIterator<'a, I> {
    /// Create an iterator starting at index 0
    pub fn new<D>(dataset: &'a D) -> Self
    where
        D: Dataset<I>,
    {
        DatasetIterator {
            current: 0,
            dataset,
        }
    }
}

impl<I> Iterator for DatasetIterator<'_, I> {
    type Item = Result<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.dataset.len() {
            return None;
        }
        let item = self.dataset.get(self.current);
        self.current += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.dataset.len().saturating_sub(self.current);
        (remaining, Some(remaining))
    }
}
