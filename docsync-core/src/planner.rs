//! Splits an ordered sequence into consecutive batches no larger than the store's write cap.

use std::num::NonZeroUsize;

/// An ordered, non-overlapping slice of the source sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    /// 0-based position of this batch in the plan.
    pub index: usize,
    /// Source index of the first item in this batch.
    pub offset: usize,
    pub items: Vec<T>,
}

impl<T> Batch<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Number of batches `plan_batches` yields for `total` items: `ceil(total / max_per_batch)`.
pub fn batch_count(total: usize, max_per_batch: NonZeroUsize) -> usize {
    total.div_ceil(max_per_batch.get())
}

/// Partition `items` into `ceil(N / M)` batches of at most `max_per_batch` items each,
/// preserving source order. An empty input yields no batches.
pub fn plan_batches<T: Clone>(items: &[T], max_per_batch: NonZeroUsize) -> Vec<Batch<T>> {
    items
        .chunks(max_per_batch.get())
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            offset: index * max_per_batch.get(),
            items: chunk.to_vec(),
        })
        .collect()
}
