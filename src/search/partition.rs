//! Splitting the search space into per-worker index ranges

use std::fmt;

/// Half-open index range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexRange {
    pub start: u64,
    pub end: u64,
}

impl IndexRange {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "range start {} past end {}", start, end);
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// The slice of the search space owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerAssignment {
    pub worker_id: usize,
    pub range: IndexRange,
}

/// Split `[0, total)` into `worker_count` contiguous ranges.
///
/// The first `total % worker_count` ranges hold one extra index, so sizes
/// never differ by more than one. When there are more workers than
/// candidates the trailing ranges are empty.
pub fn partition(total: u64, worker_count: usize) -> Vec<IndexRange> {
    if worker_count == 0 {
        return Vec::new();
    }
    let workers = worker_count as u64;
    let base = total / workers;
    let remainder = total % workers;

    let mut ranges = Vec::with_capacity(worker_count);
    let mut start = 0u64;
    for i in 0..workers {
        let size = if i < remainder { base + 1 } else { base };
        ranges.push(IndexRange::new(start, start + size));
        start += size;
    }
    ranges
}

/// Pair every range from [`partition`] with its worker id.
pub fn assign(total: u64, worker_count: usize) -> Vec<WorkerAssignment> {
    partition(total, worker_count)
        .into_iter()
        .enumerate()
        .map(|(worker_id, range)| WorkerAssignment { worker_id, range })
        .collect()
}
