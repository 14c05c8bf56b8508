//! Fork-join worker pool over row-partitioned output buffers.
//!
//! Work is split by output rows: [`WorkerPool::partition`] produces contiguous,
//! disjoint row ranges, and [`WorkerPool::for_each_band`] hands each worker an
//! exclusive `&mut` band of the output carved out with `split_at_mut`. Workers
//! never share writable memory, so no locking is involved. The call returns
//! once every worker has joined.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::thread;

use log::{debug, trace};

use crate::error::{AlgoError, Result};

/// Fixed-size pool of scoped worker threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerPool {
    workers: NonZeroUsize,
}

impl WorkerPool {
    /// Creates a pool with `workers` threads. Zero workers is an error.
    pub fn new(workers: usize) -> Result<Self> {
        NonZeroUsize::new(workers)
            .map(|workers| Self { workers })
            .ok_or(AlgoError::ZeroWorkers)
    }

    /// One worker per available hardware thread.
    pub fn available() -> Self {
        let workers = thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
        Self { workers }
    }

    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Splits `0..rows` into at most `workers` contiguous ranges.
    ///
    /// Range lengths differ by at most one and empty ranges are omitted, so the
    /// result covers every row exactly once even when `rows` is not a multiple
    /// of the worker count.
    pub fn partition(&self, rows: usize) -> Vec<Range<usize>> {
        let parts = self.workers().min(rows);
        if parts == 0 {
            return Vec::new();
        }
        let base = rows / parts;
        let extra = rows % parts;
        let mut ranges = Vec::with_capacity(parts);
        let mut start = 0;
        for i in 0..parts {
            let len = base + usize::from(i < extra);
            ranges.push(start..start + len);
            start += len;
        }
        debug_assert_eq!(start, rows);
        ranges
    }

    /// Runs `f(rows, band)` for each partition of `out` on its own thread.
    ///
    /// `out` is viewed as `out.len() / row_len` rows of `row_len` elements;
    /// `band` is the mutable slice holding exactly the rows in `rows`.
    ///
    /// # Panics
    ///
    /// Panics if `row_len` is zero while `out` is non-empty, if `out.len()` is
    /// not a multiple of `row_len`, or if a worker panics.
    pub fn for_each_band<T, F>(&self, out: &mut [T], row_len: usize, f: F)
    where
        T: Send,
        F: Fn(Range<usize>, &mut [T]) + Sync,
    {
        if out.is_empty() {
            return;
        }
        assert!(row_len > 0, "row length must be non-zero");
        assert_eq!(out.len() % row_len, 0, "buffer is not a whole number of rows");

        let rows = out.len() / row_len;
        let ranges = self.partition(rows);
        debug!(
            "dispatching {} rows across {} workers",
            rows,
            ranges.len()
        );

        let f = &f;
        thread::scope(|s| {
            let mut remaining = out;
            for range in ranges {
                let take = range.len() * row_len;
                let (band, rest) = remaining.split_at_mut(take);
                remaining = rest;
                assert_eq!(band.len(), range.len() * row_len);
                trace!("worker band rows {}..{}", range.start, range.end);
                s.spawn(move || f(range, band));
            }
            assert!(remaining.is_empty(), "partition left rows unassigned");
        });
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_workers_rejected() {
        assert_eq!(WorkerPool::new(0), Err(AlgoError::ZeroWorkers));
        assert_eq!(WorkerPool::new(3).unwrap().workers(), 3);
    }

    #[test]
    fn partition_spreads_remainder() {
        let pool = WorkerPool::new(4).unwrap();
        assert_eq!(pool.partition(10), vec![0..3, 3..6, 6..8, 8..10]);
        assert_eq!(pool.partition(2), vec![0..1, 1..2]);
        assert!(pool.partition(0).is_empty());
    }

    #[test]
    fn bands_cover_output_once() {
        let pool = WorkerPool::new(3).unwrap();
        let row_len = 5;
        let mut out = vec![0usize; 7 * row_len];
        pool.for_each_band(&mut out, row_len, |rows, band| {
            for (offset, row) in rows.clone().zip(band.chunks_mut(row_len)) {
                for v in row {
                    *v += offset + 1;
                }
            }
        });
        for (row, chunk) in out.chunks(row_len).enumerate() {
            assert!(chunk.iter().all(|&v| v == row + 1), "row {row}: {chunk:?}");
        }
    }

    proptest! {
        #[test]
        fn partition_is_disjoint_and_complete(workers in 1usize..32, rows in 0usize..500) {
            let pool = WorkerPool::new(workers).unwrap();
            let ranges = pool.partition(rows);
            prop_assert!(ranges.len() <= workers);
            let mut next = 0;
            for r in &ranges {
                prop_assert_eq!(r.start, next);
                prop_assert!(!r.is_empty());
                next = r.end;
            }
            prop_assert_eq!(next, rows);
            if let (Some(min), Some(max)) = (
                ranges.iter().map(|r| r.len()).min(),
                ranges.iter().map(|r| r.len()).max(),
            ) {
                prop_assert!(max - min <= 1);
            }
        }
    }
}
