//! Error types shared by every algorithm in the crate.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, AlgoError>;

/// Precondition failures reported by the algorithms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgoError {
    /// Inner dimensions of a matrix product do not agree.
    #[error("cannot multiply {}x{} by {}x{}", .left.0, .left.1, .right.0, .right.1)]
    DimensionMismatch {
        /// Shape of the left operand as `(rows, cols)`.
        left: (usize, usize),
        /// Shape of the right operand as `(rows, cols)`.
        right: (usize, usize),
    },

    /// A flat buffer does not hold `rows * cols` elements.
    #[error("buffer of {len} elements cannot back a {rows}x{cols} matrix")]
    ShapeMismatch {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
        /// Actual buffer length.
        len: usize,
    },

    /// Transform length is not a power of two.
    #[error("length {len} is not a power of two")]
    NotPowerOfTwo {
        /// Offending length.
        len: usize,
    },

    /// Transform length is not a power of four.
    #[error("length {len} is not a power of four")]
    NotPowerOfFour {
        /// Offending length.
        len: usize,
    },

    /// Input length differs from the length an FFT plan was built for.
    #[error("plan expects {expected} points, got {actual}")]
    PlanLengthMismatch {
        /// Planned length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// Pooling window does not fit the input dimensions.
    #[error("window {window} does not fit a {rows}x{cols} input")]
    InvalidWindow {
        /// Window side length.
        window: usize,
        /// Input rows.
        rows: usize,
        /// Input columns.
        cols: usize,
    },

    /// A worker pool needs at least one worker.
    #[error("worker pool needs at least one worker")]
    ZeroWorkers,

    /// A ring buffer needs room for at least one element.
    #[error("ring buffer capacity must be non-zero")]
    ZeroCapacity,

    /// Quad-tree partitioning needs a square grid.
    #[error("grid must be square, got {rows}x{cols}")]
    NonSquareGrid {
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        cols: usize,
    },

    /// Grid side cannot be halved `depth` times into equal leaves.
    #[error("grid of side {size} cannot be split evenly to depth {depth}")]
    UnevenPartition {
        /// Grid side length.
        size: usize,
        /// Requested tree depth.
        depth: u32,
    },

    /// Rotation axis has zero length.
    #[error("rotation axis has zero length")]
    ZeroAxis,

    /// A binomial coefficient no longer fits in `u64`.
    #[error("binomial coefficient overflows u64 at row {row}")]
    Overflow {
        /// First row that overflowed.
        row: usize,
    },

    /// A configuration value is outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
