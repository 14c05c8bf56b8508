//! Reference implementations of classic numeric algorithms and data structures.
//!
//! Each module is self-contained: it documents the strategies it offers, the
//! trade-offs between them, and carries its own tests. Modules share only the
//! [`Matrix`] buffer, the [`WorkerPool`] used by threaded kernels, and the
//! crate-wide [`AlgoError`].
//!
//! # Algorithms
//!
//! - **Matrix multiply** ([`matmul_naive`], [`matmul_blocked`], etc.): loop orders and tiling
//! - **Pooling** ([`reduce()`], [`reduce_threaded`]): max/mean over tiled or sliding windows
//! - **Convolution** ([`convolve2d`], [`correlate2d`]): full 2-D convolution
//! - **FFT** ([`fft`]): radix-2 and radix-4, decimation in time and in frequency
//! - **Fixed point** ([`Fixed`], [`ProductComparison`]): Q16.16 against `f32`
//! - **Nested sampling** ([`nested_sampling`]): Bayesian evidence estimation
//! - **Pascal's triangle** ([`PascalTriangle`]): binomials in one flat buffer
//! - **Quaternions** ([`Quaternion`], [`rotate_point`]): algebra and 3-D rotation
//! - **Merge sort** ([`merge_sort`], [`merge_sort_by`]): generic top-down merge sort
//! - **Binary search tree** ([`BinarySearchTree`]): arena-backed, iterative
//! - **Quad-tree** ([`QuadTree`]): static partition of a square grid
//! - **Ring buffer** ([`RingBuffer`]): fixed capacity, overwrites oldest
//! - **Prime factors** ([`prime_factors`]): trial division
//!
//! # Logging
//!
//! Library code logs through the [`log`] facade at `debug`/`trace` level and
//! never prints. Install any logger (the `perf_harness` binary uses
//! `env_logger`) to see it.

pub mod error;
pub mod fft;
pub mod nested_sampling;

mod bst;
mod convolution;
mod fixed_point;
mod matmul;
mod matrix;
mod pascal;
mod primes;
mod quadtree;
mod quaternion;
mod reduce;
mod ring;
mod sort;
mod workers;

pub use bst::*;
pub use convolution::*;
pub use error::{AlgoError, Result};
pub use fixed_point::*;
pub use matmul::*;
pub use matrix::*;
pub use nested_sampling::{Explore, GaussianModel, Model, NestedSamplingConfig, NestedSamplingResult};
pub use pascal::*;
pub use primes::*;
pub use quadtree::*;
pub use quaternion::*;
pub use reduce::*;
pub use ring::*;
pub use sort::*;
pub use workers::*;
