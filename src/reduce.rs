//! Max and mean pooling over square windows.
//!
//! A reduction slides a `w x w` window over a matrix and collapses each window
//! to one value. Two window placements are supported:
//!
//! | [`Stride`] | Output shape | Requirement |
//! |------------|--------------|-------------|
//! | `Tiled` | `(rows / w) x (cols / w)` | `w` divides both dimensions |
//! | `Sliding` | `(rows - w + 1) x (cols - w + 1)` | `w <= rows` and `w <= cols` |
//!
//! [`reduce`] runs on the calling thread. [`reduce_threaded`] splits the output
//! rows across a [`WorkerPool`]; each worker owns a disjoint band of the output,
//! so both paths compute bit-identical results.
//!
//! Mean pooling divides by the window area `w * w`. Max pooling seeds each
//! window with its first element, so inputs that are entirely negative reduce
//! correctly. NaN cells are skipped unless the whole window is NaN, in which
//! case the result is NaN.

use std::ops::Range;

use crate::error::{AlgoError, Result};
use crate::matrix::Matrix;
use crate::workers::WorkerPool;

/// How each window is collapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reduction {
    Max,
    Mean,
}

/// How windows are placed over the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stride {
    /// Non-overlapping windows, step `w`.
    Tiled,
    /// Overlapping windows, step 1.
    Sliding,
}

/// Serial reduction.
pub fn reduce(
    input: &Matrix<f64>,
    window: usize,
    reduction: Reduction,
    stride: Stride,
) -> Result<Matrix<f64>> {
    let (out_rows, out_cols) = output_shape(input, window, stride)?;
    let mut out = vec![0.0f64; out_rows * out_cols];
    reduce_rows(input, window, reduction, stride, 0..out_rows, out_cols, &mut out);
    Matrix::from_vec(out_rows, out_cols, out)
}

/// Reduction with output rows partitioned across `pool`.
pub fn reduce_threaded(
    input: &Matrix<f64>,
    window: usize,
    reduction: Reduction,
    stride: Stride,
    pool: &WorkerPool,
) -> Result<Matrix<f64>> {
    let (out_rows, out_cols) = output_shape(input, window, stride)?;
    let mut out = vec![0.0f64; out_rows * out_cols];
    if out_cols > 0 {
        pool.for_each_band(&mut out, out_cols, |rows, band| {
            reduce_rows(input, window, reduction, stride, rows, out_cols, band);
        });
    }
    Matrix::from_vec(out_rows, out_cols, out)
}

/// Tiled max pooling.
pub fn reduce_max(input: &Matrix<f64>, window: usize) -> Result<Matrix<f64>> {
    reduce(input, window, Reduction::Max, Stride::Tiled)
}

/// Tiled mean pooling.
pub fn reduce_mean(input: &Matrix<f64>, window: usize) -> Result<Matrix<f64>> {
    reduce(input, window, Reduction::Mean, Stride::Tiled)
}

/// Sliding-window max pooling.
pub fn reduce_max_sliding(input: &Matrix<f64>, window: usize) -> Result<Matrix<f64>> {
    reduce(input, window, Reduction::Max, Stride::Sliding)
}

/// Sliding-window mean pooling.
pub fn reduce_mean_sliding(input: &Matrix<f64>, window: usize) -> Result<Matrix<f64>> {
    reduce(input, window, Reduction::Mean, Stride::Sliding)
}

fn output_shape(input: &Matrix<f64>, window: usize, stride: Stride) -> Result<(usize, usize)> {
    let (rows, cols) = input.shape();
    let invalid = AlgoError::InvalidWindow { window, rows, cols };
    if window == 0 {
        return Err(invalid);
    }
    match stride {
        Stride::Tiled => {
            if rows % window != 0 || cols % window != 0 {
                return Err(invalid);
            }
            Ok((rows / window, cols / window))
        }
        Stride::Sliding => {
            if window > rows || window > cols {
                return Err(invalid);
            }
            Ok((rows - window + 1, cols - window + 1))
        }
    }
}

/// Fills `band` with output rows `rows`. `band` holds exactly those rows.
fn reduce_rows(
    input: &Matrix<f64>,
    window: usize,
    reduction: Reduction,
    stride: Stride,
    rows: Range<usize>,
    out_cols: usize,
    band: &mut [f64],
) {
    debug_assert_eq!(band.len(), rows.len() * out_cols);
    let step = match stride {
        Stride::Tiled => window,
        Stride::Sliding => 1,
    };
    let area = (window * window) as f64;

    for (out_row, out) in rows.zip(band.chunks_mut(out_cols)) {
        let r0 = out_row * step;
        for (out_col, slot) in out.iter_mut().enumerate() {
            let c0 = out_col * step;
            let cells = (r0..r0 + window)
                .flat_map(move |r| input.row(r)[c0..c0 + window].iter().copied());
            *slot = match reduction {
                // `window > 0`, so every window has a first cell.
                Reduction::Max => cells.reduce(f64::max).unwrap_or(f64::NAN),
                Reduction::Mean => cells.sum::<f64>() / area,
            };
        }
    }
}
