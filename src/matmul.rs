//! Matrix multiplication (C = A x B) algorithms.
//!
//! Operands are row-major [`Matrix<f32>`] values of any conformable shape:
//! `A` is `m x k`, `B` is `k x n`, and the product is `m x n`.
//!
//! # Strategies
//!
//! | Function | Strategy | Best For |
//! |----------|----------|----------|
//! | [`matmul_naive`] | Naive i-j-k loops | Tiny matrices, clarity |
//! | [`matmul_transposed`] | Transpose B for contiguous access | Moderate sizes |
//! | [`matmul_ikj`] | Loop reordering (i-k-j) | Better cache reuse |
//! | [`matmul_blocked`] | Square tiles of [`BLOCK_SIZE`] | Larger matrices |
//!
//! # Cache blocking
//!
//! The blocked variant walks the i, j and k dimensions in tiles so that one tile
//! each of A, B and C stays resident while it is reused. With `BLOCK_SIZE = 16`
//! the three `f32` tiles take 3 KB, well inside any L1. Edge tiles are clipped,
//! so dimensions need not be multiples of the tile size.
//!
//! # References
//!
//! - [Matrix multiplication chapter](https://en.algorithmica.org/hpc/algorithms/matmul/)

use crate::error::{AlgoError, Result};
use crate::matrix::Matrix;

/// Tile side used by [`matmul_blocked`].
pub const BLOCK_SIZE: usize = 16;

/// Validates conformability and returns `(m, k, n)`.
#[inline]
fn check_dims(a: &Matrix<f32>, b: &Matrix<f32>) -> Result<(usize, usize, usize)> {
    if a.cols() != b.rows() {
        return Err(AlgoError::DimensionMismatch {
            left: a.shape(),
            right: b.shape(),
        });
    }
    Ok((a.rows(), a.cols(), b.cols()))
}

/// Naive multiplication (i-j-k order).
pub fn matmul_naive(a: &Matrix<f32>, b: &Matrix<f32>) -> Result<Matrix<f32>> {
    let (m, k, n) = check_dims(a, b)?;
    let (a, b) = (a.as_slice(), b.as_slice());
    let mut c = vec![0.0f32; m * n];
    for i in 0..m {
        let a_row = i * k;
        for j in 0..n {
            let mut sum = 0.0f32;
            for p in 0..k {
                sum += a[a_row + p] * b[p * n + j];
            }
            c[i * n + j] = sum;
        }
    }
    Matrix::from_vec(m, n, c)
}

/// Multiply with B transposed to make the inner loop contiguous.
pub fn matmul_transposed(a: &Matrix<f32>, b: &Matrix<f32>) -> Result<Matrix<f32>> {
    let (m, k, n) = check_dims(a, b)?;
    let b_t = b.transpose();
    let (a, b_t) = (a.as_slice(), b_t.as_slice());
    let mut c = vec![0.0f32; m * n];
    for i in 0..m {
        let a_row = &a[i * k..(i + 1) * k];
        for j in 0..n {
            let b_col = &b_t[j * k..(j + 1) * k];
            c[i * n + j] = a_row.iter().zip(b_col).map(|(x, y)| x * y).sum();
        }
    }
    Matrix::from_vec(m, n, c)
}

/// Loop-reordered multiplication (i-k-j order) for better cache locality.
pub fn matmul_ikj(a: &Matrix<f32>, b: &Matrix<f32>) -> Result<Matrix<f32>> {
    let (m, k, n) = check_dims(a, b)?;
    let (a, b) = (a.as_slice(), b.as_slice());
    let mut c = vec![0.0f32; m * n];
    for i in 0..m {
        let c_row = &mut c[i * n..(i + 1) * n];
        for p in 0..k {
            let a_ip = a[i * k + p];
            let b_row = &b[p * n..(p + 1) * n];
            for (out, &b_pj) in c_row.iter_mut().zip(b_row) {
                *out += a_ip * b_pj;
            }
        }
    }
    Matrix::from_vec(m, n, c)
}

/// Cache-blocked multiplication with [`BLOCK_SIZE`] tiles.
pub fn matmul_blocked(a: &Matrix<f32>, b: &Matrix<f32>) -> Result<Matrix<f32>> {
    matmul_blocked_with(a, b, BLOCK_SIZE)
}

/// Cache-blocked multiplication with an explicit tile side.
pub fn matmul_blocked_with(a: &Matrix<f32>, b: &Matrix<f32>, block: usize) -> Result<Matrix<f32>> {
    let (m, k, n) = check_dims(a, b)?;
    if block == 0 {
        return Err(AlgoError::InvalidConfig(
            "matmul tile size must be non-zero".to_string(),
        ));
    }
    let (a, b) = (a.as_slice(), b.as_slice());
    let mut c = vec![0.0f32; m * n];

    for ii in (0..m).step_by(block) {
        let i_max = (ii + block).min(m);
        for jj in (0..n).step_by(block) {
            let j_max = (jj + block).min(n);
            for pp in (0..k).step_by(block) {
                let p_max = (pp + block).min(k);
                for i in ii..i_max {
                    let c_row = &mut c[i * n + jj..i * n + j_max];
                    for p in pp..p_max {
                        let a_ip = a[i * k + p];
                        let b_row = &b[p * n + jj..p * n + j_max];
                        for (out, &b_pj) in c_row.iter_mut().zip(b_row) {
                            *out += a_ip * b_pj;
                        }
                    }
                }
            }
        }
    }

    Matrix::from_vec(m, n, c)
}
