//! Full 2D convolution and cross-correlation of two kernels.
//!
//! Both functions return the "full" result: for an `ra x ca` kernel and an
//! `rb x cb` kernel the output is `(ra + rb - 1) x (ca + cb - 1)`, i.e. every
//! placement where the kernels overlap by at least one cell. Cells outside the
//! first kernel are treated as zero.
//!
//! [`convolve2d`] flips the second kernel (true convolution, commutative);
//! [`correlate2d`] does not. They agree for kernels that are symmetric under a
//! 180 degree rotation, such as the constant kernels used to compose box
//! filters.

use crate::error::{AlgoError, Result};
use crate::matrix::Matrix;

/// Full 2D convolution `a * b`.
pub fn convolve2d(a: &Matrix<f64>, b: &Matrix<f64>) -> Result<Matrix<f64>> {
    let (out_rows, out_cols) = full_shape(a, b)?;
    let mut out = Matrix::zeros(out_rows, out_cols);
    for p in 0..a.rows() {
        for q in 0..a.cols() {
            let a_pq = a[(p, q)];
            for s in 0..b.rows() {
                let b_row = b.row(s);
                let out_row = out.row_mut(p + s);
                for (t, &b_st) in b_row.iter().enumerate() {
                    out_row[q + t] += a_pq * b_st;
                }
            }
        }
    }
    Ok(out)
}

/// Full 2D cross-correlation of `a` with `b` (no flip).
///
/// `out[i][j] = sum_{s,t} pad(a)[i + s][j + t] * b[s][t]`, where `pad(a)` is `a`
/// surrounded by `rb - 1` zero rows and `cb - 1` zero columns on every side.
pub fn correlate2d(a: &Matrix<f64>, b: &Matrix<f64>) -> Result<Matrix<f64>> {
    let (out_rows, out_cols) = full_shape(a, b)?;
    let (rb, cb) = b.shape();
    let mut out = Matrix::zeros(out_rows, out_cols);
    for p in 0..a.rows() {
        for q in 0..a.cols() {
            let a_pq = a[(p, q)];
            for s in 0..rb {
                let b_row = b.row(s);
                let out_row = out.row_mut(p + rb - 1 - s);
                for (t, &b_st) in b_row.iter().enumerate() {
                    out_row[q + cb - 1 - t] += a_pq * b_st;
                }
            }
        }
    }
    Ok(out)
}

fn full_shape(a: &Matrix<f64>, b: &Matrix<f64>) -> Result<(usize, usize)> {
    if a.is_empty() || b.is_empty() {
        return Err(AlgoError::InvalidConfig(format!(
            "cannot convolve empty kernels ({}x{} and {}x{})",
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    Ok((a.rows() + b.rows() - 1, a.cols() + b.cols() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn rotate_180(m: &Matrix<f64>) -> Matrix<f64> {
        let (r, c) = m.shape();
        Matrix::from_fn(r, c, |i, j| m[(r - 1 - i, c - 1 - j)])
    }

    fn kernel(rows: usize, cols: usize, salt: usize) -> Matrix<f64> {
        Matrix::from_fn(rows, cols, |r, c| ((r * 5 + c * 3 + salt) % 11) as f64 - 5.0)
    }

    #[test]
    fn box_kernels_compose_to_pyramid() {
        let ones = Matrix::filled(3, 3, 1.0);
        let twos = Matrix::filled(3, 3, 2.0);
        let out = convolve2d(&ones, &twos).unwrap();
        assert_eq!(out.shape(), (5, 5));
        let overlap = [1.0, 2.0, 3.0, 2.0, 1.0];
        for i in 0..5 {
            for j in 0..5 {
                assert_relative_eq!(out[(i, j)], 2.0 * overlap[i] * overlap[j]);
            }
        }
        assert_eq!(correlate2d(&ones, &twos).unwrap(), out);
    }

    #[test]
    fn delta_is_identity() {
        let a = kernel(3, 4, 1);
        let delta = Matrix::filled(1, 1, 1.0);
        assert_eq!(convolve2d(&a, &delta).unwrap(), a);
        assert_eq!(convolve2d(&delta, &a).unwrap(), a);
        assert_eq!(correlate2d(&a, &delta).unwrap(), a);
    }

    #[test]
    fn empty_kernel_rejected() {
        let a = kernel(2, 2, 0);
        let empty: Matrix<f64> = Matrix::zeros(0, 3);
        assert!(matches!(convolve2d(&a, &empty), Err(AlgoError::InvalidConfig(_))));
        assert!(matches!(correlate2d(&empty, &a), Err(AlgoError::InvalidConfig(_))));
    }

    proptest! {
        #[test]
        fn convolution_properties(
            (ra, ca, rb, cb) in (1usize..6, 1usize..6, 1usize..6, 1usize..6),
            salt in 0usize..11,
        ) {
            let a = kernel(ra, ca, salt);
            let b = kernel(rb, cb, salt + 4);

            let ab = convolve2d(&a, &b).unwrap();
            let ba = convolve2d(&b, &a).unwrap();
            prop_assert_eq!(ab.shape(), (ra + rb - 1, ca + cb - 1));
            prop_assert_eq!(&ab, &ba);

            let sum = |m: &Matrix<f64>| m.as_slice().iter().sum::<f64>();
            prop_assert!((sum(&ab) - sum(&a) * sum(&b)).abs() < 1e-9);

            let corr = correlate2d(&a, &b).unwrap();
            prop_assert_eq!(corr, convolve2d(&a, &rotate_180(&b)).unwrap());
        }
    }
}
