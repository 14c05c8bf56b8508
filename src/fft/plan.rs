//! Radix-4 DIF transform with a precomputed twiddle table.

use log::debug;

use super::{Complex64, check_power_of_four, twiddle};
use crate::error::{AlgoError, Result};

/// Reusable radix-4 DIF transform for one fixed length.
///
/// The plan stores `w_N^t = exp(-2*pi*i*t / N)` for `t < N`. A sub-transform of
/// length `m` at recursion depth `d` needs `w_m^{rk}`, which is the table entry
/// `r * k * 4^d` because `N / m = 4^d`. One table therefore serves every level.
///
/// The first butterfly output always has twiddle 1, so it is never multiplied.
/// Intermediate results ping-pong between the caller's buffer and a single
/// scratch buffer owned by the plan.
#[derive(Clone, Debug)]
pub struct Radix4Plan {
    len: usize,
    twiddles: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl Radix4Plan {
    /// Builds a plan for `len` points. `len` must be a power of four.
    pub fn new(len: usize) -> Result<Self> {
        check_power_of_four(len)?;
        // Largest index used is 3 * (len/4 - 1) < 3 * len / 4.
        let table_len = (3 * len / 4).max(1);
        let twiddles = (0..table_len).map(|t| twiddle(t, len)).collect();
        debug!("radix-4 plan: len={len} twiddles={table_len}");
        Ok(Self {
            len,
            twiddles,
            scratch: vec![Complex64::new(0.0, 0.0); len],
        })
    }

    /// Number of points this plan transforms.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: a plan covers at least one point.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Transforms `data` in place.
    pub fn process(&mut self, data: &mut [Complex64]) -> Result<()> {
        if data.len() != self.len {
            return Err(AlgoError::PlanLengthMismatch {
                expected: self.len,
                actual: data.len(),
            });
        }
        dif_radix4_lut(data, &mut self.scratch, &self.twiddles, 1);
        Ok(())
    }
}

/// `data` holds the input and receives the output; `scratch` has the same
/// length and its contents are clobbered. `stride = N / data.len()`.
fn dif_radix4_lut(
    data: &mut [Complex64],
    scratch: &mut [Complex64],
    twiddles: &[Complex64],
    stride: usize,
) {
    let n = data.len();
    if n < 4 {
        return;
    }
    let q = n / 4;
    let j = Complex64::i();

    {
        let (s0, rest) = scratch.split_at_mut(q);
        let (s1, rest) = rest.split_at_mut(q);
        let (s2, s3) = rest.split_at_mut(q);
        for k in 0..q {
            let (a, b, c, d) = (data[k], data[k + q], data[k + 2 * q], data[k + 3 * q]);
            let a_plus_c = a + c;
            let a_minus_c = a - c;
            let b_plus_d = b + d;
            let j_b_minus_d = j * (b - d);

            s0[k] = a_plus_c + b_plus_d;
            if k == 0 {
                s1[0] = a_minus_c - j_b_minus_d;
                s2[0] = a_plus_c - b_plus_d;
                s3[0] = a_minus_c + j_b_minus_d;
            } else {
                let t = k * stride;
                s1[k] = (a_minus_c - j_b_minus_d) * twiddles[t];
                s2[k] = (a_plus_c - b_plus_d) * twiddles[2 * t];
                s3[k] = (a_minus_c + j_b_minus_d) * twiddles[3 * t];
            }
        }
    }

    // The butterflies consumed `data`, so its quarters become the children's scratch.
    for (part, spare) in scratch.chunks_exact_mut(q).zip(data.chunks_exact_mut(q)) {
        dif_radix4_lut(part, spare, twiddles, stride * 4);
    }

    for (k, quad) in data.chunks_exact_mut(4).enumerate() {
        for (r, slot) in quad.iter_mut().enumerate() {
            *slot = scratch[r * q + k];
        }
    }
}
