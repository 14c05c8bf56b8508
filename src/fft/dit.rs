//! Decimation-in-time kernels.
//!
//! DIT reorders the input first (evens then odds, or the four residues mod 4),
//! transforms each part recursively, then combines them with twiddled
//! butterflies. The reorder happens at every level, which is what produces the
//! bit-reversal permutation overall.

use super::{Complex64, check_power_of_four, check_power_of_two, twiddle};
use crate::error::Result;

/// In-place radix-2 DIT FFT. `data.len()` must be a power of two.
pub fn fft_dit_radix2(data: &mut [Complex64]) -> Result<()> {
    check_power_of_two(data.len())?;
    dit_radix2(data);
    Ok(())
}

/// In-place radix-4 DIT FFT. `data.len()` must be a power of four.
pub fn fft_dit_radix4(data: &mut [Complex64]) -> Result<()> {
    check_power_of_four(data.len())?;
    dit_radix4(data);
    Ok(())
}

fn dit_radix2(data: &mut [Complex64]) {
    let n = data.len();
    if n < 2 {
        return;
    }
    let half = n / 2;

    // Separate: evens to the front half, odds to the back half.
    let odds: Vec<Complex64> = data.iter().skip(1).step_by(2).copied().collect();
    for i in 0..half {
        data[i] = data[2 * i];
    }
    data[half..].copy_from_slice(&odds);

    let (even, odd) = data.split_at_mut(half);
    dit_radix2(even);
    dit_radix2(odd);

    for k in 0..half {
        let e = even[k];
        let t = twiddle(k, n) * odd[k];
        even[k] = e + t;
        odd[k] = e - t;
    }
}

fn dit_radix4(data: &mut [Complex64]) {
    let n = data.len();
    if n < 4 {
        return;
    }
    let q = n / 4;

    // Separate by residue mod 4 into four contiguous quarters.
    let src = data.to_vec();
    for (r, quarter) in data.chunks_exact_mut(q).enumerate() {
        for (i, slot) in quarter.iter_mut().enumerate() {
            *slot = src[4 * i + r];
        }
    }

    for quarter in data.chunks_exact_mut(q) {
        dit_radix4(quarter);
    }

    let j = Complex64::i();
    for k in 0..q {
        let a = data[k];
        let b = data[k + q] * twiddle(k, n);
        let c = data[k + 2 * q] * twiddle(2 * k, n);
        let d = data[k + 3 * q] * twiddle(3 * k, n);

        data[k] = a + b + c + d;
        data[k + q] = (a - c) - j * (b - d);
        data[k + 2 * q] = (a + c) - (b + d);
        data[k + 3 * q] = (a - c) + j * (b - d);
    }
}
