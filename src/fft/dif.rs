//! Decimation-in-frequency kernels.
//!
//! DIF applies the butterflies first, transforms the resulting halves (or
//! quarters) recursively, then interleaves them: the sub-transform of part `r`
//! supplies every output bin congruent to `r` modulo the radix.

use super::{Complex64, check_power_of_four, check_power_of_two, twiddle};
use crate::error::Result;

/// In-place radix-2 DIF FFT. `data.len()` must be a power of two.
pub fn fft_dif_radix2(data: &mut [Complex64]) -> Result<()> {
    check_power_of_two(data.len())?;
    dif_radix2(data);
    Ok(())
}

/// In-place radix-4 DIF FFT. `data.len()` must be a power of four.
pub fn fft_dif_radix4(data: &mut [Complex64]) -> Result<()> {
    check_power_of_four(data.len())?;
    dif_radix4(data);
    Ok(())
}

fn dif_radix2(data: &mut [Complex64]) {
    let n = data.len();
    if n < 2 {
        return;
    }
    let half = n / 2;

    let mut even = Vec::with_capacity(half);
    let mut odd = Vec::with_capacity(half);
    for k in 0..half {
        let (x0, x1) = (data[k], data[k + half]);
        even.push(x0 + x1);
        odd.push((x0 - x1) * twiddle(k, n));
    }

    dif_radix2(&mut even);
    dif_radix2(&mut odd);

    for (k, pair) in data.chunks_exact_mut(2).enumerate() {
        pair[0] = even[k];
        pair[1] = odd[k];
    }
}

fn dif_radix4(data: &mut [Complex64]) {
    let n = data.len();
    if n < 4 {
        return;
    }
    let q = n / 4;
    let j = Complex64::i();

    let mut parts: [Vec<Complex64>; 4] = std::array::from_fn(|_| Vec::with_capacity(q));
    for k in 0..q {
        let (a, b, c, d) = (data[k], data[k + q], data[k + 2 * q], data[k + 3 * q]);
        parts[0].push(a + b + c + d);
        parts[1].push(((a - c) - j * (b - d)) * twiddle(k, n));
        parts[2].push(((a + c) - (b + d)) * twiddle(2 * k, n));
        parts[3].push(((a - c) + j * (b - d)) * twiddle(3 * k, n));
    }

    for part in parts.iter_mut() {
        dif_radix4(part);
    }

    for (k, quad) in data.chunks_exact_mut(4).enumerate() {
        for (r, slot) in quad.iter_mut().enumerate() {
            *slot = parts[r][k];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft::{fft_dit_radix2, tests::signal};

    #[test]
    fn dif_matches_dit() {
        let input = signal(256, 31);
        let mut dit = input.clone();
        fft_dit_radix2(&mut dit).unwrap();

        let mut r2 = input.clone();
        fft_dif_radix2(&mut r2).unwrap();
        let mut r4 = input.clone();
        fft_dif_radix4(&mut r4).unwrap();

        for ((a, b), c) in dit.iter().zip(&r2).zip(&r4) {
            assert!((a - b).norm() < 1e-9);
            assert!((a - c).norm() < 1e-9);
        }
    }

    #[test]
    fn constant_signal_concentrates_in_dc() {
        let mut data = vec![Complex64::new(2.0, -1.0); 16];
        fft_dif_radix4(&mut data).unwrap();
        assert!((data[0] - Complex64::new(32.0, -16.0)).norm() < 1e-12);
        for v in &data[1..] {
            assert!(v.norm() < 1e-12);
        }
    }
}
