//! Cooley-Tukey fast Fourier transforms.
//!
//! Every transform here is forward, in place and unnormalised:
//!
//! ```text
//! X[k] = sum_{n=0}^{N-1} x[n] * exp(-2*pi*i*k*n / N)
//! ```
//!
//! # Strategies
//!
//! | Function | Decomposition | Valid sizes |
//! |----------|---------------|-------------|
//! | [`fft_dit_radix2`] | Decimation in time, 2-way | Powers of two |
//! | [`fft_dit_radix4`] | Decimation in time, 4-way | Powers of four |
//! | [`fft_dif_radix2`] | Decimation in frequency, 2-way | Powers of two |
//! | [`fft_dif_radix4`] | Decimation in frequency, 4-way | Powers of four |
//! | [`Radix4Plan`] | DIF 4-way with a precomputed twiddle table | Powers of four |
//!
//! The recursive variants are reference code: they recompute twiddles and
//! allocate temporaries at every level. [`Radix4Plan`] applies the standard
//! fixes (a shared twiddle lookup table, no multiply by the trivial twiddle,
//! one scratch buffer for the whole transform).
//!
//! [`dft`] is the O(N^2) definition, used to check the fast variants.
//!
//! # References
//!
//! - J. W. Cooley and J. W. Tukey, "An Algorithm for the Machine Calculation of
//!   Complex Fourier Series" (1965)

mod dif;
mod dit;
mod plan;

pub use dif::{fft_dif_radix2, fft_dif_radix4};
pub use dit::{fft_dit_radix2, fft_dit_radix4};
pub use num_complex::Complex64;
pub use plan::Radix4Plan;

use std::f64::consts::PI;

use crate::error::{AlgoError, Result};

/// Selects one of the recursive transforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FftVariant {
    /// Decimation in time, radix 2 ([`fft_dit_radix2`]).
    DitRadix2,
    /// Decimation in time, radix 4 ([`fft_dit_radix4`]).
    DitRadix4,
    /// Decimation in frequency, radix 2 ([`fft_dif_radix2`]).
    DifRadix2,
    /// Decimation in frequency, radix 4 ([`fft_dif_radix4`]).
    DifRadix4,
}

impl FftVariant {
    /// Every variant, radix-2 before radix-4 within each decimation.
    pub const ALL: [FftVariant; 4] = [
        FftVariant::DitRadix2,
        FftVariant::DitRadix4,
        FftVariant::DifRadix2,
        FftVariant::DifRadix4,
    ];

    /// Checks that `len` is a valid size for this variant.
    pub fn check_len(self, len: usize) -> Result<()> {
        match self {
            FftVariant::DitRadix2 | FftVariant::DifRadix2 => check_power_of_two(len),
            FftVariant::DitRadix4 | FftVariant::DifRadix4 => check_power_of_four(len),
        }
    }
}

/// Forward transform with the chosen variant.
pub fn fft(variant: FftVariant, data: &mut [Complex64]) -> Result<()> {
    match variant {
        FftVariant::DitRadix2 => fft_dit_radix2(data),
        FftVariant::DitRadix4 => fft_dit_radix4(data),
        FftVariant::DifRadix2 => fft_dif_radix2(data),
        FftVariant::DifRadix4 => fft_dif_radix4(data),
    }
}

/// Inverse transform, normalised by `1 / N`.
///
/// Uses `ifft(x) = conj(fft(conj(x))) / N`, so any forward variant serves.
pub fn ifft(variant: FftVariant, data: &mut [Complex64]) -> Result<()> {
    variant.check_len(data.len())?;
    data.iter_mut().for_each(|v| *v = v.conj());
    fft(variant, data)?;
    let scale = 1.0 / data.len() as f64;
    data.iter_mut().for_each(|v| *v = v.conj() * scale);
    Ok(())
}

/// Direct O(N^2) discrete Fourier transform.
pub fn dft(input: &[Complex64]) -> Vec<Complex64> {
    let n = input.len();
    (0..n)
        .map(|k| {
            input
                .iter()
                .enumerate()
                .map(|(t, &x)| {
                    // Reduce k*t mod n first to keep the angle small and accurate.
                    let angle = -2.0 * PI * ((k * t) % n) as f64 / n as f64;
                    x * Complex64::from_polar(1.0, angle)
                })
                .sum()
        })
        .collect()
}

/// `exp(-2*pi*i*k / n)`.
#[inline]
pub(crate) fn twiddle(k: usize, n: usize) -> Complex64 {
    Complex64::from_polar(1.0, -2.0 * PI * k as f64 / n as f64)
}

pub(crate) fn check_power_of_two(len: usize) -> Result<()> {
    if len.is_power_of_two() {
        Ok(())
    } else {
        Err(AlgoError::NotPowerOfTwo { len })
    }
}

pub(crate) fn check_power_of_four(len: usize) -> Result<()> {
    if len.is_power_of_two() && len.trailing_zeros() % 2 == 0 {
        Ok(())
    } else {
        Err(AlgoError::NotPowerOfFour { len })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Max error relative to the input's L1 norm, which bounds every |X[k]|.
    pub(crate) fn relative_error(input: &[Complex64], actual: &[Complex64]) -> f64 {
        let expected = dft(input);
        let scale = input.iter().map(|v| v.norm()).sum::<f64>().max(1.0);
        expected
            .iter()
            .zip(actual)
            .map(|(e, a)| (e - a).norm())
            .fold(0.0, f64::max)
            / scale
    }

    pub(crate) fn signal(len: usize, seed: u64) -> Vec<Complex64> {
        let mut state = seed | 1;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let re = (state & 0xFFFF) as f64 / 6553.6 - 5.0;
                let im = ((state >> 16) & 0xFFFF) as f64 / 6553.6 - 5.0;
                Complex64::new(re, im)
            })
            .collect()
    }

    #[test]
    fn size_checks() {
        assert!(check_power_of_two(1).is_ok());
        assert!(check_power_of_two(64).is_ok());
        assert_eq!(check_power_of_two(0), Err(AlgoError::NotPowerOfTwo { len: 0 }));
        assert_eq!(check_power_of_two(12), Err(AlgoError::NotPowerOfTwo { len: 12 }));

        for len in [1, 4, 16, 64, 256, 1 << 20] {
            assert!(check_power_of_four(len).is_ok(), "len={len}");
        }
        for len in [0, 2, 5, 8, 20, 32, 128] {
            assert_eq!(
                check_power_of_four(len),
                Err(AlgoError::NotPowerOfFour { len }),
                "len={len}"
            );
        }
    }

    #[test]
    fn dft_of_impulse_is_flat() {
        let mut x = vec![Complex64::new(0.0, 0.0); 8];
        x[0] = Complex64::new(1.0, 0.0);
        for v in dft(&x) {
            assert!((v - Complex64::new(1.0, 0.0)).norm() < 1e-12);
        }
    }

    #[test]
    fn variants_match_dft() {
        for variant in FftVariant::ALL {
            for len in [1usize, 2, 4, 8, 16, 32, 64, 256] {
                if variant.check_len(len).is_err() {
                    continue;
                }
                let input = signal(len, 0x5EED ^ len as u64);
                let mut data = input.clone();
                fft(variant, &mut data).unwrap();
                let err = relative_error(&input, &data);
                assert!(err < 1e-9, "{variant:?} len={len} err={err:e}");
            }
        }
    }

    #[test]
    fn invalid_sizes_rejected() {
        let mut eight = signal(8, 1);
        let untouched = eight.clone();
        assert_eq!(
            fft(FftVariant::DitRadix4, &mut eight),
            Err(AlgoError::NotPowerOfFour { len: 8 })
        );
        assert_eq!(
            fft(FftVariant::DifRadix4, &mut eight),
            Err(AlgoError::NotPowerOfFour { len: 8 })
        );
        assert_eq!(eight, untouched);

        let mut six = signal(6, 2);
        assert_eq!(
            fft(FftVariant::DitRadix2, &mut six),
            Err(AlgoError::NotPowerOfTwo { len: 6 })
        );
        assert_eq!(
            fft(FftVariant::DifRadix2, &mut []),
            Err(AlgoError::NotPowerOfTwo { len: 0 })
        );
    }

    #[test]
    fn inverse_round_trip() {
        let input = signal(64, 77);
        for variant in FftVariant::ALL {
            let mut data = input.clone();
            fft(variant, &mut data).unwrap();
            ifft(variant, &mut data).unwrap();
            for (a, b) in input.iter().zip(&data) {
                assert!((a - b).norm() < 1e-9, "{variant:?}");
            }
        }
    }

    proptest! {
        #[test]
        fn radix2_variants_match_dft(log_len in 0u32..9, seed in any::<u64>()) {
            let input = signal(1 << log_len, seed);
            for variant in [FftVariant::DitRadix2, FftVariant::DifRadix2] {
                let mut data = input.clone();
                fft(variant, &mut data).unwrap();
                prop_assert!(relative_error(&input, &data) < 1e-9);
            }
        }

        #[test]
        fn radix4_variants_match_dft(log4_len in 0u32..5, seed in any::<u64>()) {
            let input = signal(1 << (2 * log4_len), seed);
            for variant in [FftVariant::DitRadix4, FftVariant::DifRadix4] {
                let mut data = input.clone();
                fft(variant, &mut data).unwrap();
                prop_assert!(relative_error(&input, &data) < 1e-9);
            }
        }
    }
}
