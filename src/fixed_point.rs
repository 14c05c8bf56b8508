//! Q16.16 fixed-point arithmetic next to `f32` floating point.
//!
//! A [`Fixed`] stores `value * 2^16` in an `i32`: 16 integer bits (with sign)
//! and 16 fraction bits. Resolution is uniform (`2^-16` everywhere) while `f32`
//! precision is relative to magnitude, which is the trade-off
//! [`ProductComparison`] makes visible.
//!
//! Multiplication avoids a 64-bit intermediate by splitting each magnitude into
//! 16-bit halves:
//!
//! ```text
//! (ah*2^16 + al) * (bh*2^16 + bl) / 2^16
//!     = (ah*bh << 16) + (ah*bl + al*bh) + (al*bl >> 16)
//! ```
//!
//! The low term is truncated, so products round toward zero.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Number of fraction bits.
pub const FRAC_BITS: u32 = 16;

const FRAC_MASK: u32 = (1 << FRAC_BITS) - 1;
const SCALE: f64 = (1u32 << FRAC_BITS) as f64;

/// Signed Q16.16 fixed-point number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(1 << FRAC_BITS);
    pub const MAX: Fixed = Fixed(i32::MAX);
    pub const MIN: Fixed = Fixed(i32::MIN);

    /// Wraps raw Q16.16 bits.
    pub const fn from_bits(bits: i32) -> Self {
        Fixed(bits)
    }

    pub const fn to_bits(self) -> i32 {
        self.0
    }

    pub const fn from_int(value: i16) -> Self {
        Fixed((value as i32) << FRAC_BITS)
    }

    /// Nearest representable value, or `None` if `value` is out of range or NaN.
    pub fn from_f64(value: f64) -> Option<Self> {
        let scaled = (value * SCALE).round();
        if scaled.is_nan() || scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
            return None;
        }
        Some(Fixed(scaled as i32))
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE
    }

    /// Integer part, rounded toward negative infinity.
    pub const fn integer_part(self) -> i32 {
        self.0 >> FRAC_BITS
    }

    /// Raw fraction bits (`0..2^16`), measured up from [`Fixed::integer_part`].
    pub const fn fraction_bits(self) -> u32 {
        (self.0 as u32) & FRAC_MASK
    }

    /// Product rounded toward zero, or `None` on overflow.
    pub fn checked_mul(self, rhs: Fixed) -> Option<Fixed> {
        let negative = (self.0 < 0) != (rhs.0 < 0);
        let magnitude = mul_split(self.0.unsigned_abs(), rhs.0.unsigned_abs());
        if negative {
            let min_magnitude = u64::from(i32::MIN.unsigned_abs());
            if magnitude > min_magnitude {
                return None;
            }
            Some(Fixed((-(magnitude as i64)) as i32))
        } else {
            i32::try_from(magnitude).ok().map(Fixed)
        }
    }

    /// Product clamped to [`Fixed::MIN`]..=[`Fixed::MAX`].
    pub fn saturating_mul(self, rhs: Fixed) -> Fixed {
        self.checked_mul(rhs).unwrap_or(if (self.0 < 0) != (rhs.0 < 0) {
            Fixed::MIN
        } else {
            Fixed::MAX
        })
    }
}

/// Q16.16 product of two magnitudes using 16-bit halves.
#[inline]
fn mul_split(a: u32, b: u32) -> u64 {
    let (a_hi, a_lo) = (u64::from(a >> FRAC_BITS), u64::from(a & FRAC_MASK));
    let (b_hi, b_lo) = (u64::from(b >> FRAC_BITS), u64::from(b & FRAC_MASK));

    let high = (a_hi * b_hi) << FRAC_BITS;
    let cross = a_hi * b_lo + a_lo * b_hi;
    let low = (a_lo * b_lo) >> FRAC_BITS;
    high + cross + low
}

impl Add for Fixed {
    type Output = Fixed;

    /// Wrapping addition.
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    /// Wrapping subtraction.
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_sub(rhs.0))
    }
}

impl Neg for Fixed {
    type Output = Fixed;

    fn neg(self) -> Fixed {
        Fixed(self.0.wrapping_neg())
    }
}

impl Mul for Fixed {
    type Output = Fixed;

    /// Saturating multiplication; see [`Fixed::saturating_mul`].
    fn mul(self, rhs: Fixed) -> Fixed {
        self.saturating_mul(rhs)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Five decimal places cover the 2^-16 resolution.
        write!(f, "{:.5}", self.to_f64())
    }
}

/// One product evaluated in `f32` and in Q16.16, with errors against `f64`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProductComparison {
    pub exact: f64,
    pub float: f32,
    pub fixed: Fixed,
    pub float_error: f64,
    pub fixed_error: f64,
}

impl ProductComparison {
    /// Multiplies `a * b` in both representations.
    ///
    /// Returns `None` if an operand or the product does not fit Q16.16.
    pub fn compute(a: f64, b: f64) -> Option<Self> {
        let exact = a * b;
        let float = (a as f32) * (b as f32);
        let fixed = Fixed::from_f64(a)?.checked_mul(Fixed::from_f64(b)?)?;
        Some(Self {
            exact,
            float,
            fixed,
            float_error: (f64::from(float) - exact).abs(),
            fixed_error: (fixed.to_f64() - exact).abs(),
        })
    }
}
