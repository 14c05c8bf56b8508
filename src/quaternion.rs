//! Quaternion algebra and 3-D rotation.
//!
//! `q = w + xi + yj + zk` with `i² = j² = k² = ijk = -1`. The product is
//! non-commutative; `ij = k` but `ji = -k`.
//!
//! A unit quaternion `q = cos(θ/2) + sin(θ/2) * n` rotates a point `p` (embedded
//! as the pure quaternion `0 + p`) by angle `θ` about axis `n` through
//! `p' = q p q*`. Rotation is right-handed: looking down the axis toward the
//! origin, positive angles turn counter-clockwise.
//!
//! # References
//!
//! - W. R. Hamilton, "On Quaternions" (1844)
//! - K. Shoemake, "Animating Rotation with Quaternion Curves" (SIGGRAPH 1985)

use std::ops::{Add, Mul, Neg, Sub};

use crate::error::{AlgoError, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub const ONE: Quaternion = Quaternion::new(1.0, 0.0, 0.0, 0.0);
    pub const I: Quaternion = Quaternion::new(0.0, 1.0, 0.0, 0.0);
    pub const J: Quaternion = Quaternion::new(0.0, 0.0, 1.0, 0.0);
    pub const K: Quaternion = Quaternion::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Pure quaternion `0 + v`.
    pub const fn from_vector(v: [f64; 3]) -> Self {
        Self::new(0.0, v[0], v[1], v[2])
    }

    /// Unit quaternion rotating by `angle` radians about `axis`.
    ///
    /// `axis` need not be normalised but must have non-zero length.
    pub fn from_axis_angle(axis: [f64; 3], angle: f64) -> Result<Self> {
        let len = axis.iter().map(|a| a * a).sum::<f64>().sqrt();
        if len == 0.0 || !len.is_finite() {
            return Err(AlgoError::ZeroAxis);
        }
        let (sin, cos) = (angle / 2.0).sin_cos();
        let s = sin / len;
        Ok(Self::new(cos, axis[0] * s, axis[1] * s, axis[2] * s))
    }

    /// Negates the vector part; the real part is kept.
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    pub fn norm_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn norm(self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Four-dimensional dot product.
    pub fn dot(self, rhs: Self) -> f64 {
        self.w * rhs.w + self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Unit quaternion in the same direction, or `None` for zero.
    pub fn normalize(self) -> Option<Self> {
        let n = self.norm();
        (n > 0.0).then(|| self * (1.0 / n))
    }

    /// Multiplicative inverse `q* / |q|²`, or `None` for zero.
    pub fn inverse(self) -> Option<Self> {
        let n2 = self.norm_squared();
        (n2 > 0.0).then(|| self.conjugate() * (1.0 / n2))
    }

    /// The vector part `(x, y, z)`.
    pub fn vector(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Rotates `self`'s vector part with the unit quaternion `rotation`.
    pub fn rotate_by(self, rotation: Quaternion) -> Self {
        rotation * self * rotation.conjugate()
    }
}

/// Rotates `point` by `angle` radians about `axis`.
pub fn rotate_point(point: [f64; 3], axis: [f64; 3], angle: f64) -> Result<[f64; 3]> {
    let q = Quaternion::from_axis_angle(axis, angle)?;
    Ok(Quaternion::from_vector(point).rotate_by(q).vector())
}

impl Add for Quaternion {
    type Output = Quaternion;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.w + rhs.w, self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Quaternion {
    type Output = Quaternion;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.w - rhs.w, self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Quaternion {
    type Output = Quaternion;

    fn neg(self) -> Self {
        Self::new(-self.w, -self.x, -self.y, -self.z)
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    /// Hamilton product.
    fn mul(self, b: Self) -> Self {
        let a = self;
        Self::new(
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y + a.y * b.w + a.z * b.x - a.x * b.z,
            a.w * b.z + a.z * b.w + a.x * b.y - a.y * b.x,
        )
    }
}

impl Mul<f64> for Quaternion {
    type Output = Quaternion;

    fn mul(self, s: f64) -> Self {
        Self::new(self.w * s, self.x * s, self.y * s, self.z * s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: Quaternion, b: Quaternion, eps: f64) -> bool {
        (a - b).norm() <= eps
    }

    fn quaternion() -> impl Strategy<Value = Quaternion> {
        prop::array::uniform4(-10.0f64..10.0).prop_map(|[w, x, y, z]| Quaternion::new(w, x, y, z))
    }

    #[test]
    fn units_square_to_minus_one() {
        let minus_one = -Quaternion::ONE;
        let (i, j, k) = (Quaternion::I, Quaternion::J, Quaternion::K);
        assert_eq!(i * i, minus_one);
        assert_eq!(j * j, minus_one);
        assert_eq!(k * k, minus_one);
        assert_eq!(i * j * k, minus_one);
        assert_eq!(i * j, k);
        assert_eq!(j * i, -k);
    }

    #[test]
    fn hamilton_product_example() {
        let a = Quaternion::new(3.0, -4.0, 2.0, 5.0);
        let b = Quaternion::new(2.0, -3.0, -7.0, 3.0);
        assert_eq!(a * b, Quaternion::new(-7.0, 24.0, -20.0, 53.0));
        assert_relative_eq!((a * b).norm_squared(), a.norm_squared() * b.norm_squared());
    }

    #[test]
    fn conjugate_keeps_real_part() {
        let q = Quaternion::new(1.5, 2.0, -3.0, 4.0);
        assert_eq!(q.conjugate(), Quaternion::new(1.5, -2.0, 3.0, -4.0));
        let qq = q * q.conjugate();
        assert_relative_eq!(qq.w, q.norm_squared());
        assert_eq!(qq.vector(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn rotations() {
        let p = rotate_point([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], FRAC_PI_2).unwrap();
        assert_relative_eq!(p[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[2], 0.0, epsilon = 1e-12);

        // Unnormalised axis along +x.
        let angle = 1.508f64;
        let p = rotate_point([0.0, 2.0, 0.0], [5.0, 0.0, 0.0], angle).unwrap();
        assert_relative_eq!(p[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 2.0 * angle.cos(), epsilon = 1e-12);
        assert_relative_eq!(p[2], 2.0 * angle.sin(), epsilon = 1e-12);
    }

    #[test]
    fn zero_axis_and_zero_quaternion() {
        assert_eq!(
            rotate_point([1.0, 2.0, 3.0], [0.0, 0.0, 0.0], 1.0),
            Err(AlgoError::ZeroAxis)
        );
        assert_eq!(Quaternion::default().inverse(), None);
        assert_eq!(Quaternion::default().normalize(), None);
    }

    proptest! {
        #[test]
        fn norm_is_multiplicative(a in quaternion(), b in quaternion()) {
            let lhs = (a * b).norm();
            let rhs = a.norm() * b.norm();
            prop_assert!((lhs - rhs).abs() <= 1e-9 * rhs.max(1.0));
        }

        #[test]
        fn inverse_cancels(q in quaternion()) {
            prop_assume!(q.norm() > 1e-3);
            let inv = q.inverse().unwrap();
            prop_assert!(close(q * inv, Quaternion::ONE, 1e-9));
            prop_assert!(close(inv * q, Quaternion::ONE, 1e-9));
        }

        #[test]
        fn rotation_preserves_length(
            point in prop::array::uniform3(-100.0f64..100.0),
            axis in prop::array::uniform3(-1.0f64..1.0),
            angle in -10.0f64..10.0,
        ) {
            prop_assume!(axis.iter().map(|a| a * a).sum::<f64>() > 1e-6);
            let rotated = rotate_point(point, axis, angle).unwrap();
            let len = |v: [f64; 3]| v.iter().map(|c| c * c).sum::<f64>().sqrt();
            prop_assert!((len(rotated) - len(point)).abs() <= 1e-9 * len(point).max(1.0));
        }
    }
}
