//! # Vector and matrix primitives
//!
//! Thin layer over [`nalgebra`] fixing the conventions used by every frame
//! change in the crate:
//!
//! - [`rotmt`] builds the **frame** rotation `R_k(α)` about one principal axis.
//!   It rotates the coordinate axes by `α` in the right-handed sense, so a fixed
//!   vector's coordinates turn by `−α`.
//! - [`Matrix3Ext::right_multiply`] computes `self · M` and
//!   [`Matrix3Ext::left_multiply`] computes `M · self`. Composition order matters
//!   throughout the pipeline (precession before nutation, transposes for the
//!   topocentric offset), so call sites say which one they mean.
//! - [`Vector3Ext::normalize_or_keep`] leaves a zero vector unchanged instead
//!   of producing NaNs.

use nalgebra::{Matrix3, Vector3};

use crate::constants::{Radian, DPI};

/// Principal axis of a single-axis rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Construct the right-handed 3×3 frame rotation about one principal axis.
///
/// Arguments
/// ---------
/// * `alpha`: rotation angle in **radians**.
/// * `axis`: axis of rotation.
///
/// Returns
/// --------
/// * `R` such that `x' = R · x` expresses a fixed vector `x` in axes rotated by `alpha`.
///
/// ```text
/// R_x(α) = | 1    0     0  |   R_y(α) = | cos α  0  −sin α |   R_z(α) = |  cos α  sin α  0 |
///          | 0  cos α sin α|            |   0    1    0    |            | −sin α  cos α  0 |
///          | 0 −sin α cos α|            | sin α  0   cos α |            |    0      0    1 |
/// ```
///
/// # See also
/// * [`precession_matrix`](crate::earth_orientation::precession_matrix) – closed form of `R_z(−z)·R_y(θ)·R_z(−ζ)`
/// * [`nutation_matrix`](crate::earth_orientation::nutation_matrix) – `R_x(−ε−Δε)·R_z(−Δψ)·R_x(ε)`
pub fn rotmt(alpha: Radian, axis: Axis) -> Matrix3<f64> {
    let (s, c) = alpha.sin_cos();
    match axis {
        Axis::X => Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c),
        Axis::Y => Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c),
        Axis::Z => Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0),
    }
}

/// Order-explicit matrix products.
pub trait Matrix3Ext {
    /// `self · m`
    fn right_multiply(&self, m: &Matrix3<f64>) -> Matrix3<f64>;

    /// `m · self`
    fn left_multiply(&self, m: &Matrix3<f64>) -> Matrix3<f64>;

    /// `true` when `self · selfᵗ = I` within `tol` and `det(self) > 0`.
    fn is_proper_rotation(&self, tol: f64) -> bool;
}

impl Matrix3Ext for Matrix3<f64> {
    fn right_multiply(&self, m: &Matrix3<f64>) -> Matrix3<f64> {
        self * m
    }

    fn left_multiply(&self, m: &Matrix3<f64>) -> Matrix3<f64> {
        m * self
    }

    fn is_proper_rotation(&self, tol: f64) -> bool {
        let residual = self * self.transpose() - Matrix3::identity();
        residual.iter().all(|x| x.abs() <= tol) && (self.determinant() - 1.0).abs() <= tol
    }
}

pub trait Vector3Ext {
    /// Unit vector along `self`, or `self` unchanged when its norm is zero.
    fn normalize_or_keep(&self) -> Vector3<f64>;

    /// `m · self`
    fn transform(&self, m: &Matrix3<f64>) -> Vector3<f64>;
}

impl Vector3Ext for Vector3<f64> {
    fn normalize_or_keep(&self) -> Vector3<f64> {
        let norm = self.norm();
        if norm == 0.0 {
            *self
        } else {
            self / norm
        }
    }

    fn transform(&self, m: &Matrix3<f64>) -> Vector3<f64> {
        m * self
    }
}

/// Right ascension in `[0, 2π)` and declination of a direction vector.
pub fn ra_dec(v: &Vector3<f64>) -> (Radian, Radian) {
    let ra = v.y.atan2(v.x).rem_euclid(DPI);
    let dec = v.z.atan2(v.x.hypot(v.y));
    (ra, dec)
}

/// Unit vector pointing at (`ra`, `dec`).
pub fn unit_vector(ra: Radian, dec: Radian) -> Vector3<f64> {
    let (sd, cd) = dec.sin_cos();
    let (sa, ca) = ra.sin_cos();
    Vector3::new(cd * ca, cd * sa, sd)
}

#[cfg(test)]
mod ref_system_test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_rotmt_is_frame_rotation() {
        // Rotating the axes by +90° about z brings the old y axis onto +x.
        let r = rotmt(FRAC_PI_2, Axis::Z);
        let v = r * Vector3::new(0.0, 1.0, 0.0);
        assert_relative_eq!(v, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-15);

        let r = rotmt(FRAC_PI_2, Axis::X);
        let v = r * Vector3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(v, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-15);

        let r = rotmt(FRAC_PI_2, Axis::Y);
        let v = r * Vector3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(v, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-15);
    }

    #[test]
    fn test_rotmt_inverse_is_transpose() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let r = rotmt(0.3, axis);
            assert_relative_eq!(r.transpose(), rotmt(-0.3, axis), epsilon = 1e-15);
            assert!(r.is_proper_rotation(1e-14));
        }
    }

    #[test]
    fn test_multiplication_order() {
        let a = rotmt(0.4, Axis::X);
        let b = rotmt(1.1, Axis::Z);
        assert_eq!(a.right_multiply(&b), a * b);
        assert_eq!(a.left_multiply(&b), b * a);
        assert_ne!(a.right_multiply(&b), a.left_multiply(&b));
    }

    #[test]
    fn test_determinant_and_improper_matrix() {
        let reflection = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -1.0));
        assert_eq!(reflection.determinant(), -1.0);
        assert!(!reflection.is_proper_rotation(1e-12));
    }

    #[test]
    fn test_normalize_zero_vector() {
        let zero = Vector3::zeros();
        assert_eq!(zero.normalize_or_keep(), zero);

        let v = Vector3::new(3.0, 0.0, 4.0).normalize_or_keep();
        assert_relative_eq!(v, Vector3::new(0.6, 0.0, 0.8), epsilon = 1e-15);
    }

    #[test]
    fn test_ra_dec_roundtrip_quadrants() {
        let (ra, dec) = ra_dec(&unit_vector(4.0, -0.5));
        assert_relative_eq!(ra, 4.0, epsilon = 1e-14);
        assert_relative_eq!(dec, -0.5, epsilon = 1e-14);

        let (ra, dec) = ra_dec(&Vector3::new(0.0, 0.0, 2.0));
        assert_eq!(ra, 0.0);
        assert_relative_eq!(dec, FRAC_PI_2);
    }
}
