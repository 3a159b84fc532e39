//! # Earth orientation
//!
//! Precession (IAU 1976, Lieske angles), nutation (IAU 1980, 106-term series),
//! obliquity and sidereal time. Every matrix returned here maps coordinates
//! **from** the older frame **to** the newer one:
//!
//! ```text
//! x_mean(date) = P · x_mean(fixed)        x_true(date) = N · x_mean(date)
//! ```
//!
//! All time arguments are Julian Dates. The series are evaluated in TT; the
//! pipeline feeds them UT-corrected dates, the difference being far below the
//! precision of the models.

use nalgebra::Matrix3;

use crate::{
    constants::{centuries_between, ArcSec, JulianDate, Radian, DPI, J2000, RADSEC},
    ref_system::{rotmt, Axis, Matrix3Ext},
    time::{delta_t, gmst, tdb_to_ut},
};

/// Mean obliquity of the ecliptic (IAU 1976), in radians.
///
/// ```text
/// ε = 84381.448″ − 46.815″·T − 0.00059″·T² + 0.001813″·T³
/// ```
/// with `T` in Julian centuries from J2000.
pub fn mean_obliquity(jd: JulianDate) -> Radian {
    let ob0 = ((23.0 * 3600.0 + 26.0 * 60.0) + 21.448) * RADSEC;
    let ob1 = -46.815 * RADSEC;
    let ob2 = -0.0006 * RADSEC;
    let ob3 = 0.00181 * RADSEC;

    let t = centuries_between(J2000, jd);

    ((ob3 * t + ob2) * t + ob1) * t + ob0
}

/// IAU 1980 nutation series.
///
/// Each row: multipliers of (l, l′, F, D, Ω), then the longitude coefficient
/// `s0 + s1·T` and the obliquity coefficient `c0 + c1·T`, in units of 0.0001″.
#[rustfmt::skip]
const NUTATION_1980: [([i8; 5], f64, f64, f64, f64); 106] = [
    ([0, 0, 0, 0, 1], -171996.0, -174.2, 92025.0, 8.9),
    ([0, 0, 0, 0, 2], 2062.0, 0.2, -895.0, 0.5),
    ([-2, 0, 2, 0, 1], 46.0, 0.0, -24.0, 0.0),
    ([2, 0, -2, 0, 0], 11.0, 0.0, 0.0, 0.0),
    ([-2, 0, 2, 0, 2], -3.0, 0.0, 1.0, 0.0),
    ([1, -1, 0, -1, 0], -3.0, 0.0, 0.0, 0.0),
    ([0, -2, 2, -2, 1], -2.0, 0.0, 1.0, 0.0),
    ([2, 0, -2, 0, 1], 1.0, 0.0, 0.0, 0.0),
    ([0, 0, 2, -2, 2], -13187.0, -1.6, 5736.0, -3.1),
    ([0, 1, 0, 0, 0], 1426.0, -3.4, 54.0, -0.1),
    ([0, 1, 2, -2, 2], -517.0, 1.2, 224.0, -0.6),
    ([0, -1, 2, -2, 2], 217.0, -0.5, -95.0, 0.3),
    ([0, 0, 2, -2, 1], 129.0, 0.1, -70.0, 0.0),
    ([2, 0, 0, -2, 0], 48.0, 0.0, 1.0, 0.0),
    ([0, 0, 2, -2, 0], -22.0, 0.0, 0.0, 0.0),
    ([0, 2, 0, 0, 0], 17.0, -0.1, 0.0, 0.0),
    ([0, 1, 0, 0, 1], -15.0, 0.0, 9.0, 0.0),
    ([0, 2, 2, -2, 2], -16.0, 0.1, 7.0, 0.0),
    ([0, -1, 0, 0, 1], -12.0, 0.0, 6.0, 0.0),
    ([-2, 0, 0, 2, 1], -6.0, 0.0, 3.0, 0.0),
    ([0, -1, 2, -2, 1], -5.0, 0.0, 3.0, 0.0),
    ([2, 0, 0, -2, 1], 4.0, 0.0, -2.0, 0.0),
    ([0, 1, 2, -2, 1], 4.0, 0.0, -2.0, 0.0),
    ([1, 0, 0, -1, 0], -4.0, 0.0, 0.0, 0.0),
    ([2, 1, 0, -2, 0], 1.0, 0.0, 0.0, 0.0),
    ([0, 0, -2, 2, 1], 1.0, 0.0, 0.0, 0.0),
    ([0, 1, -2, 2, 0], -1.0, 0.0, 0.0, 0.0),
    ([0, 1, 0, 0, 2], 1.0, 0.0, 0.0, 0.0),
    ([-1, 0, 0, 1, 1], 1.0, 0.0, 0.0, 0.0),
    ([0, 1, 2, -2, 0], -1.0, 0.0, 0.0, 0.0),
    ([0, 0, 2, 0, 2], -2274.0, -0.2, 977.0, -0.5),
    ([1, 0, 0, 0, 0], 712.0, 0.1, -7.0, 0.0),
    ([0, 0, 2, 0, 1], -386.0, -0.4, 200.0, 0.0),
    ([1, 0, 2, 0, 2], -301.0, 0.0, 129.0, -0.1),
    ([1, 0, 0, -2, 0], -158.0, 0.0, -1.0, 0.0),
    ([-1, 0, 2, 0, 2], 123.0, 0.0, -53.0, 0.0),
    ([0, 0, 0, 2, 0], 63.0, 0.0, -2.0, 0.0),
    ([1, 0, 0, 0, 1], 63.0, 0.1, -33.0, 0.0),
    ([-1, 0, 0, 0, 1], -58.0, -0.1, 32.0, 0.0),
    ([-1, 0, 2, 2, 2], -59.0, 0.0, 26.0, 0.0),
    ([1, 0, 2, 0, 1], -51.0, 0.0, 27.0, 0.0),
    ([0, 0, 2, 2, 2], -38.0, 0.0, 16.0, 0.0),
    ([2, 0, 0, 0, 0], 29.0, 0.0, -1.0, 0.0),
    ([1, 0, 2, -2, 2], 29.0, 0.0, -12.0, 0.0),
    ([2, 0, 2, 0, 2], -31.0, 0.0, 13.0, 0.0),
    ([0, 0, 2, 0, 0], 26.0, 0.0, -1.0, 0.0),
    ([-1, 0, 2, 0, 1], 21.0, 0.0, -10.0, 0.0),
    ([-1, 0, 0, 2, 1], 16.0, 0.0, -8.0, 0.0),
    ([1, 0, 0, -2, 1], -13.0, 0.0, 7.0, 0.0),
    ([-1, 0, 2, 2, 1], -10.0, 0.0, 5.0, 0.0),
    ([1, 1, 0, -2, 0], -7.0, 0.0, 0.0, 0.0),
    ([0, 1, 2, 0, 2], 7.0, 0.0, -3.0, 0.0),
    ([0, -1, 2, 0, 2], -7.0, 0.0, 3.0, 0.0),
    ([1, 0, 2, 2, 2], -8.0, 0.0, 3.0, 0.0),
    ([1, 0, 0, 2, 0], 6.0, 0.0, 0.0, 0.0),
    ([2, 0, 2, -2, 2], 6.0, 0.0, -3.0, 0.0),
    ([0, 0, 0, 2, 1], -6.0, 0.0, 3.0, 0.0),
    ([0, 0, 2, 2, 1], -7.0, 0.0, 3.0, 0.0),
    ([1, 0, 2, -2, 1], 6.0, 0.0, -3.0, 0.0),
    ([0, 0, 0, -2, 1], -5.0, 0.0, 3.0, 0.0),
    ([1, -1, 0, 0, 0], 5.0, 0.0, 0.0, 0.0),
    ([2, 0, 2, 0, 1], -5.0, 0.0, 3.0, 0.0),
    ([0, 1, 0, -2, 0], -4.0, 0.0, 0.0, 0.0),
    ([1, 0, -2, 0, 0], 4.0, 0.0, 0.0, 0.0),
    ([0, 0, 0, 1, 0], -4.0, 0.0, 0.0, 0.0),
    ([1, 1, 0, 0, 0], -3.0, 0.0, 0.0, 0.0),
    ([1, 0, 2, 0, 0], 3.0, 0.0, 0.0, 0.0),
    ([1, -1, 2, 0, 2], -3.0, 0.0, 1.0, 0.0),
    ([-1, -1, 2, 2, 2], -3.0, 0.0, 1.0, 0.0),
    ([-2, 0, 0, 0, 1], -2.0, 0.0, 1.0, 0.0),
    ([3, 0, 2, 0, 2], -3.0, 0.0, 1.0, 0.0),
    ([0, -1, 2, 2, 2], -3.0, 0.0, 1.0, 0.0),
    ([1, 1, 2, 0, 2], 2.0, 0.0, -1.0, 0.0),
    ([-1, 0, 2, -2, 1], -2.0, 0.0, 1.0, 0.0),
    ([2, 0, 0, 0, 1], 2.0, 0.0, -1.0, 0.0),
    ([1, 0, 0, 0, 2], -2.0, 0.0, 1.0, 0.0),
    ([3, 0, 0, 0, 0], 2.0, 0.0, 0.0, 0.0),
    ([0, 0, 2, 1, 2], 2.0, 0.0, -1.0, 0.0),
    ([-1, 0, 0, 0, 2], 1.0, 0.0, -1.0, 0.0),
    ([1, 0, 0, -4, 0], -1.0, 0.0, 0.0, 0.0),
    ([-2, 0, 2, 2, 2], 1.0, 0.0, -1.0, 0.0),
    ([-1, 0, 2, 4, 2], -2.0, 0.0, 1.0, 0.0),
    ([2, 0, 0, -4, 0], -1.0, 0.0, 0.0, 0.0),
    ([1, 1, 2, -2, 2], 1.0, 0.0, -1.0, 0.0),
    ([1, 0, 2, 2, 1], -1.0, 0.0, 1.0, 0.0),
    ([-2, 0, 2, 4, 2], -1.0, 0.0, 1.0, 0.0),
    ([-1, 0, 4, 0, 2], 1.0, 0.0, 0.0, 0.0),
    ([1, -1, 0, -2, 0], 1.0, 0.0, 0.0, 0.0),
    ([2, 0, 2, -2, 1], 1.0, 0.0, -1.0, 0.0),
    ([2, 0, 2, 2, 2], -1.0, 0.0, 0.0, 0.0),
    ([1, 0, 0, 2, 1], -1.0, 0.0, 0.0, 0.0),
    ([0, 0, 4, -2, 2], 1.0, 0.0, 0.0, 0.0),
    ([3, 0, 2, -2, 2], 1.0, 0.0, 0.0, 0.0),
    ([1, 0, 2, -2, 0], -1.0, 0.0, 0.0, 0.0),
    ([0, 1, 2, 0, 1], 1.0, 0.0, 0.0, 0.0),
    ([-1, -1, 0, 2, 1], 1.0, 0.0, 0.0, 0.0),
    ([0, 0, -2, 0, 1], -1.0, 0.0, 0.0, 0.0),
    ([0, 0, 2, -1, 2], -1.0, 0.0, 0.0, 0.0),
    ([0, 1, 0, 2, 0], -1.0, 0.0, 0.0, 0.0),
    ([1, 0, -2, -2, 0], -1.0, 0.0, 0.0, 0.0),
    ([0, -1, 2, 0, 1], -1.0, 0.0, 0.0, 0.0),
    ([1, 1, 0, -2, 1], -1.0, 0.0, 0.0, 0.0),
    ([1, 0, -2, 2, 0], -1.0, 0.0, 0.0, 0.0),
    ([2, 0, 0, 2, 0], 1.0, 0.0, 0.0, 0.0),
    ([0, 0, 2, 4, 2], -1.0, 0.0, 0.0, 0.0),
    ([0, 1, 0, 1, 0], 1.0, 0.0, 0.0, 0.0),
];

/// Delaunay arguments (l, l′, F, D, Ω) in radians, reduced to `[0, 2π)`.
fn fundamental_arguments(t: f64) -> [Radian; 5] {
    let t2 = t * t;
    let t3 = t2 * t;

    let l = 485866.733 + 1717915922.633 * t + 31.310 * t2 + 0.064 * t3;
    let lp = 1287099.804 + 129596581.224 * t - 0.577 * t2 - 0.012 * t3;
    let f = 335778.877 + 1739527263.137 * t - 13.257 * t2 + 0.011 * t3;
    let d = 1072261.307 + 1602961601.328 * t - 6.891 * t2 + 0.019 * t3;
    let om = 450160.280 - 6962890.539 * t + 7.455 * t2 + 0.008 * t3;

    [l, lp, f, d, om].map(|arcsec| (arcsec * RADSEC) % DPI)
}

/// Nutation in longitude and obliquity (Δψ, Δε), in arcseconds.
///
/// Sum of the 106 periodic terms of the IAU 1980 theory over the five
/// fundamental arguments, with their secular rates.
pub fn nutation_angles(jd: JulianDate) -> (ArcSec, ArcSec) {
    let t = centuries_between(J2000, jd);
    let args = fundamental_arguments(t);

    let (dpsi, deps) = NUTATION_1980
        .iter()
        .fold((0.0, 0.0), |(dpsi, deps), (k, s0, s1, c0, c1)| {
            let arg: f64 = k
                .iter()
                .zip(args.iter())
                .map(|(k, a)| f64::from(*k) * a)
                .sum();
            let (s, c) = arg.sin_cos();
            (dpsi + (s0 + s1 * t) * s, deps + (c0 + c1 * t) * c)
        });

    (dpsi * 1e-4, deps * 1e-4)
}

/// True obliquity ε + Δε, in radians.
pub fn true_obliquity(jd: JulianDate) -> Radian {
    let (_, deps) = nutation_angles(jd);
    mean_obliquity(jd) + deps * RADSEC
}

/// Nutation matrix `N = R1(−ε−Δε) · R3(−Δψ) · R1(ε)`, mean to true equator of date.
pub fn nutation_matrix(jd: JulianDate) -> Matrix3<f64> {
    let epsm = mean_obliquity(jd);
    let (dpsi, deps) = nutation_angles(jd);
    let epst = epsm + deps * RADSEC;

    rotmt(epsm, Axis::X)
        .left_multiply(&rotmt(-dpsi * RADSEC, Axis::Z))
        .left_multiply(&rotmt(-epst, Axis::X))
}

/// Equation of the equinoxes Δψ·cos ε, in radians.
pub fn equation_of_equinoxes(jd: JulianDate) -> Radian {
    let (dpsi, _) = nutation_angles(jd);
    dpsi * RADSEC * mean_obliquity(jd).cos()
}

/// Greenwich apparent sidereal time for a UT Julian Date, in `[0, 2π)`.
pub fn gast(jd_ut: JulianDate) -> Radian {
    (gmst(jd_ut) + equation_of_equinoxes(jd_ut)).rem_euclid(DPI)
}

/// Precession angles (ζ, z, θ) in radians from the mean equator of `fixed` to that of `date`.
///
/// Lieske et al. (1977), with `T` the centuries from J2000 to `fixed` and `t`
/// the centuries from `fixed` to `date`:
///
/// ```text
/// ζ = (2306.2181″ + 1.39656″T − 0.000139″T²)t + (0.30188″ − 0.000344″T)t² + 0.017998″t³
/// z = (2306.2181″ + 1.39656″T − 0.000139″T²)t + (1.09468″ + 0.000066″T)t² + 0.018203″t³
/// θ = (2004.3109″ − 0.85330″T − 0.000217″T²)t − (0.42665″ + 0.000217″T)t² − 0.041833″t³
/// ```
pub fn precession_angles(fixed: JulianDate, date: JulianDate) -> (Radian, Radian, Radian) {
    let big_t = centuries_between(J2000, fixed);
    let t = centuries_between(fixed, date);
    let t2 = t * t;
    let t3 = t2 * t;

    let rate = 2306.2181 + (1.39656 - 0.000139 * big_t) * big_t;
    let zeta = rate * t + (0.30188 - 0.000344 * big_t) * t2 + 0.017998 * t3;
    let z = rate * t + (1.09468 + 0.000066 * big_t) * t2 + 0.018203 * t3;
    let theta = (2004.3109 - (0.85330 + 0.000217 * big_t) * big_t) * t
        - (0.42665 + 0.000217 * big_t) * t2
        - 0.041833 * t3;

    (zeta * RADSEC, z * RADSEC, theta * RADSEC)
}

/// Precession matrix `P = R3(−z) · R2(θ) · R3(−ζ)` from `fixed` to `date`, in closed form.
pub fn precession_matrix(fixed: JulianDate, date: JulianDate) -> Matrix3<f64> {
    let (zeta, z, theta) = precession_angles(fixed, date);
    let (sz, cz) = z.sin_cos();
    let (sze, cze) = zeta.sin_cos();
    let (sth, cth) = theta.sin_cos();

    Matrix3::new(
        cze * cz * cth - sze * sz,
        -sze * cz * cth - cze * sz,
        -cz * sth,
        cze * sz * cth + sze * cz,
        -sze * sz * cth + cze * cz,
        -sz * sth,
        cze * sth,
        -sze * sth,
        cth,
    )
}

/// Earth orientation model used by the apparent-place pipeline.
///
/// Bundles the free functions of this module behind one value so that callers
/// can pass "no model" (`None`) to get J2000 astrometric places, or a model to
/// get places referred to the true equator and equinox of date. With
/// `nutation` off the result is referred to the mean equator of date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthOrientationModel {
    pub nutation: bool,
}

impl Default for EarthOrientationModel {
    fn default() -> Self {
        EarthOrientationModel { nutation: true }
    }
}

impl EarthOrientationModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Precession only: mean equator and equinox of date.
    pub fn mean_of_date() -> Self {
        EarthOrientationModel { nutation: false }
    }

    pub fn mean_obliquity(&self, jd: JulianDate) -> Radian {
        mean_obliquity(jd)
    }

    pub fn true_obliquity(&self, jd: JulianDate) -> Radian {
        true_obliquity(jd)
    }

    /// ΔT in seconds.
    pub fn delta_t(&self, jd: JulianDate) -> f64 {
        delta_t(jd)
    }

    pub fn gmst(&self, jd_ut: JulianDate) -> Radian {
        gmst(jd_ut)
    }

    pub fn gast(&self, jd_ut: JulianDate) -> Radian {
        gast(jd_ut)
    }

    pub fn equation_of_equinoxes(&self, jd: JulianDate) -> Radian {
        equation_of_equinoxes(jd)
    }

    pub fn precession_angles(&self, fixed: JulianDate, date: JulianDate) -> (Radian, Radian, Radian) {
        precession_angles(fixed, date)
    }

    pub fn precession_matrix(&self, fixed: JulianDate, date: JulianDate) -> Matrix3<f64> {
        precession_matrix(fixed, date)
    }

    pub fn nutation_angles(&self, jd: JulianDate) -> (ArcSec, ArcSec) {
        nutation_angles(jd)
    }

    /// Identity when nutation is switched off.
    pub fn nutation_matrix(&self, jd: JulianDate) -> Matrix3<f64> {
        if self.nutation {
            nutation_matrix(jd)
        } else {
            Matrix3::identity()
        }
    }

    /// Rotation from the mean equator of `reference_epoch` to the frame of the
    /// date `jd_tdb`, evaluated at the UT-corrected date: `N · P`.
    pub fn frame_of_date(&self, reference_epoch: JulianDate, jd_tdb: JulianDate) -> Matrix3<f64> {
        let jd_ut = tdb_to_ut(jd_tdb);
        self.precession_matrix(reference_epoch, jd_ut)
            .left_multiply(&self.nutation_matrix(jd_ut))
    }
}
