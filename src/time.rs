//! # Time scales and sidereal time
//!
//! The pipeline runs on Julian Dates in TDB. This module provides the few
//! conversions it needs around that scale:
//!
//! - [`delta_t`]: ΔT = TT − UT in seconds, from a piecewise polynomial table
//! - [`tdb_to_ut`]: UT Julian Date from a TDB Julian Date (TDB ≈ TT here)
//! - [`gmst`]: Greenwich mean sidereal time for a UT Julian Date
//! - [`jd_tdb`]: bridge from a [`hifitime::Epoch`]
//!
//! Civil calendar handling is left to `hifitime`.

use hifitime::Epoch;
use log::warn;

use crate::constants::{
    centuries_between, Centuries, JulianDate, Radian, DPI, J2000, JDTOMJD, SECONDS_PER_DAY,
};

/// Julian Date (TDB) of an epoch.
pub fn jd_tdb(epoch: &Epoch) -> JulianDate {
    epoch.to_jde_tdb_days()
}

/// One piece of the ΔT table: valid for centuries-since-J2000 below `until`,
/// polynomial in `u = (year − origin) / step`.
struct DeltaTSegment {
    until: Centuries,
    origin: f64,
    step: f64,
    coefficients: &'static [f64],
}

impl DeltaTSegment {
    fn eval(&self, year: f64) -> f64 {
        let u = (year - self.origin) / self.step;
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * u + c)
    }
}

/// Espenak & Meeus (2006) fits, from −500 to 2150.
const DELTA_T_TABLE: [DeltaTSegment; 14] = [
    DeltaTSegment {
        until: -25.0,
        origin: 1820.0,
        step: 100.0,
        coefficients: &[-20.0, 0.0, 32.0],
    },
    DeltaTSegment {
        until: -15.0,
        origin: 0.0,
        step: 100.0,
        coefficients: &[
            10583.6,
            -1014.41,
            33.78311,
            -5.952053,
            -0.1798452,
            0.022174192,
            0.0090316521,
        ],
    },
    DeltaTSegment {
        until: -4.0,
        origin: 1000.0,
        step: 100.0,
        coefficients: &[
            1574.2,
            -556.01,
            71.23472,
            0.319781,
            -0.8503463,
            -0.005050998,
            0.0083572073,
        ],
    },
    DeltaTSegment {
        until: -3.0,
        origin: 1600.0,
        step: 1.0,
        coefficients: &[120.0, -0.9808, -0.01532, 1.0 / 7129.0],
    },
    DeltaTSegment {
        until: -2.0,
        origin: 1700.0,
        step: 1.0,
        coefficients: &[8.83, 0.1603, -0.0059285, 0.00013336, -1.0 / 1_174_000.0],
    },
    DeltaTSegment {
        until: -1.4,
        origin: 1800.0,
        step: 1.0,
        coefficients: &[
            13.72,
            -0.332447,
            0.0068612,
            0.0041116,
            -0.00037436,
            0.0000121272,
            -0.0000001699,
            0.000000000875,
        ],
    },
    DeltaTSegment {
        until: -1.0,
        origin: 1860.0,
        step: 1.0,
        coefficients: &[
            7.62,
            0.5737,
            -0.251754,
            0.01680668,
            -0.0004473624,
            1.0 / 233_174.0,
        ],
    },
    DeltaTSegment {
        until: -0.8,
        origin: 1900.0,
        step: 1.0,
        coefficients: &[-2.79, 1.494119, -0.0598939, 0.0061966, -0.000197],
    },
    DeltaTSegment {
        until: -0.59,
        origin: 1920.0,
        step: 1.0,
        coefficients: &[21.20, 0.84493, -0.076100, 0.0020936],
    },
    DeltaTSegment {
        until: -0.39,
        origin: 1950.0,
        step: 1.0,
        coefficients: &[29.07, 0.407, -1.0 / 233.0, 1.0 / 2547.0],
    },
    DeltaTSegment {
        until: -0.14,
        origin: 1975.0,
        step: 1.0,
        coefficients: &[45.45, 1.067, -1.0 / 260.0, -1.0 / 718.0],
    },
    DeltaTSegment {
        until: 0.05,
        origin: 2000.0,
        step: 1.0,
        coefficients: &[
            63.86,
            0.3345,
            -0.060374,
            0.0017275,
            0.000651814,
            0.00002373599,
        ],
    },
    DeltaTSegment {
        until: 0.5,
        origin: 2000.0,
        step: 1.0,
        coefficients: &[62.92, 0.32217, 0.005589],
    },
    DeltaTSegment {
        until: 1.5,
        origin: 1820.0,
        step: 1.0,
        coefficients: &[-205.724, 0.5628, 0.0032],
    },
];

/// `true` when `jd` falls inside the ΔT table.
pub fn delta_t_covered(jd: JulianDate) -> bool {
    let t = centuries_between(J2000, jd);
    DELTA_T_TABLE.iter().any(|segment| segment.until > t)
}

/// ΔT = TT − UT in seconds.
///
/// The first table entry whose threshold exceeds the date is used. Dates after
/// the last entry (year 2150) get 0.0, not an extrapolation; a warning is
/// logged and [`delta_t_covered`] reports `false` for them.
pub fn delta_t(jd: JulianDate) -> f64 {
    let t = centuries_between(J2000, jd);
    match DELTA_T_TABLE.iter().find(|segment| segment.until > t) {
        Some(segment) => segment.eval(2000.0 + 100.0 * t),
        None => {
            warn!("ΔT requested at JD {jd}, beyond the table; using 0.0");
            0.0
        }
    }
}

/// Universal Time Julian Date from a TDB Julian Date.
pub fn tdb_to_ut(jd: JulianDate) -> JulianDate {
    jd - delta_t(jd) / SECONDS_PER_DAY
}

/// Greenwich Mean Sidereal Time (IAU 1982) in radians, in `[0, 2π)`.
///
/// Arguments
/// -----------------
/// * `jd_ut`: Julian Date on the UT scale.
///
/// The cubic gives GMST at the preceding 0h UT; the elapsed fraction of the
/// day is then added at the sidereal rate.
pub fn gmst(jd_ut: JulianDate) -> Radian {
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    // sidereal / solar day
    const RAP: f64 = 1.00273790934;

    let mjd = jd_ut - JDTOMJD;
    let midnight = mjd.floor();
    let t = centuries_between(J2000 - JDTOMJD, midnight);

    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / SECONDS_PER_DAY;
    let h = (mjd - midnight) * DPI;

    (gmst0 + h * RAP).rem_euclid(DPI)
}
