//! # Constants and type definitions for skyplace
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Astronomical and geophysical constants (speed of light, solar GM, Earth ellipsoid)
//! - Unit conversions (degrees ↔ radians, arcseconds ↔ radians, days ↔ seconds)
//! - Core type aliases used across the crate
//!
//! Time arguments are Julian Dates on the TDB scale unless a function says otherwise.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of days in a Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Julian Date of J2000.0 (2000-01-01 12:00:00 TT)
pub const J2000: f64 = 2_451_545.0;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2400000.5;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Speed of light in astronomical units per day
pub const VLIGHT_AU: f64 = 173.1446;

/// Gaussian gravitational constant k
pub const GAUSS_GRAV: f64 = 0.01720209895;

/// Heliocentric gravitational constant GM☉ = k² in AU³/day²
pub const GM_SUN: f64 = GAUSS_GRAV * GAUSS_GRAV;

/// Scale factor 2·GM☉/c² (AU) shared by the Shapiro delay and the light deflection
pub const SCHWARZSCHILD_SUN_AU: f64 = 2.0 * GM_SUN / (VLIGHT_AU * VLIGHT_AU);

/// Earth equatorial radius in kilometers
pub const EARTH_EQUATORIAL_RADIUS: Kilometer = 6378.14;

/// Earth flattening
pub const EARTH_FLATTENING: f64 = 1.0 / 298.257;

/// Earth rotation rate in rad/s
pub const EARTH_ROTATION_RATE: f64 = 7.292115e-5;

/// Astronomical Unit in kilometers (IAU 2012); used when a file carries no AU constant
pub const AU: Kilometer = 149_597_870.7;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Julian Date (days)
pub type JulianDate = f64;
/// Julian centuries since a reference epoch
pub type Centuries = f64;

/// Julian centuries elapsed from `from` to `to`.
#[inline]
pub fn centuries_between(from: JulianDate, to: JulianDate) -> Centuries {
    (to - from) / DAYS_PER_CENTURY
}
