//! Stars from a catalogue, propagated by their space motion.
//!
//! A [`CatalogStar`] turns the six catalogue astrometric parameters into a
//! barycentric position and a constant velocity, so that a star goes through
//! the same apparent-place pipeline as a planet. Catalogue parsing itself
//! belongs to the caller.

use nalgebra::Vector3;

use crate::constants::{JulianDate, AU, J2000, RADSEC, SECONDS_PER_DAY};
use crate::jpl_ephem::StateVector;
use crate::moving_point::MovingPoint;
use crate::ref_system::unit_vector;
use crate::skyplace_errors::SkyplaceError;

/// Parallax used for zero or negative catalogue values, in mas (1e-7″).
pub const MIN_PARALLAX_MAS: f64 = 1.0e-4;

const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStar {
    /// Right ascension, radians (J2000 equator)
    ra: f64,
    /// Declination, radians
    dec: f64,
    /// Proper motion in RA, mas/yr, including the cos δ factor
    pm_ra: f64,
    /// Proper motion in Dec, mas/yr
    pm_dec: f64,
    /// Parallax, mas
    parallax: f64,
    /// Radial velocity, km/s
    radial_velocity: f64,
    /// Catalogue epoch, JD TDB
    epoch: JulianDate,
    position: Vector3<f64>,
    velocity: Vector3<f64>,
}

impl CatalogStar {
    /// Build a star from catalogue values (angles in degrees) at epoch J2000.
    pub fn new(
        ra_degrees: f64,
        dec_degrees: f64,
        pm_ra: f64,
        pm_dec: f64,
        parallax: f64,
        radial_velocity: f64,
    ) -> Self {
        let mut star = CatalogStar {
            ra: ra_degrees.to_radians(),
            dec: dec_degrees.to_radians(),
            pm_ra,
            pm_dec,
            parallax,
            radial_velocity,
            epoch: J2000,
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
        };
        star.compute_vectors();
        star
    }

    pub fn with_epoch(mut self, epoch: JulianDate) -> Self {
        self.epoch = epoch;
        self
    }

    /// Right ascension, radians.
    pub fn ra(&self) -> f64 {
        self.ra
    }

    /// Declination, radians.
    pub fn dec(&self) -> f64 {
        self.dec
    }

    /// Proper motions (RA·cos δ, Dec), mas/yr.
    pub fn proper_motion(&self) -> (f64, f64) {
        (self.pm_ra, self.pm_dec)
    }

    /// Catalogue parallax in mas, before clamping.
    pub fn parallax(&self) -> f64 {
        self.parallax
    }

    pub fn radial_velocity(&self) -> f64 {
        self.radial_velocity
    }

    pub fn epoch(&self) -> JulianDate {
        self.epoch
    }

    /// Distance in AU implied by the (clamped) parallax.
    pub fn distance(&self) -> f64 {
        self.position.norm()
    }

    fn compute_vectors(&mut self) {
        let parallax = if self.parallax <= 0.0 {
            MIN_PARALLAX_MAS
        } else {
            self.parallax
        };
        let dist = 1.0 / (parallax * 1.0e-3 * RADSEC).sin();

        let (sra, cra) = self.ra.sin_cos();
        let (sdc, cdc) = self.dec.sin_cos();
        self.position = unit_vector(self.ra, self.dec) * dist;

        // mas/yr at `dist` AU → AU/day
        let pmr = self.pm_ra * 1.0e-3 * RADSEC * dist / DAYS_PER_YEAR;
        let pmd = self.pm_dec * 1.0e-3 * RADSEC * dist / DAYS_PER_YEAR;
        let rvl = self.radial_velocity * SECONDS_PER_DAY / AU;

        self.velocity = Vector3::new(
            -pmr * sra - pmd * sdc * cra + rvl * cdc * cra,
            pmr * cra - pmd * sdc * sra + rvl * cdc * sra,
            pmd * cdc + rvl * sdc,
        );
    }
}

impl MovingPoint for CatalogStar {
    fn position_at(&self, t: JulianDate) -> Result<Vector3<f64>, SkyplaceError> {
        Ok(self.position + self.velocity * (t - self.epoch))
    }

    fn state_at(&self, t: JulianDate) -> Result<StateVector, SkyplaceError> {
        Ok(StateVector {
            position: self.position_at(t)?,
            velocity: self.velocity,
        })
    }

    fn valid_range(&self) -> (JulianDate, JulianDate) {
        (f64::NEG_INFINITY, f64::INFINITY)
    }

    fn needs_light_time(&self) -> bool {
        false
    }
}
