//! # Observers
//!
//! An [`Observer`] is the Earth centre plus, optionally, a site on the
//! Earth's surface. The variant is picked at construction:
//!
//! - [`Observer::geocentric`]: the centre of the Earth.
//! - [`Observer::terrestrial`]: a [`GeodeticSite`] on an oblate Earth
//!   (equatorial radius 6378.14 km, flattening 1/298.257).
//!
//! ## Topocentric offset
//!
//! ```text
//! (ρ·cosφ′, ρ·sinφ′)  --(local apparent sidereal time)-->  true equator of date
//!                      --(Nᵀ, then Pᵀ)-->                  mean equator J2000
//! ```
//!
//! The body-fixed site vector is turned by the local apparent sidereal time
//! (GAST at the UT-corrected date plus the east longitude), then brought back
//! to the J2000 frame with the transposes of the nutation and precession
//! matrices before being added to the Earth's barycentric position. The
//! velocity gains the diurnal term `ω × r`.
//!
//! ## Units
//!
//! - Longitudes and latitudes: **degrees** (east and north positive).
//! - Height above the ellipsoid: **metres**.
//! - Parallax constants (ρ·cosφ′, ρ·sinφ′): **Earth equatorial radii**.
//! - Positions and velocities: **AU** and **AU/day**.

use std::sync::Arc;

use nalgebra::Vector3;

use crate::constants::{
    Degree, JulianDate, EARTH_EQUATORIAL_RADIUS, EARTH_FLATTENING, EARTH_ROTATION_RATE, J2000,
    SECONDS_PER_DAY,
};
use crate::earth_orientation::EarthOrientationModel;
use crate::jpl_ephem::{EphemerisStore, StateVector};
use crate::moving_point::{EarthCentre, MovingPoint};
use crate::ref_system::{rotmt, Axis, Vector3Ext};
use crate::skyplace_errors::SkyplaceError;
use crate::time::tdb_to_ut;

/// Convert geodetic latitude (radians) and height (metres) into parallax
/// constants (ρ·cosφ′, ρ·sinφ′), in Earth equatorial radii.
///
/// `u = atan((1 − f)·tan φ)` is the reduced latitude; the height term is added
/// along the ellipsoid normal.
pub fn lat_alt_to_parallax(lat: f64, height: f64) -> (f64, f64) {
    let axis_ratio = 1.0 - EARTH_FLATTENING;
    let height_ratio = height / (EARTH_EQUATORIAL_RADIUS * 1000.0);

    let u = (lat.sin() * axis_ratio).atan2(lat.cos());

    let rho_sin_phi = axis_ratio * u.sin() + height_ratio * lat.sin();
    let rho_cos_phi = u.cos() + height_ratio * lat.cos();

    (rho_cos_phi, rho_sin_phi)
}

/// Same as [`lat_alt_to_parallax`] with the latitude in degrees.
pub fn geodetic_to_parallax(lat: Degree, height: f64) -> (f64, f64) {
    lat_alt_to_parallax(lat.to_radians(), height)
}

/// A site on the Earth's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticSite {
    /// East longitude, degrees.
    pub longitude: Degree,
    /// Geodetic latitude, degrees.
    pub latitude: Degree,
    /// Height above the ellipsoid, metres.
    pub height: f64,
}

impl GeodeticSite {
    pub fn new(longitude: Degree, latitude: Degree, height: f64) -> Self {
        GeodeticSite {
            longitude,
            latitude,
            height,
        }
    }

    pub fn parallax(&self) -> (f64, f64) {
        geodetic_to_parallax(self.latitude, self.height)
    }

    /// Geocentric position (km) and velocity (km/day) in the true equator of
    /// date, for a local apparent sidereal time `last` in radians.
    pub fn position_of_date(&self, last: f64) -> (Vector3<f64>, Vector3<f64>) {
        let (rho_cos_phi, rho_sin_phi) = self.parallax();
        let body_fixed = Vector3::new(
            rho_cos_phi * EARTH_EQUATORIAL_RADIUS,
            0.0,
            rho_sin_phi * EARTH_EQUATORIAL_RADIUS,
        );
        // Turning the frame by −LAST turns the site by +LAST.
        let position = body_fixed.transform(&rotmt(-last, Axis::Z));

        let omega = Vector3::new(0.0, 0.0, EARTH_ROTATION_RATE * SECONDS_PER_DAY);
        let velocity = omega.cross(&position);
        (position, velocity)
    }
}

/// The point the sky is observed from.
#[derive(Debug, Clone)]
pub struct Observer {
    earth: EarthCentre,
    site: Option<GeodeticSite>,
    orientation: EarthOrientationModel,
}

impl Observer {
    pub fn geocentric(store: Arc<EphemerisStore>) -> Self {
        Observer {
            earth: EarthCentre::new(store),
            site: None,
            orientation: EarthOrientationModel::default(),
        }
    }

    pub fn terrestrial(store: Arc<EphemerisStore>, site: GeodeticSite) -> Self {
        Observer {
            earth: EarthCentre::new(store),
            site: Some(site),
            orientation: EarthOrientationModel::default(),
        }
    }

    /// Earth orientation used to place the site; nutation is on by default.
    pub fn with_orientation(mut self, orientation: EarthOrientationModel) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn site(&self) -> Option<&GeodeticSite> {
        self.site.as_ref()
    }

    pub fn store(&self) -> &Arc<EphemerisStore> {
        self.earth.store()
    }

    /// Geocentric state of the site at `t` (JD TDB), equatorial J2000, in AU
    /// and AU/day. Zero for a geocentric observer.
    pub fn topocentric_offset(&self, t: JulianDate) -> StateVector {
        let Some(site) = &self.site else {
            return StateVector {
                position: Vector3::zeros(),
                velocity: Vector3::zeros(),
            };
        };

        let jd_ut = tdb_to_ut(t);
        let last = self.orientation.gast(jd_ut) + site.longitude.to_radians();
        let (position, velocity) = site.position_of_date(last);

        let to_j2000 = self.orientation.frame_of_date(J2000, t).transpose();
        let km_to_au = 1.0 / self.store().au_km();

        StateVector {
            position: position.transform(&to_j2000) * km_to_au,
            velocity: velocity.transform(&to_j2000) * km_to_au,
        }
    }
}

impl MovingPoint for Observer {
    fn position_at(&self, t: JulianDate) -> Result<Vector3<f64>, SkyplaceError> {
        let earth = self.earth.position_at(t)?;
        Ok(earth + self.topocentric_offset(t).position)
    }

    fn state_at(&self, t: JulianDate) -> Result<StateVector, SkyplaceError> {
        let earth = self.earth.state_at(t)?;
        Ok(earth + self.topocentric_offset(t))
    }

    fn valid_range(&self) -> (JulianDate, JulianDate) {
        self.earth.valid_range()
    }
}
