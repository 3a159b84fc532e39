//! # Moving points
//!
//! Everything the apparent-place pipeline can look at, or look from, is a
//! [`MovingPoint`]: a provider of barycentric positions and velocities in the
//! equatorial J2000 frame, in AU and AU/day, over a validity range.
//!
//! | Type | Source |
//! |------|--------|
//! | [`Planet`] | one barycentric slot of the ephemeris (planets, Pluto, Sun, Earth–Moon barycentre) |
//! | [`EarthCentre`] | Earth–Moon barycentre corrected by the lunar offset |
//! | [`MoonCentre`] | same combination, on the Moon's side of the barycentre |
//! | [`Observer`](crate::observers::Observer) | Earth centre plus an optional topocentric offset |
//! | [`CatalogStar`](crate::stars::CatalogStar) | catalogue position propagated by space motion |
//!
//! All ephemeris-backed points share one [`EphemerisStore`] through an [`Arc`].

use std::sync::Arc;

use nalgebra::Vector3;

use crate::constants::{JulianDate, J2000};
use crate::jpl_ephem::{Body, EphemerisStore, Evaluation, StateVector};
use crate::skyplace_errors::SkyplaceError;

pub trait MovingPoint: Send + Sync {
    /// Barycentric position (AU) at `t` (JD TDB).
    fn position_at(&self, t: JulianDate) -> Result<Vector3<f64>, SkyplaceError>;

    /// Barycentric position (AU) and velocity (AU/day) at `t` (JD TDB).
    fn state_at(&self, t: JulianDate) -> Result<StateVector, SkyplaceError>;

    /// Interval of `t` over which the point can be evaluated.
    fn valid_range(&self) -> (JulianDate, JulianDate);

    /// `true` for the Sun, which gets neither the Shapiro term nor the light deflection.
    fn is_sun(&self) -> bool {
        false
    }

    /// Equinox the positions are referred to; the starting point of precession.
    fn reference_epoch(&self) -> JulianDate {
        J2000
    }

    /// `false` for points whose position is already referred to the light
    /// arriving at `t` (stars), so the light-time iteration is skipped.
    fn needs_light_time(&self) -> bool {
        true
    }
}

/// A barycentric slot read straight from the ephemeris.
#[derive(Debug, Clone)]
pub struct Planet {
    store: Arc<EphemerisStore>,
    body: Body,
}

impl Planet {
    /// Errors
    /// ----------
    /// * [`SkyplaceError::InvalidBody`] for the geocentric Moon slot (use
    ///   [`MoonCentre`]) and for the nutation and libration slots.
    pub fn new(store: Arc<EphemerisStore>, body: Body) -> Result<Self, SkyplaceError> {
        match body {
            Body::Moon | Body::Nutation | Body::Libration => Err(SkyplaceError::InvalidBody(body)),
            _ => Ok(Planet { store, body }),
        }
    }

    pub fn sun(store: Arc<EphemerisStore>) -> Self {
        Planet {
            store,
            body: Body::Sun,
        }
    }

    pub fn body(&self) -> Body {
        self.body
    }
}

impl MovingPoint for Planet {
    fn position_at(&self, t: JulianDate) -> Result<Vector3<f64>, SkyplaceError> {
        Ok(self.store.evaluate(t, self.body, false)?.position)
    }

    fn state_at(&self, t: JulianDate) -> Result<StateVector, SkyplaceError> {
        Ok(self.store.evaluate(t, self.body, true)?.into_state())
    }

    fn valid_range(&self) -> (JulianDate, JulianDate) {
        (self.store.earliest(), self.store.latest())
    }

    fn is_sun(&self) -> bool {
        self.body == Body::Sun
    }
}

/// Weight of the geocentric Moon vector for the Earth and for the Moon.
///
/// The barycentre sits at `Moon_geo / (1 + EMRAT)` from the Earth, so
/// `Earth = EMB − Moon_geo / (1 + EMRAT)` and `Moon = EMB + Moon_geo · EMRAT / (1 + EMRAT)`.
fn lunar_weights(store: &EphemerisStore) -> (f64, f64) {
    let emrat = store.earth_moon_mass_ratio();
    (-1.0 / (1.0 + emrat), emrat / (1.0 + emrat))
}

fn earth_moon(
    store: &EphemerisStore,
    t: JulianDate,
    want_velocity: bool,
) -> Result<(Evaluation, Evaluation), SkyplaceError> {
    let emb = store.evaluate(t, Body::EarthMoonBarycenter, want_velocity)?;
    let moon = store.evaluate(t, Body::Moon, want_velocity)?;
    Ok((emb, moon))
}

/// Centre of the Earth.
#[derive(Debug, Clone)]
pub struct EarthCentre {
    store: Arc<EphemerisStore>,
}

impl EarthCentre {
    pub fn new(store: Arc<EphemerisStore>) -> Self {
        EarthCentre { store }
    }

    pub fn store(&self) -> &Arc<EphemerisStore> {
        &self.store
    }

    fn evaluate(&self, t: JulianDate, want_velocity: bool) -> Result<Evaluation, SkyplaceError> {
        let (emb, moon) = earth_moon(&self.store, t, want_velocity)?;
        let (earth_weight, _) = lunar_weights(&self.store);
        Ok(emb + moon * earth_weight)
    }
}

impl MovingPoint for EarthCentre {
    fn position_at(&self, t: JulianDate) -> Result<Vector3<f64>, SkyplaceError> {
        Ok(self.evaluate(t, false)?.position)
    }

    fn state_at(&self, t: JulianDate) -> Result<StateVector, SkyplaceError> {
        Ok(self.evaluate(t, true)?.into_state())
    }

    fn valid_range(&self) -> (JulianDate, JulianDate) {
        (self.store.earliest(), self.store.latest())
    }
}

/// Centre of the Moon, barycentric.
#[derive(Debug, Clone)]
pub struct MoonCentre {
    store: Arc<EphemerisStore>,
}

impl MoonCentre {
    pub fn new(store: Arc<EphemerisStore>) -> Self {
        MoonCentre { store }
    }

    fn evaluate(&self, t: JulianDate, want_velocity: bool) -> Result<Evaluation, SkyplaceError> {
        let (emb, moon) = earth_moon(&self.store, t, want_velocity)?;
        let (_, moon_weight) = lunar_weights(&self.store);
        Ok(emb + moon * moon_weight)
    }

    /// Geocentric position of the Moon (AU), as stored in the file.
    pub fn geocentric_position(&self, t: JulianDate) -> Result<Vector3<f64>, SkyplaceError> {
        Ok(self.store.evaluate(t, Body::Moon, false)?.position)
    }
}

impl MovingPoint for MoonCentre {
    fn position_at(&self, t: JulianDate) -> Result<Vector3<f64>, SkyplaceError> {
        Ok(self.evaluate(t, false)?.position)
    }

    fn state_at(&self, t: JulianDate) -> Result<StateVector, SkyplaceError> {
        Ok(self.evaluate(t, true)?.into_state())
    }

    fn valid_range(&self) -> (JulianDate, JulianDate) {
        (self.store.earliest(), self.store.latest())
    }
}

#[cfg(all(test, feature = "jpl-fixture"))]
mod moving_point_test {
    use super::*;
    use crate::unit_test_global::DE_STORE;
    use approx::assert_relative_eq;

    #[test]
    fn test_earth_offset_from_barycentre() {
        let earth = EarthCentre::new(DE_STORE.clone());
        let emb = Planet::new(DE_STORE.clone(), Body::EarthMoonBarycenter).unwrap();
        for k in 0..28 {
            let t = J2000 + k as f64;
            let offset = emb.position_at(t).unwrap() - earth.position_at(t).unwrap();
            // 4 300 to 5 000 km depending on the lunar distance
            let km = offset.norm() * DE_STORE.au_km();
            assert!((4_300.0..5_000.0).contains(&km), "{km} km");
        }
    }

    #[test]
    fn test_moon_geocentric_consistency() {
        let earth = EarthCentre::new(DE_STORE.clone());
        let moon = MoonCentre::new(DE_STORE.clone());
        let t = J2000 + 12.5;
        let geo = moon.position_at(t).unwrap() - earth.position_at(t).unwrap();
        assert_relative_eq!(geo, moon.geocentric_position(t).unwrap(), epsilon = 1e-14);
    }
}
