mod common;

use approx::assert_relative_eq;
use skyplace::constants::EARTH_EQUATORIAL_RADIUS;
use skyplace::earth_orientation::EarthOrientationModel;
use skyplace::jpl_ephem::Body;
use skyplace::moving_point::{EarthCentre, MoonCentre, MovingPoint, Planet};
use skyplace::observers::{GeodeticSite, Observer};
use skyplace::skyplace_errors::SkyplaceError;

use crate::common::*;

#[test]
fn test_planet_rejects_non_point_slots() {
    let store = fixture_store();
    for body in [Body::Moon, Body::Nutation, Body::Libration] {
        let err = Planet::new(store.clone(), body).unwrap_err();
        assert_eq!(err, SkyplaceError::InvalidBody(body));
        assert!(err.is_config_error());
    }
    let mars = Planet::new(store.clone(), Body::Mars).unwrap();
    assert_eq!(mars.body(), Body::Mars);
    assert!(!mars.is_sun());
    assert!(Planet::sun(store).is_sun());
}

#[test]
fn test_planet_passes_through() {
    let store = fixture_store();
    let mars = Planet::new(store.clone(), Body::Mars).unwrap();
    let t = J2000 + 17.125;
    assert_eq!(
        mars.position_at(t).unwrap(),
        store.evaluate(t, Body::Mars, false).unwrap().position
    );
    assert_eq!(mars.valid_range(), (FIXTURE_START, FIXTURE_END));
}

#[test]
fn test_earth_and_moon_centres() {
    let store = fixture_store();
    let earth = EarthCentre::new(store.clone());
    let moon = MoonCentre::new(store.clone());

    for k in 0..10 {
        let t = FIXTURE_START + 1.0 + k as f64 * 37.3;
        let expected_earth = model_earth(t) / FIXTURE_AU_KM;
        assert_relative_eq!(earth.position_at(t).unwrap(), expected_earth, epsilon = 1e-10);

        // EMRAT = M_earth / M_moon weights the barycentre towards the Earth.
        let e = earth.position_at(t).unwrap();
        let m = moon.position_at(t).unwrap();
        let emb = store.evaluate(t, Body::EarthMoonBarycenter, false).unwrap().position;
        assert_relative_eq!((e * FIXTURE_EMRAT + m) / (1.0 + FIXTURE_EMRAT), emb, epsilon = 1e-14);

        let geocentric = moon.geocentric_position(t).unwrap();
        assert_relative_eq!(m - e, geocentric, epsilon = 1e-14);
        assert_relative_eq!(geocentric.norm() * FIXTURE_AU_KM, 384_400.0, epsilon = 1e-3);
    }
}

#[test]
fn test_earth_velocity_is_orbital() {
    let earth = EarthCentre::new(fixture_store());
    let state = earth.state_at(J2000).unwrap();
    // ≈ 29.8 km/s, plus the lunar wobble
    let km_s = state.velocity.norm() * FIXTURE_AU_KM / 86_400.0;
    assert_relative_eq!(km_s, 29.78, epsilon = 0.05);
}

#[test]
fn test_geocentric_observer_is_earth_centre() {
    let store = fixture_store();
    let observer = Observer::geocentric(store.clone());
    let earth = EarthCentre::new(store);
    assert!(observer.site().is_none());
    assert_eq!(
        observer.state_at(J2000).unwrap(),
        earth.state_at(J2000).unwrap()
    );
}

#[test]
fn test_terrestrial_observer_offset() {
    let store = fixture_store();
    let site = GeodeticSite::new(-17.88, 0.0, 0.0);
    let observer = Observer::terrestrial(store.clone(), site);
    let earth = EarthCentre::new(store);

    for k in 0..8 {
        let t = J2000 + k as f64 * 0.137;
        let offset = observer.position_at(t).unwrap() - earth.position_at(t).unwrap();
        // rotations keep the equatorial radius
        assert_relative_eq!(
            offset.norm() * FIXTURE_AU_KM,
            EARTH_EQUATORIAL_RADIUS,
            epsilon = 1e-6
        );
        // an equatorial site stays close to the J2000 equator
        assert!((offset.z * FIXTURE_AU_KM).abs() < 60.0);

        let dv = observer.state_at(t).unwrap().velocity - earth.state_at(t).unwrap().velocity;
        assert_relative_eq!(dv.norm() * FIXTURE_AU_KM / 86_400.0, 0.4651, epsilon = 1e-3);
        assert!(dv.dot(&offset).abs() < 1e-15);
    }
}

#[test]
fn test_site_offset_follows_sidereal_rotation() {
    let store = fixture_store();
    let site = GeodeticSite::new(0.0, 45.0, 0.0);
    let observer =
        Observer::terrestrial(store, site).with_orientation(EarthOrientationModel::mean_of_date());

    // half a sidereal day turns the site to the other side of the axis
    let half_sidereal_day = 0.5 / 1.002_737_909_35;
    let a = observer.topocentric_offset(J2000).position;
    let b = observer.topocentric_offset(J2000 + half_sidereal_day).position;
    assert_relative_eq!(a.z, b.z, epsilon = 1e-10);
    assert_relative_eq!(a.x, -b.x, epsilon = 1e-10);
    assert_relative_eq!(a.y, -b.y, epsilon = 1e-10);
    assert!(a.x.hypot(a.y) > 1e-5);
}
