//! # Apparent place
//!
//! Direction of a [`MovingPoint`] as seen by an [`Observer`], corrected for
//! the finite speed of light, the Sun's gravitational deflection and the
//! observer's motion, then optionally rotated into the equator of date.
//!
//! ## Pipeline
//!
//! ```text
//! observer state at t
//!   → light-time iteration on τ (with the solar Shapiro delay)
//!   → P, Q, E normalized
//!   → light deflection by the Sun       (PipelineConfig::light_deflection)
//!   → relativistic aberration            (PipelineConfig::aberration)
//!   → N · P rotation to the date        (Some(EarthOrientationModel))
//!   → RA, Dec
//! ```
//!
//! where `P` is observer → target, `Q` Sun → target and `E` Sun → observer,
//! the target and Sun being taken at the retarded time `t − τ`.
//!
//! Two entry points are offered:
//!
//! - [`compute_apparent_place`], a pure function returning a fresh
//!   [`ApparentPlaceResult`];
//! - [`ApparentPlace`], which owns the target and observer and caches the
//!   result of the most recent successful calculation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use skyplace::apparent_place::ApparentPlace;
//! use skyplace::earth_orientation::EarthOrientationModel;
//! use skyplace::jpl_ephem::{Body, EphemerisStore, LoadSpan};
//! use skyplace::moving_point::Planet;
//! use skyplace::observers::Observer;
//!
//! let store = Arc::new(EphemerisStore::open("lnxp1600p2200.405", LoadSpan::full())?);
//! let mars = Planet::new(store.clone(), Body::Mars)?;
//! let mut place = ApparentPlace::new(Box::new(mars), Observer::geocentric(store))
//!     .with_orientation(EarthOrientationModel::default());
//!
//! place.calculate(2_451_545.0)?;
//! println!("RA {} Dec {}", place.ra()?, place.dec()?);
//! # Ok::<(), skyplace::skyplace_errors::SkyplaceError>(())
//! ```

use hifitime::Epoch;
use log::trace;
use nalgebra::Vector3;

use crate::constants::{JulianDate, Radian, SCHWARZSCHILD_SUN_AU, VLIGHT_AU};
use crate::earth_orientation::EarthOrientationModel;
use crate::jpl_ephem::Body;
use crate::moving_point::MovingPoint;
use crate::observers::Observer;
use crate::ref_system::{ra_dec, Vector3Ext};
use crate::skyplace_errors::SkyplaceError;
use crate::time::jd_tdb;

/// Tuning of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Cap on light-time passes before giving up with
    /// [`SkyplaceError::LightTimeDiverged`].
    pub max_iterations: usize,
    /// Convergence threshold on the light-time correction, days.
    pub tolerance_days: f64,
    pub light_deflection: bool,
    pub aberration: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            max_iterations: 50,
            tolerance_days: 1e-9,
            light_deflection: true,
            aberration: true,
        }
    }
}

impl PipelineConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance_days(mut self, tolerance_days: f64) -> Self {
        self.tolerance_days = tolerance_days;
        self
    }

    pub fn with_light_deflection(mut self, enabled: bool) -> Self {
        self.light_deflection = enabled;
        self
    }

    pub fn with_aberration(mut self, enabled: bool) -> Self {
        self.aberration = enabled;
        self
    }

    /// Light-time only: no deflection, no aberration.
    pub fn astrometric() -> Self {
        PipelineConfig::default()
            .with_light_deflection(false)
            .with_aberration(false)
    }
}

/// Outcome of one apparent-place calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentPlaceResult {
    /// Observation time, JD TDB.
    pub time: JulianDate,
    /// Unit vector towards the target in the output frame.
    pub direction: Vector3<f64>,
    /// Distance travelled by the light, including the Shapiro delay, AU.
    pub light_path_distance: f64,
    /// Observer–target distance at `time`, without light-time, AU.
    pub geometric_distance: f64,
    /// Right ascension in `[0, 2π)`.
    pub ra: Radian,
    pub dec: Radian,
    /// Light-time passes performed (0 for targets without light-time).
    pub iterations: usize,
    /// Converged light time τ, days.
    pub light_time: f64,
}

/// Extra path length of light passing the Sun (Shapiro delay), AU.
///
/// `e`, `p`, `q` are the lengths of E (Sun → observer), P (observer →
/// target) and Q (Sun → target).
fn shapiro_path(e: f64, p: f64, q: f64) -> f64 {
    SCHWARZSCHILD_SUN_AU * ((e + p + q) / (e - p + q)).ln()
}

/// Bend the unit direction `p` by the Sun's gravity.
///
/// `p`, `q`, `e` are unit vectors and `e_norm` the observer's heliocentric
/// distance in AU.
fn deflect(p: &Vector3<f64>, q: &Vector3<f64>, e: &Vector3<f64>, e_norm: f64) -> Vector3<f64> {
    let g1 = SCHWARZSCHILD_SUN_AU / e_norm;
    let g2 = 1.0 + q.dot(e);
    p + (e * p.dot(q) - q * e.dot(p)) * (g1 / g2)
}

/// Relativistic aberration of the unit direction `p` for an observer moving
/// at `v` (in units of c).
fn aberrate(p: &Vector3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    let beta = (1.0 - v.norm_squared()).sqrt();
    let f1 = p.dot(v);
    let f2 = 1.0 + f1 / (1.0 + beta);
    (p * beta + v * f2) / (1.0 + f1)
}

/// Positions the light-time solution ends on.
struct LightTimeSolution {
    target: Vector3<f64>,
    sun: Vector3<f64>,
    light_path_distance: f64,
    geometric_distance: f64,
    iterations: usize,
    light_time: f64,
}

fn solve_light_time(
    target: &dyn MovingPoint,
    observer: &Observer,
    observer_position: &Vector3<f64>,
    sun_at_t: &Vector3<f64>,
    t: JulianDate,
    config: &PipelineConfig,
) -> Result<LightTimeSolution, SkyplaceError> {
    let store = observer.store();
    let e_norm = (observer_position - sun_at_t).norm();

    if !target.needs_light_time() {
        let position = target.position_at(t)?;
        let distance = (position - observer_position).norm();
        return Ok(LightTimeSolution {
            target: position,
            sun: *sun_at_t,
            light_path_distance: distance,
            geometric_distance: distance,
            iterations: 0,
            light_time: 0.0,
        });
    }

    let mut tau = 0.0;
    let mut geometric_distance = 0.0;
    let mut last_correction = f64::INFINITY;

    for iteration in 1..=config.max_iterations {
        let retarded = t - tau;
        let position = target.position_at(retarded)?;
        let sun = store.evaluate(retarded, Body::Sun, false)?.position;

        let p = (position - observer_position).norm();
        let q = (position - sun).norm();
        if iteration == 1 {
            geometric_distance = p;
        }

        let light_path_distance = if target.is_sun() {
            p
        } else {
            p + shapiro_path(e_norm, p, q)
        };

        let new_tau = light_path_distance / VLIGHT_AU;
        last_correction = new_tau - tau;
        trace!("light-time pass {iteration}: tau = {new_tau} d, correction = {last_correction} d");

        if last_correction.abs() < config.tolerance_days {
            return Ok(LightTimeSolution {
                target: position,
                sun,
                light_path_distance,
                geometric_distance,
                iterations: iteration,
                light_time: new_tau,
            });
        }
        tau = new_tau;
    }

    Err(SkyplaceError::LightTimeDiverged {
        iterations: config.max_iterations,
        last_correction,
    })
}

/// Apparent place of `target` seen by `observer` at `t` (JD TDB).
///
/// Without an orientation model the direction stays in the equatorial J2000
/// frame; with one it is rotated from the target's reference epoch to the
/// equator of date (mean or true, following the model).
///
/// Errors
/// ----------
/// * Range errors from any ephemeris lookup, unchanged.
/// * [`SkyplaceError::LightTimeDiverged`] when the light-time correction is
///   still above tolerance after `config.max_iterations` passes.
pub fn compute_apparent_place(
    target: &dyn MovingPoint,
    observer: &Observer,
    t: JulianDate,
    orientation: Option<&EarthOrientationModel>,
    config: &PipelineConfig,
) -> Result<ApparentPlaceResult, SkyplaceError> {
    let observer_state = observer.state_at(t)?;
    let sun_at_t = observer.store().evaluate(t, Body::Sun, false)?.position;

    let solution = solve_light_time(
        target,
        observer,
        &observer_state.position,
        &sun_at_t,
        t,
        config,
    )?;

    let e_vec = observer_state.position - sun_at_t;
    let e_norm = e_vec.norm();
    let e = e_vec.normalize_or_keep();
    let q = (solution.target - solution.sun).normalize_or_keep();
    let mut p = (solution.target - observer_state.position).normalize_or_keep();

    if config.light_deflection && !target.is_sun() {
        p = deflect(&p, &q, &e, e_norm);
    }

    if config.aberration {
        p = aberrate(&p, &(observer_state.velocity / VLIGHT_AU));
    }

    p = p.normalize_or_keep();

    if let Some(model) = orientation {
        p = p.transform(&model.frame_of_date(target.reference_epoch(), t));
    }

    let (ra, dec) = ra_dec(&p);
    trace!(
        "apparent place at JD {t}: ra = {ra} rad, dec = {dec} rad after {} light-time passes",
        solution.iterations
    );

    Ok(ApparentPlaceResult {
        time: t,
        direction: p,
        light_path_distance: solution.light_path_distance,
        geometric_distance: solution.geometric_distance,
        ra,
        dec,
        iterations: solution.iterations,
        light_time: solution.light_time,
    })
}

/// A target/observer pair with the result of its last calculation.
///
/// Getters fail with [`SkyplaceError::NotCalculated`] until
/// [`ApparentPlace::calculate`] has succeeded once. A failed calculation
/// leaves the previous result in place. Only the most recent time is kept.
pub struct ApparentPlace {
    target: Box<dyn MovingPoint>,
    observer: Observer,
    orientation: Option<EarthOrientationModel>,
    config: PipelineConfig,
    result: Option<ApparentPlaceResult>,
}

impl ApparentPlace {
    /// J2000 places with the default configuration.
    pub fn new(target: Box<dyn MovingPoint>, observer: Observer) -> Self {
        ApparentPlace {
            target,
            observer,
            orientation: None,
            config: PipelineConfig::default(),
            result: None,
        }
    }

    /// Rotate results to the equator of date with `model`.
    pub fn with_orientation(mut self, model: EarthOrientationModel) -> Self {
        self.orientation = Some(model);
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn target(&self) -> &dyn MovingPoint {
        self.target.as_ref()
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn calculate(&mut self, t: JulianDate) -> Result<&ApparentPlaceResult, SkyplaceError> {
        let result = compute_apparent_place(
            self.target.as_ref(),
            &self.observer,
            t,
            self.orientation.as_ref(),
            &self.config,
        )?;
        Ok(self.result.insert(result))
    }

    pub fn calculate_at_epoch(&mut self, epoch: &Epoch) -> Result<&ApparentPlaceResult, SkyplaceError> {
        self.calculate(jd_tdb(epoch))
    }

    pub fn is_calculated(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Result<&ApparentPlaceResult, SkyplaceError> {
        self.result.as_ref().ok_or(SkyplaceError::NotCalculated)
    }

    pub fn time(&self) -> Result<JulianDate, SkyplaceError> {
        Ok(self.result()?.time)
    }

    pub fn direction(&self) -> Result<Vector3<f64>, SkyplaceError> {
        Ok(self.result()?.direction)
    }

    pub fn ra(&self) -> Result<Radian, SkyplaceError> {
        Ok(self.result()?.ra)
    }

    pub fn dec(&self) -> Result<Radian, SkyplaceError> {
        Ok(self.result()?.dec)
    }

    pub fn light_path_distance(&self) -> Result<f64, SkyplaceError> {
        Ok(self.result()?.light_path_distance)
    }

    pub fn geometric_distance(&self) -> Result<f64, SkyplaceError> {
        Ok(self.result()?.geometric_distance)
    }
}
