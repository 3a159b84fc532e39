//! # Atmospheric refraction
//!
//! Standalone low-precision formulas for the refraction of a body near the
//! horizon. They are not applied by the apparent-place pipeline, which stops
//! at a geocentric or topocentric RA/Dec; a caller working in horizontal
//! coordinates applies them afterwards.
//!
//! | Function | Input altitude | Source |
//! |----------|----------------|--------|
//! | [`bennett`] | apparent (observed) | Bennett (1982) |
//! | [`saemundsson`] | true (geometric) | Sæmundsson (1986) |
//!
//! Both are calibrated for 1010 mbar and 10 °C and scaled by
//! `(P / 1010)·(283 / (273 + T))` for other conditions. Altitudes and results
//! are in **degrees**.

use crate::constants::Degree;

/// Altitudes outside this interval get no refraction.
const VALID_ALTITUDES: std::ops::RangeInclusive<f64> = -1.0..=89.9;

/// Pressure and temperature at the observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atmosphere {
    /// Pressure, millibars.
    pub pressure_mbar: f64,
    /// Air temperature, degrees Celsius.
    pub temperature_c: f64,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Atmosphere {
            pressure_mbar: 1010.0,
            temperature_c: 10.0,
        }
    }
}

impl Atmosphere {
    pub fn new(pressure_mbar: f64, temperature_c: f64) -> Self {
        Atmosphere {
            pressure_mbar,
            temperature_c,
        }
    }

    fn scale(&self) -> f64 {
        (self.pressure_mbar / 1010.0) * (283.0 / (273.0 + self.temperature_c))
    }
}

/// Refraction in degrees for an apparent altitude, standard atmosphere.
pub fn bennett(apparent_altitude: Degree) -> Degree {
    bennett_with(apparent_altitude, &Atmosphere::default())
}

/// Refraction in degrees for an apparent altitude.
///
/// `R = cot(h + 7.31 / (h + 4.4))` arcminutes; accurate to about 0.07′
/// above the horizon.
pub fn bennett_with(apparent_altitude: Degree, atmosphere: &Atmosphere) -> Degree {
    if !VALID_ALTITUDES.contains(&apparent_altitude) {
        return 0.0;
    }
    let h = apparent_altitude;
    let arcmin = 1.0 / (h + 7.31 / (h + 4.4)).to_radians().tan();
    arcmin / 60.0 * atmosphere.scale()
}

/// Refraction in degrees for a true altitude, standard atmosphere.
pub fn saemundsson(true_altitude: Degree) -> Degree {
    saemundsson_with(true_altitude, &Atmosphere::default())
}

/// Refraction in degrees for a true altitude.
///
/// `R = 1.02·cot(h + 10.3 / (h + 5.11))` arcminutes, the approximate inverse
/// of [`bennett_with`].
pub fn saemundsson_with(true_altitude: Degree, atmosphere: &Atmosphere) -> Degree {
    if !VALID_ALTITUDES.contains(&true_altitude) {
        return 0.0;
    }
    let h = true_altitude;
    let arcmin = 1.02 / (h + 10.3 / (h + 5.11)).to_radians().tan();
    arcmin / 60.0 * atmosphere.scale()
}

#[cfg(test)]
mod refraction_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bennett_reference_values() {
        // about 34.5′ at the horizon, 1′ at 45°
        assert_relative_eq!(bennett(0.0) * 60.0, 34.477_533_743, epsilon = 1e-6);
        assert_relative_eq!(bennett(10.0) * 60.0, 5.391_505_467, epsilon = 1e-6);
        assert_relative_eq!(bennett(45.0) * 60.0, 0.994_847_968, epsilon = 1e-6);
    }

    #[test]
    fn test_saemundsson_reference_values() {
        assert_relative_eq!(saemundsson(0.0) * 60.0, 28.981_927_384, epsilon = 1e-6);
        assert_relative_eq!(saemundsson(45.0) * 60.0, 1.012_707_659, epsilon = 1e-6);
    }

    #[test]
    fn test_formulas_are_near_inverse() {
        let apparent = 10.0;
        let r = bennett(apparent);
        let back = saemundsson(apparent - r);
        assert_relative_eq!(back * 60.0, r * 60.0, epsilon = 0.1);
    }

    #[test]
    fn test_atmosphere_scaling() {
        let thin = Atmosphere::new(505.0, 10.0);
        assert_relative_eq!(bennett_with(0.0, &thin) * 60.0, 17.238_766_872, epsilon = 1e-6);

        let cold = Atmosphere::new(1010.0, -10.0);
        assert_relative_eq!(bennett_with(0.0, &cold) * 60.0, 37.099_399_427, epsilon = 1e-6);
    }

    #[test]
    fn test_outside_valid_altitudes() {
        assert_eq!(bennett(90.0), 0.0);
        assert_eq!(bennett(-5.0), 0.0);
        assert_eq!(saemundsson(-2.0), 0.0);
        assert!(bennett(89.9) > 0.0);
    }
}
