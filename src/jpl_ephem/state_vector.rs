//! Position/velocity containers returned by ephemeris evaluation.
//!
//! Units
//! -----------------
//! * Position-type bodies: AU and AU/day (already divided by the file's AU constant).
//! * Nutation and libration angles: radians and radians/day.
//!
//! Arithmetic semantics
//! -----------------
//! Addition/subtraction on [`Evaluation`] are component-wise. The velocity
//! propagates **only when present on both** operands.

use nalgebra::Vector3;
use std::ops::{Add, Mul, Sub};

/// Raw output of [`EphemerisStore::evaluate`](crate::jpl_ephem::store::EphemerisStore::evaluate).
///
/// `velocity` is `Some` only when it was requested.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Evaluation {
    pub position: Vector3<f64>,
    pub velocity: Option<Vector3<f64>>,
}

impl Evaluation {
    /// Promote to a full state vector, treating a missing velocity as zero.
    pub fn into_state(self) -> StateVector {
        StateVector {
            position: self.position,
            velocity: self.velocity.unwrap_or_else(Vector3::zeros),
        }
    }
}

impl Add for Evaluation {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Evaluation {
            position: self.position + other.position,
            velocity: match (self.velocity, other.velocity) {
                (Some(v1), Some(v2)) => Some(v1 + v2),
                _ => None,
            },
        }
    }
}

impl Sub for Evaluation {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Evaluation {
            position: self.position - other.position,
            velocity: match (self.velocity, other.velocity) {
                (Some(v1), Some(v2)) => Some(v1 - v2),
                _ => None,
            },
        }
    }
}

impl Mul<f64> for Evaluation {
    type Output = Self;

    fn mul(self, k: f64) -> Self::Output {
        Evaluation {
            position: self.position * k,
            velocity: self.velocity.map(|v| v * k),
        }
    }
}

/// Barycentric position (AU) and velocity (AU/day), equatorial J2000 frame.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl Add for StateVector {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        StateVector {
            position: self.position + other.position,
            velocity: self.velocity + other.velocity,
        }
    }
}

impl Sub for StateVector {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        StateVector {
            position: self.position - other.position,
            velocity: self.velocity - other.velocity,
        }
    }
}

#[cfg(test)]
mod state_vector_test {
    use super::*;

    #[test]
    fn test_velocity_dropped_unless_both_present() {
        let a = Evaluation {
            position: Vector3::new(1.0, 2.0, 3.0),
            velocity: Some(Vector3::new(0.1, 0.0, 0.0)),
        };
        let b = Evaluation {
            position: Vector3::new(1.0, 0.0, 0.0),
            velocity: None,
        };
        let c = a + b;
        assert_eq!(c.position, Vector3::new(2.0, 2.0, 3.0));
        assert!(c.velocity.is_none());

        let d = (a - a) * 2.0;
        assert_eq!(d.position, Vector3::zeros());
        assert_eq!(d.velocity, Some(Vector3::zeros()));
    }

    #[test]
    fn test_into_state_zero_velocity() {
        let e = Evaluation {
            position: Vector3::new(1.0, 0.0, 0.0),
            velocity: None,
        };
        assert_eq!(e.into_state().velocity, Vector3::zeros());
    }
}
