use nalgebra::Vector3;
use smallvec::SmallVec;

use crate::constants::JulianDate;
use crate::skyplace_errors::SkyplaceError;

use super::byte_order::ByteOrder;
use super::header::BodyDescriptor;
use super::state_vector::Evaluation;

/// Inline capacity of the per-call Chebyshev scratch. DE files use at most 18
/// coefficients per coordinate, so this never spills to the heap in practice.
pub type ChebyshevScratch = SmallVec<[f64; 32]>;

/// Chebyshev polynomials of the first kind `T_0(x) … T_{n-1}(x)`.
///
/// `T0 = 1`, `T1 = x`, `Ti = 2x·T(i−1) − T(i−2)`.
pub fn chebyshev_basis(x: f64, n: usize) -> ChebyshevScratch {
    let mut t = ChebyshevScratch::with_capacity(n);
    for i in 0..n {
        let value = match i {
            0 => 1.0,
            1 => x,
            _ => 2.0 * x * t[i - 1] - t[i - 2],
        };
        t.push(value);
    }
    t
}

/// Derivatives `U_i = dT_i/dx` built from the first-kind basis `t`.
///
/// `U0 = 0`, `U1 = 1`, `Ui = 2x·U(i−1) − U(i−2) + 2·T(i−1)`.
pub fn chebyshev_derivative_basis(x: f64, t: &[f64]) -> ChebyshevScratch {
    let mut u = ChebyshevScratch::with_capacity(t.len());
    for i in 0..t.len() {
        let value = match i {
            0 => 0.0,
            1 => 1.0,
            _ => 2.0 * x * u[i - 1] - u[i - 2] + 2.0 * t[i - 1],
        };
        u.push(value);
    }
    u
}

fn series(coefficients: &[f64], basis: &[f64]) -> f64 {
    coefficients.iter().zip(basis).map(|(c, b)| c * b).sum()
}

/// One fixed-length data record: `[start, end, coefficients...]`.
///
/// The coefficients are kept as one flat array in file order so that the
/// 1-based descriptor offsets index it directly.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientRecord {
    pub start: JulianDate,
    pub end: JulianDate,
    data: Vec<f64>,
}

impl CoefficientRecord {
    /// Decode a record of `record_len` float64 words.
    pub fn parse(
        input: &[u8],
        order: ByteOrder,
        record_len: usize,
    ) -> Result<Self, SkyplaceError> {
        let (_, data) = order.f64_array(input, record_len)?;
        CoefficientRecord::from_words(data)
    }

    pub fn from_words(data: Vec<f64>) -> Result<Self, SkyplaceError> {
        match data.as_slice() {
            [start, end, ..] => Ok(CoefficientRecord {
                start: *start,
                end: *end,
                data,
            }),
            _ => Err(SkyplaceError::Format(
                "Data record shorter than its two time words".into(),
            )),
        }
    }

    /// Coefficients of coordinate `component` in sub-interval `sub`.
    fn coefficients(
        &self,
        descriptor: &BodyDescriptor,
        components: usize,
        sub: usize,
        component: usize,
    ) -> &[f64] {
        let n = descriptor.n_coeffs;
        let first = descriptor.offset - 1 + sub * n * components + component * n;
        &self.data[first..first + n]
    }

    /// Evaluate one slot at `fraction ∈ [0, 1]` of this record.
    ///
    /// Arguments
    /// -----------------
    /// * `descriptor`: slot layout, validated against the record length by the header.
    /// * `components`: 2 for nutation, 3 otherwise. A 2-component result has `z = 0`.
    /// * `fraction`: normalized position of the epoch inside the record.
    /// * `span`: record span in days, for the velocity chain rule.
    /// * `want_velocity`: evaluate the derivative series too.
    ///
    /// Return
    /// ----------
    /// * Raw file units: km and km/day, or radians and radians/day.
    pub fn interpolate(
        &self,
        descriptor: &BodyDescriptor,
        components: usize,
        fraction: f64,
        span: f64,
        want_velocity: bool,
    ) -> Evaluation {
        let n_sub = descriptor.n_subintervals;
        let scaled = fraction.clamp(0.0, 1.0) * n_sub as f64;
        let sub = (scaled.floor() as usize).min(n_sub - 1);
        let x = 2.0 * (scaled - sub as f64) - 1.0;

        let t = chebyshev_basis(x, descriptor.n_coeffs);
        let mut position = Vector3::zeros();
        for c in 0..components {
            position[c] = series(self.coefficients(descriptor, components, sub, c), &t);
        }

        let velocity = want_velocity.then(|| {
            let u = chebyshev_derivative_basis(x, &t);
            let vfac = 2.0 * n_sub as f64 / span;
            let mut velocity = Vector3::zeros();
            for c in 0..components {
                velocity[c] = vfac * series(self.coefficients(descriptor, components, sub, c), &u);
            }
            velocity
        });

        Evaluation { position, velocity }
    }
}
