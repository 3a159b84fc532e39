#![allow(dead_code)]

//! Synthetic DE405-layout ephemeris files.
//!
//! The fixture holds twelve 32-day records fitted on an analytic solar system:
//! a slowly drifting Sun, circular heliocentric orbits for the Earth–Moon
//! barycentre and Mars, a circular geocentric Moon and a small periodic
//! nutation. Mercury, Venus, the outer planets and libration are absent.

use std::f64::consts::{PI, TAU};
use std::io::Cursor;
use std::io::Write;
use std::sync::Arc;

use camino::Utf8Path;
use nalgebra::Vector3;
use skyplace::jpl_ephem::byte_order::ByteOrder;
use skyplace::jpl_ephem::{Body, EphemerisStore, LoadSpan};
use tempfile::NamedTempFile;

pub const J2000: f64 = 2_451_545.0;
pub const FIXTURE_START: f64 = 2_451_536.5;
pub const FIXTURE_SPAN: f64 = 32.0;
pub const FIXTURE_RECORDS: usize = 12;
pub const FIXTURE_END: f64 = FIXTURE_START + FIXTURE_SPAN * FIXTURE_RECORDS as f64;
pub const FIXTURE_AU_KM: f64 = 149_597_870.691;
pub const FIXTURE_EMRAT: f64 = 81.30056;
pub const FIXTURE_VERSION: i32 = 405;

const RECORD_LEN: usize = 1018;
const RECORD_BYTES: usize = RECORD_LEN * 8;

/// (slot, 1-based offset, coefficients, sub-intervals)
const SLOTS: [(Body, usize, usize, usize); 5] = [
    (Body::Sun, 3, 7, 1),
    (Body::EarthMoonBarycenter, 24, 10, 2),
    (Body::Moon, 84, 10, 4),
    (Body::Mars, 204, 10, 1),
    (Body::Nutation, 234, 6, 1),
];

const CONSTANTS: [(&str, f64); 4] = [
    ("DENUM", 405.0),
    ("AU", FIXTURE_AU_KM),
    ("EMRAT", FIXTURE_EMRAT),
    ("CLIGHT", 299_792.458),
];

fn obliquity() -> f64 {
    23.439_281f64.to_radians()
}

/// Circular motion in a plane tilted by the obliquity about the x axis.
fn circle(radius: f64, period: f64, phase: f64, t: f64) -> Vector3<f64> {
    let theta = TAU * (t - J2000) / period + phase;
    let (s, c) = theta.sin_cos();
    let eps = obliquity();
    Vector3::new(radius * c, radius * s * eps.cos(), radius * s * eps.sin())
}

/// Raw file value of a slot at `t`: km for positions, radians for nutation.
pub fn model(body: Body, t: f64) -> Vector3<f64> {
    let sun = Vector3::new(1.0e5, -2.0e4, 3.0e3) + Vector3::new(10.0, 5.0, -2.0) * (t - J2000);
    match body {
        Body::Sun => sun,
        Body::EarthMoonBarycenter => sun + circle(FIXTURE_AU_KM, 365.256_36, 1.75, t),
        Body::Moon => circle(384_400.0, 27.321_661, 0.5, t),
        Body::Mars => sun + circle(1.523_679 * FIXTURE_AU_KM, 686.98, 6.2, t),
        Body::Nutation => {
            let omega = TAU * (t - J2000) / 6798.38;
            Vector3::new(-8.3e-5 * omega.sin(), 4.5e-5 * omega.cos(), 0.0)
        }
        other => panic!("{other:?} is not in the fixture"),
    }
}

/// Central-difference derivative of [`model`], per day.
pub fn model_rate(body: Body, t: f64) -> Vector3<f64> {
    let (after, before) = (t + 1e-3, t - 1e-3);
    (model(body, after) - model(body, before)) / (after - before)
}

/// Chebyshev coefficients of `f` on `[a, b]`, from its values at the `n`
/// Chebyshev nodes.
fn chebyshev_fit(f: impl Fn(f64) -> f64, a: f64, b: f64, n: usize) -> Vec<f64> {
    let mid = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let nodes: Vec<(f64, f64)> = (0..n)
        .map(|k| {
            let x = (PI * (k as f64 + 0.5) / n as f64).cos();
            (x, f(mid + half * x))
        })
        .collect();

    (0..n)
        .map(|j| {
            let sum: f64 = nodes
                .iter()
                .map(|(x, fx)| fx * (j as f64 * x.acos()).cos())
                .sum();
            let c = 2.0 / n as f64 * sum;
            if j == 0 {
                c / 2.0
            } else {
                c
            }
        })
        .collect()
}

fn data_record(start: f64) -> Vec<f64> {
    let mut words = vec![0.0; RECORD_LEN];
    words[0] = start;
    words[1] = start + FIXTURE_SPAN;
    for (body, offset, n, n_sub) in SLOTS {
        let components = body.components();
        let width = FIXTURE_SPAN / n_sub as f64;
        for sub in 0..n_sub {
            let a = start + sub as f64 * width;
            for c in 0..components {
                let coeffs = chebyshev_fit(|t| model(body, t)[c], a, a + width, n);
                let first = offset - 1 + sub * n * components + c * n;
                words[first..first + n].copy_from_slice(&coeffs);
            }
        }
    }
    words
}

struct Encoder(ByteOrder);

impl Encoder {
    fn f64(&self, out: &mut Vec<u8>, v: f64) {
        match self.0 {
            ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
            ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
        }
    }

    fn i32(&self, out: &mut Vec<u8>, v: i32) {
        match self.0 {
            ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
            ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
        }
    }
}

fn header_record(enc: &Encoder, version: i32) -> Vec<u8> {
    let mut bytes = vec![b' '; 2652];
    let title = b"JPL Planetary Ephemeris DE405 (synthetic test fixture)";
    bytes[..title.len()].copy_from_slice(title);
    for (k, (name, _)) in CONSTANTS.iter().enumerate() {
        let at = 252 + 6 * k;
        bytes[at..at + name.len()].copy_from_slice(name.as_bytes());
    }

    for v in [FIXTURE_START, FIXTURE_END, FIXTURE_SPAN] {
        enc.f64(&mut bytes, v);
    }
    enc.i32(&mut bytes, CONSTANTS.len() as i32);
    enc.f64(&mut bytes, FIXTURE_AU_KM);
    enc.f64(&mut bytes, FIXTURE_EMRAT);

    for slot in 0..12 {
        let triple = SLOTS
            .iter()
            .find(|(body, ..)| body.index() == slot)
            .map_or([0, 0, 0], |(_, offset, n, n_sub)| {
                [*offset as i32, *n as i32, *n_sub as i32]
            });
        for v in triple {
            enc.i32(&mut bytes, v);
        }
    }
    enc.i32(&mut bytes, version);
    // libration absent
    for v in [0, 0, 0] {
        enc.i32(&mut bytes, v);
    }

    bytes.resize(RECORD_BYTES, 0);
    bytes
}

/// Whole fixture file as bytes.
pub fn fixture_bytes(order: ByteOrder, version: i32) -> Vec<u8> {
    let enc = Encoder(order);
    let mut bytes = header_record(&enc, version);

    let mut constants = Vec::with_capacity(RECORD_BYTES);
    for (_, value) in CONSTANTS {
        enc.f64(&mut constants, value);
    }
    constants.resize(RECORD_BYTES, 0);
    bytes.extend(constants);

    for i in 0..FIXTURE_RECORDS {
        for word in data_record(FIXTURE_START + i as f64 * FIXTURE_SPAN) {
            enc.f64(&mut bytes, word);
        }
    }
    bytes
}

/// Overwrite one float64 word of data record `record` (0-based).
pub fn set_data_word(bytes: &mut [u8], order: ByteOrder, record: usize, word: usize, value: f64) {
    let at = (2 + record) * RECORD_BYTES + word * 8;
    let encoded = match order {
        ByteOrder::Big => value.to_be_bytes(),
        ByteOrder::Little => value.to_le_bytes(),
    };
    bytes[at..at + 8].copy_from_slice(&encoded);
}

/// Fixture written to a temporary file; the file lives as long as the handle.
pub fn write_fixture(order: ByteOrder) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create a temporary file");
    file.write_all(&fixture_bytes(order, FIXTURE_VERSION))
        .expect("Failed to write the fixture");
    file.flush().expect("Failed to flush the fixture");
    file
}

pub fn open_fixture(file: &NamedTempFile, span: LoadSpan) -> EphemerisStore {
    let path = Utf8Path::from_path(file.path()).expect("Temporary path is not UTF-8");
    EphemerisStore::open(path, span).expect("Failed to open the fixture")
}

/// Whole fixture, big-endian, loaded from memory.
pub fn fixture_store() -> Arc<EphemerisStore> {
    let bytes = fixture_bytes(ByteOrder::Big, FIXTURE_VERSION);
    Arc::new(
        EphemerisStore::from_reader(Cursor::new(bytes), LoadSpan::full())
            .expect("Failed to load the fixture"),
    )
}

/// Earth centre from the model, km.
pub fn model_earth(t: f64) -> Vector3<f64> {
    model(Body::EarthMoonBarycenter, t) - model(Body::Moon, t) / (1.0 + FIXTURE_EMRAT)
}
