//! # DE binary header
//!
//! The first record of a JPL DE binary file is laid out as follows (byte offsets):
//!
//! | Offset | Content |
//! |-------:|---------|
//! | 0      | 3 title lines, 84 characters each |
//! | 252    | 400 constant names, `CHAR*6` |
//! | 2652   | start JD, end JD, record span (3 × f64) |
//! | 2676   | number of constants (i32) |
//! | 2680   | AU in km, Earth/Moon mass ratio (2 × f64) |
//! | 2696   | descriptor triples for the first 12 slots (36 × i32) |
//! | 2840   | DE version tag (i32) |
//! | 2844   | libration descriptor triple (3 × i32) |
//! | 2856   | constant names beyond the 400th, when present |
//!
//! The byte order of every numeric field is decided once, from the version tag
//! (see [`ByteOrder::detect`]).

use crate::constants::JulianDate;
use crate::skyplace_errors::SkyplaceError;

use super::bodies::{Body, BODY_COUNT};
use super::byte_order::{parse_labels, ByteOrder};

/// Size of the fixed part of the header.
pub const HEADER_LEN: usize = 2856;

/// Number of constant names stored in the fixed part of the header.
pub const OLD_MAX: usize = 400;

const TITLE_LEN: usize = 84;
const TITLE_LINES: usize = 3;
const SS_OFFSET: usize = 2652;
const IPT_OFFSET: usize = 2696;
const NUMDE_OFFSET: usize = 2840;
const LPT_OFFSET: usize = 2844;

/// Number of float64 words per record for the known DE releases.
pub fn record_length(de_version: i32) -> Result<usize, SkyplaceError> {
    match de_version {
        102 => Ok(773),
        200 | 202 => Ok(826),
        406 => Ok(728),
        403 | 405 | 410 | 413 | 414 | 418 | 421 | 422 | 423 | 430 | 431 | 432 | 436 | 438
        | 440 | 441 => Ok(1018),
        other => Err(SkyplaceError::Format(format!(
            "Unknown DE version tag: {other}"
        ))),
    }
}

/// Location of one slot's coefficients inside a record.
///
/// * `offset`: 1-based index of the first coefficient in the record, the two
///   leading time words included.
/// * `n_coeffs`: Chebyshev coefficients per coordinate and sub-interval.
/// * `n_subintervals`: sub-intervals per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BodyDescriptor {
    pub offset: usize,
    pub n_coeffs: usize,
    pub n_subintervals: usize,
}

impl BodyDescriptor {
    fn from_triple(body: Body, triple: [i32; 3]) -> Result<Self, SkyplaceError> {
        let field = |v: i32| {
            usize::try_from(v).map_err(|_| {
                SkyplaceError::Format(format!("Negative descriptor entry for {body:?}: {triple:?}"))
            })
        };
        Ok(BodyDescriptor {
            offset: field(triple[0])?,
            n_coeffs: field(triple[1])?,
            n_subintervals: field(triple[2])?,
        })
    }

    pub fn is_present(&self) -> bool {
        self.n_coeffs > 0 && self.n_subintervals > 0
    }

    /// Number of words this slot occupies in a record.
    pub fn block_len(&self, components: usize) -> usize {
        self.n_coeffs * components * self.n_subintervals
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisHeader {
    pub titles: Vec<String>,
    pub de_version: i32,
    pub byte_order: ByteOrder,
    pub start: JulianDate,
    pub end: JulianDate,
    pub span: f64,
    pub ncon: usize,
    pub au_km: f64,
    pub emrat: f64,
    pub descriptors: [BodyDescriptor; BODY_COUNT],
    /// float64 words per record
    pub record_len: usize,
    pub constant_names: Vec<String>,
}

impl EphemerisHeader {
    /// Decode the fixed part of the header.
    ///
    /// `bytes` must hold at least [`HEADER_LEN`] bytes. Constant names past the
    /// 400th are left out; see [`EphemerisHeader::read_extended_names`].
    ///
    /// Errors
    /// ----------
    /// * [`SkyplaceError::Format`] for a short buffer, an unknown version tag, an
    ///   empty or inverted time span, or a descriptor pointing outside the record.
    pub fn parse(bytes: &[u8]) -> Result<Self, SkyplaceError> {
        if bytes.len() < HEADER_LEN {
            return Err(SkyplaceError::Format(format!(
                "Header truncated: {} bytes, expected at least {HEADER_LEN}",
                bytes.len()
            )));
        }

        let (byte_order, de_version) =
            ByteOrder::detect(&bytes[NUMDE_OFFSET..NUMDE_OFFSET + 4])?;
        let record_len = record_length(de_version)?;

        let titles = bytes[..TITLE_LEN * TITLE_LINES]
            .chunks(TITLE_LEN)
            .map(|line| String::from_utf8_lossy(line).trim().to_string())
            .collect();

        let (_, names) = parse_labels(&bytes[TITLE_LEN * TITLE_LINES..SS_OFFSET], OLD_MAX)?;

        let (input, ss) = byte_order.f64_array(&bytes[SS_OFFSET..], 3)?;
        let (input, ncon) = byte_order.i32(input)?;
        let (input, au_km) = byte_order.f64(input)?;
        let (_, emrat) = byte_order.f64(input)?;

        let mut descriptors = [BodyDescriptor::default(); BODY_COUNT];
        let mut input = &bytes[IPT_OFFSET..NUMDE_OFFSET];
        for body in &Body::ALL[..BODY_COUNT - 1] {
            let (rest, triple) = byte_order.i32_triple(input)?;
            descriptors[body.index()] = BodyDescriptor::from_triple(*body, triple)?;
            input = rest;
        }
        let (_, lpt) = byte_order.i32_triple(&bytes[LPT_OFFSET..HEADER_LEN])?;
        descriptors[Body::Libration.index()] = BodyDescriptor::from_triple(Body::Libration, lpt)?;

        let ncon = usize::try_from(ncon)
            .map_err(|_| SkyplaceError::Format(format!("Negative constant count: {ncon}")))?;
        if ncon > record_len {
            return Err(SkyplaceError::Format(format!(
                "{ncon} constants do not fit in a record of {record_len} words"
            )));
        }

        let header = EphemerisHeader {
            titles,
            de_version,
            byte_order,
            start: ss[0],
            end: ss[1],
            span: ss[2],
            ncon,
            au_km,
            emrat,
            descriptors,
            record_len,
            constant_names: names.into_iter().take(ncon.min(OLD_MAX)).collect(),
        };
        header.validate()?;
        Ok(header)
    }

    /// Number of bytes occupied by constant names beyond the 400th.
    pub fn extended_names_len(&self) -> usize {
        self.ncon.saturating_sub(OLD_MAX) * 6
    }

    /// Append the constant names stored after the fixed header.
    ///
    /// `bytes` is the header record from its first byte; it must cover
    /// `HEADER_LEN + extended_names_len()` bytes.
    pub fn read_extended_names(&mut self, bytes: &[u8]) -> Result<(), SkyplaceError> {
        let extra = self.ncon.saturating_sub(OLD_MAX);
        if extra == 0 {
            return Ok(());
        }
        let area = bytes.get(HEADER_LEN..HEADER_LEN + extra * 6).ok_or_else(|| {
            SkyplaceError::Format(format!("Header too short for {} constant names", self.ncon))
        })?;
        let (_, names) = parse_labels(area, extra)?;
        self.constant_names.extend(names);
        Ok(())
    }

    /// Record size in bytes.
    pub fn record_bytes(&self) -> usize {
        self.record_len * 8
    }

    pub fn descriptor(&self, body: Body) -> &BodyDescriptor {
        &self.descriptors[body.index()]
    }

    /// Highest coefficient count across all slots.
    pub fn max_coefficients(&self) -> usize {
        self.descriptors
            .iter()
            .map(|d| d.n_coeffs)
            .max()
            .unwrap_or(0)
    }

    fn validate(&self) -> Result<(), SkyplaceError> {
        if !(self.span > 0.0) || !(self.start < self.end) {
            return Err(SkyplaceError::Format(format!(
                "Invalid time span: start {}, end {}, record span {}",
                self.start, self.end, self.span
            )));
        }
        for body in Body::ALL {
            let d = self.descriptor(body);
            if !d.is_present() {
                continue;
            }
            let last = d.offset.saturating_sub(1) + d.block_len(body.components());
            if d.offset < 3 || last > self.record_len {
                return Err(SkyplaceError::Format(format!(
                    "Descriptor of {body:?} ({d:?}) exceeds a record of {} words",
                    self.record_len
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod header_test {
    use super::*;

    /// Minimal DE405-like header: Sun only, one constant.
    fn raw_header(order: ByteOrder, version: i32) -> Vec<u8> {
        let f = |v: f64| match order {
            ByteOrder::Big => v.to_be_bytes(),
            ByteOrder::Little => v.to_le_bytes(),
        };
        let i = |v: i32| match order {
            ByteOrder::Big => v.to_be_bytes(),
            ByteOrder::Little => v.to_le_bytes(),
        };

        let mut bytes = vec![b' '; SS_OFFSET];
        bytes[..9].copy_from_slice(b"TEST FILE");
        bytes[252..254].copy_from_slice(b"AU");
        bytes[258..263].copy_from_slice(b"EMRAT");
        for v in [2451536.5, 2451600.5, 32.0] {
            bytes.extend_from_slice(&f(v));
        }
        bytes.extend_from_slice(&i(2));
        bytes.extend_from_slice(&f(149597870.691));
        bytes.extend_from_slice(&f(81.30056));
        for slot in 0..12 {
            let triple = if slot == Body::Sun.index() {
                [3, 11, 2]
            } else {
                [0, 0, 0]
            };
            for v in triple {
                bytes.extend_from_slice(&i(v));
            }
        }
        bytes.extend_from_slice(&i(version));
        for v in [0, 0, 0] {
            bytes.extend_from_slice(&i(v));
        }
        bytes
    }

    #[test]
    fn test_record_length_table() {
        assert_eq!(record_length(405).unwrap(), 1018);
        assert_eq!(record_length(440).unwrap(), 1018);
        assert_eq!(record_length(200).unwrap(), 826);
        assert_eq!(record_length(406).unwrap(), 728);
        assert_eq!(record_length(102).unwrap(), 773);
        assert!(record_length(999).unwrap_err().is_format_error());
    }

    #[test]
    fn test_parse_both_byte_orders() {
        for order in [ByteOrder::Big, ByteOrder::Little] {
            let header = EphemerisHeader::parse(&raw_header(order, 405)).unwrap();
            assert_eq!(header.byte_order, order);
            assert_eq!(header.de_version, 405);
            assert_eq!(header.record_len, 1018);
            assert_eq!(header.start, 2451536.5);
            assert_eq!(header.span, 32.0);
            assert_eq!(header.emrat, 81.30056);
            assert_eq!(header.constant_names, vec!["AU", "EMRAT"]);
            assert_eq!(header.titles[0], "TEST FILE");
            assert_eq!(
                *header.descriptor(Body::Sun),
                BodyDescriptor {
                    offset: 3,
                    n_coeffs: 11,
                    n_subintervals: 2
                }
            );
            assert!(!header.descriptor(Body::Mars).is_present());
            assert_eq!(header.max_coefficients(), 11);
        }
    }

    #[test]
    fn test_unknown_version_is_fatal() {
        let err = EphemerisHeader::parse(&raw_header(ByteOrder::Big, 999)).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_truncated_header() {
        let bytes = raw_header(ByteOrder::Big, 405);
        let err = EphemerisHeader::parse(&bytes[..2000]).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_descriptor_outside_record() {
        let mut bytes = raw_header(ByteOrder::Big, 405);
        // Sun: 200 coefficients × 3 × 2 sub-intervals overflows 1018 words.
        let sun_coeffs = IPT_OFFSET + Body::Sun.index() * 12 + 4;
        bytes[sun_coeffs..sun_coeffs + 4].copy_from_slice(&200i32.to_be_bytes());
        assert!(EphemerisHeader::parse(&bytes).unwrap_err().is_format_error());
    }

    #[test]
    fn test_extended_names() {
        let mut bytes = raw_header(ByteOrder::Little, 440);
        let ncon = SS_OFFSET + 24;
        bytes[ncon..ncon + 4].copy_from_slice(&402i32.to_le_bytes());
        let mut header = EphemerisHeader::parse(&bytes).unwrap();
        assert_eq!(header.constant_names.len(), OLD_MAX);
        assert_eq!(header.extended_names_len(), 12);

        assert!(header.read_extended_names(&bytes).is_err());

        bytes.extend_from_slice(b"GMB11 GMB12 ");
        header.read_extended_names(&bytes).unwrap();
        assert_eq!(header.constant_names.len(), 402);
        assert_eq!(header.constant_names[400], "GMB11");
        assert_eq!(header.constant_names[401], "GMB12");
    }
}
