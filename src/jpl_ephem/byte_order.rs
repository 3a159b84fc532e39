//! Byte-order aware decoding primitives for the DE binary format.
//!
//! A DE file does not declare its endianness. The only self-description is the
//! version tag (`NUMDE`): read big-endian first, and if the value is not a
//! plausible version number the whole file is little-endian. Every later read
//! goes through the [`ByteOrder`] chosen here.

use std::ops::RangeInclusive;

use nom::{
    bytes::complete::take,
    multi::count,
    number::{complete as num, Endianness},
    IResult, Parser,
};

use crate::skyplace_errors::SkyplaceError;

/// Range of version tags accepted by the big-endian probe.
pub const PLAUSIBLE_VERSIONS: RangeInclusive<i32> = 1..=1999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    /// Pick the byte order from the 4-byte version tag field.
    ///
    /// Returns the chosen order and the tag decoded with it. The little-endian
    /// value is returned as is, even when it is itself implausible; rejecting it
    /// is the version table's job.
    pub fn detect(tag_field: &[u8]) -> Result<(ByteOrder, i32), SkyplaceError> {
        let (_, big) = ByteOrder::Big.i32(tag_field)?;
        if PLAUSIBLE_VERSIONS.contains(&big) {
            return Ok((ByteOrder::Big, big));
        }
        let (_, little) = ByteOrder::Little.i32(tag_field)?;
        Ok((ByteOrder::Little, little))
    }

    fn endianness(self) -> Endianness {
        match self {
            ByteOrder::Big => Endianness::Big,
            ByteOrder::Little => Endianness::Little,
        }
    }

    pub fn i32(self, input: &[u8]) -> IResult<&[u8], i32> {
        num::i32(self.endianness()).parse(input)
    }

    pub fn f64(self, input: &[u8]) -> IResult<&[u8], f64> {
        num::f64(self.endianness()).parse(input)
    }

    pub fn f64_array(self, input: &[u8], n: usize) -> IResult<&[u8], Vec<f64>> {
        count(num::f64(self.endianness()), n).parse(input)
    }

    pub fn i32_triple(self, input: &[u8]) -> IResult<&[u8], [i32; 3]> {
        let (input, a) = self.i32(input)?;
        let (input, b) = self.i32(input)?;
        let (input, c) = self.i32(input)?;
        Ok((input, [a, b, c]))
    }
}

/// Parse a Fortran `CHAR*6` label (6 bytes, blank padded).
pub fn parse_char6(input: &[u8]) -> IResult<&[u8], String> {
    let (rest, raw) = take(6usize).parse(input)?;
    Ok((rest, String::from_utf8_lossy(raw).trim().to_string()))
}

pub fn parse_labels(input: &[u8], n: usize) -> IResult<&[u8], Vec<String>> {
    count(parse_char6, n).parse(input)
}
