//! # Ephemeris store
//!
//! [`EphemerisStore`] owns the decoded header, the constants record and the
//! subset of data records covering a requested time span. Once built it is
//! immutable: [`EphemerisStore::evaluate`] takes `&self` and allocates its
//! Chebyshev scratch per call, so one store can be shared behind an
//! [`Arc`](std::sync::Arc) by any number of readers.
//!
//! Units
//! -----------------
//! * Times are Julian Dates on the TDB scale.
//! * Position-type slots are returned in AU and AU/day, using the file's own
//!   AU constant. Nutation and libration are returned in radians and radians/day.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};

use camino::Utf8Path;
use log::debug;

use crate::constants::{JulianDate, AU};
use crate::skyplace_errors::SkyplaceError;

use super::bodies::Body;
use super::byte_order::ByteOrder;
use super::header::{BodyDescriptor, EphemerisHeader, HEADER_LEN};
use super::records::CoefficientRecord;
use super::state_vector::Evaluation;

/// Time window to load from a file.
///
/// A bound equal to `0.0` means "use the file's own bound".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadSpan {
    pub start: JulianDate,
    pub end: JulianDate,
}

impl LoadSpan {
    /// The whole file.
    pub fn full() -> Self {
        LoadSpan {
            start: 0.0,
            end: 0.0,
        }
    }

    pub fn new(start: JulianDate, end: JulianDate) -> Self {
        LoadSpan { start, end }
    }

    fn resolve(&self, header: &EphemerisHeader) -> (JulianDate, JulianDate) {
        let start = if self.start == 0.0 {
            header.start
        } else {
            self.start
        };
        let end = if self.end == 0.0 { header.end } else { self.end };
        (start, end)
    }
}

impl Default for LoadSpan {
    fn default() -> Self {
        LoadSpan::full()
    }
}

#[derive(Debug, Clone)]
pub struct EphemerisStore {
    header: EphemerisHeader,
    constants: Vec<(String, f64)>,
    records: Vec<CoefficientRecord>,
    au_km: f64,
}

/// `read_exact` that reports a truncated file as a format problem.
fn read_block<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<(), SkyplaceError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => SkyplaceError::Format(format!("File truncated in {what}")),
        _ => SkyplaceError::Io(e),
    })
}

impl EphemerisStore {
    /// Open a DE binary file and load the records intersecting `span`.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: location of the binary file (e.g. `lnxp1600p2200.405`, `linux_p1550p2650.440`).
    /// * `span`: time window to keep; see [`LoadSpan`].
    ///
    /// Return
    /// ----------
    /// * A fully loaded store, or an error. No partially loaded store is ever returned.
    ///
    /// Errors
    /// ----------
    /// * [`SkyplaceError::InvalidSpan`] when a bound is not finite or the start of
    ///   the window is after its end.
    /// * [`SkyplaceError::Format`] for an unknown DE version, a malformed header,
    ///   non-contiguous records or a truncated file.
    /// * [`SkyplaceError::OutOfRange`] when the window lies outside the file or
    ///   no record intersects it.
    /// * [`SkyplaceError::Io`] when the file cannot be read.
    pub fn open(path: impl AsRef<Utf8Path>, span: LoadSpan) -> Result<Self, SkyplaceError> {
        let path = path.as_ref();
        debug!("Opening DE ephemeris file {path}");
        let file = File::open(path)?;
        EphemerisStore::from_reader(BufReader::new(file), span)
    }

    /// Same as [`EphemerisStore::open`] for any seekable byte source.
    pub fn from_reader<R: Read + Seek>(
        mut reader: R,
        span: LoadSpan,
    ) -> Result<Self, SkyplaceError> {
        if !span.start.is_finite() || !span.end.is_finite() {
            return Err(SkyplaceError::InvalidSpan {
                start: span.start,
                end: span.end,
            });
        }
        if span.start != 0.0 && span.end != 0.0 && span.start > span.end {
            return Err(SkyplaceError::InvalidSpan {
                start: span.start,
                end: span.end,
            });
        }

        let mut fixed = vec![0u8; HEADER_LEN];
        read_block(&mut reader, &mut fixed, "header")?;
        let mut header = EphemerisHeader::parse(&fixed)?;

        if header.extended_names_len() > 0 {
            let mut extended = vec![0u8; HEADER_LEN + header.extended_names_len()];
            reader.seek(SeekFrom::Start(0))?;
            read_block(&mut reader, &mut extended, "extended constant names")?;
            header.read_extended_names(&extended)?;
        }

        let (start, end) = span.resolve(&header);
        if start > end {
            return Err(SkyplaceError::InvalidSpan { start, end });
        }
        if start > header.end || end < header.start {
            return Err(SkyplaceError::OutOfRange {
                time: if start > header.end { start } else { end },
                earliest: header.start,
                latest: header.end,
            });
        }

        let record_bytes = header.record_bytes();
        let mut buffer = vec![0u8; record_bytes];

        reader.seek(SeekFrom::Start(record_bytes as u64))?;
        read_block(&mut reader, &mut buffer, "constants record")?;
        let (_, values) = header.byte_order.f64_array(&buffer, header.ncon)?;
        let constants: Vec<(String, f64)> =
            header.constant_names.iter().cloned().zip(values).collect();

        let records = load_records(&mut reader, &header, &mut buffer, start, end)?;

        let au_km = if header.au_km > 0.0 {
            header.au_km
        } else {
            constants
                .iter()
                .find(|(name, _)| name == "AU")
                .map(|(_, v)| *v)
                .unwrap_or(AU)
        };

        let store = EphemerisStore {
            header,
            constants,
            records,
            au_km,
        };

        debug!(
            "Loaded DE{} ({:?} endian, {} words per record): {} records covering [{}, {}]",
            store.de_version(),
            store.byte_order(),
            store.header.record_len,
            store.record_count(),
            store.earliest(),
            store.latest()
        );

        Ok(store)
    }

    /// Position (and optionally velocity) of one slot at `time`.
    ///
    /// The Moon is geocentric, every other position is barycentric, all in the
    /// equatorial J2000 frame.
    ///
    /// Errors
    /// ----------
    /// * [`SkyplaceError::OutOfRange`] if `time` is outside [`earliest`](Self::earliest), [`latest`](Self::latest).
    /// * [`SkyplaceError::AbsentBody`] if the file holds no coefficients for `body`.
    pub fn evaluate(
        &self,
        time: JulianDate,
        body: Body,
        want_velocity: bool,
    ) -> Result<Evaluation, SkyplaceError> {
        let (earliest, latest) = (self.earliest(), self.latest());
        if !(earliest..=latest).contains(&time) {
            return Err(SkyplaceError::OutOfRange {
                time,
                earliest,
                latest,
            });
        }

        let descriptor = self.header.descriptor(body);
        if !descriptor.is_present() {
            return Err(SkyplaceError::AbsentBody(body));
        }

        let span = self.header.span;
        let index = (((time - earliest) / span).floor() as usize).min(self.records.len() - 1);
        let record = &self.records[index];
        let fraction = (time - record.start) / span;

        let raw = record.interpolate(descriptor, body.components(), fraction, span, want_velocity);
        if body.is_position() {
            Ok(raw * (1.0 / self.au_km))
        } else {
            Ok(raw)
        }
    }

    /// Value of a named header constant (`"AU"`, `"EMRAT"`, `"GMS"`, ...).
    pub fn constant(&self, name: &str) -> Option<f64> {
        self.constants
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// All header constants in file order.
    pub fn constants(&self) -> impl Iterator<Item = (&str, f64)> {
        self.constants.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn de_version(&self) -> i32 {
        self.header.de_version
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.header.byte_order
    }

    pub fn titles(&self) -> &[String] {
        &self.header.titles
    }

    /// Days covered by one record.
    pub fn record_span(&self) -> f64 {
        self.header.span
    }

    /// Kilometres per astronomical unit used for the unit conversion.
    pub fn au_km(&self) -> f64 {
        self.au_km
    }

    pub fn earth_moon_mass_ratio(&self) -> f64 {
        self.header.emrat
    }

    /// Start of the first loaded record.
    pub fn earliest(&self) -> JulianDate {
        self.records.first().map_or(self.header.start, |r| r.start)
    }

    /// End of the last loaded record.
    pub fn latest(&self) -> JulianDate {
        self.records.last().map_or(self.header.end, |r| r.end)
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn max_coefficients(&self) -> usize {
        self.header.max_coefficients()
    }

    pub fn descriptor(&self, body: Body) -> &BodyDescriptor {
        self.header.descriptor(body)
    }

    pub fn has_body(&self, body: Body) -> bool {
        self.descriptor(body).is_present()
    }
}

/// Read the data records intersecting `[start, end]`.
///
/// Reading starts one record before the nominal position of `start` and stops
/// at the first record beginning after `end` or at the end of the file. A
/// record merely touching the window on its edge is dropped when a neighbour
/// already covers that edge.
fn load_records<R: Read + Seek>(
    reader: &mut R,
    header: &EphemerisHeader,
    buffer: &mut [u8],
    start: JulianDate,
    end: JulianDate,
) -> Result<Vec<CoefficientRecord>, SkyplaceError> {
    let record_bytes = header.record_bytes() as u64;
    let first = ((start - header.start) / header.span).floor().max(1.0) as u64 - 1;
    let offset = first
        .checked_add(2)
        .and_then(|index| index.checked_mul(record_bytes))
        .ok_or_else(|| SkyplaceError::OutOfRange {
            time: start,
            earliest: header.start,
            latest: header.end,
        })?;
    reader.seek(SeekFrom::Start(offset))?;

    let mut records: Vec<CoefficientRecord> = Vec::new();
    loop {
        match reader.read_exact(buffer) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
        let record = CoefficientRecord::parse(buffer, header.byte_order, header.record_len)?;
        if record.start > end {
            break;
        }
        if record.end < start {
            continue;
        }
        records.push(record);
    }

    if records.len() > 1 && records[0].end == start {
        records.remove(0);
    }
    if records.len() > 1 && records[records.len() - 1].start == end {
        records.pop();
    }

    if records.is_empty() {
        return Err(SkyplaceError::OutOfRange {
            time: start,
            earliest: header.start,
            latest: header.end,
        });
    }

    let tolerance = header.span * 1e-9;
    for pair in records.windows(2) {
        if pair[1].start != pair[0].end {
            return Err(SkyplaceError::Format(format!(
                "Records not contiguous: one ends at {}, the next starts at {}",
                pair[0].end, pair[1].start
            )));
        }
    }
    if let Some(bad) = records
        .iter()
        .find(|r| ((r.end - r.start) - header.span).abs() > tolerance)
    {
        return Err(SkyplaceError::Format(format!(
            "Record [{}, {}] does not span {} days",
            bad.start, bad.end, header.span
        )));
    }

    Ok(records)
}
