use thiserror::Error;

use crate::constants::JulianDate;
use crate::jpl_ephem::bodies::Body;

#[derive(Error, Debug)]
pub enum SkyplaceError {
    #[error("Invalid ephemeris format: {0}")]
    Format(String),

    #[error("Error during the nom parsing: {0}")]
    NomParsing(String),

    #[error("Time {time} is outside the loaded ephemeris span [{earliest}, {latest}]")]
    OutOfRange {
        time: JulianDate,
        earliest: JulianDate,
        latest: JulianDate,
    },

    #[error("Body {0:?} has no coefficients in this ephemeris")]
    AbsentBody(Body),

    #[error("Apparent place requested before a successful calculation")]
    NotCalculated,

    #[error("{0:?} cannot be used as a moving point")]
    InvalidBody(Body),

    #[error("Invalid load span: start {start} is after end {end}")]
    InvalidSpan { start: JulianDate, end: JulianDate },

    #[error("Light-time iteration did not converge after {iterations} iterations (last correction {last_correction} d)")]
    LightTimeDiverged {
        iterations: usize,
        last_correction: f64,
    },

    #[error("Unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),
}

impl SkyplaceError {
    /// Malformed header, unknown version tag or undecodable bytes.
    pub fn is_format_error(&self) -> bool {
        matches!(self, SkyplaceError::Format(_) | SkyplaceError::NomParsing(_))
    }

    /// Time outside the loaded span or absent body component.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            SkyplaceError::OutOfRange { .. } | SkyplaceError::AbsentBody(_)
        )
    }

    /// The light-time iteration hit its cap.
    pub fn is_convergence_error(&self) -> bool {
        matches!(self, SkyplaceError::LightTimeDiverged { .. })
    }

    pub fn is_state_error(&self) -> bool {
        matches!(self, SkyplaceError::NotCalculated)
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SkyplaceError::InvalidSpan { .. } | SkyplaceError::InvalidBody(_)
        )
    }
}

impl<E: std::fmt::Debug> From<nom::Err<E>> for SkyplaceError {
    fn from(err: nom::Err<E>) -> Self {
        SkyplaceError::NomParsing(format!("{err:?}"))
    }
}

impl PartialEq for SkyplaceError {
    fn eq(&self, other: &Self) -> bool {
        use SkyplaceError::*;
        match (self, other) {
            (Format(a), Format(b)) => a == b,
            (NomParsing(a), NomParsing(b)) => a == b,
            (
                OutOfRange {
                    time: t1,
                    earliest: e1,
                    latest: l1,
                },
                OutOfRange {
                    time: t2,
                    earliest: e2,
                    latest: l2,
                },
            ) => t1 == t2 && e1 == e2 && l1 == l2,
            (AbsentBody(a), AbsentBody(b)) => a == b,
            (InvalidBody(a), InvalidBody(b)) => a == b,
            (InvalidSpan { start: s1, end: e1 }, InvalidSpan { start: s2, end: e2 }) => {
                s1 == s2 && e1 == e2
            }
            (
                LightTimeDiverged {
                    iterations: i1,
                    last_correction: c1,
                },
                LightTimeDiverged {
                    iterations: i2,
                    last_correction: c2,
                },
            ) => i1 == i2 && c1 == c2,

            // I/O errors are not comparable: equal if same variant
            (Io(_), Io(_)) => true,

            (NotCalculated, NotCalculated) => true,

            _ => false,
        }
    }
}
