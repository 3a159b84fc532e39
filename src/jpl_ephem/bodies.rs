use crate::skyplace_errors::SkyplaceError;

/// Descriptor slot of a quantity stored in a JPL DE binary file.
///
/// The header carries one `(offset, coefficients, sub-intervals)` triple per
/// slot, in this order. Positions are barycentric except [`Body::Moon`], which
/// the file stores geocentric.
///
/// Conversions
/// -----------
/// * [`Body::from_index`] maps a raw slot index (`0..=12`) back to a `Body`.
/// * `body as usize` (or [`Body::index`]) gives the slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Mercury = 0,
    Venus = 1,
    EarthMoonBarycenter = 2,
    Mars = 3,
    Jupiter = 4,
    Saturn = 5,
    Uranus = 6,
    Neptune = 7,
    Pluto = 8,
    Moon = 9,
    Sun = 10,
    Nutation = 11,
    Libration = 12,
}

/// Number of descriptor slots in the header.
pub const BODY_COUNT: usize = 13;

impl Body {
    pub const ALL: [Body; BODY_COUNT] = [
        Body::Mercury,
        Body::Venus,
        Body::EarthMoonBarycenter,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
        Body::Moon,
        Body::Sun,
        Body::Nutation,
        Body::Libration,
    ];

    pub fn from_index(index: usize) -> Result<Self, SkyplaceError> {
        Body::ALL
            .get(index)
            .copied()
            .ok_or_else(|| SkyplaceError::Format(format!("Invalid body index: {index}")))
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Number of coordinates stored per coefficient set.
    ///
    /// Nutation carries (Δψ, Δε); every other slot carries three coordinates.
    /// Libration is not a 2-coordinate slot: DE files store three Euler angles
    /// (φ, θ, ψ) for the lunar mantle, and all three are returned.
    pub fn components(self) -> usize {
        match self {
            Body::Nutation => 2,
            _ => 3,
        }
    }

    /// `true` for slots holding positions in kilometres, `false` for angles.
    pub fn is_position(self) -> bool {
        !matches!(self, Body::Nutation | Body::Libration)
    }
}

#[cfg(test)]
mod bodies_test {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        for (i, body) in Body::ALL.iter().enumerate() {
            assert_eq!(body.index(), i);
            assert_eq!(Body::from_index(i).unwrap(), *body);
        }
        assert!(Body::from_index(13).unwrap_err().is_format_error());
    }

    #[test]
    fn test_components() {
        assert_eq!(Body::Nutation.components(), 2);
        assert_eq!(Body::Libration.components(), 3);
        assert_eq!(Body::Sun.components(), 3);
        assert!(!Body::Libration.is_position());
        assert!(Body::Moon.is_position());
    }
}
