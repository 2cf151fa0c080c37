//! Connection types and the compatibility matrix.
//!
//! Every connection on a part has one of [`ConnectionType::COUNT`] physical
//! kinds. Whether two kinds bond, block each other, or simply pass by is read
//! from a literal table: the rows are versioned data, not a rule, and several
//! entries are deliberately asymmetric.

use std::fmt;
use std::str::FromStr;

use crate::error::ConnectivityError;

/// Outcome of bringing two connection types together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionMatch {
    /// The types are incompatible and block placement.
    Reject,
    /// The types do not interact.
    Ignore,
    /// The types may form a bond.
    Connect,
}

impl ConnectionMatch {
    const fn from_byte(byte: u8) -> Self {
        match byte {
            b'c' => Self::Connect,
            b'r' => Self::Reject,
            _ => Self::Ignore,
        }
    }
}

/// The physical kind of a connection.
///
/// The first [`ConnectionType::CONNECTOR_COUNT`] variants sit on connector
/// fields (knobs, pins, bars), the rest on receptor fields (tubes, holes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ConnectionType {
    Knob,
    HollowKnob,
    KnobFitInPegHole,
    HollowKnobFitInPegHole,
    SquareKnob,
    HollowSquareKnob,
    JumperKnob,
    TubeGap,
    Bar,
    Handle,
    Pin,
    HalfPin,
    Axle,
    Ball,
    TowBall,
    DuploKnob,
    DuploHollowKnob,
    DuploAnimalKnob,
    DuploTubeGap,
    ConnectorBlocker,
    Tube,
    BottomTube,
    SmallTube,
    HollowTube,
    AntiKnob,
    SquareAntiKnob,
    PegHole,
    SecondaryPin,
    SecondaryPinWithSmallCollision,
    SecondaryPinWithTinyCollision,
    Clip,
    PinHole,
    PinHoleWithFriction,
    AxleHole,
    BallSocket,
    TowBallSocket,
    DuploTube,
    DuploBottomTube,
    DuploAntiKnob,
    DuploAnimalAntiKnob,
    DuploSecondaryPin,
    DuploSystemTube,
    ReceptorBlocker,
}

impl ConnectionType {
    /// Number of connection types.
    pub const COUNT: usize = 43;

    /// Number of connector-side types; they come first in [`Self::ALL`].
    pub const CONNECTOR_COUNT: usize = 20;

    /// Every type in matrix order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Knob,
        Self::HollowKnob,
        Self::KnobFitInPegHole,
        Self::HollowKnobFitInPegHole,
        Self::SquareKnob,
        Self::HollowSquareKnob,
        Self::JumperKnob,
        Self::TubeGap,
        Self::Bar,
        Self::Handle,
        Self::Pin,
        Self::HalfPin,
        Self::Axle,
        Self::Ball,
        Self::TowBall,
        Self::DuploKnob,
        Self::DuploHollowKnob,
        Self::DuploAnimalKnob,
        Self::DuploTubeGap,
        Self::ConnectorBlocker,
        Self::Tube,
        Self::BottomTube,
        Self::SmallTube,
        Self::HollowTube,
        Self::AntiKnob,
        Self::SquareAntiKnob,
        Self::PegHole,
        Self::SecondaryPin,
        Self::SecondaryPinWithSmallCollision,
        Self::SecondaryPinWithTinyCollision,
        Self::Clip,
        Self::PinHole,
        Self::PinHoleWithFriction,
        Self::AxleHole,
        Self::BallSocket,
        Self::TowBallSocket,
        Self::DuploTube,
        Self::DuploBottomTube,
        Self::DuploAntiKnob,
        Self::DuploAnimalAntiKnob,
        Self::DuploSecondaryPin,
        Self::DuploSystemTube,
        Self::ReceptorBlocker,
    ];

    /// Row/column of this type in the matrix.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Single-bit mask of this type.
    #[must_use]
    pub const fn bit(self) -> u64 {
        1 << self.index()
    }

    /// Whether this type belongs on a connector field.
    #[must_use]
    pub const fn is_connector_side(self) -> bool {
        self.index() < Self::CONNECTOR_COUNT
    }

    /// Mask of every type this one connects to (row of the matrix).
    #[must_use]
    pub const fn connect_mask(self) -> u64 {
        CONNECT_MASKS[self.index()]
    }

    /// The type's name, as used in connectivity descriptions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Knob => "Knob",
            Self::HollowKnob => "HollowKnob",
            Self::KnobFitInPegHole => "KnobFitInPegHole",
            Self::HollowKnobFitInPegHole => "HollowKnobFitInPegHole",
            Self::SquareKnob => "SquareKnob",
            Self::HollowSquareKnob => "HollowSquareKnob",
            Self::JumperKnob => "JumperKnob",
            Self::TubeGap => "TubeGap",
            Self::Bar => "Bar",
            Self::Handle => "Handle",
            Self::Pin => "Pin",
            Self::HalfPin => "HalfPin",
            Self::Axle => "Axle",
            Self::Ball => "Ball",
            Self::TowBall => "TowBall",
            Self::DuploKnob => "DuploKnob",
            Self::DuploHollowKnob => "DuploHollowKnob",
            Self::DuploAnimalKnob => "DuploAnimalKnob",
            Self::DuploTubeGap => "DuploTubeGap",
            Self::ConnectorBlocker => "ConnectorBlocker",
            Self::Tube => "Tube",
            Self::BottomTube => "BottomTube",
            Self::SmallTube => "SmallTube",
            Self::HollowTube => "HollowTube",
            Self::AntiKnob => "AntiKnob",
            Self::SquareAntiKnob => "SquareAntiKnob",
            Self::PegHole => "PegHole",
            Self::SecondaryPin => "SecondaryPin",
            Self::SecondaryPinWithSmallCollision => "SecondaryPinWithSmallCollision",
            Self::SecondaryPinWithTinyCollision => "SecondaryPinWithTinyCollision",
            Self::Clip => "Clip",
            Self::PinHole => "PinHole",
            Self::PinHoleWithFriction => "PinHoleWithFriction",
            Self::AxleHole => "AxleHole",
            Self::BallSocket => "BallSocket",
            Self::TowBallSocket => "TowBallSocket",
            Self::DuploTube => "DuploTube",
            Self::DuploBottomTube => "DuploBottomTube",
            Self::DuploAntiKnob => "DuploAntiKnob",
            Self::DuploAnimalAntiKnob => "DuploAnimalAntiKnob",
            Self::DuploSecondaryPin => "DuploSecondaryPin",
            Self::DuploSystemTube => "DuploSystemTube",
            Self::ReceptorBlocker => "ReceptorBlocker",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionType {
    type Err = ConnectivityError;

    /// Parses a type name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConnectivityError::UnknownConnectionType { name: s.to_string() })
    }
}

// Rows are the first type, columns the second, both in `ConnectionType::ALL`
// order. c = connect, i = ignore, r = reject.
#[rustfmt::skip]
const MATRIX: [&[u8; ConnectionType::COUNT]; ConnectionType::COUNT] = [
    b"iiiiiiiiiiiiiiiiiiiiccrcccrrriiiiiiirrrrrcr", // Knob
    b"iiiiiiiiiiiiiiiiiiiiccrcccrriiiiiiiirrrrrcr", // HollowKnob
    b"iiiiiiiiiiiiiiiiiiiiccrccccrriiiiiiirrrrrcr", // KnobFitInPegHole
    b"iiiiiiiiiiiiiiiiiiiiccrccccriiiiiiiirrrrrcr", // HollowKnobFitInPegHole
    b"iiiiiiiiiiiiiiiiiiiicrrcccrrrriiiiiirrrrrrr", // SquareKnob
    b"iiiiiiiiiiiiiiiiiiiicrrcccrrrriiiiiirrrrrrr", // HollowSquareKnob
    b"iiiiiiiiiiiiiiiiiiiiccrcccrccciiiiiirrrrrrr", // JumperKnob
    b"iiiiiiiiiiiiiiiiiiiicicciiiccciiiiiirrrrrrr", // TubeGap
    b"iiiiiiiiiiiiiiiiiiiiiicciiiiiicrrrrriiiiiir", // Bar
    b"iiiiiiiiiiiiiiiiiiiiiiiiiiiiiicrrrrriiiiiir", // Handle
    b"iiiiiiiiiiiiiiiiiiiiiiiiiiiiiirccrrriiiiiir", // Pin
    b"iiiiiiiiiiiiiiiiiiiiiiiiiiiiiirccirriiiiiir", // HalfPin
    b"iiiiiiiiiiiiiiiiiiiiiiiiiiiiiircicrriiiiiir", // Axle
    b"iiiiiiiiiiiiiiiiiiiiiiiiiiiiiirrrrcriiiiiir", // Ball
    b"iiiiiiiiiiiiiiiiiiiiiiiiiiiiiirrrrrciiiiiir", // TowBall
    b"iiiiiiiiiiiiiiiiiiiirrrrrrrrrriiiiiicccrrrr", // DuploKnob
    b"iiiiiiiiiiiiiiiiiiiirrrrrrrrrriiiiiicccrcrr", // DuploHollowKnob
    b"iiiiiiiiiiiiiiiiiiiirrrrrrrrrriiiiiirrccirr", // DuploAnimalKnob
    b"iiiiiiiiiiiiiiiiiiiirrrrrrrrrriiiiiiciircrr", // DuploTubeGap
    b"iiiiiiiiiiiiiiiiiiiirrrrrrrrrrrrrrrrrrrrrrr", // ConnectorBlocker
    b"cccccccciiiiiiirrrrriiiiiiiiiiiiiiiiiiiiiii", // Tube
    b"ccccrrcriiiiiiirrrrriiiiiiiiiiiiiiiiiiiiiii", // BottomTube
    b"rrrrrrrcciiiiiirrrrriiiiiiiiiiiiiiiiiiiiiii", // SmallTube
    b"ccccccccciiiiiirrrrriiiiiiiiiiiiiiiiiiiiiii", // HollowTube
    b"ccccccciiiiiiiirrrrriiiiiiiiiiiiiiiiiiiiiii", // AntiKnob
    b"ccccccciiiiiiiirrrrriiiiiiiiiiiiiiiiiiiiiii", // SquareAntiKnob
    b"rrccrrriiiiiiiirrrrriiiiiiiiiiiiiiiiiiiiiii", // PegHole
    b"rrrrrrcciiiiiiirrrrriiiiiiiiiiiiiiiiiiiiiii", // SecondaryPin
    b"ririrrcciiiiiiirrrrriiiiiiiiiiiiiiiiiiiiiii", // SecondaryPinWithSmallCollision
    b"iiiirrcciiiiiiirrrrriiiiiiiiiiiiiiiiiiiiiii", // SecondaryPinWithTinyCollision
    b"iiiiiiiiccrrrrriiiiriiiiiiiiiiiiiiiiiiiiiii", // Clip
    b"iiiiiiiirrcccrriiiiriiiiiiiiiiiiiiiiiiiiiii", // PinHole
    b"iiiiiiiirrccirriiiiriiiiiiiiiiiiiiiiiiiiiii", // PinHoleWithFriction
    b"iiiiiiiirrricrriiiiriiiiiiiiiiiiiiiiiiiiiii", // AxleHole
    b"iiiiiiiirrrrrcriiiiriiiiiiiiiiiiiiiiiiiiiii", // BallSocket
    b"iiiiiiiirrrrrrciiiiriiiiiiiiiiiiiiiiiiiiiii", // TowBallSocket
    b"rrrrrrrriiiiiiiccrcriiiiiiiiiiiiiiiiiiiiiii", // DuploTube
    b"rrrrrrrriiiiiiiccrrriiiiiiiiiiiiiiiiiiiiiii", // DuploBottomTube
    b"rrrrrrrriiiiiiiccciriiiiiiiiiiiiiiiiiiiiiii", // DuploAntiKnob
    b"rrrrrrrriiiiiiirrcrriiiiiiiiiiiiiiiiiiiiiii", // DuploAnimalAntiKnob
    b"rrrrrrrriiiiiiircicriiiiiiiiiiiiiiiiiiiiiii", // DuploSecondaryPin
    b"ccccrrrriiiiiiirrrrriiiiiiiiiiiiiiiiiiiiiii", // DuploSystemTube
    b"rrrrrrrrrrrrrrrrrrrriiiiiiiiiiiiiiiiiiiiiii", // ReceptorBlocker
];

const fn table_is_well_formed() -> bool {
    let mut row = 0;
    while row < ConnectionType::COUNT {
        let mut col = 0;
        while col < ConnectionType::COUNT {
            let b = MATRIX[row][col];
            if b != b'c' && b != b'i' && b != b'r' {
                return false;
            }
            col += 1;
        }
        row += 1;
    }
    true
}

const _: () = assert!(table_is_well_formed());
const _: () = assert!(ConnectionType::COUNT <= 64);

const fn build_connect_masks() -> [u64; ConnectionType::COUNT] {
    let mut masks = [0u64; ConnectionType::COUNT];
    let mut row = 0;
    while row < ConnectionType::COUNT {
        let mut col = 0;
        while col < ConnectionType::COUNT {
            if MATRIX[row][col] == b'c' {
                masks[row] |= 1 << col;
            }
            col += 1;
        }
        row += 1;
    }
    masks
}

const CONNECT_MASKS: [u64; ConnectionType::COUNT] = build_connect_masks();

/// Looks up how type `a` (the moving side) meets type `b`.
///
/// # Example
///
/// ```
/// use brick_connectivity::{ConnectionMatch, ConnectionType, match_types};
///
/// assert_eq!(match_types(ConnectionType::Knob, ConnectionType::Tube), ConnectionMatch::Connect);
/// assert_eq!(match_types(ConnectionType::Knob, ConnectionType::PegHole), ConnectionMatch::Reject);
/// ```
#[must_use]
pub const fn match_types(a: ConnectionType, b: ConnectionType) -> ConnectionMatch {
    ConnectionMatch::from_byte(MATRIX[a.index()][b.index()])
}

/// Whether `connection_type` connects to at least one type.
#[must_use]
pub const fn is_connectable_type(connection_type: ConnectionType) -> bool {
    connection_type.connect_mask() != 0
}

/// Whether any type in `moving` connects to any type in `target`.
///
/// Both arguments are unions of [`ConnectionType::bit`].
#[must_use]
pub fn masks_connect(moving: u64, target: u64) -> bool {
    let mut remaining = moving;
    while remaining != 0 {
        let index = remaining.trailing_zeros() as usize;
        if index < ConnectionType::COUNT && CONNECT_MASKS[index] & target != 0 {
            return true;
        }
        remaining &= remaining - 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConnectionType as T;

    #[test]
    fn test_known_asymmetric_entries() {
        assert_eq!(match_types(T::BottomTube, T::TubeGap), ConnectionMatch::Reject);
        assert_eq!(match_types(T::TubeGap, T::BottomTube), ConnectionMatch::Ignore);
        assert_eq!(match_types(T::Tube, T::TubeGap), ConnectionMatch::Connect);
        assert_eq!(match_types(T::TubeGap, T::Tube), ConnectionMatch::Connect);
        assert_eq!(match_types(T::DuploBottomTube, T::DuploTubeGap), ConnectionMatch::Reject);
        assert_eq!(match_types(T::DuploTubeGap, T::DuploBottomTube), ConnectionMatch::Ignore);
    }

    #[test]
    fn test_asymmetry_is_rare() {
        let mut asymmetric = Vec::new();
        for a in T::ALL {
            for b in T::ALL {
                if a < b && match_types(a, b) != match_types(b, a) {
                    asymmetric.push((a, b));
                }
            }
        }
        assert_eq!(
            asymmetric,
            vec![(T::TubeGap, T::BottomTube), (T::DuploTubeGap, T::DuploBottomTube)]
        );
    }

    #[test]
    fn test_same_side_never_connects() {
        for a in T::ALL {
            for b in T::ALL {
                if a.is_connector_side() == b.is_connector_side() {
                    assert_ne!(match_types(a, b), ConnectionMatch::Connect, "{a} vs {b}");
                }
            }
        }
    }

    #[test]
    fn test_common_pairs() {
        assert_eq!(match_types(T::Knob, T::Tube), ConnectionMatch::Connect);
        assert_eq!(match_types(T::Knob, T::AntiKnob), ConnectionMatch::Connect);
        assert_eq!(match_types(T::Knob, T::PegHole), ConnectionMatch::Reject);
        assert_eq!(match_types(T::KnobFitInPegHole, T::PegHole), ConnectionMatch::Connect);
        assert_eq!(match_types(T::Axle, T::AxleHole), ConnectionMatch::Connect);
        assert_eq!(match_types(T::Axle, T::PinHole), ConnectionMatch::Connect);
        assert_eq!(match_types(T::Pin, T::AxleHole), ConnectionMatch::Reject);
        assert_eq!(match_types(T::Knob, T::Pin), ConnectionMatch::Ignore);
    }

    #[test]
    fn test_blockers() {
        assert!(!is_connectable_type(T::ConnectorBlocker));
        assert!(!is_connectable_type(T::ReceptorBlocker));
        assert_eq!(match_types(T::ConnectorBlocker, T::Tube), ConnectionMatch::Reject);
        assert_eq!(match_types(T::Knob, T::ReceptorBlocker), ConnectionMatch::Reject);
        assert!(is_connectable_type(T::Knob));
        assert!(is_connectable_type(T::DuploAnimalAntiKnob));
    }

    #[test]
    fn test_connect_mask_matches_table() {
        for a in T::ALL {
            for b in T::ALL {
                let bonds = a.connect_mask() & b.bit() != 0;
                assert_eq!(bonds, match_types(a, b) == ConnectionMatch::Connect);
            }
        }
    }

    #[test]
    fn test_masks_connect() {
        let knobs = T::Knob.bit() | T::ConnectorBlocker.bit();
        assert!(masks_connect(knobs, T::Tube.bit()));
        assert!(!masks_connect(knobs, T::PegHole.bit() | T::PinHole.bit()));
        assert!(!masks_connect(0, u64::MAX));
    }

    #[test]
    fn test_parse_names() {
        for t in T::ALL {
            assert_eq!(t.as_str().parse::<T>().unwrap(), t);
        }
        assert_eq!("bottomtube".parse::<T>().unwrap(), T::BottomTube);
        assert!(matches!(
            "Stud".parse::<T>(),
            Err(ConnectivityError::UnknownConnectionType { .. })
        ));
    }

    #[test]
    fn test_sides() {
        assert!(T::DuploTubeGap.is_connector_side());
        assert!(!T::Tube.is_connector_side());
        assert_eq!(T::ALL.iter().filter(|t| t.is_connector_side()).count(), T::CONNECTOR_COUNT);
    }
}
