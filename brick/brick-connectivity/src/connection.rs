//! Connection records.
//!
//! A [`Connection`] is one feature point of a part (a knob, a tube, a pin
//! hole). Its grid position is implied by its index in the owning
//! [`ConnectionField`](crate::ConnectionField); who it is bonded to is stored
//! by the field, not by the connection.

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::ids::{ConnectionRef, FieldId};
use crate::types::{ConnectionMatch, ConnectionType, is_connectable_type, match_types};

bitflags! {
    /// Geometry hints attached to a connection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ConnectionFlags: u32 {
        /// Square cross-section.
        const SQUARE = 1;
        /// Round cross-section.
        const ROUND = 1 << 1;
        /// Collision volume is hollow.
        const HOLLOW_COLLISION = 1 << 2;
        /// Collision volume is reduced.
        const SMALL_COLLISION = 1 << 3;
        /// Collision volume is minimal.
        const TINY_COLLISION = 1 << 4;
        /// No knob geometry is drawn for this connection.
        const NO_KNOB_VISUAL = 1 << 5;
    }
}

bitflags! {
    /// Which quarters of its grid cell a connection occupies.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Quadrants: u8 {
        /// Quarter at -X, -Z.
        const NEG_X_NEG_Z = 1;
        /// Quarter at +X, -Z.
        const POS_X_NEG_Z = 1 << 1;
        /// Quarter at -X, +Z.
        const NEG_X_POS_Z = 1 << 2;
        /// Quarter at +X, +Z.
        const POS_X_POS_Z = 1 << 3;
    }
}

/// Kind of visual sub-object driven by a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeatureKind {
    /// Knob geometry on top of a brick.
    Knob,
    /// Tube geometry under a brick.
    Tube,
    /// Pin geometry.
    Pin,
    /// Hole geometry.
    Hole,
}

/// A visual sub-object whose visibility follows the connection's bond state.
///
/// The `handle` is opaque to this crate; the host maps it to its own geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Feature {
    /// What the geometry is.
    pub kind: FeatureKind,
    /// Host-side geometry handle.
    pub handle: u32,
}

/// One feature point on a part.
///
/// # Example
///
/// ```
/// use brick_connectivity::{Connection, ConnectionFlags, ConnectionType, Quadrants};
///
/// let knob = Connection::new(ConnectionType::Knob)
///     .with_flags(ConnectionFlags::ROUND)
///     .with_quadrants(Quadrants::all());
/// assert!(knob.is_connectable());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connection {
    /// Physical kind.
    pub connection_type: ConnectionType,
    /// Occupied quarters of the grid cell.
    pub quadrants: Quadrants,
    /// Geometry hints.
    pub flags: ConnectionFlags,
    /// Visual sub-objects.
    pub features: SmallVec<[Feature; 2]>,
    pub(crate) index: u32,
    pub(crate) field: FieldId,
}

impl Connection {
    /// Creates a detached connection covering its whole cell.
    #[must_use]
    pub fn new(connection_type: ConnectionType) -> Self {
        Self {
            connection_type,
            quadrants: Quadrants::all(),
            flags: ConnectionFlags::empty(),
            features: SmallVec::new(),
            index: 0,
            field: FieldId::DETACHED,
        }
    }

    /// Sets the occupied quadrants.
    #[must_use]
    pub fn with_quadrants(mut self, quadrants: Quadrants) -> Self {
        self.quadrants = quadrants;
        self
    }

    /// Sets the geometry flags.
    #[must_use]
    pub fn with_flags(mut self, flags: ConnectionFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Adds a visual feature.
    #[must_use]
    pub fn with_feature(mut self, kind: FeatureKind, handle: u32) -> Self {
        self.features.push(Feature { kind, handle });
        self
    }

    /// Index of this connection in its field.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// The owning field, or [`FieldId::DETACHED`] before the field is in a scene.
    #[must_use]
    pub const fn field(&self) -> FieldId {
        self.field
    }

    /// Handle addressing this connection.
    #[must_use]
    pub const fn reference(&self) -> ConnectionRef {
        ConnectionRef::new(self.field, self.index)
    }

    /// Whether this connection's type can bond with anything.
    #[must_use]
    pub const fn is_connectable(&self) -> bool {
        is_connectable_type(self.connection_type)
    }

    /// How this connection meets `other` when this one is the moving side.
    #[must_use]
    pub const fn match_with(&self, other: &Self) -> ConnectionMatch {
        match_types(self.connection_type, other.connection_type)
    }
}
