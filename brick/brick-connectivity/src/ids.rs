//! Arena handles.
//!
//! Bricks, parts and fields live in flat tables owned by the
//! [`Scene`](crate::Scene). Everything else refers to them through these
//! copyable indices, so back-references never own anything.

use std::fmt;

/// Handle of a brick in a [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrickId(pub u32);

/// Handle of a part in a [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartId(pub u32);

/// Handle of a connection field in a [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldId(pub u32);

impl BrickId {
    /// Position in the scene's brick table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl PartId {
    /// Position in the scene's part table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl FieldId {
    /// Owner of connections in a field that has not been added to a scene yet.
    pub const DETACHED: Self = Self(u32::MAX);

    /// Position in the scene's field table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Addresses one connection: its field and its index in that field.
///
/// # Example
///
/// ```
/// use brick_connectivity::{ConnectionRef, FieldId};
///
/// let c = ConnectionRef::new(FieldId(2), 7);
/// assert_eq!(c.to_string(), "field#2[7]");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionRef {
    /// The owning field.
    pub field: FieldId,
    /// Index of the connection in the field's grid.
    pub index: u32,
}

impl ConnectionRef {
    /// Creates a connection reference.
    #[must_use]
    pub const fn new(field: FieldId, index: u32) -> Self {
        Self { field, index }
    }
}

impl fmt::Display for BrickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "brick#{}", self.0)
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "part#{}", self.0)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field#{}", self.0)
    }
}

impl fmt::Display for ConnectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.field, self.index)
    }
}
