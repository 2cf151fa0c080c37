//! Error types for connectivity operations.

use thiserror::Error;

use crate::ids::{BrickId, ConnectionRef, FieldId, PartId};

/// Result type for connectivity operations.
pub type ConnectivityResult<T> = Result<T, ConnectivityError>;

/// Errors that can occur while building or editing a connected scene.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectivityError {
    /// Brick with the given handle was not found.
    #[error("{id} not found in scene")]
    BrickNotFound {
        /// The missing brick.
        id: BrickId,
    },

    /// Part with the given handle was not found.
    #[error("{id} not found in scene")]
    PartNotFound {
        /// The missing part.
        id: PartId,
    },

    /// Field with the given handle was not found.
    #[error("{id} not found in scene")]
    FieldNotFound {
        /// The missing field.
        id: FieldId,
    },

    /// The referenced grid cell holds no connection.
    #[error("no connection at {connection}")]
    ConnectionNotFound {
        /// The empty or out-of-range reference.
        connection: ConnectionRef,
    },

    /// A connection is already bonded to something else.
    #[error("{connection} is already connected to {other}")]
    AlreadyConnected {
        /// The connection that was asked to bond.
        connection: ConnectionRef,
        /// Its current counterpart.
        other: ConnectionRef,
    },

    /// Both connections sit on fields of the same kind.
    #[error("cannot bond {first} and {second}: both fields have the same kind")]
    SameKind {
        /// First connection.
        first: ConnectionRef,
        /// Second connection.
        second: ConnectionRef,
    },

    /// Both connections belong to the same brick.
    #[error("cannot bond two connections of {brick}")]
    SameBrick {
        /// The shared owner.
        brick: BrickId,
    },

    /// The target brick is part of the set that would be moved.
    #[error("{brick} cannot move onto itself")]
    TargetIsMoving {
        /// The target's owner.
        brick: BrickId,
    },

    /// No rotation aligns the two fields (their up vectors are opposite).
    #[error("no alignment between {first} and {second}")]
    NoAlignment {
        /// Connection on the brick that would move.
        first: ConnectionRef,
        /// Connection it should land on.
        second: ConnectionRef,
    },

    /// A field must be at least one cell in each direction.
    #[error("invalid field size {width}x{height}")]
    InvalidGridSize {
        /// Requested width in cells.
        width: u32,
        /// Requested height in cells.
        height: u32,
    },

    /// A lattice coordinate lies outside a field.
    #[error("cell ({x}, {z}) is outside a {width}x{height} field")]
    CellOutOfRange {
        /// X coordinate.
        x: i32,
        /// Z coordinate.
        z: i32,
        /// Field width in cells.
        width: u32,
        /// Field height in cells.
        height: u32,
    },

    /// A field header in a connectivity description could not be parsed.
    #[error("malformed field header on line {line}: {reason}")]
    MalformedField {
        /// One-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// A connection type name is not known.
    #[error("unknown connection type '{name}'")]
    UnknownConnectionType {
        /// The unrecognised name.
        name: String,
    },
}
