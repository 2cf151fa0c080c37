//! Connection fields.
//!
//! A field is a rectangular lattice of optional [`Connection`]s on one part.
//! It lies in its local XZ plane with local +Y as its up vector; lattice
//! point `(x, z)` sits at `(x * CELL_SIZE, 0, z * CELL_SIZE)`.
//!
//! Pose-independent queries live here. Anything that needs to know where a
//! field is in the world goes through the [`Scene`](crate::Scene).

use brick_spatial::{Aabb, CELL_SIZE, GridCoord, GridRect};
use nalgebra::{Isometry3, Point3, Vector3};

use crate::connection::Connection;
use crate::error::{ConnectivityError, ConnectivityResult};
use crate::ids::{ConnectionRef, FieldId, PartId};

/// Largest accepted field dimension, in cells.
pub const MAX_FIELD_CELLS: u32 = 256;

/// Which side of a bond a field provides.
///
/// Fields of different kinds are kept apart for queries; bonds only form
/// between a connector field and a receptor field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldKind {
    /// Knob side (top of a brick).
    Connector,
    /// Tube side (bottom of a brick).
    Receptor,
}

/// A grid of connections anchored to a part.
///
/// # Example
///
/// ```
/// use brick_connectivity::{Connection, ConnectionField, ConnectionType, FieldKind};
/// use brick_spatial::GridCoord;
/// use nalgebra::Isometry3;
///
/// let mut field = ConnectionField::new(FieldKind::Connector, 2, 2, Isometry3::identity()).unwrap();
/// field.set_connection(GridCoord::new(1, 1), Connection::new(ConnectionType::Knob)).unwrap();
///
/// assert!(field.get_connection_at(GridCoord::new(1, 1)).is_some());
/// assert!(field.get_connection_at(GridCoord::new(0, 0)).is_none());
/// assert!(field.get_connection_at(GridCoord::new(5, 0)).is_none());
/// assert!(field.has_available_connections());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionField {
    id: FieldId,
    part: Option<PartId>,
    kind: FieldKind,
    width: u32,
    height: u32,
    local: Isometry3<f64>,
    connections: Vec<Option<Connection>>,
    connected_to: Vec<Option<ConnectionRef>>,
    type_mask: u64,
}

impl ConnectionField {
    /// Creates an empty field `width` by `height` cells, placed at `local` in part space.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectivityError::InvalidGridSize`] if either dimension
    /// exceeds [`MAX_FIELD_CELLS`].
    pub fn new(kind: FieldKind, width: u32, height: u32, local: Isometry3<f64>) -> ConnectivityResult<Self> {
        if width > MAX_FIELD_CELLS || height > MAX_FIELD_CELLS {
            return Err(ConnectivityError::InvalidGridSize { width, height });
        }
        let points = (width as usize + 1) * (height as usize + 1);
        Ok(Self {
            id: FieldId::DETACHED,
            part: None,
            kind,
            width,
            height,
            local,
            connections: vec![None; points],
            connected_to: vec![None; points],
            type_mask: 0,
        })
    }

    /// Places a connection on a lattice point, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectivityError::CellOutOfRange`] if `coord` is outside the field.
    pub fn set_connection(&mut self, coord: GridCoord, mut connection: Connection) -> ConnectivityResult<()> {
        let index = self.index_of(coord).ok_or(ConnectivityError::CellOutOfRange {
            x: coord.x,
            z: coord.z,
            width: self.width,
            height: self.height,
        })?;
        connection.index = index;
        connection.field = self.id;
        self.type_mask |= connection.connection_type.bit();
        self.connections[index as usize] = Some(connection);
        Ok(())
    }

    // ========================================================================
    // Identity and geometry
    // ========================================================================

    /// Handle of this field, or [`FieldId::DETACHED`] outside a scene.
    #[must_use]
    pub const fn id(&self) -> FieldId {
        self.id
    }

    /// Owning part, once the field has been added to a scene.
    #[must_use]
    pub const fn part(&self) -> Option<PartId> {
        self.part
    }

    /// Connector or receptor.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Placement of the field in its part's space.
    #[must_use]
    pub const fn local_transform(&self) -> &Isometry3<f64> {
        &self.local
    }

    /// Union of [`ConnectionType::bit`](crate::ConnectionType::bit) over every connection.
    #[must_use]
    pub const fn type_mask(&self) -> u64 {
        self.type_mask
    }

    /// Every lattice coordinate of the field.
    #[allow(clippy::cast_possible_wrap)]
    #[must_use]
    pub const fn grid_rect(&self) -> GridRect {
        GridRect {
            min: GridCoord::new(0, 0),
            max: GridCoord::new(self.width as i32, self.height as i32),
        }
    }

    /// Index of a lattice coordinate, if it lies inside the field.
    #[allow(clippy::cast_sign_loss)]
    #[must_use]
    pub const fn index_of(&self, coord: GridCoord) -> Option<u32> {
        if !self.grid_rect().contains(coord) {
            return None;
        }
        Some(coord.x as u32 + coord.z as u32 * (self.width + 1))
    }

    /// Lattice coordinate of an index.
    #[allow(clippy::cast_possible_wrap)]
    #[must_use]
    pub const fn coord_of(&self, index: u32) -> GridCoord {
        GridCoord::new((index % (self.width + 1)) as i32, (index / (self.width + 1)) as i32)
    }

    /// Position of a lattice point in field space.
    #[must_use]
    pub fn lattice_point(coord: GridCoord) -> Point3<f64> {
        Point3::new(f64::from(coord.x) * CELL_SIZE, 0.0, f64::from(coord.z) * CELL_SIZE)
    }

    /// Center of the field in field space.
    #[must_use]
    pub fn local_center(&self) -> Point3<f64> {
        Point3::new(
            f64::from(self.width) * CELL_SIZE * 0.5,
            0.0,
            f64::from(self.height) * CELL_SIZE * 0.5,
        )
    }

    /// Flat bounds of the lattice in field space.
    #[must_use]
    pub fn local_bounds(&self) -> Aabb {
        Aabb::new(
            Point3::origin(),
            Point3::new(f64::from(self.width) * CELL_SIZE, 0.0, f64::from(self.height) * CELL_SIZE),
        )
    }

    /// Up vector of the field in part space.
    #[must_use]
    pub fn local_up(&self) -> Vector3<f64> {
        self.local.rotation * Vector3::y()
    }

    // ========================================================================
    // Connections and bond state
    // ========================================================================

    /// Connection at a lattice point; `None` if out of range or empty.
    #[must_use]
    pub fn get_connection_at(&self, coord: GridCoord) -> Option<&Connection> {
        self.index_of(coord).and_then(|i| self.connection(i))
    }

    /// Connection at an index; `None` if out of range or empty.
    #[must_use]
    pub fn connection(&self, index: u32) -> Option<&Connection> {
        self.connections.get(index as usize).and_then(Option::as_ref)
    }

    /// Iterates over every present connection.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter().flatten()
    }

    /// Number of present connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections().count()
    }

    /// Whether the connection at `index` is bonded.
    #[must_use]
    pub fn has_connection(&self, index: u32) -> bool {
        self.get_connection(index).is_some()
    }

    /// Counterpart of the connection at `index`, if bonded.
    #[must_use]
    pub fn get_connection(&self, index: u32) -> Option<ConnectionRef> {
        self.connected_to.get(index as usize).copied().flatten()
    }

    /// Iterates over `(index, counterpart)` for every bonded connection.
    pub fn bonds(&self) -> impl Iterator<Item = (u32, ConnectionRef)> + '_ {
        self.connected_to
            .iter()
            .enumerate()
            .filter_map(|(i, other)| other.map(|o| (u32::try_from(i).unwrap_or(u32::MAX), o)))
    }

    /// Number of bonded connections.
    #[must_use]
    pub fn bond_count(&self) -> usize {
        self.connected_to.iter().flatten().count()
    }

    /// Whether some connectable connection is still free.
    #[must_use]
    pub fn has_available_connections(&self) -> bool {
        self.connections
            .iter()
            .zip(&self.connected_to)
            .any(|(c, bond)| bond.is_none() && c.as_ref().is_some_and(Connection::is_connectable))
    }

    pub(crate) fn set_bond(&mut self, index: u32, other: Option<ConnectionRef>) {
        if let Some(slot) = self.connected_to.get_mut(index as usize) {
            *slot = other;
        }
    }

    pub(crate) fn attach(&mut self, id: FieldId, part: PartId) {
        self.id = id;
        self.part = Some(part);
        for connection in self.connections.iter_mut().flatten() {
            connection.field = id;
        }
    }
}
