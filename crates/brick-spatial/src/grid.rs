//! Brick lattice constants and integer grid coordinates.
//!
//! Connection fields are laid out on a lattice of half-stud cells. A field
//! `width` cells wide has `width + 1` lattice points along X, so knobs sit on
//! even coordinates and the gaps between them on odd ones.

/// One LEGO unit in engine distance units.
pub const LU: f64 = 0.08;

/// Lattice spacing of connection fields: half a stud pitch (5 LU).
pub const CELL_SIZE: f64 = 5.0 * LU;

/// Distance between neighbouring knobs (10 LU).
pub const STUD_PITCH: f64 = 10.0 * LU;

/// Height of a standard brick body (12 LU).
pub const BRICK_HEIGHT: f64 = 12.0 * LU;

/// Height of a plate body (4 LU).
pub const PLATE_HEIGHT: f64 = 4.0 * LU;

/// A lattice coordinate inside a connection field.
///
/// # Example
///
/// ```
/// use brick_spatial::GridCoord;
///
/// let c = GridCoord::new(2, 3).offset(-1, 1);
/// assert_eq!(c, GridCoord::new(1, 4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCoord {
    /// Coordinate along the field's local X axis.
    pub x: i32,
    /// Coordinate along the field's local Z axis.
    pub z: i32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns this coordinate shifted by `(dx, dz)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// Converts a continuous local position (in cells) to the nearest lattice point.
    ///
    /// Returns `None` when the position is further than `tolerance` cells from
    /// any lattice point or does not fit an `i32`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_cells(x: f64, z: f64, tolerance: f64) -> Option<Self> {
        let (rx, rz) = (x.round(), z.round());
        if (x - rx).abs() > tolerance || (z - rz).abs() > tolerance {
            return None;
        }
        let limit = f64::from(i32::MAX);
        if rx.abs() > limit || rz.abs() > limit {
            return None;
        }
        Some(Self::new(rx as i32, rz as i32))
    }
}

/// An inclusive rectangle of lattice coordinates.
///
/// # Example
///
/// ```
/// use brick_spatial::{GridCoord, GridRect};
///
/// let rect = GridRect::new(GridCoord::new(0, 0), GridCoord::new(2, 1));
/// assert_eq!(rect.point_count(), 6);
/// assert_eq!(rect.iter().next(), Some(GridCoord::new(0, 0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridRect {
    /// Minimum corner (inclusive).
    pub min: GridCoord,
    /// Maximum corner (inclusive).
    pub max: GridCoord,
}

impl GridRect {
    /// Creates a rectangle from two corners in any order.
    #[must_use]
    pub fn new(a: GridCoord, b: GridCoord) -> Self {
        Self {
            min: GridCoord::new(a.x.min(b.x), a.z.min(b.z)),
            max: GridCoord::new(a.x.max(b.x), a.z.max(b.z)),
        }
    }

    /// Intersection with another rectangle, if they share any lattice point.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let min = GridCoord::new(self.min.x.max(other.min.x), self.min.z.max(other.min.z));
        let max = GridCoord::new(self.max.x.min(other.max.x), self.max.z.min(other.max.z));
        (min.x <= max.x && min.z <= max.z).then_some(Self { min, max })
    }

    /// Checks if a coordinate lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, coord: GridCoord) -> bool {
        coord.x >= self.min.x && coord.x <= self.max.x && coord.z >= self.min.z && coord.z <= self.max.z
    }

    /// Number of lattice points in the rectangle (always at least one).
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn point_count(&self) -> usize {
        ((self.max.x - self.min.x + 1) as usize) * ((self.max.z - self.min.z + 1) as usize)
    }

    /// Iterates row by row (X fastest) over every lattice point.
    pub fn iter(&self) -> impl Iterator<Item = GridCoord> + use<> {
        let (min, max) = (self.min, self.max);
        (min.z..=max.z).flat_map(move |z| (min.x..=max.x).map(move |x| GridCoord::new(x, z)))
    }
}

/// Snaps a value to the nearest multiple of `cell`.
///
/// Non-positive cell sizes return the value unchanged.
#[must_use]
pub fn snap_to_cell(value: f64, cell: f64) -> f64 {
    if cell <= 0.0 {
        return value;
    }
    (value / cell).round() * cell
}

/// Snaps a value to the nearest `k * cell + cell / 2`.
///
/// Non-positive cell sizes return the value unchanged.
///
/// # Example
///
/// ```
/// use brick_spatial::snap_to_half_cell;
///
/// assert!((snap_to_half_cell(0.1, 0.8) - 0.4).abs() < 1e-12);
/// assert!((snap_to_half_cell(0.9, 0.8) - 1.2).abs() < 1e-12);
/// ```
#[must_use]
pub fn snap_to_half_cell(value: f64, cell: f64) -> f64 {
    if cell <= 0.0 {
        return value;
    }
    let half = cell * 0.5;
    snap_to_cell(value - half, cell) + half
}
