//! Geometric relations between fields.
//!
//! These are the pose-dependent field queries: lining up two fields'
//! orientations, computing the rigid motion that makes two connections
//! coincide, finding where two fields' lattices overlap, and listing the
//! connections that currently coincide.

use brick_spatial::{CELL_SIZE, GridCoord, GridRect};
use nalgebra::{Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector3};

use crate::collision::SpatialQuery;
use crate::field::ConnectionField;
use crate::ids::{ConnectionRef, FieldId};
use crate::placement::{BrickSet, Placement};
use crate::scene::Scene;
use crate::tolerance::Tolerances;
use crate::types::{ConnectionMatch, match_types};

/// Rotation that brings a field oriented as `source` into line with `target`.
///
/// The up vectors are matched with the shortest arc, then the result is
/// yawed about the target's up so the grid axes agree to the nearest quarter
/// turn. Returns `None` when the up vectors are opposite, since no shortest
/// arc exists.
///
/// # Example
///
/// ```
/// use brick_connectivity::align_rotation;
/// use nalgebra::{UnitQuaternion, Vector3};
///
/// let source = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.3);
/// let target = UnitQuaternion::identity();
/// let r = align_rotation(&source, &target).unwrap();
/// assert!(((r * source).angle()).abs() < 1e-9);
///
/// let flipped = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI);
/// assert!(align_rotation(&flipped, &target).is_none());
/// ```
#[must_use]
pub fn align_rotation(source: &UnitQuaternion<f64>, target: &UnitQuaternion<f64>) -> Option<UnitQuaternion<f64>> {
    let source_up = source * Vector3::y();
    let target_up = target * Vector3::y_axis();
    let tilt = UnitQuaternion::rotation_between(&source_up, &target_up.into_inner())?;

    let tilted_x = tilt * source * Vector3::x();
    let target_x = target * Vector3::x();
    let target_z = target * Vector3::z();
    // Yaw of the tilted X axis in the target frame; +Y rotation takes X towards -Z.
    let yaw = (-tilted_x.dot(&target_z)).atan2(tilted_x.dot(&target_x));
    let quarter = std::f64::consts::FRAC_PI_2;
    let residual = yaw - (yaw / quarter).round() * quarter;
    let snap = UnitQuaternion::from_axis_angle(&target_up, -residual);
    Some(snap * tilt)
}

/// Rigid motion about a pivot that makes one connection land on another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectedTransformation {
    /// Rotation applied about `pivot`.
    pub rotation: UnitQuaternion<f64>,
    /// Translation applied after the rotation.
    pub offset: Vector3<f64>,
    /// Center of rotation.
    pub pivot: Point3<f64>,
}

impl ConnectedTransformation {
    /// Rotation angle in radians.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.rotation.angle()
    }

    /// Rotation axis, `None` for no rotation.
    #[must_use]
    pub fn axis(&self) -> Option<Unit<Vector3<f64>>> {
        self.rotation.axis()
    }

    /// The motion as a single world-space isometry.
    #[must_use]
    pub fn to_isometry(&self) -> Isometry3<f64> {
        let pivot = self.pivot.coords;
        let translation = pivot - self.rotation * pivot + self.offset;
        Isometry3::from_parts(Translation3::from(translation), self.rotation)
    }
}

/// A lattice point shared by two overlapping fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapCell {
    /// Coordinate in the first field.
    pub coord: GridCoord,
    /// Index in the first field.
    pub first: u32,
    /// Index in the second field.
    pub second: u32,
}

/// Where two coplanar, grid-aligned fields share lattice points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOverlap {
    /// Overlapping range in the first field's grid.
    pub rect: GridRect,
    /// Every shared lattice point, X fastest.
    pub cells: Vec<OverlapCell>,
}

/// Two coincident connections and how they meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    /// Connection on the queried field.
    pub source: ConnectionRef,
    /// Connection on the other field.
    pub target: ConnectionRef,
    /// `match_types(source, target)`.
    pub matched: ConnectionMatch,
}

/// Strongest outcome among contacts: any reject wins, then any connect.
#[must_use]
pub fn best_match(contacts: &[Contact]) -> ConnectionMatch {
    if contacts.iter().any(|c| c.matched == ConnectionMatch::Reject) {
        ConnectionMatch::Reject
    } else if contacts.iter().any(|c| c.matched == ConnectionMatch::Connect) {
        ConnectionMatch::Connect
    } else {
        ConnectionMatch::Ignore
    }
}

fn to_cells(point: &Point3<f64>, tolerance: &Tolerances) -> Option<GridCoord> {
    GridCoord::from_cells(point.x / CELL_SIZE, point.z / CELL_SIZE, tolerance.position_epsilon / CELL_SIZE)
}

impl Scene {
    /// Rigid motion about `pivot` that moves `source`'s brick so `source` coincides with `target`.
    ///
    /// Returns `None` if either connection is missing or the fields cannot be aligned.
    #[must_use]
    pub fn get_connected_transformation(
        &self,
        source: ConnectionRef,
        target: ConnectionRef,
        pivot: &Point3<f64>,
        placement: &Placement<'_>,
    ) -> Option<ConnectedTransformation> {
        self.connection(source)?;
        self.connection(target)?;
        let from = self.field_transform(source.field, placement)?;
        let to = self.field_transform(target.field, placement)?;
        let rotation = align_rotation(&from.rotation, &to.rotation)?;

        let p1 = self.connection_position(source, placement)?;
        let p2 = self.connection_position(target, placement)?;
        let rotated = pivot + rotation * (p1 - pivot);
        Some(ConnectedTransformation {
            rotation,
            offset: p2 - rotated,
            pivot: *pivot,
        })
    }

    /// Lattice overlap of field `b` on field `a`, in `a`'s grid.
    ///
    /// The fields must face the same way, lie in the same plane, and have
    /// grids that agree up to a quarter turn and whole cells; otherwise there
    /// is no overlap.
    #[must_use]
    pub fn get_overlap(
        &self,
        a: FieldId,
        b: FieldId,
        placement: &Placement<'_>,
        tolerance: &Tolerances,
    ) -> Option<FieldOverlap> {
        let (fa, fb) = (self.field(a)?, self.field(b)?);
        let ta = self.field_transform(a, placement)?;
        let tb = self.field_transform(b, placement)?;
        let b_in_a = ta.inverse() * tb;

        let cos_eps = tolerance.angle_epsilon().cos();
        if (b_in_a.rotation * Vector3::y()).y < cos_eps {
            return None;
        }
        let b_x = b_in_a.rotation * Vector3::x();
        if b_x.x.abs().max(b_x.z.abs()) < cos_eps {
            return None;
        }

        let mut corners = Vec::with_capacity(4);
        let far = fb.grid_rect().max;
        for corner in [GridCoord::new(0, 0), GridCoord::new(far.x, 0), GridCoord::new(0, far.z), far] {
            let p = b_in_a * ConnectionField::lattice_point(corner);
            if p.y.abs() > tolerance.position_epsilon {
                return None;
            }
            corners.push(to_cells(&p, tolerance)?);
        }
        // Quarter-turn alignment makes opposite corners span the footprint
        let footprint = GridRect::new(corners[0], corners[3]);
        let rect = footprint.intersection(&fa.grid_rect())?;

        let a_in_b = b_in_a.inverse();
        let cells = rect
            .iter()
            .filter_map(|coord| {
                let in_b = to_cells(&(a_in_b * ConnectionField::lattice_point(coord)), tolerance)?;
                Some(OverlapCell {
                    coord,
                    first: fa.index_of(coord)?,
                    second: fb.index_of(in_b)?,
                })
            })
            .collect();
        Some(FieldOverlap { rect, cells })
    }

    /// Every pair of coincident connections between `field` and other bricks' fields.
    ///
    /// Only fields of the opposite kind are considered. Fields on the same
    /// brick are skipped, and so are fields moving together with `field`.
    /// Bonded connections are reported too; callers filter on bond state.
    #[must_use]
    pub fn query_connections(&self, field: FieldId, placement: &Placement<'_>, tolerance: &Tolerances) -> Vec<Contact> {
        let Some(source) = self.field(field) else {
            return Vec::new();
        };
        let Some(owner) = self.field_owner(field) else {
            return Vec::new();
        };
        let Some(bounds) = self.field_world_bounds(field, placement) else {
            return Vec::new();
        };
        let bounds = bounds.inflated(tolerance.position_epsilon);
        let moving = placement.is_moving(owner);

        let mut contacts = Vec::new();
        for other in self.fields() {
            if other.kind() == source.kind() {
                continue;
            }
            let Some(other_owner) = self.field_owner(other.id()) else {
                continue;
            };
            if other_owner == owner || (moving && placement.is_moving(other_owner)) {
                continue;
            }
            if !self
                .field_world_bounds(other.id(), placement)
                .is_some_and(|b| b.intersects(&bounds))
            {
                continue;
            }
            let Some(overlap) = self.get_overlap(field, other.id(), placement, tolerance) else {
                continue;
            };
            for cell in overlap.cells {
                if let (Some(a), Some(b)) = (source.connection(cell.first), other.connection(cell.second)) {
                    contacts.push(Contact {
                        source: a.reference(),
                        target: b.reference(),
                        matched: match_types(a.connection_type, b.connection_type),
                    });
                }
            }
        }
        contacts
    }

    /// Whether two connections coincide: positions within the positional
    /// epsilon and field up vectors within the angular epsilon.
    #[must_use]
    pub fn is_connection_aligned(
        &self,
        a: ConnectionRef,
        b: ConnectionRef,
        placement: &Placement<'_>,
        tolerance: &Tolerances,
    ) -> bool {
        let (Some(pa), Some(pb)) = (self.connection_position(a, placement), self.connection_position(b, placement))
        else {
            return false;
        };
        let (Some(ua), Some(ub)) = (self.field_up(a.field, placement), self.field_up(b.field, placement)) else {
            return false;
        };
        (pa - pb).norm() < tolerance.position_epsilon && ua.angle(&ub) < tolerance.angle_epsilon()
    }

    /// [`is_connection_aligned`](Self::is_connection_aligned) plus a live
    /// collision check of `a`'s brick under the placement.
    #[must_use]
    pub fn is_connection_valid(
        &self,
        a: ConnectionRef,
        b: ConnectionRef,
        placement: &Placement<'_>,
        ignore: Option<&BrickSet>,
        query: &dyn SpatialQuery,
        tolerance: &Tolerances,
    ) -> bool {
        if !self.is_connection_aligned(a, b, placement, tolerance) {
            return false;
        }
        self.field_owner(a.field)
            .is_some_and(|owner| !self.is_colliding(owner, placement, ignore, query))
    }
}
