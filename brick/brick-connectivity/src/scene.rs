//! The scene arena.
//!
//! [`Scene`] owns every brick, part and connection field in flat tables and
//! hands out copyable handles. All pose queries take a [`Placement`] so that
//! hypothetical motions can be evaluated without touching stored transforms.

use brick_spatial::Aabb;
use nalgebra::{Isometry3, Point3, Vector3};
use tracing::debug;

use crate::connection::{Connection, Feature};
use crate::error::{ConnectivityError, ConnectivityResult};
use crate::field::ConnectionField;
use crate::ids::{BrickId, ConnectionRef, FieldId, PartId};
use crate::part::{Brick, Connectivity, Part, PartTemplate};
use crate::placement::{BrickSet, Placement};

/// Owner of every brick, part and field.
///
/// # Example
///
/// ```
/// use brick_connectivity::{PartTemplate, Placement, Scene};
/// use nalgebra::Isometry3;
///
/// let mut scene = Scene::new();
/// let id = scene.add_brick("2x2", Isometry3::identity(), &PartTemplate::rectangular("3003", 2, 2));
///
/// assert_eq!(scene.brick_count(), 1);
/// assert_eq!(scene.brick_fields(id).count(), 2);
/// let bounds = scene.brick_world_bounds(id, &Placement::at_rest()).unwrap();
/// assert!((bounds.max.y - 0.96).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scene {
    bricks: Vec<Brick>,
    parts: Vec<Part>,
    fields: Vec<ConnectionField>,
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Adds a single-part brick.
    pub fn add_brick(&mut self, name: impl Into<String>, transform: Isometry3<f64>, part: &PartTemplate) -> BrickId {
        self.add_multi_part_brick(name, transform, &[(part.clone(), Isometry3::identity())])
    }

    /// Adds a brick made of several parts, each placed in brick space.
    pub fn add_multi_part_brick(
        &mut self,
        name: impl Into<String>,
        transform: Isometry3<f64>,
        parts: &[(PartTemplate, Isometry3<f64>)],
    ) -> BrickId {
        let brick_id = BrickId(next_id(self.bricks.len()));
        let mut part_ids = Vec::with_capacity(parts.len());
        for (template, local) in parts {
            let part_id = PartId(next_id(self.parts.len()));
            let mut field_ids = Vec::with_capacity(template.fields.len());
            for field in &template.fields {
                let field_id = FieldId(next_id(self.fields.len()));
                let mut field = field.clone();
                field.attach(field_id, part_id);
                self.fields.push(field);
                field_ids.push(field_id);
            }
            self.parts.push(Part {
                id: part_id,
                brick: brick_id,
                name: template.name.clone(),
                local: *local,
                colliders: template.colliders.clone(),
                connectivity: Connectivity {
                    fields: field_ids,
                    extents: template.bounds,
                },
                material: template.material,
            });
            part_ids.push(part_id);
        }
        let name = name.into();
        debug!(brick = %brick_id, name = %name, parts = part_ids.len(), "brick added");
        self.bricks.push(Brick {
            id: brick_id,
            name,
            transform,
            parts: part_ids,
        });
        brick_id
    }

    /// Copies a brick with its parts and fields at the same transform.
    ///
    /// Bond references are copied verbatim and still point at the
    /// original's counterparts. Returns the copy and an (original, copy)
    /// pair per field.
    pub(crate) fn clone_brick(&mut self, id: BrickId) -> Option<(BrickId, Vec<(FieldId, FieldId)>)> {
        let original = self.brick(id)?.clone();
        let brick_id = BrickId(next_id(self.bricks.len()));
        let mut field_pairs = Vec::new();
        let mut part_ids = Vec::with_capacity(original.parts.len());
        for part_id in &original.parts {
            let Some(part) = self.part(*part_id).cloned() else {
                continue;
            };
            let new_part = PartId(next_id(self.parts.len()));
            let mut fields = Vec::with_capacity(part.connectivity.fields.len());
            for field_id in &part.connectivity.fields {
                let Some(mut field) = self.field(*field_id).cloned() else {
                    continue;
                };
                let new_field = FieldId(next_id(self.fields.len()));
                field.attach(new_field, new_part);
                self.fields.push(field);
                field_pairs.push((*field_id, new_field));
                fields.push(new_field);
            }
            let extents = part.connectivity.extents;
            self.parts.push(Part {
                id: new_part,
                brick: brick_id,
                connectivity: Connectivity { fields, extents },
                ..part
            });
            part_ids.push(new_part);
        }
        self.bricks.push(Brick {
            id: brick_id,
            parts: part_ids,
            ..original
        });
        Some((brick_id, field_pairs))
    }

    /// Replaces a brick's world transform.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectivityError::BrickNotFound`] for an unknown handle.
    pub fn set_brick_transform(&mut self, id: BrickId, transform: Isometry3<f64>) -> ConnectivityResult<()> {
        let brick = self
            .bricks
            .get_mut(id.index())
            .ok_or(ConnectivityError::BrickNotFound { id })?;
        brick.transform = transform;
        Ok(())
    }

    /// Applies a world-space motion to every brick in `ids`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectivityError::BrickNotFound`] before moving anything if
    /// any handle is unknown.
    pub fn move_bricks(&mut self, ids: &BrickSet, delta: &Isometry3<f64>) -> ConnectivityResult<()> {
        if let Some(&id) = ids.iter().find(|id| self.brick(**id).is_none()) {
            return Err(ConnectivityError::BrickNotFound { id });
        }
        for id in ids {
            let brick = &mut self.bricks[id.index()];
            brick.transform = delta * brick.transform;
        }
        Ok(())
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Number of bricks.
    #[must_use]
    pub fn brick_count(&self) -> usize {
        self.bricks.len()
    }

    /// Number of fields across all parts.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Brick by handle.
    #[must_use]
    pub fn brick(&self, id: BrickId) -> Option<&Brick> {
        self.bricks.get(id.index())
    }

    /// Part by handle.
    #[must_use]
    pub fn part(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id.index())
    }

    /// Field by handle.
    #[must_use]
    pub fn field(&self, id: FieldId) -> Option<&ConnectionField> {
        self.fields.get(id.index())
    }

    pub(crate) fn field_mut(&mut self, id: FieldId) -> Option<&mut ConnectionField> {
        self.fields.get_mut(id.index())
    }

    /// Iterates over every brick.
    pub fn bricks(&self) -> impl Iterator<Item = &Brick> {
        self.bricks.iter()
    }

    /// Iterates over every field.
    pub fn fields(&self) -> impl Iterator<Item = &ConnectionField> {
        self.fields.iter()
    }

    /// Connection behind a reference.
    #[must_use]
    pub fn connection(&self, c: ConnectionRef) -> Option<&Connection> {
        self.field(c.field).and_then(|f| f.connection(c.index))
    }

    /// Counterpart of a connection, if bonded.
    #[must_use]
    pub fn connected_to(&self, c: ConnectionRef) -> Option<ConnectionRef> {
        self.field(c.field).and_then(|f| f.get_connection(c.index))
    }

    /// Whether a connection is bonded.
    #[must_use]
    pub fn is_bonded(&self, c: ConnectionRef) -> bool {
        self.connected_to(c).is_some()
    }

    /// Brick that owns a field.
    #[must_use]
    pub fn field_owner(&self, field: FieldId) -> Option<BrickId> {
        self.field(field)
            .and_then(ConnectionField::part)
            .and_then(|p| self.part(p))
            .map(Part::brick)
    }

    /// Every field of a brick, across all its parts.
    pub fn brick_fields(&self, id: BrickId) -> impl Iterator<Item = FieldId> + '_ {
        self.brick(id)
            .into_iter()
            .flat_map(|b| b.parts.iter())
            .filter_map(|p| self.part(*p))
            .flat_map(|p| p.connectivity.fields.iter().copied())
    }

    /// Whether a brick has at least one connection field.
    #[must_use]
    pub fn has_connectivity(&self, id: BrickId) -> bool {
        self.brick_fields(id).next().is_some()
    }

    /// Features of a field whose connection is free, so whose geometry is visible.
    pub fn visible_features(&self, field: FieldId) -> impl Iterator<Item = Feature> + '_ {
        self.field(field).into_iter().flat_map(|f| {
            f.connections()
                .filter(move |c| !f.has_connection(c.index()))
                .flat_map(|c| c.features.iter().copied())
        })
    }

    // ========================================================================
    // Poses
    // ========================================================================

    /// Pose of a brick under a placement.
    #[must_use]
    pub fn brick_pose(&self, id: BrickId, placement: &Placement<'_>) -> Option<Isometry3<f64>> {
        self.brick(id).map(|b| placement.pose(id, &b.transform))
    }

    /// Pose of a part under a placement.
    #[must_use]
    pub fn part_pose(&self, id: PartId, placement: &Placement<'_>) -> Option<Isometry3<f64>> {
        let part = self.part(id)?;
        Some(self.brick_pose(part.brick, placement)? * part.local)
    }

    /// Pose of a field under a placement.
    #[must_use]
    pub fn field_transform(&self, id: FieldId, placement: &Placement<'_>) -> Option<Isometry3<f64>> {
        let field = self.field(id)?;
        Some(self.part_pose(field.part()?, placement)? * field.local_transform())
    }

    /// World up vector of a field.
    #[must_use]
    pub fn field_up(&self, id: FieldId, placement: &Placement<'_>) -> Option<Vector3<f64>> {
        self.field_transform(id, placement).map(|t| t.rotation * Vector3::y())
    }

    /// World position of a connection.
    #[must_use]
    pub fn connection_position(&self, c: ConnectionRef, placement: &Placement<'_>) -> Option<Point3<f64>> {
        let field = self.field(c.field)?;
        let coord = field.coord_of(c.index);
        Some(self.field_transform(c.field, placement)? * ConnectionField::lattice_point(coord))
    }

    /// World position of a field's center.
    #[must_use]
    pub fn field_center(&self, id: FieldId, placement: &Placement<'_>) -> Option<Point3<f64>> {
        let center = self.field(id)?.local_center();
        Some(self.field_transform(id, placement)? * center)
    }

    /// World bounds of a field's lattice.
    #[must_use]
    pub fn field_world_bounds(&self, id: FieldId, placement: &Placement<'_>) -> Option<Aabb> {
        let local = self.field(id)?.local_bounds();
        Some(local.transformed(&self.field_transform(id, placement)?))
    }

    /// Bounds of a brick in brick space (union of its parts' bounds).
    #[must_use]
    pub fn brick_local_bounds(&self, id: BrickId) -> Option<Aabb> {
        let brick = self.brick(id)?;
        brick
            .parts
            .iter()
            .filter_map(|p| self.part(*p))
            .map(|p| p.connectivity.extents.transformed(&p.local))
            .reduce(|a, b| a.union(&b))
    }

    /// Bounds of a brick in an arbitrary frame, from all eight corners of
    /// every part's bounds.
    #[must_use]
    pub fn brick_bounds_in(&self, id: BrickId, placement: &Placement<'_>, frame: &Isometry3<f64>) -> Option<Aabb> {
        let to_frame = frame.inverse() * self.brick_pose(id, placement)?;
        let brick = self.brick(id)?;
        brick
            .parts
            .iter()
            .filter_map(|p| self.part(*p))
            .map(|p| p.connectivity.extents.transformed(&(to_frame * p.local)))
            .reduce(|a, b| a.union(&b))
    }

    /// World bounds of a brick under a placement.
    #[must_use]
    pub fn brick_world_bounds(&self, id: BrickId, placement: &Placement<'_>) -> Option<Aabb> {
        self.brick_bounds_in(id, placement, &Isometry3::identity())
    }
}

fn next_id(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::stud_coord;
    use approx::assert_relative_eq;
    use brick_spatial::GridCoord;

    fn two_bricks() -> (Scene, BrickId, BrickId) {
        let mut scene = Scene::new();
        let t = PartTemplate::rectangular("3003", 2, 2);
        let a = scene.add_brick("a", Isometry3::identity(), &t);
        let b = scene.add_brick("b", Isometry3::translation(5.0, 0.0, 0.0), &t);
        (scene, a, b)
    }

    #[test]
    fn test_handles_are_attached() {
        let (scene, a, b) = two_bricks();
        let fields: Vec<_> = scene.brick_fields(b).collect();
        assert_eq!(fields, vec![FieldId(2), FieldId(3)]);
        assert_eq!(scene.field_owner(FieldId(0)), Some(a));
        assert_eq!(scene.field_owner(FieldId(3)), Some(b));

        let knob = scene.field(FieldId(2)).unwrap().get_connection_at(stud_coord(0, 0)).unwrap();
        assert_eq!(knob.field(), FieldId(2));
        assert_eq!(scene.connection(knob.reference()), Some(knob));
    }

    #[test]
    fn test_connection_position() {
        let (scene, _, b) = two_bricks();
        let top = scene.brick_fields(b).next().unwrap();
        let index = scene.field(top).unwrap().index_of(GridCoord::new(1, 1)).unwrap();
        let p = scene
            .connection_position(ConnectionRef::new(top, index), &Placement::at_rest())
            .unwrap();
        assert_relative_eq!(p, Point3::new(5.4, 0.96, 0.4), epsilon = 1e-12);
    }

    #[test]
    fn test_placement_moves_only_moving_bricks() {
        let (scene, a, b) = two_bricks();
        let moving: BrickSet = [a].into_iter().collect();
        let placement = Placement::new(&moving, Isometry3::translation(0.0, 1.0, 0.0));
        let ba = scene.brick_world_bounds(a, &placement).unwrap();
        let bb = scene.brick_world_bounds(b, &placement).unwrap();
        assert_relative_eq!(ba.min.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(bb.min.y, 0.0, epsilon = 1e-12);
        // Stored transforms are untouched
        assert_eq!(scene.brick(a).unwrap().transform(), &Isometry3::identity());
    }

    #[test]
    fn test_rotated_bounds_use_all_corners() {
        let mut scene = Scene::new();
        let rot = Isometry3::rotation(Vector3::y() * std::f64::consts::FRAC_PI_4);
        let id = scene.add_brick("r", rot, &PartTemplate::rectangular("3003", 2, 2));
        let bounds = scene.brick_world_bounds(id, &Placement::at_rest()).unwrap();
        let expected = Aabb::from_points(
            Aabb::new(Point3::origin(), Point3::new(1.6, 0.96, 1.6))
                .corners()
                .iter()
                .map(|c| rot * c),
        )
        .unwrap();
        assert_relative_eq!(bounds.min, expected.min, epsilon = 1e-12);
        assert_relative_eq!(bounds.max, expected.max, epsilon = 1e-12);
    }

    #[test]
    fn test_move_bricks_rejects_unknown() {
        let (mut scene, a, _) = two_bricks();
        let ids: BrickSet = [a, BrickId(99)].into_iter().collect();
        assert!(scene.move_bricks(&ids, &Isometry3::translation(1.0, 0.0, 0.0)).is_err());
        assert_eq!(scene.brick(a).unwrap().transform(), &Isometry3::identity());
    }

    #[test]
    fn test_visible_features_hide_bonded() {
        let (mut scene, _, _) = two_bricks();
        let top = FieldId(0);
        assert_eq!(scene.visible_features(top).count(), 4);
        let index = scene.field(top).unwrap().index_of(stud_coord(0, 0)).unwrap();
        scene
            .field_mut(top)
            .unwrap()
            .set_bond(index, Some(ConnectionRef::new(FieldId(3), 0)));
        assert_eq!(scene.visible_features(top).count(), 3);
    }
}
