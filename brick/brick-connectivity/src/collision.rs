//! Collision capability.
//!
//! The host supplies a [`SpatialQuery`]; [`ColliderQuery`] is a brute-force
//! default over each part's box colliders that needs nothing beyond the
//! scene itself.

use brick_spatial::{Obb, Ray};
use nalgebra::Point3;

use crate::ids::{BrickId, PartId};
use crate::placement::{BrickSet, Placement};
use crate::scene::Scene;

/// Closest collider hit along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Brick that was hit.
    pub brick: BrickId,
    /// Part that was hit.
    pub part: PartId,
    /// Distance along the normalized ray.
    pub distance: f64,
    /// World-space hit point.
    pub point: Point3<f64>,
}

/// Overlap and ray queries against the bricks of a scene at their stored poses.
pub trait SpatialQuery {
    /// Whether `obb` overlaps any collider of a brick for which `exclude` is false.
    fn overlaps(&self, scene: &Scene, obb: &Obb, exclude: &dyn Fn(BrickId) -> bool) -> bool;

    /// Closest hit within `max_distance` on a brick for which `exclude` is false.
    fn raycast(
        &self,
        scene: &Scene,
        ray: &Ray,
        max_distance: f64,
        exclude: &dyn Fn(BrickId) -> bool,
    ) -> Option<RayHit>;
}

/// Brute-force [`SpatialQuery`] over part colliders.
///
/// Both the query box and every scene collider are shrunk by `epsilon`
/// before the overlap test, so bricks that merely share a face (a brick
/// stacked on another) do not collide.
///
/// # Example
///
/// ```
/// use brick_connectivity::{ColliderQuery, PartTemplate, Scene, SpatialQuery};
/// use brick_spatial::{Aabb, Obb};
/// use nalgebra::{Isometry3, Point3};
///
/// let mut scene = Scene::new();
/// scene.add_brick("base", Isometry3::identity(), &PartTemplate::rectangular("3003", 2, 2));
///
/// let query = ColliderQuery::default();
/// let body = Aabb::new(Point3::origin(), Point3::new(1.6, 0.96, 1.6));
/// let stacked = Obb::from_aabb(&body, &Isometry3::translation(0.0, 0.96, 0.0));
/// let sunk = Obb::from_aabb(&body, &Isometry3::translation(0.0, 0.5, 0.0));
/// assert!(!query.overlaps(&scene, &stacked, &|_| false));
/// assert!(query.overlaps(&scene, &sunk, &|_| false));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderQuery {
    /// Shrink applied to every box before testing.
    pub epsilon: f64,
}

impl ColliderQuery {
    /// Creates a query with the given shrink.
    #[must_use]
    pub const fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    fn world_colliders(scene: &Scene, brick: BrickId) -> impl Iterator<Item = (PartId, Obb)> + '_ {
        let rest = Placement::at_rest();
        scene
            .brick(brick)
            .into_iter()
            .flat_map(|b| b.parts().iter().copied())
            .filter_map(move |p| Some((p, scene.part(p)?, scene.part_pose(p, &rest)?)))
            .flat_map(|(id, part, pose)| part.colliders().iter().map(move |c| (id, Obb::from_aabb(c, &pose))))
    }
}

impl Default for ColliderQuery {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl SpatialQuery for ColliderQuery {
    fn overlaps(&self, scene: &Scene, obb: &Obb, exclude: &dyn Fn(BrickId) -> bool) -> bool {
        let probe = obb.shrunk(self.epsilon);
        let probe_bounds = probe.aabb();
        let rest = Placement::at_rest();
        scene
            .bricks()
            .map(crate::part::Brick::id)
            .filter(|id| !exclude(*id))
            .filter(|id| {
                scene
                    .brick_world_bounds(*id, &rest)
                    .is_some_and(|b| b.intersects(&probe_bounds))
            })
            .any(|id| {
                Self::world_colliders(scene, id)
                    .any(|(_, collider)| collider.shrunk(self.epsilon).intersects(&probe))
            })
    }

    fn raycast(
        &self,
        scene: &Scene,
        ray: &Ray,
        max_distance: f64,
        exclude: &dyn Fn(BrickId) -> bool,
    ) -> Option<RayHit> {
        let ray = ray.normalized();
        let mut best: Option<RayHit> = None;
        for brick in scene.bricks().map(crate::part::Brick::id).filter(|id| !exclude(*id)) {
            for (part, collider) in Self::world_colliders(scene, brick) {
                let limit = best.map_or(max_distance, |b| b.distance);
                if let Some(t) = collider.ray_intersection(&ray, limit)
                    && best.is_none_or(|b| t < b.distance)
                {
                    best = Some(RayHit {
                        brick,
                        part,
                        distance: t,
                        point: ray.point_at(t),
                    });
                }
            }
        }
        best
    }
}

impl Scene {
    /// Whether `brick`, posed by `placement`, overlaps any other brick.
    ///
    /// Bricks in `ignore` and every brick moving with the placement are
    /// skipped; moving bricks keep their relative poses so cannot newly
    /// collide with each other.
    #[must_use]
    pub fn is_colliding(
        &self,
        brick: BrickId,
        placement: &Placement<'_>,
        ignore: Option<&BrickSet>,
        query: &dyn SpatialQuery,
    ) -> bool {
        let Some(b) = self.brick(brick) else {
            return false;
        };
        let exclude = |other: BrickId| {
            other == brick || placement.is_moving(other) || ignore.is_some_and(|set| set.contains(&other))
        };
        b.parts().iter().any(|p| {
            let (Some(part), Some(pose)) = (self.part(*p), self.part_pose(*p, placement)) else {
                return false;
            };
            part.colliders()
                .iter()
                .any(|c| query.overlaps(self, &Obb::from_aabb(c, &pose), &exclude))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::PartTemplate;
    use approx::assert_relative_eq;
    use nalgebra::{Isometry3, Vector3};

    fn stack() -> (Scene, BrickId, BrickId) {
        let mut scene = Scene::new();
        let t = PartTemplate::rectangular("3003", 2, 2);
        let base = scene.add_brick("base", Isometry3::identity(), &t);
        let top = scene.add_brick("top", Isometry3::translation(0.0, 0.96, 0.0), &t);
        (scene, base, top)
    }

    #[test]
    fn test_stacked_bricks_do_not_collide() {
        let (scene, _, top) = stack();
        let query = ColliderQuery::default();
        assert!(!scene.is_colliding(top, &Placement::at_rest(), None, &query));
    }

    #[test]
    fn test_hypothetical_overlap() {
        let (scene, base, top) = stack();
        let query = ColliderQuery::default();
        let moving: BrickSet = [top].into_iter().collect();
        let sunk = Placement::new(&moving, Isometry3::translation(0.4, -0.5, 0.0));
        assert!(scene.is_colliding(top, &sunk, None, &query));

        let ignore: BrickSet = [base].into_iter().collect();
        assert!(!scene.is_colliding(top, &sunk, Some(&ignore), &query));
    }

    #[test]
    fn test_moving_set_is_skipped() {
        let (scene, base, top) = stack();
        let query = ColliderQuery::default();
        // Both bricks move together: nothing else to hit
        let moving: BrickSet = [base, top].into_iter().collect();
        let placement = Placement::new(&moving, Isometry3::translation(0.0, -0.5, 0.0));
        assert!(!scene.is_colliding(top, &placement, None, &query));
    }

    #[test]
    fn test_raycast_nearest() {
        let (scene, base, top) = stack();
        let query = ColliderQuery::default();
        let ray = Ray::new(Point3::new(0.8, 10.0, 0.8), Vector3::new(0.0, -2.0, 0.0));
        let hit = query.raycast(&scene, &ray, 100.0, &|_| false).unwrap();
        assert_eq!(hit.brick, top);
        assert_relative_eq!(hit.distance, 10.0 - 1.92, epsilon = 1e-9);

        let hit = query.raycast(&scene, &ray, 100.0, &|b| b == top).unwrap();
        assert_eq!(hit.brick, base);
        assert!(query.raycast(&scene, &ray, 5.0, &|_| false).is_none());
    }
}
