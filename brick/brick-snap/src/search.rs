//! Broad-phase candidate search.

use brick_connectivity::{BrickId, Placement};
use brick_spatial::Cone;
use tracing::{debug, warn};

use crate::align::compute_bounds;
use crate::context::BuildContext;

/// Scene bricks near the user's aim that could receive the moving set.
///
/// A cone is built from a point `cone_apex_offset` behind the ray origin,
/// along the ray, just wide enough to enclose the moving set's bounding
/// sphere. Every eligible brick with connection fields whose bounding
/// sphere touches that cone is a candidate. Bricks are returned in
/// ascending handle order; the resolver sorts them by depth.
///
/// # Example
///
/// ```
/// use brick_connectivity::{BrickSet, ColliderQuery, PartTemplate, Scene};
/// use brick_snap::{BuildContext, Camera, cast_brick};
/// use brick_spatial::Ray;
/// use nalgebra::{Isometry3, Point3, Vector3};
///
/// let mut scene = Scene::new();
/// let t = PartTemplate::rectangular("3003", 2, 2);
/// let near = scene.add_brick("near", Isometry3::identity(), &t);
/// let _far = scene.add_brick("far", Isometry3::translation(40.0, 0.0, 0.0), &t);
/// let held = scene.add_brick("held", Isometry3::translation(0.0, 3.0, 0.0), &t);
///
/// let query = ColliderQuery::default();
/// let moving: BrickSet = [held].into_iter().collect();
/// let ray = Ray::new(Point3::new(0.8, 10.0, 0.8), -Vector3::y());
/// let ctx = BuildContext::new(&scene, &query, &moving, ray, Camera::default()).unwrap();
///
/// assert_eq!(cast_brick(&ctx), vec![near]);
/// ```
#[must_use]
pub fn cast_brick(ctx: &BuildContext<'_>) -> Vec<BrickId> {
    let scene = ctx.scene;
    let Some(bounds) = compute_bounds(scene, &ctx.moving_bricks(), &nalgebra::Isometry3::identity()) else {
        return Vec::new();
    };

    let direction = match ctx.ray.unit_direction() {
        Ok(d) => d.into_inner(),
        Err(error) => {
            warn!(%error, "cannot cast along a degenerate ray");
            return Vec::new();
        }
    };
    let apex = ctx.ray.origin - direction * ctx.config.cone_apex_offset();
    let cone = match Cone::enclosing(apex, direction, &bounds.bounding_sphere()) {
        Ok(cone) => cone,
        Err(error) => {
            warn!(%error, "cannot build search cone");
            return Vec::new();
        }
    };

    let rest = Placement::at_rest();
    let mut found: Vec<BrickId> = scene
        .bricks()
        .map(brick_connectivity::Brick::id)
        .filter(|id| ctx.is_eligible(*id) && scene.has_connectivity(*id))
        .filter(|id| {
            scene
                .brick_world_bounds(*id, &rest)
                .map(|b| b.bounding_sphere())
                .is_some_and(|s| !s.is_degenerate() && cone.intersects_sphere(&s))
        })
        .collect();
    found.sort_unstable();

    debug!(candidates = found.len(), scanned = scene.brick_count(), "cast bricks");
    found
}
