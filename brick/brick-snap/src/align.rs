//! Placement helpers: cluster bounds, grid snapping and free alignment.
//!
//! Everything here is pure. Hypothetical poses are expressed as a
//! [`Placement`] and nothing in the scene is moved.

use brick_connectivity::{BrickId, BrickSet, Placement, RayHit, Scene, SpatialQuery, align_rotation};
use brick_spatial::{Aabb, Ray, STUD_PITCH, snap_to_half_cell};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use tracing::trace;

use crate::context::BuildContext;

/// Bounds of several bricks expressed in `frame`.
///
/// Every part's local bounds contributes all eight transformed corners, so
/// rotated bricks get a tight box rather than a rotated box of boxes.
/// Returns `None` when no brick is found.
///
/// # Example
///
/// ```
/// use brick_connectivity::{PartTemplate, Scene};
/// use brick_snap::compute_bounds;
/// use nalgebra::Isometry3;
///
/// let mut scene = Scene::new();
/// let t = PartTemplate::rectangular("3003", 2, 2);
/// let a = scene.add_brick("a", Isometry3::identity(), &t);
/// let b = scene.add_brick("b", Isometry3::translation(0.0, 0.96, 0.0), &t);
///
/// let bounds = compute_bounds(&scene, &[a, b], &Isometry3::identity()).unwrap();
/// assert!((bounds.max.y - 1.92).abs() < 1e-12);
/// ```
#[must_use]
pub fn compute_bounds(scene: &Scene, bricks: &[BrickId], frame: &Isometry3<f64>) -> Option<Aabb> {
    compute_bounds_at(scene, bricks, &Placement::at_rest(), frame)
}

/// [`compute_bounds`] with the bricks posed by `placement`.
#[must_use]
pub fn compute_bounds_at(
    scene: &Scene,
    bricks: &[BrickId],
    placement: &Placement<'_>,
    frame: &Isometry3<f64>,
) -> Option<Aabb> {
    bricks
        .iter()
        .filter_map(|id| scene.brick_bounds_in(*id, placement, frame))
        .reduce(|a, b| a.union(&b))
}

/// Snaps a position onto the half-cell lattice of `reference`.
///
/// The local X and Z coordinates land on `k * cell + cell / 2`; the local
/// Y coordinate is left alone.
///
/// # Example
///
/// ```
/// use brick_snap::align_to_grid;
/// use nalgebra::{Isometry3, Point3};
///
/// let snapped = align_to_grid(&Point3::new(0.1, 5.0, 1.0), &Isometry3::identity(), 0.8);
/// assert!((snapped - Point3::new(0.4, 5.0, 1.2)).norm() < 1e-12);
/// ```
#[must_use]
pub fn align_to_grid(position: &Point3<f64>, reference: &Isometry3<f64>, cell_size: f64) -> Point3<f64> {
    let mut local = reference.inverse_transform_point(position);
    local.x = snap_to_half_cell(local.x, cell_size);
    local.z = snap_to_half_cell(local.z, cell_size);
    reference * local
}

/// Translation that moves `pivot` along `ray` until the lowest point of the
/// cluster rests on the plane of `plane`.
///
/// `bounds` is the cluster's box in the plane's frame and `pivot` the grab
/// point (brick origin plus pickup offset). The pivot ends up at
/// `ray.origin + t * ray.direction`, with `t` chosen so that the bottom of
/// the box sits at local height zero. Returns `None` when the ray runs
/// parallel to the plane or the solution lies behind the ray origin.
#[must_use]
pub fn get_offset_to_grid(
    bounds: &Aabb,
    pivot: &Point3<f64>,
    ray: &Ray,
    plane: &Isometry3<f64>,
) -> Option<Vector3<f64>> {
    let local_ray = ray.to_local(plane);
    let local_pivot = plane.inverse_transform_point(pivot);
    let drop = bounds.min.y - local_pivot.y;
    if local_ray.direction.y.abs() <= 1e-12 {
        return None;
    }
    // origin.y + t * direction.y + drop = 0
    let t = -(local_ray.origin.y + drop) / local_ray.direction.y;
    if t < 0.0 {
        return None;
    }
    Some(ray.point_at(t) - pivot)
}

/// Whether `brick`, placed at `pose`, overlaps anything outside `ignore`.
///
/// The pose is hypothetical; the scene is not touched.
#[must_use]
pub fn is_colliding_at_transformation(
    scene: &Scene,
    brick: BrickId,
    pose: &Isometry3<f64>,
    ignore: Option<&BrickSet>,
    query: &dyn SpatialQuery,
) -> bool {
    let Some(stored) = scene.brick(brick).map(|b| *b.transform()) else {
        return false;
    };
    let moving: BrickSet = [brick].into_iter().collect();
    let placement = Placement::new(&moving, pose * stored.inverse());
    scene.is_colliding(brick, &placement, ignore, query)
}

/// Outcome of free alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedPlacement {
    /// Translation along the ray that rests the cluster on the plane.
    pub offset: Vector3<f64>,
    /// `offset` adjusted so the focus brick's studs land on the grid.
    pub aligned_offset: Vector3<f64>,
    /// Rotation about the pivot that squares the focus brick to the plane.
    pub rotation: UnitQuaternion<f64>,
    /// Surface the ray hit, if any.
    pub hit: Option<RayHit>,
}

impl AlignedPlacement {
    /// World-space motion for the moving set: rotate about `pivot`, then translate.
    #[must_use]
    pub fn transform(&self, pivot: &Point3<f64>) -> Isometry3<f64> {
        let about_pivot = rotation_about(pivot, self.rotation);
        Translation3::from(self.aligned_offset) * about_pivot
    }
}

/// Places the moving set freely when no connection snaps.
///
/// The ray is cast into the scene (moving bricks excluded). On a hit the
/// surface's brick provides the plane and grid: its orientation, raised to
/// the hit height. Otherwise `fallback_plane` is used. The focus brick is
/// squared to the plane, the cluster is dropped along the ray until it
/// rests on the plane, and finally shifted so the focus brick's first stud
/// sits on the stud grid.
///
/// Returns `None` when the ray cannot reach the plane.
#[must_use]
pub fn align_bricks(
    ctx: &BuildContext<'_>,
    focus: BrickId,
    fallback_plane: &Isometry3<f64>,
) -> Option<AlignedPlacement> {
    let scene = ctx.scene;
    let rest = Placement::at_rest();
    let hit = ctx
        .query
        .raycast(scene, &ctx.ray, ctx.config.max_ray_distance(), &|b| ctx.moving.contains(&b));

    let reference = match hit.and_then(|h| Some((h, scene.brick_pose(h.brick, &rest)?))) {
        Some((hit, pose)) => {
            let height = pose.inverse_transform_point(&hit.point).y;
            pose * Translation3::new(0.0, height, 0.0)
        }
        None => *fallback_plane,
    };

    let focus_pose = scene.brick_pose(focus, &rest)?;
    let rotation = align_rotation(&focus_pose.rotation, &reference.rotation).unwrap_or_else(UnitQuaternion::identity);
    let rotated = Placement::new(ctx.moving, rotation_about(&ctx.pivot, rotation));

    let bounds = compute_bounds_at(scene, &ctx.moving_bricks(), &rotated, &reference)?;
    let offset = get_offset_to_grid(&bounds, &ctx.pivot, &ctx.ray, &reference)?;

    let placed = rotated.then(&Isometry3::from_parts(Translation3::from(offset), UnitQuaternion::identity()));
    let half = STUD_PITCH * 0.5;
    let stud = placed.pose(focus, &focus_pose) * Point3::new(half, 0.0, half);
    let snapped = align_to_grid(&stud, &reference, ctx.config.grid_snap_size());
    let aligned_offset = offset + (snapped - stud);
    trace!(?offset, ?aligned_offset, hit = hit.is_some(), "aligned bricks");

    Some(AlignedPlacement {
        offset,
        aligned_offset,
        rotation,
        hit,
    })
}

pub(crate) fn rotation_about(pivot: &Point3<f64>, rotation: UnitQuaternion<f64>) -> Isometry3<f64> {
    let translation = pivot.coords - rotation * pivot.coords;
    Isometry3::from_parts(Translation3::from(translation), rotation)
}
