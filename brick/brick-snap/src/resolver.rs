//! Best-connection resolver.
//!
//! Given a context (scene, moving set, aim), finds where the moving set
//! snaps. Every trial pose is a [`Placement`] value, so a failed search
//! leaves the scene exactly as it was. Acceptance is first-match-wins over
//! a fixed scan order:
//!
//! 1. candidate bricks from [`cast_brick`], nearest to the camera first
//! 2. field pairs by distance from the ray origin, then by up-vector angle
//! 3. the nine lattice offsets in [`OFFSETS`] order
//! 4. matching connection pairs in discovery order
//!
//! The first pair that survives the reject sweep, the collision test and
//! the final alignment check wins for its brick; the search stops once
//! `max_tries` bricks have produced a winner.

use brick_connectivity::{
    BrickId, BrickSet, ConnectionMatch, ConnectionRef, FieldId, Placement, Scene, Tolerances, align_rotation,
    masks_connect, match_types,
};
use brick_spatial::{CELL_SIZE, Plane};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion};
use tracing::{debug, info, trace};

use crate::align::rotation_about;
use crate::context::BuildContext;
use crate::error::{SnapError, SnapResult};
use crate::search::cast_brick;

/// Lattice offsets tried around the projected cell, in priority order:
/// center, then axis neighbours, then diagonals.
pub const OFFSETS: [(i32, i32); 9] = [(0, 0), (0, 1), (0, -1), (1, 0), (-1, 0), (1, 1), (1, -1), (-1, 1), (-1, -1)];

/// A winning pair of connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionPair {
    /// Connection on the moving set.
    pub source: ConnectionRef,
    /// Connection on the scene brick.
    pub target: ConnectionRef,
}

/// An accepted snap: the pair and the motion that realises it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapCandidate {
    /// The bonded pair.
    pub pair: ConnectionPair,
    /// World-space motion for every moving brick.
    pub transform: Isometry3<f64>,
}

impl SnapCandidate {
    /// Pose of a moving brick once the snap is applied.
    #[must_use]
    pub fn pose_of(&self, stored: &Isometry3<f64>) -> Isometry3<f64> {
        self.transform * stored
    }
}

/// Counters gathered during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapStats {
    /// Scene bricks the cone cast discarded.
    pub candidates_culled: usize,
    /// Candidate bricks handed to the per-brick resolver.
    pub candidates_considered: usize,
    /// Field pairs that reached the offset loop.
    pub field_pairs_tried: usize,
    /// Lattice offsets evaluated.
    pub offsets_tried: usize,
    /// Offsets abandoned because a cell rejected.
    pub rejects: usize,
    /// Matches dropped by the collision test.
    pub collisions: usize,
}

/// Finds the connection the moving set should snap to, if any.
///
/// # Example
///
/// ```
/// use brick_connectivity::{BrickSet, ColliderQuery, PartTemplate, Scene};
/// use brick_snap::{BuildContext, Camera, find_best_connection};
/// use brick_spatial::Ray;
/// use nalgebra::{Isometry3, Point3, Vector3};
///
/// let mut scene = Scene::new();
/// let t = PartTemplate::rectangular("3003", 2, 2);
/// let base = scene.add_brick("base", Isometry3::identity(), &t);
/// let held = scene.add_brick("held", Isometry3::translation(0.1, 4.0, -0.1), &t);
///
/// let query = ColliderQuery::default();
/// let moving: BrickSet = [held].into_iter().collect();
/// let ray = Ray::new(Point3::new(0.8, 10.0, 0.8), -Vector3::y());
/// let ctx = BuildContext::new(&scene, &query, &moving, ray, Camera::default()).unwrap();
///
/// let pair = find_best_connection(&ctx).unwrap();
/// assert_eq!(scene.field_owner(pair.target.field), Some(base));
/// assert_eq!(scene.field_owner(pair.source.field), Some(held));
/// ```
#[must_use]
pub fn find_best_connection(ctx: &BuildContext<'_>) -> Option<ConnectionPair> {
    find_connection_candidates(ctx).first().map(|c| c.pair)
}

/// Accepted snaps in scan order, at most `max_tries` of them.
#[must_use]
pub fn find_connection_candidates(ctx: &BuildContext<'_>) -> Vec<SnapCandidate> {
    find_connection_candidates_with_stats(ctx).0
}

/// [`find_connection_candidates`] plus search counters.
#[must_use]
pub fn find_connection_candidates_with_stats(ctx: &BuildContext<'_>) -> (Vec<SnapCandidate>, SnapStats) {
    let scene = ctx.scene;
    let mut stats = SnapStats::default();

    let cast = cast_brick(ctx);
    stats.candidates_culled = scene.brick_count().saturating_sub(ctx.moving.len() + cast.len());
    let bricks = sort_by_depth(ctx, cast);
    let selected = selected_fields(ctx);

    let mut found = Vec::new();
    for brick in bricks {
        if found.len() >= ctx.config.max_tries() {
            break;
        }
        stats.candidates_considered += 1;
        if let Some(candidate) = find_best_connection_on_brick(ctx, brick, &selected, &mut stats) {
            found.push(candidate);
        }
    }

    debug!(
        accepted = found.len(),
        culled = stats.candidates_culled,
        considered = stats.candidates_considered,
        field_pairs = stats.field_pairs_tried,
        offsets = stats.offsets_tried,
        rejects = stats.rejects,
        collisions = stats.collisions,
        "snap search finished"
    );
    (found, stats)
}

/// Fields of the moving set that can still bond, in brick order.
#[must_use]
pub fn selected_fields(ctx: &BuildContext<'_>) -> Vec<FieldId> {
    let scene = ctx.scene;
    ctx.moving_bricks()
        .into_iter()
        .flat_map(|b| scene.brick_fields(b))
        .filter(|f| scene.field(*f).is_some_and(|field| field.has_available_connections()))
        .collect()
}

fn sort_by_depth(ctx: &BuildContext<'_>, bricks: Vec<BrickId>) -> Vec<BrickId> {
    let rest = Placement::at_rest();
    let mut keyed: Vec<(f64, BrickId)> = bricks
        .into_iter()
        .map(|b| {
            let depth = ctx
                .scene
                .brick_world_bounds(b, &rest)
                .map_or(f64::INFINITY, |bounds| ctx.camera.depth(&bounds.center()));
            (depth, b)
        })
        .collect();
    // Stable: equal depths keep cast order
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, b)| b).collect()
}

#[derive(Debug, Clone, Copy)]
struct FieldPair {
    target: FieldId,
    source: FieldId,
    distance: f64,
    angle: f64,
}

/// Best snap of the moving set onto one scene brick.
///
/// `selected` are the moving fields to try, usually [`selected_fields`].
#[must_use]
pub fn find_best_connection_on_brick(
    ctx: &BuildContext<'_>,
    brick: BrickId,
    selected: &[FieldId],
    stats: &mut SnapStats,
) -> Option<SnapCandidate> {
    let scene = ctx.scene;
    let rest = Placement::at_rest();

    let mut pairs = Vec::new();
    for target_id in scene.brick_fields(brick) {
        let Some(target) = scene.field(target_id) else {
            continue;
        };
        if !target.has_available_connections() {
            continue;
        }
        let (Some(center), Some(target_up)) = (scene.field_center(target_id, &rest), scene.field_up(target_id, &rest))
        else {
            continue;
        };
        let distance = ctx.ray.distance_from_origin(&center);

        for &source_id in selected {
            let Some(source) = scene.field(source_id) else {
                continue;
            };
            if source.kind() == target.kind() || !masks_connect(source.type_mask(), target.type_mask()) {
                continue;
            }
            let angle = scene
                .field_up(source_id, &rest)
                .map_or(std::f64::consts::PI, |up| up.angle(&target_up));
            pairs.push(FieldPair {
                target: target_id,
                source: source_id,
                distance,
                angle,
            });
        }
    }
    pairs.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.angle.total_cmp(&b.angle))
    });

    let tolerance = ctx.tolerances();
    pairs
        .iter()
        .find_map(|pair| try_field_pair(ctx, pair, &tolerance, stats))
}

fn try_field_pair(
    ctx: &BuildContext<'_>,
    pair: &FieldPair,
    tolerance: &Tolerances,
    stats: &mut SnapStats,
) -> Option<SnapCandidate> {
    let scene = ctx.scene;
    let rest = Placement::at_rest();
    stats.field_pairs_tried += 1;

    let from = scene.field_transform(pair.source, &rest)?;
    let to = scene.field_transform(pair.target, &rest)?;
    let Some(rotation) = align_rotation(&from.rotation, &to.rotation) else {
        trace!(source = ?pair.source, target = ?pair.target, "fields cannot be aligned");
        return None;
    };
    let rotated = Placement::new(ctx.moving, rotation_about(&ctx.pivot, rotation));

    // Drop the rotated field onto the target plane along the aim
    let moved = scene.field_transform(pair.source, &rotated)?;
    let origin = Point3::from(moved.translation.vector);
    let landing = Plane::from_isometry(&to).project_along(&origin, &ctx.ray.direction);
    let local = to.inverse_transform_point(&landing);
    let (cell_x, cell_z) = ((local.x / CELL_SIZE).round(), (local.z / CELL_SIZE).round());

    for (k, (dx, dz)) in OFFSETS.iter().enumerate() {
        stats.offsets_tried += 1;
        let (x, z) = (cell_x + f64::from(*dx), cell_z + f64::from(*dz));
        let lattice = to * Point3::new(x * CELL_SIZE, 0.0, z * CELL_SIZE);
        let shift = Isometry3::from_parts(Translation3::from(lattice - origin), UnitQuaternion::identity());
        let placement = rotated.then(&shift);

        let Some(overlap) = scene.get_overlap(pair.target, pair.source, &placement, tolerance) else {
            if k == 0 {
                trace!(source = ?pair.source, target = ?pair.target, "no overlap at center, pair skipped");
                return None;
            }
            continue;
        };

        let Some(matches) = collect_matches(scene, pair, &overlap.cells) else {
            stats.rejects += 1;
            trace!(offset = k, "offset rejected");
            continue;
        };
        if let Some(candidate) = matches
            .into_iter()
            .find_map(|m| try_match(ctx, m, &placement, tolerance, stats))
        {
            trace!(offset = k, source = ?candidate.pair.source, target = ?candidate.pair.target, "snap accepted");
            return Some(candidate);
        }
    }
    None
}

/// Connecting pairs in an overlap, or `None` if any free pair rejects.
fn collect_matches(
    scene: &Scene,
    pair: &FieldPair,
    cells: &[brick_connectivity::OverlapCell],
) -> Option<Vec<ConnectionPair>> {
    let (target, source) = (scene.field(pair.target)?, scene.field(pair.source)?);
    let mut matches = Vec::new();
    for cell in cells {
        let (Some(t), Some(s)) = (target.connection(cell.first), source.connection(cell.second)) else {
            continue;
        };
        if scene.is_bonded(t.reference()) || scene.is_bonded(s.reference()) {
            continue;
        }
        match match_types(s.connection_type, t.connection_type) {
            ConnectionMatch::Reject => return None,
            ConnectionMatch::Connect => matches.push(ConnectionPair {
                source: s.reference(),
                target: t.reference(),
            }),
            ConnectionMatch::Ignore => {}
        }
    }
    Some(matches)
}

fn try_match(
    ctx: &BuildContext<'_>,
    pair: ConnectionPair,
    placement: &Placement<'_>,
    tolerance: &Tolerances,
    stats: &mut SnapStats,
) -> Option<SnapCandidate> {
    let scene = ctx.scene;
    let pivot = placement.delta() * ctx.pivot;
    let exact = scene.get_connected_transformation(pair.source, pair.target, &pivot, placement)?;
    let placement = placement.then(&exact.to_isometry());

    if rejects_anywhere(ctx, &placement, tolerance) {
        return None;
    }
    let moving = ctx.moving_bricks();
    if moving
        .iter()
        .any(|b| scene.is_colliding(*b, &placement, None, ctx.query))
    {
        stats.collisions += 1;
        return None;
    }
    if !scene.is_connection_valid(pair.source, pair.target, &placement, None, ctx.query, tolerance) {
        return None;
    }
    Some(SnapCandidate {
        pair,
        transform: *placement.delta(),
    })
}

/// Whether any free, coincident pair between a moving field and the scene rejects.
fn rejects_anywhere(ctx: &BuildContext<'_>, placement: &Placement<'_>, tolerance: &Tolerances) -> bool {
    let scene = ctx.scene;
    ctx.moving_bricks()
        .into_iter()
        .flat_map(|b| scene.brick_fields(b))
        .flat_map(|f| scene.query_connections(f, placement, tolerance))
        .any(|c| c.matched == ConnectionMatch::Reject && !scene.is_bonded(c.source) && !scene.is_bonded(c.target))
}

/// Applies an accepted snap.
///
/// Moves the moving set, breaks the bonds that no longer line up, and bonds
/// every coincident pair (the accepted one included). Returns the number of
/// new bonds.
///
/// # Errors
///
/// Returns [`SnapError::EmptyMovingSet`] for an empty moving set and
/// [`SnapError::Connectivity`] if a moving brick is not in the scene.
pub fn apply_snap(
    scene: &mut Scene,
    candidate: &SnapCandidate,
    moving: &BrickSet,
    tolerance: &Tolerances,
) -> SnapResult<usize> {
    if moving.is_empty() {
        return Err(SnapError::EmptyMovingSet);
    }
    scene.move_bricks(moving, &candidate.transform)?;

    let mut bricks: Vec<BrickId> = moving.iter().copied().collect();
    bricks.sort_unstable();
    let fields: Vec<FieldId> = bricks.iter().flat_map(|b| scene.brick_fields(*b)).collect();
    let mut broken = 0;
    for field in fields {
        broken += scene.disconnect_all_invalid(field, tolerance)?;
    }
    let bonded = scene.connect_coincident(moving, tolerance);

    info!(
        bricks = moving.len(),
        broken,
        bonded,
        source = ?candidate.pair.source,
        target = ?candidate.pair.target,
        "applied snap"
    );
    Ok(bonded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use approx::assert_relative_eq;
    use brick_connectivity::{ColliderQuery, PartTemplate};
    use brick_spatial::Ray;
    use nalgebra::Vector3;

    fn down_ray(x: f64, z: f64) -> Ray {
        Ray::new(Point3::new(x, 10.0, z), -Vector3::y())
    }

    #[test]
    fn test_offset_order() {
        assert_eq!(OFFSETS[0], (0, 0));
        assert_eq!(&OFFSETS[1..5], &[(0, 1), (0, -1), (1, 0), (-1, 0)]);
        assert!(OFFSETS[5..].iter().all(|(x, z)| x.abs() == 1 && z.abs() == 1));
    }

    #[test]
    fn test_snaps_onto_base() {
        let mut scene = Scene::new();
        let t = PartTemplate::rectangular("3003", 2, 2);
        let base = scene.add_brick("base", Isometry3::identity(), &t);
        let held = scene.add_brick("held", Isometry3::new(Vector3::new(0.1, 4.0, 0.1), Vector3::y() * 0.2), &t);
        let query = ColliderQuery::default();
        let moving: BrickSet = [held].into_iter().collect();
        let ctx = BuildContext::new(&scene, &query, &moving, down_ray(0.8, 0.8), Camera::default())
            .unwrap()
            .with_pivot(Point3::new(0.1, 4.0, 0.1));

        let (found, stats) = find_connection_candidates_with_stats(&ctx);
        assert_eq!(found.len(), 1);
        assert_eq!(stats.candidates_considered, 1);
        assert_eq!(scene.field_owner(found[0].pair.target.field), Some(base));

        let pose = found[0].pose_of(scene.brick(held).unwrap().transform());
        assert_relative_eq!(pose.rotation.angle(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(pose.translation.vector, Vector3::new(0.0, 0.96, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_apply_snap_bonds_everything() {
        let mut scene = Scene::new();
        let t = PartTemplate::rectangular("3003", 2, 2);
        scene.add_brick("base", Isometry3::identity(), &t);
        let held = scene.add_brick("held", Isometry3::translation(0.1, 4.0, 0.0), &t);
        let query = ColliderQuery::default();
        let moving: BrickSet = [held].into_iter().collect();
        let candidate = {
            let ctx = BuildContext::new(&scene, &query, &moving, down_ray(0.8, 0.8), Camera::default()).unwrap();
            find_connection_candidates(&ctx)[0]
        };

        let bonded = apply_snap(&mut scene, &candidate, &moving, &Tolerances::default()).unwrap();
        assert_eq!(bonded, 4);
        assert_eq!(scene.connected_to(candidate.pair.source), Some(candidate.pair.target));
        assert!(scene.validate(&Tolerances::default()).is_valid());
        assert!(matches!(
            apply_snap(&mut scene, &candidate, &BrickSet::new(), &Tolerances::default()),
            Err(SnapError::EmptyMovingSet)
        ));
    }

    #[test]
    fn test_collision_blocks_snap() {
        let mut scene = Scene::new();
        let t = PartTemplate::rectangular("3003", 2, 2);
        scene.add_brick("base", Isometry3::identity(), &t);
        // A wall through the base, above and below, without fields of its own
        let body = brick_spatial::Aabb::new(Point3::origin(), Point3::new(1.6, 7.0, 0.2));
        let wall = PartTemplate::new("wall", body).with_collider(body);
        scene.add_brick("wall", Isometry3::translation(0.0, -3.0, 0.7), &wall);
        let held = scene.add_brick("held", Isometry3::translation(0.0, 6.0, 0.0), &t);

        let query = ColliderQuery::default();
        let moving: BrickSet = [held].into_iter().collect();
        let ctx = BuildContext::new(&scene, &query, &moving, down_ray(0.8, 0.8), Camera::default()).unwrap();
        let (found, stats) = find_connection_candidates_with_stats(&ctx);
        assert!(found.is_empty());
        assert!(stats.collisions > 0);
    }

    #[test]
    fn test_bonded_cells_are_skipped() {
        let mut scene = Scene::new();
        let t = PartTemplate::rectangular("3003", 2, 2);
        let base = scene.add_brick("base", Isometry3::identity(), &t);
        let top = scene.add_brick("top", Isometry3::translation(0.0, 0.96, 0.0), &t);
        assert_eq!(scene.connect_coincident(&[top].into_iter().collect(), &Tolerances::default()), 4);
        let held = scene.add_brick("held", Isometry3::translation(0.0, 6.0, 0.0), &t);

        let query = ColliderQuery::default();
        let moving: BrickSet = [held].into_iter().collect();
        let only_base: BrickSet = [base].into_iter().collect();
        let ctx = BuildContext::new(&scene, &query, &moving, down_ray(0.8, 0.8), Camera::default())
            .unwrap()
            .with_eligible(&only_base);
        // Base studs are all taken, so the held brick goes underneath
        let pair = find_best_connection(&ctx).unwrap();
        assert_eq!(Some(pair.target.field), scene.brick_fields(base).nth(1));
        assert_eq!(Some(pair.source.field), scene.brick_fields(held).next());
    }

    #[test]
    fn test_selected_fields_skip_full_fields() {
        let mut scene = Scene::new();
        let t = PartTemplate::rectangular("3003", 2, 2);
        let lower = scene.add_brick("lower", Isometry3::identity(), &t);
        let upper = scene.add_brick("upper", Isometry3::translation(0.0, 0.96, 0.0), &t);
        scene.connect_coincident(&[upper].into_iter().collect(), &Tolerances::default());

        let query = ColliderQuery::default();
        let moving: BrickSet = [lower, upper].into_iter().collect();
        let ctx = BuildContext::new(&scene, &query, &moving, down_ray(0.8, 0.8), Camera::default()).unwrap();
        let selected = selected_fields(&ctx);
        // lower top is fully bonded; lower bottom, upper top and upper bottom (tubes) remain
        assert_eq!(selected.len(), 3);
        assert!(!selected.contains(&scene.brick_fields(lower).next().unwrap()));
    }
}
