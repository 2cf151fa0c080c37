//! Integration tests for the best-connection resolver.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use approx::assert_relative_eq;
use brick_connectivity::{
    BrickId, BrickSet, ColliderQuery, Connection, ConnectionField, ConnectionRef, ConnectionType, FieldKind,
    PartTemplate, Scene, Tolerances, stud_coord,
};
use brick_snap::{
    BuildContext, Camera, SnapConfig, apply_snap, find_best_connection, find_best_connection_on_brick,
    SnapStats, find_connection_candidates, find_connection_candidates_with_stats, selected_fields,
};
use brick_spatial::{Aabb, PLATE_HEIGHT, Ray};
use nalgebra::{Isometry3, Point3, Vector3};

// =============================================================================
// Helpers
// =============================================================================

/// A 2x2 plate with only a top field; `studs[row][column]` gives each stud's type.
fn studded_plate(studs: [[ConnectionType; 2]; 2]) -> PartTemplate {
    let body = Aabb::new(Point3::origin(), Point3::new(1.6, PLATE_HEIGHT, 1.6));
    let mut top =
        ConnectionField::new(FieldKind::Connector, 4, 4, Isometry3::translation(0.0, PLATE_HEIGHT, 0.0)).unwrap();
    for (row, types) in (0..).zip(studs) {
        for (column, connection_type) in (0..).zip(types) {
            top.set_connection(stud_coord(column, row), Connection::new(connection_type))
                .unwrap();
        }
    }
    PartTemplate::new("plate", body).with_collider(body).with_field(top)
}

fn down_ray(x: f64, z: f64) -> Ray {
    Ray::new(Point3::new(x, 10.0, z), -Vector3::y())
}

fn single(brick: BrickId) -> BrickSet {
    [brick].into_iter().collect()
}

/// Every brick pose and every bond, for before/after comparison.
fn snapshot(scene: &Scene) -> (Vec<Isometry3<f64>>, Vec<(ConnectionRef, ConnectionRef)>) {
    let poses = scene.bricks().map(|b| *b.transform()).collect();
    let bonds = scene
        .fields()
        .flat_map(|f| f.bonds().map(move |(i, other)| (ConnectionRef::new(f.id(), i), other)))
        .collect();
    (poses, bonds)
}

const KNOBS: [[ConnectionType; 2]; 2] = [[ConnectionType::Knob; 2]; 2];

// =============================================================================
// Failure leaves no trace
// =============================================================================

#[test]
fn test_failed_search_leaves_scene_untouched() {
    let mut scene = Scene::new();
    let brick = PartTemplate::rectangular("3003", 2, 2);
    scene.add_brick("plate", Isometry3::identity(), &studded_plate([[ConnectionType::DuploKnob; 2]; 2]));
    // A bonded stack away from the aim
    let low = scene.add_brick("low", Isometry3::translation(30.0, 0.0, 0.0), &brick);
    let high = scene.add_brick("high", Isometry3::translation(30.0, 0.96, 0.0), &brick);
    assert_eq!(scene.connect_coincident(&single(high), &Tolerances::default()), 4);
    let held = scene.add_brick("held", Isometry3::new(Vector3::new(0.1, 4.0, 0.0), Vector3::y() * 0.3), &brick);

    let before = snapshot(&scene);
    let query = ColliderQuery::default();
    let moving = single(held);
    let ctx = BuildContext::new(&scene, &query, &moving, down_ray(0.8, 0.8), Camera::default()).unwrap();

    let (found, stats) = find_connection_candidates_with_stats(&ctx);
    assert!(found.is_empty());
    assert!(stats.rejects > 0);
    assert!(find_best_connection(&ctx).is_none());
    assert_eq!(snapshot(&scene), before);
    let low_top = scene.brick_fields(low).next().unwrap();
    assert_eq!(scene.field(low_top).unwrap().bond_count(), 4);
}

// =============================================================================
// Candidate order
// =============================================================================

fn two_level_scene() -> (Scene, BrickId, BrickId, BrickId) {
    let mut scene = Scene::new();
    let t = PartTemplate::rectangular("3003", 2, 2);
    let lower = scene.add_brick("lower", Isometry3::identity(), &t);
    let upper = scene.add_brick("upper", Isometry3::translation(0.0, 3.0, 0.0), &t);
    let held = scene.add_brick("held", Isometry3::translation(0.05, 6.0, 0.05), &t);
    (scene, lower, upper, held)
}

#[test]
fn test_nearest_to_camera_wins() {
    let (scene, lower, upper, held) = two_level_scene();
    let query = ColliderQuery::default();
    let moving = single(held);
    let focus = Point3::new(0.8, 0.0, 0.8);

    let above = Camera::looking_at(&Point3::new(0.8, 30.0, 0.8), &focus, &Vector3::z());
    let ctx = BuildContext::new(&scene, &query, &moving, down_ray(0.8, 0.8), above).unwrap();
    let found = find_connection_candidates(&ctx);
    assert_eq!(found.len(), 2);
    assert_eq!(scene.field_owner(found[0].pair.target.field), Some(upper));
    assert_eq!(scene.field_owner(found[1].pair.target.field), Some(lower));

    // Same aim, camera underneath: the lower brick is now nearer
    let below = Camera::looking_at(&Point3::new(0.8, -30.0, 0.8), &focus, &Vector3::z());
    let ctx = BuildContext::new(&scene, &query, &moving, down_ray(0.8, 0.8), below).unwrap();
    let best = find_best_connection(&ctx).unwrap();
    assert_eq!(scene.field_owner(best.target.field), Some(lower));
    let first = find_connection_candidates(&ctx)[0];
    let pose = first.pose_of(scene.brick(held).unwrap().transform());
    assert_relative_eq!(pose.translation.vector, Vector3::new(0.0, 0.96, 0.0), epsilon = 1e-9);
}

#[test]
fn test_max_tries_stops_early() {
    let (scene, _, upper, held) = two_level_scene();
    let query = ColliderQuery::default();
    let moving = single(held);
    let above = Camera::looking_at(&Point3::new(0.8, 30.0, 0.8), &Point3::origin(), &Vector3::z());
    let ctx = BuildContext::new(&scene, &query, &moving, down_ray(0.8, 0.8), above)
        .unwrap()
        .with_config(SnapConfig::default().with_max_tries(1))
        .unwrap();

    let (found, stats) = find_connection_candidates_with_stats(&ctx);
    assert_eq!(found.len(), 1);
    assert_eq!(stats.candidates_considered, 1);
    assert_eq!(scene.field_owner(found[0].pair.target.field), Some(upper));
}

// =============================================================================
// Offset priority
// =============================================================================

#[test]
fn test_center_offset_beats_diagonal() {
    let mut scene = Scene::new();
    let plate = scene.add_brick("plate", Isometry3::identity(), &studded_plate(KNOBS));
    let small = PartTemplate::rectangular("3003", 2, 2);
    let held = scene.add_brick("held", Isometry3::translation(0.05, 4.0, 0.05), &small);
    let query = ColliderQuery::default();
    let moving = single(held);
    let ctx = BuildContext::new(&scene, &query, &moving, down_ray(0.8, 0.8), Camera::default()).unwrap();

    let mut stats = SnapStats::default();
    let candidate = find_best_connection_on_brick(&ctx, plate, &selected_fields(&ctx), &mut stats).unwrap();
    let pose = candidate.pose_of(scene.brick(held).unwrap().transform());
    assert_relative_eq!(pose.translation.vector, Vector3::new(0.0, PLATE_HEIGHT, 0.0), epsilon = 1e-9);
    assert_eq!(stats.offsets_tried, 1);
}

#[test]
fn test_diagonal_used_when_center_rejects() {
    let mut scene = Scene::new();
    let studs = [
        [ConnectionType::DuploKnob, ConnectionType::Knob],
        [ConnectionType::Knob, ConnectionType::Knob],
    ];
    let plate = scene.add_brick("plate", Isometry3::identity(), &studded_plate(studs));
    let small = PartTemplate::rectangular("3003", 2, 2);
    let held = scene.add_brick("held", Isometry3::translation(0.05, 4.0, 0.05), &small);
    let query = ColliderQuery::default();
    let moving = single(held);
    let ctx = BuildContext::new(&scene, &query, &moving, down_ray(0.8, 0.8), Camera::default()).unwrap();

    let mut stats = SnapStats::default();
    let candidate = find_best_connection_on_brick(&ctx, plate, &selected_fields(&ctx), &mut stats).unwrap();
    // The (+1, +1) offset seats the tube on the far knob
    let pose = candidate.pose_of(scene.brick(held).unwrap().transform());
    assert_relative_eq!(pose.translation.vector, Vector3::new(0.4, PLATE_HEIGHT, 0.4), epsilon = 1e-9);
    assert_eq!(stats.rejects, 1);
    assert_eq!(stats.offsets_tried, 6);
    let target = scene.connection(candidate.pair.target).unwrap();
    assert_eq!(target.connection_type, ConnectionType::Knob);
    assert_eq!(scene.connection(candidate.pair.source).unwrap().connection_type, ConnectionType::Tube);
}

// =============================================================================
// Reject short-circuit
// =============================================================================

#[test]
fn test_single_reject_blocks_offset() {
    let mut scene = Scene::new();
    let studs = [
        [ConnectionType::DuploKnob, ConnectionType::Knob],
        [ConnectionType::Knob, ConnectionType::Knob],
    ];
    let plate = scene.add_brick("plate", Isometry3::identity(), &studded_plate(studs));
    // 1x2 along Z over the first column: one anti-knob meets the duplo knob, the other a knob
    let small = PartTemplate::rectangular("3004", 1, 2);
    let held = scene.add_brick("held", Isometry3::translation(0.02, 4.0, 0.02), &small);
    let query = ColliderQuery::default();
    let moving = single(held);
    let ctx = BuildContext::new(&scene, &query, &moving, down_ray(0.4, 0.8), Camera::default()).unwrap();

    let mut stats = SnapStats::default();
    assert!(find_best_connection_on_brick(&ctx, plate, &selected_fields(&ctx), &mut stats).is_none());
    assert_eq!(stats.field_pairs_tried, 1);
    assert_eq!(stats.offsets_tried, 9);
    assert_eq!(stats.rejects, 1);
}

#[test]
fn test_same_layout_without_reject_connects() {
    let mut scene = Scene::new();
    let plate = scene.add_brick("plate", Isometry3::identity(), &studded_plate(KNOBS));
    let small = PartTemplate::rectangular("3004", 1, 2);
    let held = scene.add_brick("held", Isometry3::translation(0.02, 4.0, 0.02), &small);
    let query = SnapConfig::default().collider_query();
    let moving = single(held);
    let ctx = BuildContext::new(&scene, &query, &moving, down_ray(0.4, 0.8), Camera::default()).unwrap();

    let mut stats = SnapStats::default();
    let candidate = find_best_connection_on_brick(&ctx, plate, &selected_fields(&ctx), &mut stats).unwrap();
    assert_eq!(stats.rejects, 0);

    let bonds = apply_snap(&mut scene, &candidate, &moving, &Tolerances::default()).unwrap();
    assert_eq!(bonds, 2);
    assert_relative_eq!(
        scene.brick(held).unwrap().transform().translation.vector,
        Vector3::new(0.0, PLATE_HEIGHT, 0.0),
        epsilon = 1e-9
    );
}

// =============================================================================
// Rotated pickup
// =============================================================================

#[test]
fn test_rotated_cluster_snaps_square() {
    let mut scene = Scene::new();
    let t = PartTemplate::rectangular("3001", 2, 4);
    scene.add_brick("base", Isometry3::identity(), &t);
    let held = scene.add_brick("held", Isometry3::new(Vector3::new(0.0, 5.0, 2.4), Vector3::y() * 1.45), &t);
    let query = ColliderQuery::default();
    let moving = single(held);
    let ctx = BuildContext::new(&scene, &query, &moving, down_ray(0.8, 1.6), Camera::default())
        .unwrap()
        .with_pickup(held, &Vector3::zeros())
        .unwrap();

    let candidate = find_connection_candidates(&ctx)[0];
    let pose = candidate.pose_of(scene.brick(held).unwrap().transform());
    // 1.45 rad snaps to a quarter turn; the brick lies crosswise on the base
    assert_relative_eq!(pose.rotation.angle(), std::f64::consts::FRAC_PI_2, epsilon = 1e-9);
    assert_relative_eq!(pose.translation.vector, Vector3::new(0.0, 0.96, 2.4), epsilon = 1e-9);

    let tol = Tolerances::default();
    let bonds = apply_snap(&mut scene, &candidate, &moving, &tol).unwrap();
    assert_eq!(bonds, 4);
    assert!(scene.validate(&tol).is_valid());
}
