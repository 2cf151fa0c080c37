//! API Regression Tests for the Brick Crate Ecosystem
//!
//! These tests pin the public API across the brick-* crates. They are
//! organized in 3 tiers of increasing complexity:
//!
//! - Tier 1: Foundation (brick-spatial primitives, grid constants)
//! - Tier 2: Connectivity (types, matrix, fields, bonds, descriptions)
//! - Tier 3: Snapping (search, resolver, alignment)
//!
//! If any of these tests fail after API changes, it indicates a breaking change
//! that needs documentation in CHANGELOG.md and a version bump.

// Allow test-specific patterns
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use approx::assert_relative_eq;
use brick::{connectivity, prelude::*, snap, spatial};

// =============================================================================
// TIER 1: Foundation - Primitives and Grid
// =============================================================================

mod tier1_foundation {
    use super::*;

    #[test]
    fn grid_constants() {
        assert_relative_eq!(spatial::CELL_SIZE, 5.0 * spatial::LU, epsilon = 1e-12);
        assert_relative_eq!(spatial::STUD_PITCH, 2.0 * spatial::CELL_SIZE, epsilon = 1e-12);
        assert_relative_eq!(spatial::BRICK_HEIGHT, 3.0 * spatial::PLATE_HEIGHT, epsilon = 1e-12);
    }

    #[test]
    fn aabb_transform_uses_corners() {
        let aabb = Aabb::new(Point3::origin(), Point3::new(2.0, 1.0, 2.0));
        let turned = aabb.transformed(&Isometry3::rotation(Vector3::y() * std::f64::consts::FRAC_PI_4));
        let width = 2.0 * std::f64::consts::SQRT_2;
        assert_relative_eq!(turned.max.x - turned.min.x, width, epsilon = 1e-9);
    }

    #[test]
    fn cone_rejects_bad_input() {
        let sphere = spatial::Sphere::new(Point3::origin(), 1.0);
        assert!(matches!(
            spatial::Cone::enclosing(Point3::new(0.0, 5.0, 0.0), Vector3::zeros(), &sphere),
            Err(spatial::SpatialError::DegenerateDirection(_))
        ));
        let cone = spatial::Cone::enclosing(Point3::new(0.0, 5.0, 0.0), -Vector3::y(), &sphere).unwrap();
        assert!(cone.intersects_sphere(&sphere));
    }

    #[test]
    fn ray_plane_projection() {
        let plane = spatial::Plane::horizontal(1.0);
        let landed = plane.project_along(&Point3::new(0.0, 5.0, 0.0), &Vector3::new(1.0, -1.0, 0.0));
        assert_relative_eq!(landed, Point3::new(4.0, 1.0, 0.0), epsilon = 1e-12);
        let ray = Ray::new(Point3::new(0.0, 5.0, 0.0), -Vector3::y());
        assert_relative_eq!(ray.intersect_plane(&plane).unwrap(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn grid_snapping() {
        assert_relative_eq!(spatial::snap_to_cell(0.55, 0.4), 0.4, epsilon = 1e-12);
        assert_relative_eq!(spatial::snap_to_half_cell(0.55, 0.8), 0.4, epsilon = 1e-12);
    }
}

// =============================================================================
// TIER 2: Connectivity - Types, Fields, Bonds
// =============================================================================

mod tier2_connectivity {
    use super::*;

    #[test]
    fn matrix_spot_exceptions() {
        assert_eq!(match_types(ConnectionType::BottomTube, ConnectionType::TubeGap), ConnectionMatch::Reject);
        assert_eq!(match_types(ConnectionType::TubeGap, ConnectionType::BottomTube), ConnectionMatch::Ignore);
        assert_eq!(match_types(ConnectionType::Tube, ConnectionType::TubeGap), ConnectionMatch::Connect);
        assert!(!connectivity::is_connectable_type(ConnectionType::ConnectorBlocker));
    }

    #[test]
    fn type_names_round_trip() {
        let parsed: ConnectionType = "secondarypinwithsmallcollision".parse().unwrap();
        assert_eq!(parsed, ConnectionType::SecondaryPinWithSmallCollision);
        assert!("NotAType".parse::<ConnectionType>().is_err());
    }

    #[test]
    fn rectangular_template_layout() {
        let mut scene = Scene::new();
        let id = scene.add_brick("b", Isometry3::identity(), &PartTemplate::rectangular("3001", 2, 4));
        let fields: Vec<FieldId> = scene.brick_fields(id).collect();
        assert_eq!(fields.len(), 2);
        let top = scene.field(fields[0]).unwrap();
        assert_eq!(top.kind(), connectivity::FieldKind::Connector);
        assert_eq!((top.width(), top.height()), (4, 8));
        assert_eq!(top.connection_count(), 8);
        let bottom = scene.field(fields[1]).unwrap();
        // 8 anti-knobs and 3 tubes
        assert_eq!(bottom.connection_count(), 11);
    }

    #[test]
    fn connect_and_disconnect() {
        let mut scene = Scene::new();
        let t = PartTemplate::rectangular("3003", 2, 2);
        let base = scene.add_brick("base", Isometry3::identity(), &t);
        let upper = scene.add_brick("upper", Isometry3::translation(3.0, 2.0, 1.0), &t);
        let top = scene.brick_fields(base).next().unwrap();
        let bottom = scene.brick_fields(upper).nth(1).unwrap();
        let index = scene.field(top).unwrap().index_of(connectivity::stud_coord(1, 1)).unwrap();
        let (source, target) = (ConnectionRef::new(bottom, index), ConnectionRef::new(top, index));

        let tol = Tolerances::default();
        assert_eq!(scene.connect(source, target, &Point3::new(3.0, 2.0, 1.0), None, &tol).unwrap(), 4);
        assert_eq!(scene.connected_to(target), Some(source));
        assert_eq!(scene.disconnect_all(bottom).unwrap(), 4);
        assert!(!scene.is_bonded(target));
        assert!(scene.validate(&tol).is_valid());
    }

    #[test]
    fn description_text_format() {
        let text = "field receptor 2 2 0 0 0 0\n1 1 AntiKnob 15 0\n";
        let fields = connectivity::parse_description(text).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].connection_count(), 1);
        assert!(connectivity::parse_description("field sideways 2 2 0 0 0 0").is_err());
    }

    #[test]
    fn placement_is_hypothetical() {
        let mut scene = Scene::new();
        let id = scene.add_brick("a", Isometry3::identity(), &PartTemplate::rectangular("3003", 2, 2));
        let moving: BrickSet = [id].into_iter().collect();
        let placement = Placement::new(&moving, Isometry3::translation(0.0, 1.0, 0.0));
        let pose = scene.brick_pose(id, &placement).unwrap();
        assert_relative_eq!(pose.translation.vector.y, 1.0);
        assert_eq!(scene.brick(id).unwrap().transform(), &Isometry3::identity());
    }
}

// =============================================================================
// TIER 3: Snapping - Search, Resolver, Alignment
// =============================================================================

mod tier3_snapping {
    use super::*;

    fn stack_scene() -> (Scene, BrickId, BrickId) {
        let mut scene = Scene::new();
        let t = PartTemplate::rectangular("3001", 2, 4);
        let base = scene.add_brick("base", Isometry3::identity(), &t);
        let held = scene.add_brick("held", Isometry3::translation(0.1, 5.0, 0.1), &t);
        (scene, base, held)
    }

    #[test]
    fn config_defaults_and_validation() {
        let config = SnapConfig::default();
        assert_eq!(config.max_tries(), 3);
        assert_relative_eq!(config.cone_apex_offset(), 3.0);
        assert!(config.validate().is_empty());
        assert!(!SnapConfig::default().with_max_tries(0).validate().is_empty());
    }

    #[test]
    fn snap_end_to_end() {
        let (mut scene, base, held) = stack_scene();
        let query = ColliderQuery::default();
        let moving: BrickSet = [held].into_iter().collect();
        let ray = Ray::new(Point3::new(0.8, 12.0, 1.6), -Vector3::y());

        let candidate = {
            let ctx = BuildContext::new(&scene, &query, &moving, ray, Camera::default()).unwrap();
            assert_eq!(snap::cast_brick(&ctx), vec![base]);
            let pair = find_best_connection(&ctx).unwrap();
            assert_eq!(scene.field_owner(pair.target.field), Some(base));
            find_connection_candidates(&ctx)[0]
        };
        assert_eq!(apply_snap(&mut scene, &candidate, &moving, &Tolerances::default()).unwrap(), 8);
        assert_relative_eq!(
            scene.brick(held).unwrap().transform().translation.vector,
            Vector3::new(0.0, 0.96, 0.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn bounds_of_cluster() {
        let (scene, base, held) = stack_scene();
        let bounds = compute_bounds(&scene, &[base, held], &Isometry3::identity()).unwrap();
        assert_relative_eq!(bounds.min, Point3::origin(), epsilon = 1e-12);
        assert_relative_eq!(bounds.max, Point3::new(1.7, 5.96, 3.3), epsilon = 1e-12);
    }

    #[test]
    fn free_alignment_on_ground() {
        let (scene, _, held) = stack_scene();
        let query = ColliderQuery::default();
        let moving: BrickSet = [held].into_iter().collect();
        let ray = Ray::new(Point3::new(5.0, 12.0, 5.0), -Vector3::y());
        let ctx = BuildContext::new(&scene, &query, &moving, ray, Camera::default())
            .unwrap()
            .with_pickup(held, &Vector3::new(0.8, 0.0, 1.6))
            .unwrap();

        let aligned = align_bricks(&ctx, held, &Isometry3::identity()).unwrap();
        assert!(aligned.hit.is_none());
        let pose = aligned.transform(&ctx.pivot) * scene.brick(held).unwrap().transform();
        assert_relative_eq!(pose.translation.vector.y, 0.0, epsilon = 1e-9);
        assert!(!snap::is_colliding_at_transformation(&scene, held, &pose, None, &query));
    }

    #[test]
    fn errors_are_typed() {
        let scene = Scene::new();
        let query = ColliderQuery::default();
        let ray = Ray::new(Point3::origin(), Vector3::z());
        let empty = BrickSet::new();
        let err = BuildContext::new(&scene, &query, &empty, ray, Camera::default()).unwrap_err();
        assert!(matches!(err, snap::SnapError::EmptyMovingSet));

        let ghost: BrickSet = [BrickId(9)].into_iter().collect();
        let err = BuildContext::new(&scene, &query, &ghost, ray, Camera::default()).unwrap_err();
        assert!(matches!(
            err,
            snap::SnapError::Connectivity(connectivity::ConnectivityError::BrickNotFound { .. })
        ));
    }
}
