//! Brick building toolkit.
//!
//! This umbrella crate re-exports the brick-* crates behind one API. All of
//! them are Layer 0 (no engine dependencies): the host supplies collision
//! through [`connectivity::SpatialQuery`], or uses the built-in
//! [`connectivity::ColliderQuery`].
//!
//! # Quick Start
//!
//! ```
//! use brick::prelude::*;
//!
//! let mut scene = Scene::new();
//! let t = PartTemplate::rectangular("3003", 2, 2);
//! scene.add_brick("base", Isometry3::identity(), &t);
//! let held = scene.add_brick("held", Isometry3::translation(0.1, 4.0, 0.1), &t);
//!
//! let query = ColliderQuery::default();
//! let moving: BrickSet = [held].into_iter().collect();
//! let ray = Ray::new(Point3::new(0.8, 10.0, 0.8), -Vector3::y());
//!
//! let candidate = {
//!     let ctx = BuildContext::new(&scene, &query, &moving, ray, Camera::default()).unwrap();
//!     find_connection_candidates(&ctx).first().copied()
//! };
//! if let Some(candidate) = candidate {
//!     apply_snap(&mut scene, &candidate, &moving, &Tolerances::default()).unwrap();
//! }
//! assert!(scene.validate(&Tolerances::default()).is_valid());
//! ```
//!
//! # Module Organization
//!
//! - [`spatial`] - Bounds, cones, rays, planes, oriented boxes and the stud grid
//! - [`connectivity`] - Connection types, fields, bonds and the scene arena
//! - [`snap`] - Candidate search, best-connection resolver and alignment
//!
//! # Feature Flags
//!
//! - `serde` - Serialization for public data types

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Bounds, cones, rays, planes, oriented boxes and the stud grid.
pub use brick_spatial as spatial;

/// Connection types, fields, bonds and the scene arena.
pub use brick_connectivity as connectivity;

/// Candidate search, best-connection resolver and alignment.
pub use brick_snap as snap;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for brick building.
///
/// # Usage
///
/// ```
/// use brick::prelude::*;
/// ```
pub mod prelude {
    // Geometry
    pub use brick_spatial::{Aabb, Isometry3, Point3, Ray, UnitQuaternion, Vector3};

    // Scene and bonds
    pub use brick_connectivity::{
        BrickId, BrickSet, ColliderQuery, ConnectionMatch, ConnectionRef, ConnectionType, FieldId, PartTemplate,
        Placement, Scene, SpatialQuery, Tolerances, match_types,
    };

    // Snapping
    pub use brick_snap::{
        BuildContext, Camera, SnapCandidate, SnapConfig, align_bricks, apply_snap, compute_bounds,
        find_best_connection, find_connection_candidates,
    };
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use prelude::*;

        let scene = Scene::new();
        assert_eq!(scene.brick_count(), 0);
        assert_eq!(match_types(ConnectionType::Knob, ConnectionType::AntiKnob), ConnectionMatch::Connect);
    }

    #[test]
    fn test_module_reexports() {
        let _ = spatial::Aabb::default();
        let _ = connectivity::Tolerances::default();
        let _ = snap::SnapConfig::default();
    }
}
