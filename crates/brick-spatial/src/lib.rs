//! Geometric primitives for brick connectivity.
//!
//! This crate provides the small set of geometric types the brick snapping
//! engine needs to reason about bricks in space:
//!
//! - [`Aabb`] - Axis-aligned bounding box with full 8-corner transforms
//! - [`Sphere`] - Bounding sphere
//! - [`Cone`] - Bounding cone with an analytic sphere/cone test
//! - [`Ray`] and [`Plane`] - Aim rays and placement planes
//! - [`Obb`] - Oriented box used as a collider (SAT overlap, ray slab test)
//! - [`GridCoord`] and [`GridRect`] - Integer lattice coordinates of connection fields
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero engine dependencies**. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Editors and level tools
//! - Other game engines
//!
//! # Coordinate Systems
//!
//! Space is **Y-up and right-handed**. Connection grids lie in the local XZ
//! plane of their owner. All distances are `f64` engine units, where one LEGO
//! unit ([`LU`]) is `0.08`.
//!
//! # Example
//!
//! ```
//! use brick_spatial::{Aabb, Cone, Sphere};
//! use nalgebra::{Isometry3, Point3, Vector3};
//!
//! // The bounds of a 2x2 brick, rotated 45 degrees about Y
//! let local = Aabb::new(Point3::new(-0.8, 0.0, -0.8), Point3::new(0.8, 0.96, 0.8));
//! let rotated = local.transformed(&Isometry3::rotation(Vector3::y() * std::f64::consts::FRAC_PI_4));
//! assert!(rotated.size().x > local.size().x);
//!
//! // Cull by a cone looking down -Z
//! let cone = Cone::new(Point3::new(0.0, 0.0, 10.0), -Vector3::z(), 0.2).unwrap();
//! assert!(cone.intersects_sphere(&Sphere::new(Point3::origin(), 1.0)));
//! ```
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bounds;
mod cone;
mod error;
mod grid;
mod obb;
mod ray;

// Re-export core types
pub use bounds::{Aabb, Sphere};
pub use cone::Cone;
pub use error::{SpatialError, SpatialResult};
pub use grid::{
    BRICK_HEIGHT, CELL_SIZE, GridCoord, GridRect, LU, PLATE_HEIGHT, STUD_PITCH, snap_to_cell,
    snap_to_half_cell,
};
pub use obb::Obb;
pub use ray::{Plane, Ray};

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};
