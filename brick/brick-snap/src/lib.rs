//! Snapping a moving set of bricks onto a scene.
//!
//! Given the bricks being moved and the user's aim (a ray and a camera),
//! this crate finds which connections snap together and with what motion.
//! The search never mutates the scene: every trial pose is a hypothetical
//! [`Placement`](brick_connectivity::Placement), and [`apply_snap`] commits
//! the accepted one.
//!
//! # Overview
//!
//! - [`BuildContext`] - Scene, collision capability, moving set and aim for one operation
//! - [`cast_brick`] - Cone-culled candidate bricks
//! - [`find_best_connection`] - First accepted connection pair, if any
//! - [`find_connection_candidates`] - Up to `max_tries` accepted snaps in scan order
//! - [`align_bricks`] - Free placement on a surface or plane when nothing snaps
//! - [`compute_bounds`] - Tight cluster bounds in any frame
//! - [`SnapConfig`] - Search tunables
//!
//! # Quick Start
//!
//! ```
//! use brick_connectivity::{BrickSet, ColliderQuery, PartTemplate, Scene, Tolerances};
//! use brick_snap::{BuildContext, Camera, apply_snap, find_connection_candidates};
//! use brick_spatial::Ray;
//! use nalgebra::{Isometry3, Point3, Vector3};
//!
//! let mut scene = Scene::new();
//! let t = PartTemplate::rectangular("3001", 2, 4);
//! scene.add_brick("base", Isometry3::identity(), &t);
//! let held = scene.add_brick("held", Isometry3::translation(0.1, 5.0, 0.05), &t);
//!
//! let query = ColliderQuery::default();
//! let moving: BrickSet = [held].into_iter().collect();
//! let ray = Ray::new(Point3::new(0.8, 12.0, 1.6), -Vector3::y());
//! let camera = Camera::looking_at(&Point3::new(0.8, 20.0, 1.6), &Point3::origin(), &Vector3::z());
//!
//! let candidate = {
//!     let ctx = BuildContext::new(&scene, &query, &moving, ray, camera).unwrap();
//!     find_connection_candidates(&ctx)[0]
//! };
//! let bonds = apply_snap(&mut scene, &candidate, &moving, &Tolerances::default()).unwrap();
//! assert_eq!(bonds, 8);
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

mod align;
mod camera;
mod config;
mod context;
mod error;
mod resolver;
mod search;

pub use align::{
    AlignedPlacement, align_bricks, align_to_grid, compute_bounds, compute_bounds_at, get_offset_to_grid,
    is_colliding_at_transformation,
};
pub use camera::Camera;
pub use config::SnapConfig;
pub use context::BuildContext;
pub use error::{SnapError, SnapResult};
pub use resolver::{
    ConnectionPair, OFFSETS, SnapCandidate, SnapStats, apply_snap, find_best_connection,
    find_best_connection_on_brick, find_connection_candidates, find_connection_candidates_with_stats,
    selected_fields,
};
pub use search::cast_brick;
