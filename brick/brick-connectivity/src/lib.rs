//! Connection fields and bond state for brick building.
//!
//! This crate models how bricks attach to each other: typed connections laid
//! out on grid-aligned fields, a literal compatibility matrix between the 43
//! connection types, and mutual bonds between coincident connections.
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero engine dependencies**. The host
//! supplies collision through the [`SpatialQuery`] trait; [`ColliderQuery`]
//! is a self-contained default over part box colliders.
//!
//! # Overview
//!
//! - [`Scene`] - Arena owning every brick, part and field, addressed by handles
//! - [`ConnectionField`] - A connector or receptor grid of [`Connection`]s
//! - [`ConnectionType`] and [`match_types`] - The compatibility matrix
//! - [`Placement`] - A hypothetical motion of a set of bricks
//! - [`Tolerances`] - Positional, angular and collision epsilons
//! - [`parse_description`] - Text format for part connectivity
//!
//! # Quick Start
//!
//! ```
//! use brick_connectivity::{ConnectionRef, PartTemplate, Scene, Tolerances, stud_coord};
//! use nalgebra::{Isometry3, Point3};
//!
//! let mut scene = Scene::new();
//! let template = PartTemplate::rectangular("3003", 2, 2);
//! let base = scene.add_brick("base", Isometry3::identity(), &template);
//! let upper = scene.add_brick("upper", Isometry3::translation(5.0, 3.0, 1.0), &template);
//!
//! // Bottom anti-knob of the upper brick onto the matching knob of the base
//! let bottom = scene.brick_fields(upper).nth(1).unwrap();
//! let top = scene.brick_fields(base).next().unwrap();
//! let index = scene.field(top).unwrap().index_of(stud_coord(0, 0)).unwrap();
//! let source = ConnectionRef::new(bottom, index);
//! let target = ConnectionRef::new(top, index);
//!
//! let bonds = scene
//!     .connect(source, target, &Point3::new(5.0, 3.0, 1.0), None, &Tolerances::default())
//!     .unwrap();
//! assert_eq!(bonds, 4);
//! assert!(scene.validate(&Tolerances::default()).is_valid());
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

mod alignment;
mod bonds;
mod collision;
mod connection;
mod description;
mod error;
mod field;
mod ids;
mod part;
mod placement;
mod scene;
mod tolerance;
mod types;
mod validation;

pub use alignment::{ConnectedTransformation, Contact, FieldOverlap, OverlapCell, align_rotation, best_match};
pub use collision::{ColliderQuery, RayHit, SpatialQuery};
pub use connection::{Connection, ConnectionFlags, Feature, FeatureKind, Quadrants};
pub use description::parse_description;
pub use error::{ConnectivityError, ConnectivityResult};
pub use field::{ConnectionField, FieldKind, MAX_FIELD_CELLS};
pub use ids::{BrickId, ConnectionRef, FieldId, PartId};
pub use part::{Brick, Connectivity, Part, PartTemplate, stud_coord};
pub use placement::{BrickSet, Placement};
pub use scene::Scene;
pub use tolerance::Tolerances;
pub use types::{ConnectionMatch, ConnectionType, is_connectable_type, masks_connect, match_types};
pub use validation::ConnectivityValidation;
