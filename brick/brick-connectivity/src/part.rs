//! Parts and bricks.
//!
//! A [`PartTemplate`] describes one physical piece (bounds, box colliders,
//! connection fields) independent of any scene. Adding it to a
//! [`Scene`](crate::Scene) produces a [`Part`] owned by a [`Brick`], with its
//! fields moved into the scene's field table.

use brick_spatial::{Aabb, BRICK_HEIGHT, GridCoord, STUD_PITCH};
use nalgebra::{Isometry3, Point3};
use tracing::warn;

use crate::connection::{Connection, FeatureKind};
use crate::description::parse_description;
use crate::error::ConnectivityResult;
use crate::field::{ConnectionField, FieldKind};
use crate::ids::{BrickId, FieldId, PartId};
use crate::types::ConnectionType;

/// A scene-independent part definition.
///
/// # Example
///
/// ```
/// use brick_connectivity::PartTemplate;
///
/// // A classic 2x4 brick
/// let brick = PartTemplate::rectangular("3001", 2, 4);
/// assert_eq!(brick.fields.len(), 2);
/// assert_eq!(brick.fields[0].connection_count(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct PartTemplate {
    /// Design name.
    pub name: String,
    /// Bounds in part space.
    pub bounds: Aabb,
    /// Box colliders in part space.
    pub colliders: Vec<Aabb>,
    /// Connection fields, placed in part space.
    pub fields: Vec<ConnectionField>,
    /// Host material identifier.
    pub material: Option<u32>,
}

impl PartTemplate {
    /// Creates a template with bounds and no colliders or fields.
    #[must_use]
    pub fn new(name: impl Into<String>, bounds: Aabb) -> Self {
        Self {
            name: name.into(),
            bounds,
            colliders: Vec::new(),
            fields: Vec::new(),
            material: None,
        }
    }

    /// Adds a box collider.
    #[must_use]
    pub fn with_collider(mut self, collider: Aabb) -> Self {
        self.colliders.push(collider);
        self
    }

    /// Adds a connection field.
    #[must_use]
    pub fn with_field(mut self, field: ConnectionField) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the material.
    #[must_use]
    pub fn with_material(mut self, material: u32) -> Self {
        self.material = Some(material);
        self
    }

    /// Adds every field of a connectivity description.
    ///
    /// # Errors
    ///
    /// Propagates header errors from [`parse_description`].
    pub fn with_description(mut self, text: &str) -> ConnectivityResult<Self> {
        self.fields.extend(parse_description(text)?);
        Ok(self)
    }

    /// A plain brick `width` by `depth` studs with its origin at the bottom corner.
    ///
    /// Knobs sit on top at odd lattice points, anti-knobs underneath at the
    /// same points, and tubes between every 2x2 group of anti-knobs. A brick
    /// too large for a field keeps its body but gets no fields, and a warning
    /// is logged; use [`rectangular_with_height`](Self::rectangular_with_height)
    /// to handle that case.
    #[must_use]
    pub fn rectangular(name: impl Into<String>, width: u32, depth: u32) -> Self {
        let name = name.into();
        match Self::rectangular_with_height(name.clone(), width, depth, BRICK_HEIGHT) {
            Ok(template) => template,
            Err(error) => {
                warn!(%name, width, depth, %error, "brick has no connectivity");
                let body = Self::body(width, depth, BRICK_HEIGHT);
                Self::new(name, body).with_collider(body)
            }
        }
    }

    /// Like [`rectangular`](Self::rectangular) with an explicit body height.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectivityError::InvalidGridSize`](crate::ConnectivityError::InvalidGridSize)
    /// if either side needs more than [`MAX_FIELD_CELLS`](crate::MAX_FIELD_CELLS) cells.
    pub fn rectangular_with_height(
        name: impl Into<String>,
        width: u32,
        depth: u32,
        height: f64,
    ) -> ConnectivityResult<Self> {
        let body = Self::body(width, depth, height);
        let (cells_x, cells_z) = (width.saturating_mul(2), depth.saturating_mul(2));

        let top_pose = Isometry3::translation(0.0, height, 0.0);
        let mut top = ConnectionField::new(FieldKind::Connector, cells_x, cells_z, top_pose)?;
        let mut bottom = ConnectionField::new(FieldKind::Receptor, cells_x, cells_z, Isometry3::identity())?;

        // Field sizes are bounded by MAX_FIELD_CELLS, so these always fit
        let max_x = i32::try_from(cells_x).unwrap_or(i32::MAX);
        let max_z = i32::try_from(cells_z).unwrap_or(i32::MAX);
        let mut handle = 0;
        for coord in top.grid_rect().iter() {
            let stud = coord.x % 2 == 1 && coord.z % 2 == 1;
            let tube =
                coord.x % 2 == 0 && coord.z % 2 == 0 && (1..max_x).contains(&coord.x) && (1..max_z).contains(&coord.z);
            if stud {
                let knob = Connection::new(ConnectionType::Knob).with_feature(FeatureKind::Knob, handle);
                handle += 1;
                top.set_connection(coord, knob)?;
                bottom.set_connection(coord, Connection::new(ConnectionType::AntiKnob))?;
            } else if tube {
                let tube = Connection::new(ConnectionType::Tube).with_feature(FeatureKind::Tube, handle);
                handle += 1;
                bottom.set_connection(coord, tube)?;
            }
        }
        Ok(Self::new(name, body).with_collider(body).with_field(top).with_field(bottom))
    }

    fn body(width: u32, depth: u32, height: f64) -> Aabb {
        let size = Point3::new(f64::from(width) * STUD_PITCH, height, f64::from(depth) * STUD_PITCH);
        Aabb::new(Point3::origin(), size)
    }
}

/// Fields of one part plus the part's extents.
#[derive(Debug, Clone, Default)]
pub struct Connectivity {
    /// Fields owned by the part.
    pub fields: Vec<FieldId>,
    /// Extents of the part in part space.
    pub extents: Aabb,
}

/// A part placed in a scene.
#[derive(Debug, Clone)]
pub struct Part {
    pub(crate) id: PartId,
    pub(crate) brick: BrickId,
    pub(crate) name: String,
    pub(crate) local: Isometry3<f64>,
    pub(crate) colliders: Vec<Aabb>,
    pub(crate) connectivity: Connectivity,
    pub(crate) material: Option<u32>,
}

impl Part {
    /// Handle of this part.
    #[must_use]
    pub const fn id(&self) -> PartId {
        self.id
    }

    /// Owning brick.
    #[must_use]
    pub const fn brick(&self) -> BrickId {
        self.brick
    }

    /// Design name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placement in brick space.
    #[must_use]
    pub const fn local_transform(&self) -> &Isometry3<f64> {
        &self.local
    }

    /// Box colliders in part space.
    #[must_use]
    pub fn colliders(&self) -> &[Aabb] {
        &self.colliders
    }

    /// Fields and extents.
    #[must_use]
    pub const fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Bounds in part space.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        &self.connectivity.extents
    }

    /// Host material identifier.
    #[must_use]
    pub const fn material(&self) -> Option<u32> {
        self.material
    }
}

/// A placed physical object made of one or more parts.
#[derive(Debug, Clone)]
pub struct Brick {
    pub(crate) id: BrickId,
    pub(crate) name: String,
    pub(crate) transform: Isometry3<f64>,
    pub(crate) parts: Vec<PartId>,
}

impl Brick {
    /// Handle of this brick.
    #[must_use]
    pub const fn id(&self) -> BrickId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// World transform.
    #[must_use]
    pub const fn transform(&self) -> &Isometry3<f64> {
        &self.transform
    }

    /// Parts of the brick.
    #[must_use]
    pub fn parts(&self) -> &[PartId] {
        &self.parts
    }
}

/// Lattice coordinate of the stud at `(column, row)` on a rectangular brick.
#[must_use]
pub const fn stud_coord(column: i32, row: i32) -> GridCoord {
    GridCoord::new(column * 2 + 1, row * 2 + 1)
}
