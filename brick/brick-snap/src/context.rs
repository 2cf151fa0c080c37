//! Per-operation building context.

use brick_connectivity::{BrickId, BrickSet, ConnectivityError, Scene, SpatialQuery, Tolerances};
use brick_spatial::Ray;
use nalgebra::{Point3, Vector3};

use crate::camera::Camera;
use crate::config::SnapConfig;
use crate::error::{SnapError, SnapResult};

/// Everything one snap operation reads: the scene, the collision capability,
/// the bricks being moved, and the user's aim.
///
/// The context only borrows; nothing in it is mutated while searching.
///
/// # Example
///
/// ```
/// use brick_connectivity::{BrickSet, ColliderQuery, PartTemplate, Scene};
/// use brick_snap::{BuildContext, Camera, SnapError};
/// use brick_spatial::Ray;
/// use nalgebra::{Isometry3, Point3, Vector3};
///
/// let mut scene = Scene::new();
/// let id = scene.add_brick("held", Isometry3::identity(), &PartTemplate::rectangular("3003", 2, 2));
/// let query = ColliderQuery::default();
/// let ray = Ray::new(Point3::new(0.0, 10.0, 0.0), -Vector3::y());
///
/// let moving: BrickSet = [id].into_iter().collect();
/// let ctx = BuildContext::new(&scene, &query, &moving, ray, Camera::default()).unwrap();
/// assert_eq!(ctx.moving_bricks(), vec![id]);
///
/// let empty = BrickSet::new();
/// assert!(matches!(
///     BuildContext::new(&scene, &query, &empty, ray, Camera::default()),
///     Err(SnapError::EmptyMovingSet)
/// ));
/// ```
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    /// The scene being built.
    pub scene: &'a Scene,
    /// Collision capability.
    pub query: &'a dyn SpatialQuery,
    /// Bricks being moved.
    pub moving: &'a BrickSet,
    /// Scene bricks allowed as targets; `None` allows every brick.
    pub eligible: Option<&'a BrickSet>,
    /// Center of rotation for alignment.
    pub pivot: Point3<f64>,
    /// The user's aim.
    pub ray: Ray,
    /// Camera used for depth ordering.
    pub camera: Camera,
    /// Search tunables.
    pub config: SnapConfig,
}

impl<'a> BuildContext<'a> {
    /// Creates a context with the default configuration and the pivot at the ray origin.
    ///
    /// # Errors
    ///
    /// Returns [`SnapError::EmptyMovingSet`] for an empty moving set and
    /// [`SnapError::Connectivity`] if a moving brick is not in the scene.
    pub fn new(
        scene: &'a Scene,
        query: &'a dyn SpatialQuery,
        moving: &'a BrickSet,
        ray: Ray,
        camera: Camera,
    ) -> SnapResult<Self> {
        if moving.is_empty() {
            return Err(SnapError::EmptyMovingSet);
        }
        if let Some(&id) = moving.iter().find(|id| scene.brick(**id).is_none()) {
            return Err(ConnectivityError::BrickNotFound { id }.into());
        }
        Ok(Self {
            scene,
            query,
            moving,
            eligible: None,
            pivot: ray.origin,
            ray,
            camera,
            config: SnapConfig::default(),
        })
    }

    /// Replaces the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SnapError::InvalidConfig`] listing every problem found.
    pub fn with_config(mut self, config: SnapConfig) -> SnapResult<Self> {
        let issues = config.validate();
        if !issues.is_empty() {
            return Err(SnapError::InvalidConfig { issues });
        }
        self.config = config;
        Ok(self)
    }

    /// Sets the pivot directly.
    #[must_use]
    pub const fn with_pivot(mut self, pivot: Point3<f64>) -> Self {
        self.pivot = pivot;
        self
    }

    /// Sets the pivot to the point where `focus` was grabbed.
    ///
    /// # Errors
    ///
    /// Returns [`SnapError::Connectivity`] if `focus` is not in the scene.
    pub fn with_pickup(mut self, focus: BrickId, pickup_offset: &Vector3<f64>) -> SnapResult<Self> {
        let brick = self
            .scene
            .brick(focus)
            .ok_or(ConnectivityError::BrickNotFound { id: focus })?;
        self.pivot = Point3::from(brick.transform().translation.vector + pickup_offset);
        Ok(self)
    }

    /// Restricts targets to `eligible`.
    #[must_use]
    pub const fn with_eligible(mut self, eligible: &'a BrickSet) -> Self {
        self.eligible = Some(eligible);
        self
    }

    /// Tolerances implied by the configuration.
    #[must_use]
    pub const fn tolerances(&self) -> Tolerances {
        self.config.tolerances()
    }

    /// Moving bricks in ascending handle order.
    #[must_use]
    pub fn moving_bricks(&self) -> Vec<BrickId> {
        let mut bricks: Vec<BrickId> = self.moving.iter().copied().collect();
        bricks.sort_unstable();
        bricks
    }

    /// Whether `brick` may be snapped onto.
    #[must_use]
    pub fn is_eligible(&self, brick: BrickId) -> bool {
        !self.moving.contains(&brick) && self.eligible.is_none_or(|set| set.contains(&brick))
    }
}

impl std::fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("moving", &self.moving)
            .field("eligible", &self.eligible)
            .field("pivot", &self.pivot)
            .field("ray", &self.ray)
            .field("camera", &self.camera)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
