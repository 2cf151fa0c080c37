//! Read-only camera used to order candidates by depth.

use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};

/// A camera pose looking down its local +Z axis.
///
/// Only the basis is used; there is no projection.
///
/// # Example
///
/// ```
/// use brick_snap::Camera;
/// use nalgebra::{Point3, Vector3};
///
/// let camera = Camera::looking_at(&Point3::new(0.0, 0.0, -10.0), &Point3::origin(), &Vector3::y());
/// assert!((camera.depth(&Point3::origin()) - 10.0).abs() < 1e-12);
/// assert!(camera.depth(&Point3::new(0.0, 0.0, -20.0)) < 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Camera {
    /// Camera-to-world pose.
    pub pose: Isometry3<f64>,
}

impl Camera {
    /// Creates a camera from a position and orientation.
    #[must_use]
    pub fn new(position: Point3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            pose: Isometry3::from_parts(position.coords.into(), rotation),
        }
    }

    /// A camera at `eye` facing `target`.
    #[must_use]
    pub fn looking_at(eye: &Point3<f64>, target: &Point3<f64>, up: &Vector3<f64>) -> Self {
        let rotation = UnitQuaternion::face_towards(&(target - eye), up);
        Self::new(*eye, rotation)
    }

    /// World position.
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        Point3::from(self.pose.translation.vector)
    }

    /// Unit viewing direction.
    #[must_use]
    pub fn forward(&self) -> Vector3<f64> {
        self.pose.rotation * Vector3::z()
    }

    /// Camera-space Z of a world point.
    #[must_use]
    pub fn depth(&self, point: &Point3<f64>) -> f64 {
        (point - self.position()).dot(&self.forward())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pose: Isometry3::identity(),
        }
    }
}
