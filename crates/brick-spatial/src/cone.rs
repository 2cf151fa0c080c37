//! Bounding cones.
//!
//! The candidate search casts a cone from behind the camera ray over the
//! bricks being moved and keeps every scene brick whose bounding sphere the
//! cone touches.

use nalgebra::{Point3, Unit, Vector3};

use crate::bounds::Sphere;
use crate::error::{SpatialError, SpatialResult};

/// An infinite right circular cone.
///
/// # Example
///
/// ```
/// use brick_spatial::{Cone, Sphere};
/// use nalgebra::{Point3, Vector3};
///
/// let cone = Cone::new(Point3::origin(), Vector3::z(), 0.3).unwrap();
/// assert!(cone.intersects_sphere(&Sphere::new(Point3::new(0.0, 0.0, 5.0), 0.5)));
/// assert!(!cone.intersects_sphere(&Sphere::new(Point3::new(0.0, 0.0, -5.0), 0.5)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    /// The apex of the cone.
    pub apex: Point3<f64>,
    /// The unit axis, pointing into the cone.
    pub axis: Unit<Vector3<f64>>,
    /// Half of the opening angle, in radians.
    pub half_angle: f64,
}

impl Cone {
    /// Smallest half-angle accepted by [`Cone::new`].
    pub const MIN_HALF_ANGLE: f64 = 1e-6;

    /// Creates a cone from an apex, an axis direction and a half-angle.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::DegenerateDirection`] for a zero-length axis and
    /// [`SpatialError::InvalidHalfAngle`] unless the half-angle lies in
    /// `[MIN_HALF_ANGLE, π/2)`.
    pub fn new(apex: Point3<f64>, axis: Vector3<f64>, half_angle: f64) -> SpatialResult<Self> {
        let axis = Unit::try_new(axis, f64::EPSILON)
            .ok_or(SpatialError::DegenerateDirection(axis.norm()))?;
        if !(Self::MIN_HALF_ANGLE..std::f64::consts::FRAC_PI_2).contains(&half_angle) {
            return Err(SpatialError::InvalidHalfAngle(half_angle));
        }
        Ok(Self {
            apex,
            axis,
            half_angle,
        })
    }

    /// Creates the narrowest cone from `apex` that encloses `sphere`.
    ///
    /// The half-angle is `atan(radius / distance)`, clamped into the valid range.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::DegenerateDirection`] when `axis` has zero length.
    pub fn enclosing(apex: Point3<f64>, axis: Vector3<f64>, sphere: &Sphere) -> SpatialResult<Self> {
        let distance = (sphere.center - apex).norm().max(f64::EPSILON);
        let half_angle = (sphere.radius / distance)
            .atan()
            .clamp(Self::MIN_HALF_ANGLE, std::f64::consts::FRAC_PI_2 - 1e-6);
        Self::new(apex, axis, half_angle)
    }

    /// Checks if a point lies inside the cone.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let d = point - self.apex;
        let len = d.norm();
        if len <= f64::EPSILON {
            return true;
        }
        self.axis.dot(&d) >= len * self.half_angle.cos()
    }

    /// Exact sphere/cone intersection test.
    ///
    /// The cone is pushed back along its axis by `r / sin(angle)` so that a
    /// sphere touching the cone surface has its center inside the shifted cone.
    /// Spheres whose center lies behind the apex are then only accepted when
    /// they contain the apex itself.
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let (sin, cos) = self.half_angle.sin_cos();
        let r = sphere.radius;

        let shifted_apex = self.apex - self.axis.into_inner() * (r / sin);
        let d = sphere.center - shifted_apex;
        let d_sqr = d.norm_squared();
        let e = self.axis.dot(&d);
        if e <= 0.0 || e * e < d_sqr * cos * cos {
            return false;
        }

        let d = sphere.center - self.apex;
        let d_sqr = d.norm_squared();
        let e = -self.axis.dot(&d);
        if e > 0.0 && e * e >= d_sqr * sin * sin {
            return d_sqr <= r * r;
        }
        true
    }
}
