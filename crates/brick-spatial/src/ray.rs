//! Rays and planes.
//!
//! A [`Ray`] is the user's aim (camera position through the cursor). A
//! [`Plane`] is where a brick cluster is laid down when nothing else is hit.

use nalgebra::{Isometry3, Point3, Unit, Vector3};

use crate::error::{SpatialError, SpatialResult};

/// A ray defined by an origin point and a direction vector.
///
/// The direction does not need to be normalized, but must be non-zero.
///
/// # Example
///
/// ```
/// use brick_spatial::Ray;
/// use nalgebra::{Point3, Vector3};
///
/// let ray = Ray::new(Point3::origin(), Vector3::new(2.0, 0.0, 0.0));
/// let p = ray.point_at(3.0);
/// assert!((p.x - 6.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ray {
    /// The origin of the ray.
    pub origin: Point3<f64>,
    /// The direction of the ray (not necessarily normalized).
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Creates a new ray with the given origin and direction.
    #[must_use]
    pub const fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self { origin, direction }
    }

    /// Returns the point along the ray at parameter `t`.
    ///
    /// The point is computed as `origin + t * direction`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Returns the direction normalized to unit length.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::DegenerateDirection`] if the direction is zero.
    pub fn unit_direction(&self) -> SpatialResult<Unit<Vector3<f64>>> {
        Unit::try_new(self.direction, f64::EPSILON)
            .ok_or(SpatialError::DegenerateDirection(self.direction.norm()))
    }

    /// Returns a copy of this ray with a unit-length direction.
    ///
    /// If the direction is zero, returns the ray unchanged.
    #[must_use]
    pub fn normalized(&self) -> Self {
        match self.unit_direction() {
            Ok(direction) => Self::new(self.origin, direction.into_inner()),
            Err(_) => *self,
        }
    }

    /// Returns this ray expressed in the local frame of `transform`.
    #[must_use]
    pub fn to_local(&self, transform: &Isometry3<f64>) -> Self {
        Self {
            origin: transform.inverse_transform_point(&self.origin),
            direction: transform.inverse_transform_vector(&self.direction),
        }
    }

    /// Distance from the ray origin to a point.
    #[must_use]
    pub fn distance_from_origin(&self, point: &Point3<f64>) -> f64 {
        (point - self.origin).norm()
    }

    /// Returns the ray parameter where the ray crosses `plane`.
    ///
    /// Returns `None` when the ray runs parallel to the plane. The parameter
    /// may be negative (the plane lies behind the origin).
    #[must_use]
    pub fn intersect_plane(&self, plane: &Plane) -> Option<f64> {
        let denom = plane.normal.dot(&self.direction);
        if denom.abs() <= 1e-12 {
            return None;
        }
        Some(plane.normal.dot(&(plane.point - self.origin)) / denom)
    }
}

/// A plane through a point with a unit normal.
///
/// # Example
///
/// ```
/// use brick_spatial::{Plane, Ray};
/// use nalgebra::{Point3, Vector3};
///
/// let ground = Plane::horizontal(0.0);
/// let ray = Ray::new(Point3::new(0.0, 10.0, 0.0), Vector3::new(0.0, -2.0, 0.0));
/// assert_eq!(ray.intersect_plane(&ground), Some(5.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plane {
    /// A point on the plane.
    pub point: Point3<f64>,
    /// Unit normal of the plane.
    pub normal: Unit<Vector3<f64>>,
}

impl Plane {
    /// Creates a plane through `point` with the given normal.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::DegenerateDirection`] if the normal is zero.
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> SpatialResult<Self> {
        let normal = Unit::try_new(normal, f64::EPSILON)
            .ok_or(SpatialError::DegenerateDirection(normal.norm()))?;
        Ok(Self { point, normal })
    }

    /// The horizontal plane `y = height` facing up.
    #[must_use]
    pub fn horizontal(height: f64) -> Self {
        Self {
            point: Point3::new(0.0, height, 0.0),
            normal: Vector3::y_axis(),
        }
    }

    /// The local XZ plane of a transform, facing along its local +Y.
    #[must_use]
    pub fn from_isometry(transform: &Isometry3<f64>) -> Self {
        Self {
            point: Point3::from(transform.translation.vector),
            normal: transform.rotation * Vector3::y_axis(),
        }
    }

    /// Signed distance of a point above the plane.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&(point - self.point))
    }

    /// Orthogonal projection of a point onto the plane.
    #[must_use]
    pub fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal.into_inner() * self.signed_distance(point)
    }

    /// Projects a point onto the plane along `direction`.
    ///
    /// Falls back to the orthogonal projection when `direction` is parallel
    /// to the plane.
    #[must_use]
    pub fn project_along(&self, point: &Point3<f64>, direction: &Vector3<f64>) -> Point3<f64> {
        Ray::new(*point, *direction)
            .intersect_plane(self)
            .map_or_else(|| self.project(point), |t| point + direction * t)
    }
}
