//! Oriented bounding boxes.
//!
//! Part colliders are boxes in part space; placed in the world they become
//! [`Obb`]s. Overlap uses the separating axis theorem over the 15 candidate
//! axes, ray hits use the slab test in box space.

use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};

use crate::bounds::Aabb;
use crate::ray::Ray;

/// An oriented box: a center, half-extents along its local axes, and a rotation.
///
/// # Example
///
/// ```
/// use brick_spatial::{Aabb, Obb};
/// use nalgebra::{Isometry3, Point3};
///
/// let local = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.6, 0.96, 1.6));
/// let a = Obb::from_aabb(&local, &Isometry3::identity());
/// let b = Obb::from_aabb(&local, &Isometry3::translation(1.0, 0.0, 0.0));
/// let c = Obb::from_aabb(&local, &Isometry3::translation(0.0, 0.96, 0.0));
///
/// assert!(a.intersects(&b));
/// // Stacked boxes only touch; shrink them to ignore shared faces.
/// assert!(!a.shrunk(0.01).intersects(&c.shrunk(0.01)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obb {
    /// Center of the box.
    pub center: Point3<f64>,
    /// Half-extents along each local axis.
    pub half_extents: Vector3<f64>,
    /// Rotation of the local axes.
    pub rotation: UnitQuaternion<f64>,
}

impl Obb {
    /// Creates an oriented box.
    #[must_use]
    pub fn new(center: Point3<f64>, half_extents: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
            rotation,
        }
    }

    /// Places a local-space AABB with a transform.
    #[must_use]
    pub fn from_aabb(aabb: &Aabb, transform: &Isometry3<f64>) -> Self {
        Self::new(transform * aabb.center(), aabb.half_extents(), transform.rotation)
    }

    /// Returns the box with every half-extent reduced by `epsilon` (never below zero).
    #[must_use]
    pub fn shrunk(&self, epsilon: f64) -> Self {
        Self {
            half_extents: self.half_extents.map(|h| (h - epsilon).max(0.0)),
            ..*self
        }
    }

    /// The three local axes in world space.
    #[must_use]
    pub fn axes(&self) -> [Vector3<f64>; 3] {
        [
            self.rotation * Vector3::x(),
            self.rotation * Vector3::y(),
            self.rotation * Vector3::z(),
        ]
    }

    /// World-space axis-aligned bounds of the box.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        let local = Aabb::from_center(Point3::origin(), self.half_extents);
        local.transformed(&Isometry3::from_parts(self.center.coords.into(), self.rotation))
    }

    /// Checks if a point is inside the box.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let local = self.rotation.inverse() * (point - self.center);
        local.x.abs() <= self.half_extents.x
            && local.y.abs() <= self.half_extents.y
            && local.z.abs() <= self.half_extents.z
    }

    /// Separating axis test against another box.
    ///
    /// Boxes that merely touch count as intersecting.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        let a = self.axes();
        let b = other.axes();
        let t = other.center - self.center;

        let mut candidates: Vec<Vector3<f64>> = Vec::with_capacity(15);
        candidates.extend_from_slice(&a);
        candidates.extend_from_slice(&b);
        for ai in &a {
            for bj in &b {
                let cross = ai.cross(bj);
                // Parallel edges give no new axis; the face axes cover that case.
                if cross.norm_squared() > 1e-12 {
                    candidates.push(cross);
                }
            }
        }

        candidates.iter().all(|axis| {
            let ra = projected_radius(&a, &self.half_extents, axis);
            let rb = projected_radius(&b, &other.half_extents, axis);
            t.dot(axis).abs() <= ra + rb
        })
    }

    /// Returns the ray parameter of the first hit within `max_t`, if any.
    ///
    /// A ray starting inside the box hits at `t = 0`.
    #[must_use]
    pub fn ray_intersection(&self, ray: &Ray, max_t: f64) -> Option<f64> {
        let origin = self.rotation.inverse() * (ray.origin - self.center);
        let direction = self.rotation.inverse() * ray.direction;

        let mut t_min: f64 = 0.0;
        let mut t_max = max_t;
        for axis in 0..3 {
            let (o, d, h) = (origin[axis], direction[axis], self.half_extents[axis]);
            if d.abs() <= 1e-12 {
                if o.abs() > h {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (t0, t1) = {
                let a = (-h - o) * inv;
                let b = (h - o) * inv;
                if a <= b { (a, b) } else { (b, a) }
            };
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

fn projected_radius(axes: &[Vector3<f64>; 3], half: &Vector3<f64>, axis: &Vector3<f64>) -> f64 {
    axes.iter()
        .zip(half.iter())
        .map(|(a, h)| h * a.dot(axis).abs())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    fn unit_box(center: Point3<f64>) -> Obb {
        Obb::new(center, Vector3::new(0.5, 0.5, 0.5), UnitQuaternion::identity())
    }

    #[test]
    fn test_separated_boxes() {
        let a = unit_box(Point3::origin());
        let b = unit_box(Point3::new(2.0, 0.0, 0.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_rotated_box_corner_reaches() {
        // A 45 degree box reaches sqrt(2)/2 along X.
        let a = unit_box(Point3::origin());
        let rotated = Obb::new(
            Point3::new(1.15, 0.0, 0.0),
            Vector3::new(0.5, 0.5, 0.5),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_4),
        );
        assert!(a.intersects(&rotated));

        let further = Obb {
            center: Point3::new(1.25, 0.0, 0.0),
            ..rotated
        };
        assert!(!a.intersects(&further));
    }

    #[test]
    fn test_edge_edge_separation() {
        // Diamonds in orthogonal planes, clear of each other.
        let a = Obb::new(
            Point3::origin(),
            Vector3::new(0.5, 0.5, 0.5),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_4),
        );
        let b = Obb::new(
            Point3::new(0.0, 1.25, 1.25),
            Vector3::new(0.5, 0.5, 0.5),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_4),
        );
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_shrunk_touching() {
        let a = unit_box(Point3::origin());
        let b = unit_box(Point3::new(1.0, 0.0, 0.0));
        assert!(a.intersects(&b));
        assert!(!a.shrunk(0.001).intersects(&b.shrunk(0.001)));
    }

    #[test]
    fn test_aabb_of_rotated() {
        let obb = Obb::new(
            Point3::origin(),
            Vector3::new(0.5, 0.5, 0.5),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_4),
        );
        let aabb = obb.aabb();
        assert_relative_eq!(aabb.max.x, 0.5 * 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(aabb.max.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_ray_hit() {
        let obb = unit_box(Point3::new(5.0, 0.0, 0.0));
        let ray = Ray::new(Point3::origin(), Vector3::x());
        assert_relative_eq!(obb.ray_intersection(&ray, 100.0).unwrap(), 4.5);
        assert!(obb.ray_intersection(&ray, 4.0).is_none());

        let miss = Ray::new(Point3::new(0.0, 2.0, 0.0), Vector3::x());
        assert!(obb.ray_intersection(&miss, 100.0).is_none());
    }

    #[test]
    fn test_ray_from_inside() {
        let obb = unit_box(Point3::origin());
        let ray = Ray::new(Point3::origin(), Vector3::y());
        assert_eq!(obb.ray_intersection(&ray, 10.0), Some(0.0));
    }

    #[test]
    fn test_contains() {
        let obb = unit_box(Point3::origin());
        assert!(obb.contains(&Point3::new(0.4, -0.4, 0.0)));
        assert!(!obb.contains(&Point3::new(0.6, 0.0, 0.0)));
    }
}
