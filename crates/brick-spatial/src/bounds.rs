//! Bounding volumes.
//!
//! [`Aabb`] is the bounding box used for brick and cluster extents. Transforming
//! an AABB always goes through all 8 corners: the union of two rotated boxes is
//! not the rotated union of their axis-aligned boxes.

use nalgebra::{Isometry3, Point3, Vector3};

/// An axis-aligned bounding box.
///
/// # Example
///
/// ```
/// use brick_spatial::Aabb;
/// use nalgebra::Point3;
///
/// let aabb = Aabb::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.6, 0.96, 0.8),
/// );
///
/// assert!(aabb.contains(&Point3::new(0.4, 0.5, 0.4)));
/// assert!(!aabb.contains(&Point3::new(2.0, 0.5, 0.4)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3<f64>,
    /// Maximum corner of the bounding box.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Creates a new AABB from two opposite corners.
    ///
    /// The corners are automatically reordered if necessary.
    ///
    /// # Example
    ///
    /// ```
    /// use brick_spatial::Aabb;
    /// use nalgebra::Point3;
    ///
    /// let aabb = Aabb::new(Point3::new(1.0, 1.0, 1.0), Point3::origin());
    /// assert_eq!(aabb.min, Point3::origin());
    /// assert_eq!(aabb.max, Point3::new(1.0, 1.0, 1.0));
    /// ```
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates an AABB centered at a point with the given half-extents.
    #[must_use]
    pub fn from_center(center: Point3<f64>, half_extents: Vector3<f64>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Creates the smallest AABB containing every point, or `None` for an empty iterator.
    ///
    /// # Example
    ///
    /// ```
    /// use brick_spatial::Aabb;
    /// use nalgebra::Point3;
    ///
    /// let aabb = Aabb::from_points([Point3::new(1.0, 0.0, 0.0), Point3::new(-1.0, 2.0, 0.5)]).unwrap();
    /// assert_eq!(aabb.min, Point3::new(-1.0, 0.0, 0.0));
    /// assert_eq!(aabb.max, Point3::new(1.0, 2.0, 0.5));
    ///
    /// assert!(Aabb::from_points(std::iter::empty()).is_none());
    /// ```
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Point3<f64>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut aabb = Self {
            min: first,
            max: first,
        };
        for point in points {
            aabb.expand_to_include(&point);
        }
        Some(aabb)
    }

    /// Returns the center point of the AABB.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns the half-extents (half-size) of the AABB.
    #[must_use]
    pub fn half_extents(&self) -> Vector3<f64> {
        (self.max - self.min) * 0.5
    }

    /// Returns the full size (dimensions) of the AABB.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Returns the 8 corners of the box.
    ///
    /// Corner `i` takes `max` on axis `k` when bit `k` of `i` is set.
    #[must_use]
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let mut corners = [self.min; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            if i & 1 != 0 {
                corner.x = self.max.x;
            }
            if i & 2 != 0 {
                corner.y = self.max.y;
            }
            if i & 4 != 0 {
                corner.z = self.max.z;
            }
        }
        corners
    }

    /// Transforms all 8 corners and returns their axis-aligned extent.
    ///
    /// # Example
    ///
    /// ```
    /// use brick_spatial::Aabb;
    /// use nalgebra::{Isometry3, Point3, Vector3};
    /// use std::f64::consts::FRAC_PI_4;
    ///
    /// let unit = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
    /// let rotated = unit.transformed(&Isometry3::rotation(Vector3::y() * FRAC_PI_4));
    /// assert!((rotated.max.x - 2.0_f64.sqrt()).abs() < 1e-12);
    /// assert!((rotated.max.y - 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn transformed(&self, transform: &Isometry3<f64>) -> Self {
        let corners = self.corners().map(|corner| transform * corner);
        let mut aabb = Self {
            min: corners[0],
            max: corners[0],
        };
        for corner in &corners[1..] {
            aabb.expand_to_include(corner);
        }
        aabb
    }

    /// Checks if a point is inside the AABB.
    ///
    /// Points on the boundary are considered inside.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Checks if this AABB intersects another AABB.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Expands this AABB to include a point.
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Returns a new AABB that is the union of this AABB and another.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut aabb = *self;
        aabb.expand_to_include(&other.min);
        aabb.expand_to_include(&other.max);
        aabb
    }

    /// Returns an AABB grown by `margin` on every side (shrunk for negative margins).
    ///
    /// Shrinking never inverts the box; an over-shrunk axis collapses to its center.
    #[must_use]
    pub fn inflated(&self, margin: f64) -> Self {
        let center = self.center();
        let half = self.half_extents().map(|h| (h + margin).max(0.0));
        Self::from_center(center, half)
    }

    /// Returns the sphere that encloses the box (center, half-diagonal radius).
    #[must_use]
    pub fn bounding_sphere(&self) -> Sphere {
        Sphere::new(self.center(), self.half_extents().norm())
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Point3::origin(), Point3::origin())
    }
}

/// A sphere in world coordinates.
///
/// # Example
///
/// ```
/// use brick_spatial::Sphere;
/// use nalgebra::Point3;
///
/// let sphere = Sphere::new(Point3::new(5.0, 5.0, 5.0), 2.0);
///
/// assert!(sphere.contains(&Point3::new(6.0, 5.0, 5.0)));
/// assert!(!sphere.contains(&Point3::new(8.0, 5.0, 5.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sphere {
    /// The center of the sphere.
    pub center: Point3<f64>,
    /// The radius of the sphere.
    pub radius: f64,
}

impl Sphere {
    /// Creates a new sphere with the given center and radius.
    ///
    /// A negative radius is taken by magnitude.
    #[must_use]
    pub const fn new(center: Point3<f64>, radius: f64) -> Self {
        Self {
            center,
            radius: if radius < 0.0 { -radius } else { radius },
        }
    }

    /// Checks if a point is inside or on the sphere.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        (point - self.center).norm_squared() <= self.radius * self.radius
    }

    /// Returns `true` for a sphere with (near) zero radius.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.radius <= f64::EPSILON
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new(Point3::origin(), 1.0)
    }
}
