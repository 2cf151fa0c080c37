//! Hypothetical poses.
//!
//! Searching for a snap never moves anything. Instead every pose-dependent
//! query takes a [`Placement`]: a set of moving bricks plus one rigid motion
//! applied on top of their stored transforms.

use hashbrown::HashSet;
use nalgebra::Isometry3;

use crate::ids::BrickId;

/// A set of bricks, used for moving sets and ignore sets.
pub type BrickSet = HashSet<BrickId>;

/// Bricks in `moving` are posed at `delta * transform`; all others where they are.
///
/// # Example
///
/// ```
/// use brick_connectivity::{BrickId, BrickSet, Placement};
/// use nalgebra::Isometry3;
///
/// let moving: BrickSet = [BrickId(1)].into_iter().collect();
/// let placement = Placement::new(&moving, Isometry3::translation(0.0, 1.0, 0.0));
///
/// let stored = Isometry3::identity();
/// assert_eq!(placement.pose(BrickId(1), &stored).translation.y, 1.0);
/// assert_eq!(placement.pose(BrickId(2), &stored).translation.y, 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    moving: Option<&'a BrickSet>,
    delta: Isometry3<f64>,
}

impl<'a> Placement<'a> {
    /// Everything at its stored transform.
    #[must_use]
    pub fn at_rest() -> Self {
        Self {
            moving: None,
            delta: Isometry3::identity(),
        }
    }

    /// Moves `moving` by `delta`.
    #[must_use]
    pub const fn new(moving: &'a BrickSet, delta: Isometry3<f64>) -> Self {
        Self {
            moving: Some(moving),
            delta,
        }
    }

    /// The moving set, if any.
    #[must_use]
    pub const fn moving(&self) -> Option<&'a BrickSet> {
        self.moving
    }

    /// Motion applied to the moving set.
    #[must_use]
    pub const fn delta(&self) -> &Isometry3<f64> {
        &self.delta
    }

    /// Whether `brick` is in the moving set.
    #[must_use]
    pub fn is_moving(&self, brick: BrickId) -> bool {
        self.moving.is_some_and(|m| m.contains(&brick))
    }

    /// Same moving set with a different motion.
    #[must_use]
    pub const fn with_delta(&self, delta: Isometry3<f64>) -> Self {
        Self {
            moving: self.moving,
            delta,
        }
    }

    /// Applies a further world-space motion after the current one.
    #[must_use]
    pub fn then(&self, motion: &Isometry3<f64>) -> Self {
        self.with_delta(motion * self.delta)
    }

    /// Pose of `brick` given its stored transform.
    #[must_use]
    pub fn pose(&self, brick: BrickId, stored: &Isometry3<f64>) -> Isometry3<f64> {
        if self.is_moving(brick) {
            self.delta * stored
        } else {
            *stored
        }
    }
}

impl Default for Placement<'_> {
    fn default() -> Self {
        Self::at_rest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_at_rest_moves_nothing() {
        let p = Placement::at_rest();
        let stored = Isometry3::translation(1.0, 2.0, 3.0);
        assert_eq!(p.pose(BrickId(0), &stored), stored);
        assert!(!p.is_moving(BrickId(0)));
    }

    #[test]
    fn test_then_composes_in_world_space() {
        let moving: BrickSet = [BrickId(0)].into_iter().collect();
        let p = Placement::new(&moving, Isometry3::translation(1.0, 0.0, 0.0))
            .then(&Isometry3::rotation(Vector3::y() * std::f64::consts::FRAC_PI_2));
        let pose = p.pose(BrickId(0), &Isometry3::identity());
        // Translate first, then rotate about the world origin: +X becomes -Z
        assert_relative_eq!(pose * Point3::origin(), Point3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
    }
}
