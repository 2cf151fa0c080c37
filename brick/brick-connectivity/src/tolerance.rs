//! Positional and angular tolerances.

/// How close two connections must be to count as coincident.
///
/// # Example
///
/// ```
/// use brick_connectivity::Tolerances;
///
/// let tol = Tolerances::default().with_position_epsilon(0.05);
/// assert!(tol.validate().is_empty());
/// assert!((tol.angle_epsilon() - 3.0_f64.to_radians()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances {
    /// Maximum distance between two coincident connections.
    pub position_epsilon: f64,
    /// Maximum angle between two aligned field up vectors, in degrees.
    pub angle_epsilon_degrees: f64,
    /// Amount colliders are shrunk by before overlap tests.
    pub collision_epsilon: f64,
}

impl Tolerances {
    /// Creates the default tolerances (0.1 units, 3 degrees, 0.01 units).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            position_epsilon: 0.1,
            angle_epsilon_degrees: 3.0,
            collision_epsilon: 0.01,
        }
    }

    /// Sets the positional epsilon.
    #[must_use]
    pub const fn with_position_epsilon(mut self, epsilon: f64) -> Self {
        self.position_epsilon = epsilon;
        self
    }

    /// Sets the angular epsilon in degrees.
    #[must_use]
    pub const fn with_angle_epsilon_degrees(mut self, degrees: f64) -> Self {
        self.angle_epsilon_degrees = degrees;
        self
    }

    /// Sets the collision epsilon.
    #[must_use]
    pub const fn with_collision_epsilon(mut self, epsilon: f64) -> Self {
        self.collision_epsilon = epsilon;
        self
    }

    /// Angular epsilon in radians.
    #[must_use]
    pub fn angle_epsilon(&self) -> f64 {
        self.angle_epsilon_degrees.to_radians()
    }

    /// Validates the tolerances and returns any issues.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !(self.position_epsilon > 0.0 && self.position_epsilon.is_finite()) {
            issues.push(format!("position_epsilon must be positive, got {}", self.position_epsilon));
        }
        if !(self.angle_epsilon_degrees > 0.0 && self.angle_epsilon_degrees < 45.0) {
            issues.push(format!(
                "angle_epsilon_degrees must be in (0, 45), got {}",
                self.angle_epsilon_degrees
            ));
        }
        if !(self.collision_epsilon >= 0.0 && self.collision_epsilon.is_finite()) {
            issues.push(format!("collision_epsilon must be non-negative, got {}", self.collision_epsilon));
        }
        issues
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let tol = Tolerances::default();
        assert_relative_eq!(tol.position_epsilon, 0.1);
        assert_relative_eq!(tol.angle_epsilon_degrees, 3.0);
        assert_relative_eq!(tol.collision_epsilon, 0.01);
        assert!(tol.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_each_problem() {
        let tol = Tolerances::new()
            .with_position_epsilon(0.0)
            .with_angle_epsilon_degrees(90.0)
            .with_collision_epsilon(f64::NAN);
        assert_eq!(tol.validate().len(), 3);
    }
}
