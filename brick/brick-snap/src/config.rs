//! Snap configuration.

use brick_connectivity::{ColliderQuery, Tolerances};
use brick_spatial::{CELL_SIZE, STUD_PITCH};

/// Tunables for candidate search, resolving and alignment.
///
/// # Example
///
/// ```
/// use brick_snap::SnapConfig;
///
/// let config = SnapConfig::default().with_max_tries(5).with_cone_apex_offset(2.0);
/// assert_eq!(config.max_tries(), 5);
/// assert!(config.validate().is_empty());
///
/// let broken = SnapConfig::default().with_max_tries(0);
/// assert_eq!(broken.validate().len(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapConfig {
    /// Accepted candidates to collect before the search stops.
    max_tries: usize,
    /// Distance the cone apex is pulled back behind the ray origin.
    cone_apex_offset: f64,
    /// Largest distance at which two connections still coincide.
    position_epsilon: f64,
    /// Largest angle between field up vectors, in degrees.
    angle_epsilon_degrees: f64,
    /// Spacing of the connection lattice.
    cell_size: f64,
    /// Spacing of the free-placement grid.
    grid_snap_size: f64,
    /// Shrink applied to colliders before overlap tests.
    collision_epsilon: f64,
    /// Farthest distance a placement ray may hit.
    max_ray_distance: f64,
}

impl SnapConfig {
    /// Creates a configuration with default settings.
    ///
    /// Defaults:
    /// - Max tries: 3
    /// - Cone apex offset: 3.0
    /// - Position epsilon: 0.1
    /// - Angle epsilon: 3 degrees
    /// - Cell size: half a stud (0.4)
    /// - Grid snap size: one stud (0.8)
    /// - Collision epsilon: 0.01
    /// - Max ray distance: 1000
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_tries: 3,
            cone_apex_offset: 3.0,
            position_epsilon: 0.1,
            angle_epsilon_degrees: 3.0,
            cell_size: CELL_SIZE,
            grid_snap_size: STUD_PITCH,
            collision_epsilon: 0.01,
            max_ray_distance: 1000.0,
        }
    }

    /// Sets how many accepted candidates to collect.
    #[must_use]
    pub const fn with_max_tries(mut self, max_tries: usize) -> Self {
        self.max_tries = max_tries;
        self
    }

    /// Sets the cone apex pull-back distance.
    #[must_use]
    pub const fn with_cone_apex_offset(mut self, offset: f64) -> Self {
        self.cone_apex_offset = offset;
        self
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

    /// Sets the lattice spacing.
    #[must_use]
    pub const fn with_cell_size(mut self, size: f64) -> Self {
        self.cell_size = size;
        self
    }

    /// Sets the free-placement grid spacing.
    #[must_use]
    pub const fn with_grid_snap_size(mut self, size: f64) -> Self {
        self.grid_snap_size = size;
        self
    }

    /// Sets the collider shrink.
    #[must_use]
    pub const fn with_collision_epsilon(mut self, epsilon: f64) -> Self {
        self.collision_epsilon = epsilon;
        self
    }

    /// Sets the farthest placement ray hit.
    #[must_use]
    pub const fn with_max_ray_distance(mut self, distance: f64) -> Self {
        self.max_ray_distance = distance;
        self
    }

    /// Returns the number of accepted candidates to collect.
    #[must_use]
    pub const fn max_tries(&self) -> usize {
        self.max_tries
    }

    /// Returns the cone apex pull-back distance.
    #[must_use]
    pub const fn cone_apex_offset(&self) -> f64 {
        self.cone_apex_offset
    }

    /// Returns the positional epsilon.
    #[must_use]
    pub const fn position_epsilon(&self) -> f64 {
        self.position_epsilon
    }

    /// Returns the angular epsilon in degrees.
    #[must_use]
    pub const fn angle_epsilon_degrees(&self) -> f64 {
        self.angle_epsilon_degrees
    }

    /// Returns the lattice spacing.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Returns the free-placement grid spacing.
    #[must_use]
    pub const fn grid_snap_size(&self) -> f64 {
        self.grid_snap_size
    }

    /// Returns the collider shrink.
    #[must_use]
    pub const fn collision_epsilon(&self) -> f64 {
        self.collision_epsilon
    }

    /// Returns the farthest placement ray hit.
    #[must_use]
    pub const fn max_ray_distance(&self) -> f64 {
        self.max_ray_distance
    }

    /// The connectivity tolerances this configuration implies.
    #[must_use]
    pub const fn tolerances(&self) -> Tolerances {
        Tolerances::new()
            .with_position_epsilon(self.position_epsilon)
            .with_angle_epsilon_degrees(self.angle_epsilon_degrees)
            .with_collision_epsilon(self.collision_epsilon)
    }

    /// A brute-force collider query using this configuration's shrink.
    #[must_use]
    pub const fn collider_query(&self) -> ColliderQuery {
        ColliderQuery::new(self.collision_epsilon)
    }

    /// Validates the configuration and returns any issues found.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.max_tries == 0 {
            issues.push("max_tries must be at least 1".to_string());
        }
        if self.cone_apex_offset.is_nan() || self.cone_apex_offset < 0.0 {
            issues.push(format!("cone_apex_offset must be non-negative, got {}", self.cone_apex_offset));
        }
        for (name, value) in [
            ("cell_size", self.cell_size),
            ("grid_snap_size", self.grid_snap_size),
            ("max_ray_distance", self.max_ray_distance),
        ] {
            if value.is_nan() || value <= 0.0 {
                issues.push(format!("{name} must be positive, got {value}"));
            }
        }
        // The lattice is fixed by the connection fields
        if (self.cell_size - CELL_SIZE).abs() > 1e-9 {
            issues.push(format!("cell_size must match the connection lattice ({CELL_SIZE}), got {}", self.cell_size));
        }
        issues.extend(self.tolerances().validate());

        issues
    }
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&SnapConfig> for Tolerances {
    fn from(config: &SnapConfig) -> Self {
        config.tolerances()
    }
}
