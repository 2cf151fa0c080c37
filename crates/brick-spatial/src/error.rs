//! Error types for spatial operations.

/// Result type for spatial operations.
pub type SpatialResult<T> = Result<T, SpatialError>;

/// Errors that can occur when constructing geometric primitives.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SpatialError {
    /// A direction vector had (near) zero length.
    #[error("direction vector is degenerate (length {0})")]
    DegenerateDirection(f64),

    /// A cone half-angle outside `(0, π/2)`.
    #[error("cone half-angle must be in (0, π/2), got {0}")]
    InvalidHalfAngle(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SpatialError::InvalidHalfAngle(-0.4);
        assert!(err.to_string().contains("-0.4"));

        let err = SpatialError::DegenerateDirection(0.0);
        assert!(err.to_string().contains("degenerate"));
    }
}
