//! Error types for snapping operations.

use brick_connectivity::ConnectivityError;

/// Result type for snapping operations.
pub type SnapResult<T> = Result<T, SnapError>;

/// Errors raised while setting up or applying a snap.
///
/// Finding no connection is not an error: the resolver returns `None`.
///
/// # Example
///
/// ```
/// use brick_snap::SnapError;
///
/// let error = SnapError::EmptyMovingSet;
/// assert!(error.to_string().contains("no bricks"));
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SnapError {
    /// The moving set contained no bricks.
    #[error("no bricks are being moved")]
    EmptyMovingSet,

    /// The configuration failed validation.
    #[error("invalid snap configuration: {}", issues.join("; "))]
    InvalidConfig {
        /// Every problem found.
        issues: Vec<String>,
    },

    /// A scene operation failed.
    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use brick_connectivity::BrickId;

    #[test]
    fn test_error_display() {
        let err = SnapError::InvalidConfig {
            issues: vec!["max_tries must be at least 1".to_string(), "cell_size must be positive".to_string()],
        };
        let text = err.to_string();
        assert!(text.contains("max_tries"));
        assert!(text.contains("; cell_size"));

        let err: SnapError = ConnectivityError::BrickNotFound { id: BrickId(4) }.into();
        assert!(err.to_string().contains("brick#4"));
    }
}
