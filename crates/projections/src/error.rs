//! Projection error types.

use thiserror::Error;

/// Errors that can occur while maintaining the read-side projection.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The view store failed to persist or load state.
    #[error("View store error: {0}")]
    Store(String),
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
