//! Notification error types.

use thiserror::Error;

/// Errors that can occur in the customer notification service.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The notification store failed to persist or load state.
    #[error("Notification store error: {0}")]
    Store(String),
}

/// Result type for notification operations.
pub type Result<T> = std::result::Result<T, NotificationError>;
