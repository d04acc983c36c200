//! Inventory service error types.

use thiserror::Error;

/// Errors that can occur in the inventory service.
#[derive(Debug, Error)]
pub enum StockError {
    /// The stock store failed to persist or load state.
    #[error("Stock store error: {0}")]
    Store(String),
}

/// Result type for inventory operations.
pub type Result<T> = std::result::Result<T, StockError>;
