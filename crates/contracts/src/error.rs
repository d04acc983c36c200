//! Contract error types.

use thiserror::Error;

/// Errors that can occur when building or interpreting messages.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The envelope is missing a required field.
    #[error("Envelope is missing required field '{0}'")]
    MissingField(&'static str),

    /// The message type is not registered in the schema registry.
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    /// The message version is not one this consumer can interpret.
    ///
    /// Consumers must reject such messages rather than guess field meaning.
    #[error("Unsupported version '{version}' for message type '{message_type}', supported: {supported}")]
    UnsupportedVersion {
        message_type: String,
        version: String,
        supported: String,
    },

    /// The envelope's declared type does not match the requested schema.
    #[error("Message type mismatch: expected '{expected}', got '{actual}'")]
    TypeMismatch { expected: String, actual: String },

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for contract operations.
pub type Result<T> = std::result::Result<T, ContractError>;
