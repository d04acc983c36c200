//! Broker error types.

use contracts::ContractError;
use thiserror::Error;

/// Errors that can occur when interacting with the message broker.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The broker connection is unavailable.
    ///
    /// Publish fails synchronously with this error; the caller decides
    /// whether to abort its unit of work.
    #[error("Broker connection unavailable")]
    ConnectionUnavailable,

    /// The queue already has an active consumer.
    ///
    /// Queues are consumed one message at a time by a single consumer;
    /// scaling out means declaring additional queues.
    #[error("Queue '{0}' already has an active consumer")]
    ConsumerExists(String),

    /// The queue was closed while a message was being enqueued.
    #[error("Queue '{0}' is closed")]
    QueueClosed(String),

    /// A contract error occurred while handling a message.
    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),
}

/// Result type for broker operations.
pub type Result<T> = std::result::Result<T, BrokerError>;
