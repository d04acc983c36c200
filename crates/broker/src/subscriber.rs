//! Subscriber side of the transport contract.

use std::sync::Arc;

use async_trait::async_trait;
use contracts::{ContractError, MessageEnvelope};
use thiserror::Error;

use crate::Result;

/// A single delivery of a message to a consumer.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// The delivered envelope.
    pub envelope: MessageEnvelope,

    /// How many times this message was redelivered after a failed attempt.
    pub redelivered: u32,
}

impl Delivery {
    /// Wraps an envelope in a first-attempt delivery.
    pub fn new(envelope: MessageEnvelope) -> Self {
        Self {
            envelope,
            redelivered: 0,
        }
    }
}

/// Error returned by a message handler, deciding the fate of the delivery.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Deterministic failure (schema mismatch, unparseable body). The
    /// message is routed to the dead-letter exchange without retries.
    #[error("Message rejected: {0}")]
    Reject(String),

    /// Possibly transient failure. The delivery is retried according to the
    /// queue's retry policy.
    #[error("Handler failed: {0}")]
    Retry(String),
}

impl From<ContractError> for HandlerError {
    fn from(e: ContractError) -> Self {
        HandlerError::Reject(e.to_string())
    }
}

/// A handler invoked once per delivered message.
///
/// The delivery is acknowledged only after `handle` returns Ok, by which
/// point the handler must have committed its local unit of work. Returning
/// an error leaves the acknowledgment to the queue's retry policy.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Returns the name of this handler, used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Processes one delivery.
    async fn handle(&self, delivery: &Delivery) -> std::result::Result<(), HandlerError>;
}

/// Retry behavior applied when a handler returns [`HandlerError::Retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Log and drop the message on handler failure.
    DropOnError,

    /// Redeliver until the message has been attempted `max_attempts` times,
    /// then route it to the dead-letter exchange (or drop it if the queue
    /// has none configured).
    RetryThenDeadLetter {
        /// Total delivery attempts, including the first.
        max_attempts: u32,
    },
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::RetryThenDeadLetter { max_attempts: 3 }
    }
}

/// Where poison messages for a queue are routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetterConfig {
    /// The dead-letter exchange.
    pub exchange: String,

    /// The routing key dead-lettered messages are published with.
    pub routing_key: String,
}

impl DeadLetterConfig {
    /// Creates a new dead-letter configuration.
    pub fn new(exchange: impl Into<String>, routing_key: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            routing_key: routing_key.into(),
        }
    }
}

/// Declaration of a durable, non-exclusive queue and its binding.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Queue name; queues are namespaced per service by convention
    /// (e.g. `"order-service.inventory-error"`).
    pub queue_name: String,

    /// The topic exchange the queue binds to.
    pub exchange: String,

    /// The binding pattern (usually the event type tag).
    pub binding_key: String,

    /// What happens when the handler fails.
    pub retry: RetryPolicy,

    /// Optional dead-letter destination for poison messages.
    pub dead_letter: Option<DeadLetterConfig>,
}

impl QueueConfig {
    /// Creates a queue declaration with the default retry policy and no
    /// dead-letter exchange.
    pub fn new(
        queue_name: impl Into<String>,
        exchange: impl Into<String>,
        binding_key: impl Into<String>,
    ) -> Self {
        Self {
            queue_name: queue_name.into(),
            exchange: exchange.into(),
            binding_key: binding_key.into(),
            retry: RetryPolicy::default(),
            dead_letter: None,
        }
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the dead-letter destination.
    pub fn with_dead_letter(mut self, dead_letter: DeadLetterConfig) -> Self {
        self.dead_letter = Some(dead_letter);
        self
    }
}

/// Trait for binding durable queues and registering message handlers.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Declares the queue described by `config`, binds it, and starts a
    /// consumer that invokes `handler` once per delivered message.
    async fn subscribe(&self, config: QueueConfig, handler: Arc<dyn MessageHandler>) -> Result<()>;
}
