//! Transport adapter for the saga services.
//!
//! This crate defines the publish/subscribe contract the services depend on
//! and an in-memory topic-exchange implementation with the same delivery
//! semantics a production AMQP adapter would provide: durable queues,
//! at-least-once delivery, per-queue FIFO, bounded retries, and dead-letter
//! routing for poison messages.

pub mod error;
pub mod memory;
pub mod publisher;
pub mod routing;
pub mod subscriber;

pub use error::{BrokerError, Result};
pub use memory::InMemoryBroker;
pub use publisher::EventPublisher;
pub use subscriber::{
    DeadLetterConfig, Delivery, EventSubscriber, HandlerError, MessageHandler, QueueConfig,
    RetryPolicy,
};
