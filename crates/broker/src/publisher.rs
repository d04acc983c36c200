//! Publisher side of the transport contract.

use async_trait::async_trait;
use contracts::MessageEnvelope;

use crate::Result;

/// Trait for publishing events to a topic exchange.
///
/// Guarantees at-least-once delivery to any bound durable queue and FIFO
/// order for envelopes published sequentially on the same connection. No
/// ordering is guaranteed across different routing keys.
///
/// If the broker is unavailable the publish fails synchronously; the caller
/// decides whether to abort its unit of work.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes an envelope to the named exchange with the given routing key.
    async fn publish(
        &self,
        envelope: MessageEnvelope,
        exchange: &str,
        routing_key: &str,
    ) -> Result<()>;
}
