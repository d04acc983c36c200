//! Transactional outbox and its relay.
//!
//! The outbox record is written in the same store transaction as the order
//! it announces; the relay publishes records to the broker afterwards and
//! deletes each row only after a confirmed send. A crash between commit
//! and publish therefore leaves the row in place for the next relay tick
//! instead of stranding the saga.

use std::sync::Arc;
use std::time::Duration;

use broker::EventPublisher;
use chrono::{DateTime, Utc};
use common::{MessageId, OrderId};
use contracts::MessageEnvelope;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::Result;
use crate::store::OrderStore;

/// An outbound event awaiting publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxRecord {
    /// The envelope's message id; doubles as the outbox row key.
    pub message_id: MessageId,

    /// The order the envelope belongs to.
    pub order_id: OrderId,

    /// Routing key to publish with.
    pub routing_key: String,

    /// The complete envelope to publish.
    pub envelope: MessageEnvelope,

    /// When the record was enqueued.
    pub enqueued_at: DateTime<Utc>,
}

impl OutboxRecord {
    /// Wraps an envelope for the given order in an outbox record.
    pub fn new(order_id: OrderId, envelope: MessageEnvelope) -> Self {
        Self {
            message_id: envelope.message_id,
            order_id,
            routing_key: envelope.routing_key.clone(),
            envelope,
            enqueued_at: Utc::now(),
        }
    }
}

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct OutboxRelayConfig {
    /// The exchange outbox envelopes are published to.
    pub exchange: String,

    /// How often the relay polls for undispatched records.
    pub poll_interval: Duration,

    /// Maximum records drained per tick.
    pub batch_size: usize,
}

impl Default for OutboxRelayConfig {
    fn default() -> Self {
        Self {
            exchange: "commerce".to_string(),
            poll_interval: Duration::from_millis(50),
            batch_size: 64,
        }
    }
}

/// Publishes outbox records to the broker and deletes them after send.
pub struct OutboxRelay<S, P> {
    store: Arc<S>,
    publisher: Arc<P>,
    config: OutboxRelayConfig,
}

impl<S, P> OutboxRelay<S, P>
where
    S: OrderStore + 'static,
    P: EventPublisher + 'static,
{
    /// Creates a new relay.
    pub fn new(store: Arc<S>, publisher: Arc<P>, config: OutboxRelayConfig) -> Self {
        Self {
            store,
            publisher,
            config,
        }
    }

    /// Drains one batch of pending records.
    ///
    /// Records are published in insertion order. The first publish failure
    /// stops the tick so per-order FIFO is preserved; the remaining rows
    /// stay in the outbox for the next tick. Returns how many records were
    /// dispatched.
    #[tracing::instrument(skip(self))]
    pub async fn drain_once(&self) -> Result<usize> {
        let records = self.store.pending_outbox(self.config.batch_size).await?;
        let mut dispatched = 0;

        for record in records {
            match self
                .publisher
                .publish(
                    record.envelope.clone(),
                    &self.config.exchange,
                    &record.routing_key,
                )
                .await
            {
                Ok(()) => {
                    self.store.remove_outbox(record.message_id).await?;
                    metrics::counter!("outbox_dispatched_total").increment(1);
                    dispatched += 1;
                }
                Err(e) => {
                    metrics::counter!("outbox_publish_failures_total").increment(1);
                    tracing::warn!(
                        message_id = %record.message_id,
                        order_id = %record.order_id,
                        error = %e,
                        "outbox publish failed, will retry"
                    );
                    break;
                }
            }
        }

        Ok(dispatched)
    }

    /// Spawns the relay loop as a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                if let Err(e) = self.drain_once().await {
                    tracing::error!(error = %e, "outbox drain failed");
                }
                tokio::time::sleep(self.config.poll_interval).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broker::{EventSubscriber, InMemoryBroker, QueueConfig};
    use common::{CustomerId, Money};
    use contracts::{EventLineItem, OrderCreated, SchemaRegistry};

    use crate::memory::InMemoryOrderStore;
    use crate::model::{LineItem, Order, OrderStatus};

    fn make_order_and_record() -> (Order, OutboxRecord) {
        let order_id = OrderId::new();
        let customer_id = CustomerId::new();
        let order = Order {
            id: order_id,
            customer_id,
            order_date: Utc::now(),
            total_amount: Money::from_dollars(80),
            line_items: vec![LineItem::new(order_id, 1, 1)],
            status: OrderStatus::Pending,
        };

        let event = OrderCreated {
            order_id,
            customer_id,
            order_date: order.order_date,
            total_amount: order.total_amount,
            line_items: vec![EventLineItem::new(1, 1)],
        };
        let envelope = SchemaRegistry::with_default_contracts()
            .envelope(&event, "order-service")
            .unwrap();

        (order, OutboxRecord::new(order_id, envelope))
    }

    #[tokio::test]
    async fn test_drain_publishes_and_clears() {
        let store = Arc::new(InMemoryOrderStore::new());
        let broker = Arc::new(InMemoryBroker::new());
        broker.declare_and_bind("q", "commerce", "OrderCreated");

        let (order, record) = make_order_and_record();
        store.insert(order, record).await.unwrap();

        let relay = OutboxRelay::new(
            store.clone(),
            broker.clone(),
            OutboxRelayConfig::default(),
        );
        let dispatched = relay.drain_once().await.unwrap();

        assert_eq!(dispatched, 1);
        assert_eq!(store.outbox_depth().await, 0);
        assert_eq!(broker.queue_depth("q"), 1);
    }

    #[tokio::test]
    async fn test_publish_failure_retains_records() {
        let store = Arc::new(InMemoryOrderStore::new());
        let broker = Arc::new(InMemoryBroker::new());
        broker.declare_and_bind("q", "commerce", "OrderCreated");
        broker.set_fail_publish(true);

        let (order, record) = make_order_and_record();
        store.insert(order, record).await.unwrap();

        let relay = OutboxRelay::new(
            store.clone(),
            broker.clone(),
            OutboxRelayConfig::default(),
        );
        let dispatched = relay.drain_once().await.unwrap();

        assert_eq!(dispatched, 0);
        assert_eq!(store.outbox_depth().await, 1);
        assert_eq!(broker.queue_depth("q"), 0);

        // Broker recovers; the retained record goes out on the next tick
        broker.set_fail_publish(false);
        let dispatched = relay.drain_once().await.unwrap();
        assert_eq!(dispatched, 1);
        assert_eq!(store.outbox_depth().await, 0);
    }

    #[tokio::test]
    async fn test_drain_preserves_insertion_order() {
        let store = Arc::new(InMemoryOrderStore::new());
        let broker = Arc::new(InMemoryBroker::new());

        use broker::{Delivery, HandlerError, MessageHandler};
        use std::sync::Mutex as StdMutex;

        struct CollectingHandler(Arc<StdMutex<Vec<String>>>);

        #[async_trait::async_trait]
        impl MessageHandler for CollectingHandler {
            fn name(&self) -> &'static str {
                "CollectingHandler"
            }

            async fn handle(&self, delivery: &Delivery) -> std::result::Result<(), HandlerError> {
                self.0
                    .lock()
                    .unwrap()
                    .push(delivery.envelope.correlation_id().unwrap().to_string());
                Ok(())
            }
        }

        let seen = Arc::new(StdMutex::new(Vec::new()));
        broker
            .subscribe(
                QueueConfig::new("q", "commerce", "OrderCreated"),
                Arc::new(CollectingHandler(seen.clone())),
            )
            .await
            .unwrap();

        let mut expected = Vec::new();
        for _ in 0..3 {
            let (order, record) = make_order_and_record();
            expected.push(order.id.to_string());
            store.insert(order, record).await.unwrap();
        }

        let relay = OutboxRelay::new(
            store.clone(),
            broker.clone(),
            OutboxRelayConfig::default(),
        );
        relay.drain_once().await.unwrap();
        assert!(broker.settle(Duration::from_secs(1)).await);

        assert_eq!(*seen.lock().unwrap(), expected);
    }
}
