//! Inbound event handlers for the order-write service.

use std::sync::Arc;

use async_trait::async_trait;
use broker::{Delivery, HandlerError, MessageHandler};
use chrono::Utc;
use contracts::{InventoryError, InventoryUpdated, SchemaRegistry};

use crate::store::OrderStore;

/// Compensates the saga on `InventoryError`.
///
/// Deletes the pending order and its line items. Deliveries for unknown or
/// already-compensated orders are silent no-ops, so duplicate delivery is
/// safe. No event is published in response; this branch of the
/// choreography terminates here.
pub struct InventoryErrorCompensator<S> {
    store: Arc<S>,
    registry: SchemaRegistry,
}

impl<S> InventoryErrorCompensator<S> {
    /// Creates a new compensation handler.
    pub fn new(store: Arc<S>, registry: SchemaRegistry) -> Self {
        Self { store, registry }
    }
}

#[async_trait]
impl<S: OrderStore> MessageHandler for InventoryErrorCompensator<S> {
    fn name(&self) -> &'static str {
        "InventoryErrorCompensator"
    }

    #[tracing::instrument(skip(self, delivery), fields(message_id = %delivery.envelope.message_id))]
    async fn handle(&self, delivery: &Delivery) -> Result<(), HandlerError> {
        self.registry.check_compatibility(&delivery.envelope)?;
        let event: InventoryError = delivery.envelope.decode()?;

        let removed = self
            .store
            .remove(event.order_id)
            .await
            .map_err(|e| HandlerError::Retry(e.to_string()))?;

        if removed {
            metrics::counter!("orders_compensated_total").increment(1);
            tracing::info!(
                order_id = %event.order_id,
                reason = %event.reason,
                "order compensated"
            );
        } else {
            metrics::counter!("orders_compensation_noop_total").increment(1);
            tracing::debug!(
                order_id = %event.order_id,
                "compensation no-op, order unknown or already compensated"
            );
        }

        Ok(())
    }
}

/// Marks orders confirmed on `InventoryUpdated`.
///
/// The confirmed status is the write side's persisted seen-marker: the
/// pending sweep only force-compensates orders that never reached it.
pub struct ConfirmationHandler<S> {
    store: Arc<S>,
    registry: SchemaRegistry,
}

impl<S> ConfirmationHandler<S> {
    /// Creates a new confirmation handler.
    pub fn new(store: Arc<S>, registry: SchemaRegistry) -> Self {
        Self { store, registry }
    }
}

#[async_trait]
impl<S: OrderStore> MessageHandler for ConfirmationHandler<S> {
    fn name(&self) -> &'static str {
        "ConfirmationHandler"
    }

    #[tracing::instrument(skip(self, delivery), fields(message_id = %delivery.envelope.message_id))]
    async fn handle(&self, delivery: &Delivery) -> Result<(), HandlerError> {
        self.registry.check_compatibility(&delivery.envelope)?;
        let event: InventoryUpdated = delivery.envelope.decode()?;

        let confirmed = self
            .store
            .mark_confirmed(event.order_id)
            .await
            .map_err(|e| HandlerError::Retry(e.to_string()))?;

        if confirmed {
            let elapsed = (Utc::now() - event.order_date).num_milliseconds() as f64 / 1000.0;
            metrics::histogram!("saga_duration_seconds").record(elapsed);
            metrics::counter!("orders_confirmed_total").increment(1);
            tracing::info!(order_id = %event.order_id, "order confirmed");
        } else {
            tracing::debug!(order_id = %event.order_id, "confirmation for unknown order");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{CustomerId, Money, OrderId};
    use contracts::{EventLineItem, IntegrationEvent, MessageEnvelope, OrderCreated};

    use crate::memory::InMemoryOrderStore;
    use crate::model::{LineItem, Order, OrderStatus};
    use crate::outbox::OutboxRecord;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::with_default_contracts()
    }

    async fn seed_order(store: &InMemoryOrderStore) -> Order {
        let order_id = OrderId::new();
        let customer_id = CustomerId::new();
        let order = Order {
            id: order_id,
            customer_id,
            order_date: Utc::now(),
            total_amount: Money::from_dollars(80),
            line_items: vec![LineItem::new(order_id, 1, 1), LineItem::new(order_id, 2, 1)],
            status: OrderStatus::Pending,
        };

        let event = OrderCreated {
            order_id,
            customer_id,
            order_date: order.order_date,
            total_amount: order.total_amount,
            line_items: vec![EventLineItem::new(1, 1), EventLineItem::new(2, 1)],
        };
        let envelope = registry().envelope(&event, "order-service").unwrap();
        store
            .insert(order.clone(), OutboxRecord::new(order_id, envelope))
            .await
            .unwrap();
        order
    }

    fn delivery_for<E: IntegrationEvent>(event: &E) -> Delivery {
        Delivery::new(registry().envelope(event, "inventory-service").unwrap())
    }

    #[tokio::test]
    async fn test_compensation_removes_pending_order() {
        let store = Arc::new(InMemoryOrderStore::new());
        let order = seed_order(&store).await;
        let handler = InventoryErrorCompensator::new(store.clone(), registry());

        let event = InventoryError::new(order.id, "insufficient inventory");
        handler.handle(&delivery_for(&event)).await.unwrap();

        assert!(store.get(order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_compensation_is_idempotent() {
        let store = Arc::new(InMemoryOrderStore::new());
        let order = seed_order(&store).await;
        let handler = InventoryErrorCompensator::new(store.clone(), registry());

        let event = InventoryError::new(order.id, "insufficient inventory");
        handler.handle(&delivery_for(&event)).await.unwrap();
        // Second delivery of the same event is a silent no-op
        handler.handle(&delivery_for(&event)).await.unwrap();

        assert!(store.get(order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_compensation_for_unknown_order_is_noop() {
        let store = Arc::new(InMemoryOrderStore::new());
        let handler = InventoryErrorCompensator::new(store.clone(), registry());

        let event = InventoryError::new(OrderId::new(), "insufficient inventory");
        handler.handle(&delivery_for(&event)).await.unwrap();
    }

    #[tokio::test]
    async fn test_confirmation_marks_order() {
        let store = Arc::new(InMemoryOrderStore::new());
        let order = seed_order(&store).await;
        let handler = ConfirmationHandler::new(store.clone(), registry());

        let event = InventoryUpdated {
            order_id: order.id,
            customer_id: order.customer_id,
            order_date: order.order_date,
            total_amount: order.total_amount,
            line_items: vec![EventLineItem::new(1, 1)],
        };
        handler.handle(&delivery_for(&event)).await.unwrap();

        let loaded = store.get(order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_unsupported_version_is_rejected() {
        let store = Arc::new(InMemoryOrderStore::new());
        let handler = InventoryErrorCompensator::new(store.clone(), registry());

        let event = InventoryError::new(OrderId::new(), "insufficient inventory");
        let mut envelope = registry().envelope(&event, "inventory-service").unwrap();
        envelope.message_version = "99".to_string();

        let result = handler.handle(&Delivery::new(envelope)).await;
        assert!(matches!(result, Err(HandlerError::Reject(_))));
    }

    #[tokio::test]
    async fn test_mismatched_body_is_rejected() {
        let store = Arc::new(InMemoryOrderStore::new());
        let handler = InventoryErrorCompensator::new(store.clone(), registry());

        // An InventoryUpdated envelope delivered to the compensator queue
        let envelope = MessageEnvelope::builder()
            .service_name("inventory-service")
            .message_type("InventoryUpdated")
            .message_version("1")
            .routing_key("InventoryError")
            .body_raw(serde_json::json!({}))
            .build();

        let result = handler.handle(&Delivery::new(envelope)).await;
        assert!(matches!(result, Err(HandlerError::Reject(_))));
    }
}
