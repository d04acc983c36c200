//! Order-write service: order creation and queries.

use std::sync::Arc;

use chrono::Utc;
use common::OrderId;
use contracts::{EventLineItem, OrderCreated, SchemaRegistry};

use crate::error::{OrderError, Result};
use crate::model::{CreateOrder, LineItem, Order};
use crate::outbox::OutboxRecord;
use crate::store::OrderStore;

/// Service owning the write side of the order saga.
pub struct OrderWriteService<S> {
    store: Arc<S>,
    registry: SchemaRegistry,
    service_name: String,
}

impl<S: OrderStore> OrderWriteService<S> {
    /// Creates a new order-write service.
    pub fn new(store: Arc<S>, registry: SchemaRegistry, service_name: impl Into<String>) -> Self {
        Self {
            store,
            registry,
            service_name: service_name.into(),
        }
    }

    /// Creates an order.
    ///
    /// Validates the command, then commits the order, its line items, and
    /// the `OrderCreated` outbox record in one store transaction. The event
    /// reaches the broker through the outbox relay, never directly from
    /// this path. Returns the created order with its generated id; on a
    /// store failure nothing is committed and no event is ever published.
    #[tracing::instrument(skip(self, cmd), fields(customer_id = %cmd.customer_id))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<Order> {
        if cmd.line_items.is_empty() {
            return Err(OrderError::NoLineItems);
        }
        for item in &cmd.line_items {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    sku_id: item.sku_id,
                    quantity: item.quantity,
                });
            }
        }
        if cmd.total_amount.is_negative() {
            return Err(OrderError::InvalidTotal(cmd.total_amount));
        }

        let order_id = OrderId::new();
        let order_date = Utc::now();
        let line_items: Vec<LineItem> = cmd
            .line_items
            .iter()
            .map(|item| LineItem::new(order_id, item.sku_id, item.quantity))
            .collect();

        let order = Order {
            id: order_id,
            customer_id: cmd.customer_id,
            order_date,
            total_amount: cmd.total_amount,
            line_items,
            status: Default::default(),
        };

        let event = OrderCreated {
            order_id,
            customer_id: cmd.customer_id,
            order_date,
            total_amount: cmd.total_amount,
            line_items: cmd
                .line_items
                .iter()
                .map(|item| EventLineItem::new(item.sku_id, item.quantity))
                .collect(),
        };
        let envelope = self.registry.envelope(&event, &self.service_name)?;
        let outbox = OutboxRecord::new(order_id, envelope);

        self.store.insert(order.clone(), outbox).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order_id, "order created, awaiting inventory decision");

        Ok(order)
    }

    /// Loads an order by id.
    ///
    /// Returns None if the order was never created or was compensated.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        self.store.get(order_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{CustomerId, Money};

    use crate::memory::InMemoryOrderStore;
    use crate::model::{NewLineItem, OrderStatus};

    fn service() -> (OrderWriteService<InMemoryOrderStore>, Arc<InMemoryOrderStore>) {
        let store = Arc::new(InMemoryOrderStore::new());
        let service = OrderWriteService::new(
            store.clone(),
            SchemaRegistry::with_default_contracts(),
            "order-service",
        );
        (service, store)
    }

    fn sample_command() -> CreateOrder {
        CreateOrder::new(
            CustomerId::new(),
            Money::from_dollars(80),
            vec![NewLineItem::new(1, 1), NewLineItem::new(2, 1)],
        )
    }

    #[tokio::test]
    async fn test_create_order_persists_and_enqueues_event() {
        let (service, store) = service();
        let cmd = sample_command();
        let customer_id = cmd.customer_id;

        let order = service.create_order(cmd).await.unwrap();

        assert_eq!(order.customer_id, customer_id);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.line_items.len(), 2);
        assert!(order.line_items.iter().all(|i| i.order_id == order.id));

        // The outbox record carries a matching OrderCreated envelope
        let outbox = store.pending_outbox(10).await.unwrap();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].order_id, order.id);

        let event: OrderCreated = outbox[0].envelope.decode().unwrap();
        assert_eq!(event.order_id, order.id);
        assert_eq!(event.customer_id, customer_id);
        assert_eq!(event.total_amount, Money::from_dollars(80));
        assert_eq!(event.line_items.len(), 2);
        assert_eq!(event.line_items[0], EventLineItem::new(1, 1));
    }

    #[tokio::test]
    async fn test_create_order_envelope_is_complete() {
        let (service, store) = service();
        service.create_order(sample_command()).await.unwrap();

        let outbox = store.pending_outbox(10).await.unwrap();
        let envelope = &outbox[0].envelope;
        envelope.validate().unwrap();
        assert_eq!(envelope.message_type, "OrderCreated");
        assert_eq!(envelope.message_version, "1");
        assert_eq!(envelope.service_name, "order-service");
        assert!(envelope.correlation_id().is_some());
    }

    #[tokio::test]
    async fn test_create_order_rejects_empty_line_items() {
        let (service, store) = service();
        let cmd = CreateOrder::new(CustomerId::new(), Money::from_dollars(80), vec![]);

        let result = service.create_order(cmd).await;
        assert!(matches!(result, Err(OrderError::NoLineItems)));
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.outbox_depth().await, 0);
    }

    #[tokio::test]
    async fn test_create_order_rejects_zero_quantity() {
        let (service, _store) = service();
        let cmd = CreateOrder::new(
            CustomerId::new(),
            Money::from_dollars(80),
            vec![NewLineItem::new(1, 0)],
        );

        let result = service.create_order(cmd).await;
        assert!(matches!(result, Err(OrderError::InvalidQuantity { .. })));
    }

    #[tokio::test]
    async fn test_create_order_rejects_negative_total() {
        let (service, _store) = service();
        let cmd = CreateOrder::new(
            CustomerId::new(),
            Money::from_cents(-1),
            vec![NewLineItem::new(1, 1)],
        );

        let result = service.create_order(cmd).await;
        assert!(matches!(result, Err(OrderError::InvalidTotal(_))));
    }

    #[tokio::test]
    async fn test_store_failure_publishes_nothing() {
        let (service, store) = service();
        store.set_fail_on_insert(true).await;

        let result = service.create_order(sample_command()).await;
        assert!(matches!(result, Err(OrderError::Store(_))));
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.outbox_depth().await, 0);
    }

    #[tokio::test]
    async fn test_get_order_roundtrip() {
        let (service, _store) = service();
        let order = service.create_order(sample_command()).await.unwrap();

        let loaded = service.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(loaded, order);
        assert!(service.get_order(OrderId::new()).await.unwrap().is_none());
    }
}
