//! The customer notification handler.

use std::sync::Arc;

use async_trait::async_trait;
use broker::{Delivery, HandlerError, MessageHandler};
use contracts::{InventoryUpdated, SchemaRegistry};

use crate::model::Notification;
use crate::store::NotificationStore;

/// Creates a notification for every accepted order.
///
/// Subscribes to the same `InventoryUpdated` event as the read projector,
/// on its own queue, and applies the same dedupe pattern: one notification
/// per order id no matter how many times the event is delivered.
pub struct NotificationHandler<S> {
    store: Arc<S>,
    registry: SchemaRegistry,
}

impl<S> NotificationHandler<S> {
    /// Creates a new notification handler.
    pub fn new(store: Arc<S>, registry: SchemaRegistry) -> Self {
        Self { store, registry }
    }
}

#[async_trait]
impl<S: NotificationStore> MessageHandler for NotificationHandler<S> {
    fn name(&self) -> &'static str {
        "NotificationHandler"
    }

    #[tracing::instrument(skip(self, delivery), fields(message_id = %delivery.envelope.message_id))]
    async fn handle(&self, delivery: &Delivery) -> Result<(), HandlerError> {
        self.registry.check_compatibility(&delivery.envelope)?;
        let event: InventoryUpdated = delivery.envelope.decode()?;

        let exists = self
            .store
            .exists_for_order(event.order_id)
            .await
            .map_err(|e| HandlerError::Retry(e.to_string()))?;
        if exists {
            metrics::counter!("notification_duplicates_skipped_total").increment(1);
            tracing::debug!(order_id = %event.order_id, "notification already exists, skipping");
            return Ok(());
        }

        self.store
            .insert(Notification::for_accepted_order(&event))
            .await
            .map_err(|e| HandlerError::Retry(e.to_string()))?;

        metrics::counter!("notifications_created_total").increment(1);
        tracing::info!(
            order_id = %event.order_id,
            customer_id = %event.customer_id,
            "customer notified of accepted order"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{CustomerId, Money, OrderId};
    use contracts::EventLineItem;

    use crate::memory::InMemoryNotificationStore;
    use crate::model::ACCEPTED_MESSAGE;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::with_default_contracts()
    }

    fn sample_event() -> InventoryUpdated {
        InventoryUpdated {
            order_id: OrderId::new(),
            customer_id: CustomerId::new(),
            order_date: Utc::now(),
            total_amount: Money::from_dollars(80),
            line_items: vec![EventLineItem::new(1, 1), EventLineItem::new(2, 1)],
        }
    }

    fn delivery_for(event: &InventoryUpdated) -> Delivery {
        Delivery::new(registry().envelope(event, "inventory-service").unwrap())
    }

    #[tokio::test]
    async fn test_notification_created_for_accepted_order() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let handler = NotificationHandler::new(store.clone(), registry());
        let event = sample_event();

        handler.handle(&delivery_for(&event)).await.unwrap();

        let notifications = store.get_by_customer(event.customer_id).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].order_id, event.order_id);
        assert_eq!(notifications[0].message, ACCEPTED_MESSAGE);
    }

    #[tokio::test]
    async fn test_duplicate_delivery_creates_one_notification() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let handler = NotificationHandler::new(store.clone(), registry());
        let event = sample_event();

        handler.handle(&delivery_for(&event)).await.unwrap();
        handler.handle(&delivery_for(&event)).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_version_is_rejected() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let handler = NotificationHandler::new(store.clone(), registry());
        let event = sample_event();

        let mut envelope = registry().envelope(&event, "inventory-service").unwrap();
        envelope.message_version = "99".to_string();

        let result = handler.handle(&Delivery::new(envelope)).await;
        assert!(matches!(result, Err(HandlerError::Reject(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
