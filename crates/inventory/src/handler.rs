//! The inventory decision handler.

use std::sync::Arc;

use async_trait::async_trait;
use broker::{Delivery, EventPublisher, HandlerError, MessageHandler};
use contracts::{
    IntegrationEvent, InventoryError, InventoryUpdated, OrderCreated, SchemaRegistry,
};

use crate::model::Decision;
use crate::store::StockStore;

/// Reason attached to every stock rejection.
pub const REJECTION_REASON: &str = "insufficient inventory";

/// Decides each order's fate and publishes the outcome.
///
/// Consumes `OrderCreated`, reserves stock, and emits `InventoryUpdated`
/// on success or `InventoryError` on failure. The reservation and the
/// ledger entry commit together, so a redelivery after a publish failure
/// re-emits the recorded decision instead of deciding again; the outcome
/// for an order id can therefore never change, only repeat.
pub struct InventoryDecisionHandler<S, P> {
    stock: Arc<S>,
    publisher: Arc<P>,
    registry: SchemaRegistry,
    exchange: String,
    service_name: String,
}

impl<S, P> InventoryDecisionHandler<S, P> {
    /// Creates a new decision handler publishing to the given exchange.
    pub fn new(
        stock: Arc<S>,
        publisher: Arc<P>,
        registry: SchemaRegistry,
        exchange: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            stock,
            publisher,
            registry,
            exchange: exchange.into(),
            service_name: service_name.into(),
        }
    }
}

impl<S, P> InventoryDecisionHandler<S, P>
where
    P: EventPublisher,
{
    async fn publish_decision<E: IntegrationEvent>(&self, event: &E) -> Result<(), HandlerError> {
        let envelope = self.registry.envelope(event, &self.service_name)?;
        let routing_key = envelope.routing_key.clone();
        self.publisher
            .publish(envelope, &self.exchange, &routing_key)
            .await
            .map_err(|e| HandlerError::Retry(e.to_string()))
    }
}

#[async_trait]
impl<S, P> MessageHandler for InventoryDecisionHandler<S, P>
where
    S: StockStore,
    P: EventPublisher,
{
    fn name(&self) -> &'static str {
        "InventoryDecisionHandler"
    }

    #[tracing::instrument(skip(self, delivery), fields(message_id = %delivery.envelope.message_id))]
    async fn handle(&self, delivery: &Delivery) -> Result<(), HandlerError> {
        self.registry.check_compatibility(&delivery.envelope)?;
        let event: OrderCreated = delivery.envelope.decode()?;

        let items: Vec<_> = event
            .line_items
            .iter()
            .map(|item| (item.sku_id, item.quantity))
            .collect();

        let already_decided = self
            .stock
            .decision(event.order_id)
            .await
            .map_err(|e| HandlerError::Retry(e.to_string()))?
            .is_some();
        let decision = self
            .stock
            .decide(event.order_id, &items)
            .await
            .map_err(|e| HandlerError::Retry(e.to_string()))?;

        if already_decided {
            metrics::counter!("inventory_duplicate_orders_total").increment(1);
            tracing::debug!(
                order_id = %event.order_id,
                %decision,
                "order already decided, re-emitting recorded decision"
            );
        }

        match decision {
            Decision::Accepted => {
                self.publish_decision(&InventoryUpdated::from_order_created(&event))
                    .await?;
                metrics::counter!("inventory_orders_accepted_total").increment(1);
                tracing::info!(order_id = %event.order_id, "stock reserved, order accepted");
            }
            Decision::Rejected => {
                self.publish_decision(&InventoryError::new(event.order_id, REJECTION_REASON))
                    .await?;
                metrics::counter!("inventory_orders_rejected_total").increment(1);
                tracing::info!(order_id = %event.order_id, "stock unavailable, order rejected");
            }
        }

        Ok(())
    }
}
