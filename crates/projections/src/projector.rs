//! The order-read projector.

use std::sync::Arc;

use async_trait::async_trait;
use broker::{Delivery, HandlerError, MessageHandler};
use contracts::{InventoryUpdated, SchemaRegistry};

use crate::store::OrderViewStore;
use crate::view::OrderView;

/// Materializes the read-side order view from `InventoryUpdated` events.
///
/// The existence check makes the projector an idempotent consumer: however
/// many times the broker delivers the same event, exactly one view row
/// exists per order id.
pub struct OrderProjector<S> {
    store: Arc<S>,
    registry: SchemaRegistry,
}

impl<S> OrderProjector<S> {
    /// Creates a new projector.
    pub fn new(store: Arc<S>, registry: SchemaRegistry) -> Self {
        Self { store, registry }
    }
}

#[async_trait]
impl<S: OrderViewStore> MessageHandler for OrderProjector<S> {
    fn name(&self) -> &'static str {
        "OrderProjector"
    }

    #[tracing::instrument(skip(self, delivery), fields(message_id = %delivery.envelope.message_id))]
    async fn handle(&self, delivery: &Delivery) -> Result<(), HandlerError> {
        self.registry.check_compatibility(&delivery.envelope)?;
        let event: InventoryUpdated = delivery.envelope.decode()?;

        let exists = self
            .store
            .contains(event.order_id)
            .await
            .map_err(|e| HandlerError::Retry(e.to_string()))?;
        if exists {
            metrics::counter!("projection_duplicates_skipped_total").increment(1);
            tracing::debug!(order_id = %event.order_id, "view already materialized, skipping");
            return Ok(());
        }

        self.store
            .insert(OrderView::from(&event))
            .await
            .map_err(|e| HandlerError::Retry(e.to_string()))?;

        metrics::counter!("projection_views_created_total").increment(1);
        tracing::info!(order_id = %event.order_id, "order view materialized");
        Ok(())
    }
}
