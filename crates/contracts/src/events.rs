//! The three integration events that drive the order fulfillment saga.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, SkuId};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// A line item as carried on the wire.
///
/// Deliberately narrower than the write-side record: consumers only need
/// the SKU and quantity, never the write side's row identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLineItem {
    /// The stock-keeping unit ordered.
    pub sku_id: SkuId,

    /// Quantity ordered.
    pub quantity: u32,
}

impl EventLineItem {
    /// Creates a new event line item.
    pub fn new(sku_id: impl Into<SkuId>, quantity: u32) -> Self {
        Self {
            sku_id: sku_id.into(),
            quantity,
        }
    }
}

/// Common behavior of every integration event.
///
/// The message type tag identifies the schema on the wire; the version and
/// routing key for a tag come from the [`SchemaRegistry`](crate::SchemaRegistry)
/// so services can evolve their contracts through configuration.
pub trait IntegrationEvent: Serialize + DeserializeOwned + Send + Sync {
    /// Stable message type tag for this schema.
    fn message_type() -> &'static str
    where
        Self: Sized;

    /// The order this event belongs to — the saga's correlation key.
    fn order_id(&self) -> OrderId;
}

/// Published by the order service after a new order is persisted.
///
/// Triggers the inventory check in the product service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreated {
    /// The newly created order.
    pub order_id: OrderId,

    /// The customer who placed the order.
    pub customer_id: CustomerId,

    /// When the order was placed.
    pub order_date: DateTime<Utc>,

    /// Total amount of the order.
    pub total_amount: Money,

    /// The ordered line items.
    pub line_items: Vec<EventLineItem>,
}

impl IntegrationEvent for OrderCreated {
    fn message_type() -> &'static str {
        "OrderCreated"
    }

    fn order_id(&self) -> OrderId {
        self.order_id
    }
}

/// Published by the inventory service when stock was reserved.
///
/// Semantically "order accepted": the read projection and the customer
/// notification are both built from this event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryUpdated {
    /// The accepted order.
    pub order_id: OrderId,

    /// The customer who placed the order.
    pub customer_id: CustomerId,

    /// When the order was placed.
    pub order_date: DateTime<Utc>,

    /// Total amount of the order.
    pub total_amount: Money,

    /// The reserved line items.
    pub line_items: Vec<EventLineItem>,
}

impl InventoryUpdated {
    /// Builds the acceptance event by echoing the fields of the triggering
    /// [`OrderCreated`] event.
    pub fn from_order_created(event: &OrderCreated) -> Self {
        Self {
            order_id: event.order_id,
            customer_id: event.customer_id,
            order_date: event.order_date,
            total_amount: event.total_amount,
            line_items: event.line_items.clone(),
        }
    }
}

impl IntegrationEvent for InventoryUpdated {
    fn message_type() -> &'static str {
        "InventoryUpdated"
    }

    fn order_id(&self) -> OrderId {
        self.order_id
    }
}

/// Published by the inventory service when stock could not be reserved.
///
/// The order service reacts by compensating: the pending order is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryError {
    /// The rejected order.
    pub order_id: OrderId,

    /// Why the reservation failed.
    pub reason: String,
}

impl InventoryError {
    /// Creates a new rejection event.
    pub fn new(order_id: OrderId, reason: impl Into<String>) -> Self {
        Self {
            order_id,
            reason: reason.into(),
        }
    }
}

impl IntegrationEvent for InventoryError {
    fn message_type() -> &'static str {
        "InventoryError"
    }

    fn order_id(&self) -> OrderId {
        self.order_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order_created() -> OrderCreated {
        OrderCreated {
            order_id: OrderId::new(),
            customer_id: CustomerId::new(),
            order_date: Utc::now(),
            total_amount: Money::from_dollars(80),
            line_items: vec![EventLineItem::new(1, 1), EventLineItem::new(2, 1)],
        }
    }

    #[test]
    fn test_message_type_tags() {
        assert_eq!(OrderCreated::message_type(), "OrderCreated");
        assert_eq!(InventoryUpdated::message_type(), "InventoryUpdated");
        assert_eq!(InventoryError::message_type(), "InventoryError");
    }

    #[test]
    fn test_inventory_updated_echoes_order_created() {
        let created = sample_order_created();
        let updated = InventoryUpdated::from_order_created(&created);

        assert_eq!(updated.order_id, created.order_id);
        assert_eq!(updated.customer_id, created.customer_id);
        assert_eq!(updated.total_amount, created.total_amount);
        assert_eq!(updated.line_items, created.line_items);
    }

    #[test]
    fn test_order_created_serialization_roundtrip() {
        let event = sample_order_created();
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: OrderCreated = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }

    #[test]
    fn test_inventory_error_carries_reason() {
        let order_id = OrderId::new();
        let event = InventoryError::new(order_id, "insufficient inventory");
        assert_eq!(event.order_id(), order_id);
        assert_eq!(event.reason, "insufficient inventory");
    }
}
