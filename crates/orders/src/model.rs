//! Write-side order records.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, SkuId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Saga-visible state of a write-side order.
///
/// `Pending` means the order was created and `OrderCreated` is on its way
/// (or already out) but no inventory decision has arrived. `Confirmed` is
/// terminal on the write side; compensated orders are deleted rather than
/// kept in a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created, awaiting the inventory decision.
    #[default]
    Pending,

    /// Inventory reserved; the record is now historical.
    Confirmed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Confirmed => write!(f, "Confirmed"),
        }
    }
}

/// A line item belonging to a write-side order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Row identifier.
    pub id: Uuid,

    /// The order this line item belongs to.
    pub order_id: OrderId,

    /// The stock-keeping unit ordered.
    pub sku_id: SkuId,

    /// Quantity ordered.
    pub quantity: u32,
}

impl LineItem {
    /// Creates a line item for an order.
    pub fn new(order_id: OrderId, sku_id: impl Into<SkuId>, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            sku_id: sku_id.into(),
            quantity,
        }
    }
}

/// Authoritative write-side order record.
///
/// Owned exclusively by the order-write service: created on client request,
/// mutated only to mark confirmation, deleted only by compensation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier, generated at creation.
    pub id: OrderId,

    /// The customer who placed the order.
    pub customer_id: CustomerId,

    /// When the order was placed.
    pub order_date: DateTime<Utc>,

    /// Total amount of the order.
    pub total_amount: Money,

    /// The ordered line items.
    pub line_items: Vec<LineItem>,

    /// Saga-visible state.
    pub status: OrderStatus,
}

impl Order {
    /// Returns true if the order is still awaiting an inventory decision.
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }
}

/// A line item as requested by the client, before row ids are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewLineItem {
    /// The stock-keeping unit to order.
    pub sku_id: SkuId,

    /// Quantity to order.
    pub quantity: u32,
}

impl NewLineItem {
    /// Creates a new line item request.
    pub fn new(sku_id: impl Into<SkuId>, quantity: u32) -> Self {
        Self {
            sku_id: sku_id.into(),
            quantity,
        }
    }
}

/// Command to create a new order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// The customer placing the order.
    pub customer_id: CustomerId,

    /// Total amount of the order.
    pub total_amount: Money,

    /// The requested line items.
    pub line_items: Vec<NewLineItem>,
}

impl CreateOrder {
    /// Creates a new CreateOrder command.
    pub fn new(
        customer_id: CustomerId,
        total_amount: Money,
        line_items: Vec<NewLineItem>,
    ) -> Self {
        Self {
            customer_id,
            total_amount,
            line_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_back_reference() {
        let order_id = OrderId::new();
        let item = LineItem::new(order_id, 1, 2);
        assert_eq!(item.order_id, order_id);
        assert_eq!(item.sku_id, SkuId::new(1));
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_order_status_default_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(OrderStatus::Pending.to_string(), "Pending");
        assert_eq!(OrderStatus::Confirmed.to_string(), "Confirmed");
    }

    #[test]
    fn test_order_is_pending() {
        let order_id = OrderId::new();
        let order = Order {
            id: order_id,
            customer_id: CustomerId::new(),
            order_date: Utc::now(),
            total_amount: Money::from_dollars(80),
            line_items: vec![LineItem::new(order_id, 1, 1)],
            status: OrderStatus::Pending,
        };
        assert!(order.is_pending());

        let confirmed = Order {
            status: OrderStatus::Confirmed,
            ..order
        };
        assert!(!confirmed.is_pending());
    }
}
