//! The denormalized order view.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, SkuId};
use contracts::{EventLineItem, InventoryUpdated};
use serde::{Deserialize, Serialize};

/// A line item in the read-side view.
///
/// A denormalized copy of the event data, not a foreign key into the write
/// side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewLineItem {
    /// The stock-keeping unit ordered.
    pub sku_id: SkuId,

    /// Quantity ordered.
    pub quantity: u32,
}

impl From<&EventLineItem> for ViewLineItem {
    fn from(item: &EventLineItem) -> Self {
        Self {
            sku_id: item.sku_id,
            quantity: item.quantity,
        }
    }
}

/// Query-optimized copy of a confirmed order.
///
/// The id equals the write-side order id, which is the correlation key
/// across stores. Views are created once by the projector and never
/// mutated or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    /// The order id, equal to the write-side id.
    pub id: OrderId,

    /// The customer who placed the order.
    pub customer_id: CustomerId,

    /// When the order was placed.
    pub order_date: DateTime<Utc>,

    /// Total amount of the order.
    pub total_amount: Money,

    /// Denormalized line items.
    pub line_items: Vec<ViewLineItem>,
}

impl From<&InventoryUpdated> for OrderView {
    fn from(event: &InventoryUpdated) -> Self {
        Self {
            id: event.order_id,
            customer_id: event.customer_id,
            order_date: event.order_date,
            total_amount: event.total_amount,
            line_items: event.line_items.iter().map(ViewLineItem::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_built_from_event() {
        let event = InventoryUpdated {
            order_id: OrderId::new(),
            customer_id: CustomerId::new(),
            order_date: Utc::now(),
            total_amount: Money::from_dollars(80),
            line_items: vec![EventLineItem::new(1, 1), EventLineItem::new(2, 3)],
        };

        let view = OrderView::from(&event);
        assert_eq!(view.id, event.order_id);
        assert_eq!(view.customer_id, event.customer_id);
        assert_eq!(view.total_amount, event.total_amount);
        assert_eq!(view.line_items.len(), 2);
        assert_eq!(view.line_items[1].sku_id, SkuId::new(2));
        assert_eq!(view.line_items[1].quantity, 3);
    }
}
