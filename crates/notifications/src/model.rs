//! The customer notification record.

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId};
use contracts::InventoryUpdated;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message text attached to every fulfillment notification.
pub const ACCEPTED_MESSAGE: &str = "Your order has been accepted and is being prepared.";

/// A per-customer record of a successfully fulfilled order.
///
/// Notifications have a lifecycle independent from the order: created once
/// when `InventoryUpdated` arrives, never updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Row identifier.
    pub id: Uuid,

    /// The order this notification is about.
    pub order_id: OrderId,

    /// The customer being notified.
    pub customer_id: CustomerId,

    /// Human-readable message text.
    pub message: String,

    /// When the order was placed.
    pub order_date: DateTime<Utc>,
}

impl Notification {
    /// Builds the notification for an accepted order.
    pub fn for_accepted_order(event: &InventoryUpdated) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id: event.order_id,
            customer_id: event.customer_id,
            message: ACCEPTED_MESSAGE.to_string(),
            order_date: event.order_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Money;
    use contracts::EventLineItem;

    #[test]
    fn test_notification_built_from_event() {
        let event = InventoryUpdated {
            order_id: OrderId::new(),
            customer_id: CustomerId::new(),
            order_date: Utc::now(),
            total_amount: Money::from_dollars(80),
            line_items: vec![EventLineItem::new(1, 1)],
        };

        let notification = Notification::for_accepted_order(&event);
        assert_eq!(notification.order_id, event.order_id);
        assert_eq!(notification.customer_id, event.customer_id);
        assert_eq!(notification.order_date, event.order_date);
        assert_eq!(notification.message, ACCEPTED_MESSAGE);
    }
}
