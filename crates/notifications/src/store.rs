//! Persistence contract for the notification store.

use async_trait::async_trait;
use common::{CustomerId, OrderId};

use crate::Result;
use crate::model::Notification;

/// Notification persistence.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Returns true if a notification exists for the order id.
    ///
    /// This is the handler's duplicate-delivery guard.
    async fn exists_for_order(&self, order_id: OrderId) -> Result<bool>;

    /// Inserts a notification.
    async fn insert(&self, notification: Notification) -> Result<()>;

    /// Returns all notifications for a customer, oldest first.
    async fn get_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Notification>>;

    /// Returns the number of stored notifications.
    async fn count(&self) -> Result<usize>;
}
