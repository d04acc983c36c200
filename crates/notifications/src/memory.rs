//! In-memory notification store implementation for testing and the demo
//! binary.

use std::sync::Arc;

use async_trait::async_trait;
use common::{CustomerId, OrderId};
use tokio::sync::RwLock;

use crate::Result;
use crate::model::Notification;
use crate::store::NotificationStore;

/// In-memory notification store.
#[derive(Clone, Default)]
pub struct InMemoryNotificationStore {
    notifications: Arc<RwLock<Vec<Notification>>>,
}

impl InMemoryNotificationStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn exists_for_order(&self, order_id: OrderId) -> Result<bool> {
        Ok(self
            .notifications
            .read()
            .await
            .iter()
            .any(|n| n.order_id == order_id))
    }

    async fn insert(&self, notification: Notification) -> Result<()> {
        self.notifications.write().await.push(notification);
        Ok(())
    }

    async fn get_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        let mut matching: Vec<Notification> = notifications
            .iter()
            .filter(|n| n.customer_id == customer_id)
            .cloned()
            .collect();
        matching.sort_by_key(|n| n.order_date);
        Ok(matching)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.notifications.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::model::ACCEPTED_MESSAGE;

    fn make_notification(customer_id: CustomerId) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            order_id: OrderId::new(),
            customer_id,
            message: ACCEPTED_MESSAGE.to_string(),
            order_date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = InMemoryNotificationStore::new();
        let notification = make_notification(CustomerId::new());
        let order_id = notification.order_id;

        assert!(!store.exists_for_order(order_id).await.unwrap());
        store.insert(notification).await.unwrap();
        assert!(store.exists_for_order(order_id).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_by_customer() {
        let store = InMemoryNotificationStore::new();
        let customer = CustomerId::new();

        store.insert(make_notification(customer)).await.unwrap();
        store.insert(make_notification(customer)).await.unwrap();
        store
            .insert(make_notification(CustomerId::new()))
            .await
            .unwrap();

        let notifications = store.get_by_customer(customer).await.unwrap();
        assert_eq!(notifications.len(), 2);
        assert!(notifications.iter().all(|n| n.customer_id == customer));
    }
}
