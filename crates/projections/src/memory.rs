//! In-memory view store implementation for testing and the demo binary.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{CustomerId, OrderId};
use tokio::sync::RwLock;

use crate::Result;
use crate::store::OrderViewStore;
use crate::view::OrderView;

/// In-memory order view store.
#[derive(Clone, Default)]
pub struct InMemoryOrderViewStore {
    views: Arc<RwLock<HashMap<OrderId, OrderView>>>,
}

impl InMemoryOrderViewStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderViewStore for InMemoryOrderViewStore {
    async fn contains(&self, order_id: OrderId) -> Result<bool> {
        Ok(self.views.read().await.contains_key(&order_id))
    }

    async fn insert(&self, view: OrderView) -> Result<()> {
        self.views.write().await.insert(view.id, view);
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<OrderView>> {
        Ok(self.views.read().await.get(&order_id).cloned())
    }

    async fn get_by_customer(&self, customer_id: CustomerId) -> Result<Vec<OrderView>> {
        let views = self.views.read().await;
        let mut matching: Vec<OrderView> = views
            .values()
            .filter(|v| v.customer_id == customer_id)
            .cloned()
            .collect();
        matching.sort_by_key(|v| v.order_date);
        Ok(matching)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.views.read().await.len())
    }
}
