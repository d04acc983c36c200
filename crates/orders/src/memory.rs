//! In-memory order store implementation for testing and the demo binary.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{MessageId, OrderId};
use tokio::sync::RwLock;

use crate::error::{OrderError, Result};
use crate::model::{Order, OrderStatus};
use crate::outbox::OutboxRecord;
use crate::store::OrderStore;

#[derive(Default)]
struct StoreState {
    orders: HashMap<OrderId, Order>,
    outbox: Vec<OutboxRecord>,
    fail_on_insert: bool,
}

/// In-memory order store.
///
/// A single write lock spans each mutation, giving the same atomicity as
/// the relational implementation's transaction: the order and its outbox
/// record are committed together or not at all.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail the next inserts.
    pub async fn set_fail_on_insert(&self, fail: bool) {
        self.state.write().await.fail_on_insert = fail;
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the number of undispatched outbox records.
    pub async fn outbox_depth(&self) -> usize {
        self.state.read().await.outbox.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order, outbox: OutboxRecord) -> Result<()> {
        let mut state = self.state.write().await;

        if state.fail_on_insert {
            return Err(OrderError::Store("simulated insert failure".to_string()));
        }

        state.orders.insert(order.id, order);
        state.outbox.push(outbox);
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&order_id).cloned())
    }

    async fn remove(&self, order_id: OrderId) -> Result<bool> {
        Ok(self.state.write().await.orders.remove(&order_id).is_some())
    }

    async fn mark_confirmed(&self, order_id: OrderId) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.orders.get_mut(&order_id) {
            Some(order) => {
                order.status = OrderStatus::Confirmed;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn pending_created_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut pending: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::Pending && o.order_date < cutoff)
            .cloned()
            .collect();
        pending.sort_by_key(|o| o.order_date);
        Ok(pending)
    }

    async fn pending_outbox(&self, limit: usize) -> Result<Vec<OutboxRecord>> {
        let state = self.state.read().await;
        Ok(state.outbox.iter().take(limit).cloned().collect())
    }

    async fn remove_outbox(&self, message_id: MessageId) -> Result<()> {
        let mut state = self.state.write().await;
        state.outbox.retain(|r| r.message_id != message_id);
        Ok(())
    }
}
