//! In-memory stock store implementation for testing and the demo binary.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, SkuId};
use tokio::sync::RwLock;

use crate::Result;
use crate::error::StockError;
use crate::model::Decision;
use crate::store::StockStore;

#[derive(Default)]
struct StockState {
    stock: HashMap<SkuId, u32>,
    decisions: HashMap<OrderId, Decision>,
    fail_on_decide: bool,
}

/// In-memory stock store.
///
/// A single write lock spans each decision, giving the same atomicity as
/// a relational implementation's transaction: the reservation and the
/// ledger entry are committed together or not at all.
#[derive(Clone, Default)]
pub struct InMemoryStockStore {
    state: Arc<RwLock<StockState>>,
}

impl InMemoryStockStore {
    /// Creates a new store with no stock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail the next decisions.
    pub async fn set_fail_on_decide(&self, fail: bool) {
        self.state.write().await.fail_on_decide = fail;
    }

    /// Returns the number of recorded decisions.
    pub async fn decision_count(&self) -> usize {
        self.state.read().await.decisions.len()
    }
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn set_stock(&self, sku_id: SkuId, quantity: u32) -> Result<()> {
        self.state.write().await.stock.insert(sku_id, quantity);
        Ok(())
    }

    async fn available(&self, sku_id: SkuId) -> Result<u32> {
        Ok(self
            .state
            .read()
            .await
            .stock
            .get(&sku_id)
            .copied()
            .unwrap_or(0))
    }

    async fn decide(&self, order_id: OrderId, items: &[(SkuId, u32)]) -> Result<Decision> {
        let mut state = self.state.write().await;

        if state.fail_on_decide {
            return Err(StockError::Store("simulated store failure".to_string()));
        }

        if let Some(decision) = state.decisions.get(&order_id) {
            return Ok(*decision);
        }

        let coverable = items
            .iter()
            .all(|(sku_id, quantity)| state.stock.get(sku_id).copied().unwrap_or(0) >= *quantity);

        let decision = if coverable {
            for (sku_id, quantity) in items {
                if let Some(available) = state.stock.get_mut(sku_id) {
                    *available -= quantity;
                }
            }
            Decision::Accepted
        } else {
            Decision::Rejected
        };

        state.decisions.insert(order_id, decision);
        Ok(decision)
    }

    async fn decision(&self, order_id: OrderId) -> Result<Option<Decision>> {
        Ok(self.state.read().await.decisions.get(&order_id).copied())
    }
}
