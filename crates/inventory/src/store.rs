//! Persistence contract for stock levels and the decision ledger.

use async_trait::async_trait;
use common::{OrderId, SkuId};

use crate::Result;
use crate::model::Decision;

/// Stock persistence plus the per-order decision ledger.
///
/// `decide` is the heart of the participant: reservation and decision
/// recording happen in one transaction, and an order id that already has a
/// recorded decision gets that decision back untouched. All
/// implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Sets the available quantity for a SKU.
    async fn set_stock(&self, sku_id: SkuId, quantity: u32) -> Result<()>;

    /// Returns the available quantity for a SKU. Unknown SKUs have zero.
    async fn available(&self, sku_id: SkuId) -> Result<u32>;

    /// Decides the order: reserves stock for every requested item and
    /// records `Accepted`, or reserves nothing and records `Rejected`.
    ///
    /// All-or-nothing: a single uncoverable item rejects the whole order
    /// with no partial reservation. If a decision is already recorded for
    /// the order id, it is returned as-is and stock is untouched.
    async fn decide(&self, order_id: OrderId, items: &[(SkuId, u32)]) -> Result<Decision>;

    /// Returns the recorded decision for an order id, if any.
    async fn decision(&self, order_id: OrderId) -> Result<Option<Decision>>;
}
