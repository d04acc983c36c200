//! Persistence contract for the order-write service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{MessageId, OrderId};

use crate::Result;
use crate::model::Order;
use crate::outbox::OutboxRecord;

/// Write-side order persistence.
///
/// The store is the saga's transaction boundary: `insert` commits the order,
/// its line items, and the outbox record atomically, so the outbox row
/// exists if and only if the order does. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts an order and its outbox record in a single transaction.
    ///
    /// If the insert fails, neither the order nor the outbox record is
    /// committed and no event will ever be published for this order.
    async fn insert(&self, order: Order, outbox: OutboxRecord) -> Result<()>;

    /// Loads an order by id. Returns None if it does not exist (never
    /// created, or already compensated).
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Deletes an order and all of its line items.
    ///
    /// Returns false if the order did not exist, which callers treat as an
    /// idempotent no-op.
    async fn remove(&self, order_id: OrderId) -> Result<bool>;

    /// Marks an order as confirmed.
    ///
    /// Returns false if the order did not exist.
    async fn mark_confirmed(&self, order_id: OrderId) -> Result<bool>;

    /// Returns pending orders placed before the cutoff, oldest first.
    async fn pending_created_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Order>>;

    /// Returns undispatched outbox records in insertion order.
    async fn pending_outbox(&self, limit: usize) -> Result<Vec<OutboxRecord>>;

    /// Removes an outbox record after its envelope was confirmed published.
    async fn remove_outbox(&self, message_id: MessageId) -> Result<()>;
}
