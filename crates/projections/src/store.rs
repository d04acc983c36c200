//! Persistence contract for the read-side view store.

use async_trait::async_trait;
use common::{CustomerId, OrderId};

use crate::Result;
use crate::view::OrderView;

/// Read-side view persistence.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderViewStore: Send + Sync {
    /// Returns true if a view exists for the order id.
    ///
    /// This is the projector's duplicate-delivery guard.
    async fn contains(&self, order_id: OrderId) -> Result<bool>;

    /// Inserts a view.
    async fn insert(&self, view: OrderView) -> Result<()>;

    /// Loads a view by order id.
    async fn get(&self, order_id: OrderId) -> Result<Option<OrderView>>;

    /// Returns all views for a customer.
    async fn get_by_customer(&self, customer_id: CustomerId) -> Result<Vec<OrderView>>;

    /// Returns the number of stored views.
    async fn count(&self) -> Result<usize>;
}
