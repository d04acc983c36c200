//! Order service error types.

use common::{Money, OrderId, SkuId};
use thiserror::Error;

/// Errors that can occur in the order-write service.
#[derive(Debug, Error)]
pub enum OrderError {
    /// An order must contain at least one line item.
    #[error("Order has no line items")]
    NoLineItems,

    /// A line item quantity must be positive.
    #[error("Invalid quantity {quantity} for SKU {sku_id}")]
    InvalidQuantity { sku_id: SkuId, quantity: u32 },

    /// The order total must not be negative.
    #[error("Invalid total amount: {0}")]
    InvalidTotal(Money),

    /// The order was not found.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The store failed to persist or load state.
    #[error("Store error: {0}")]
    Store(String),

    /// A contract error occurred while building an event.
    #[error("Contract error: {0}")]
    Contract(#[from] contracts::ContractError),
}

/// Result type for order-write operations.
pub type Result<T> = std::result::Result<T, OrderError>;
