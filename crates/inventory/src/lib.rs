//! Inventory service: the saga's decision participant.
//!
//! Consumes `OrderCreated`, atomically reserves stock for every line item,
//! and emits exactly one of `InventoryUpdated` or `InventoryError` per
//! order id. The decision is recorded in the same transaction as the
//! reservation, so a redelivered `OrderCreated` can never reserve twice or
//! flip an earlier decision.

pub mod error;
pub mod handler;
pub mod memory;
pub mod model;
pub mod store;

pub use error::{Result, StockError};
pub use handler::InventoryDecisionHandler;
pub use memory::InMemoryStockStore;
pub use model::Decision;
pub use store::StockStore;
