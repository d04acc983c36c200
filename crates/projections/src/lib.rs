//! Read side of the order saga.
//!
//! The order-read service materializes a denormalized order view from
//! `InventoryUpdated` events. The projector is the sole write path into the
//! view store; queries never touch the write-side store.

pub mod error;
pub mod memory;
pub mod projector;
pub mod store;
pub mod view;

pub use error::{ProjectionError, Result};
pub use memory::InMemoryOrderViewStore;
pub use projector::OrderProjector;
pub use store::OrderViewStore;
pub use view::{OrderView, ViewLineItem};
