//! Customer service: notifications for fulfilled orders.
//!
//! An independent subscriber to the same `InventoryUpdated` event the read
//! projector consumes. Each accepted order produces exactly one
//! notification per customer; the handler dedupes on order id.

pub mod error;
pub mod handler;
pub mod memory;
pub mod model;
pub mod store;

pub use error::{NotificationError, Result};
pub use handler::NotificationHandler;
pub use memory::InMemoryNotificationStore;
pub use model::Notification;
pub use store::NotificationStore;
