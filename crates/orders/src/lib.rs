//! Order-write service: the saga's initiating participant.
//!
//! Creating an order persists the write-side record together with an outbox
//! entry in one transaction; a relay publishes the outbox to the broker, so
//! a crash between commit and publish can never strand the saga. The
//! service reacts to the inventory decision by either marking the order
//! confirmed or compensating (deleting) it, and a background sweep
//! force-compensates orders that never receive a decision.

pub mod error;
pub mod handlers;
pub mod memory;
pub mod model;
pub mod outbox;
pub mod service;
pub mod store;
pub mod sweep;

pub use error::{OrderError, Result};
pub use handlers::{ConfirmationHandler, InventoryErrorCompensator};
pub use memory::InMemoryOrderStore;
pub use model::{CreateOrder, LineItem, NewLineItem, Order, OrderStatus};
pub use outbox::{OutboxRecord, OutboxRelay, OutboxRelayConfig};
pub use service::OrderWriteService;
pub use store::OrderStore;
pub use sweep::{PendingSweep, SweepConfig};
