//! Integration event contracts shared by all saga services.
//!
//! This crate is pure data: the three event schemas exchanged between the
//! order, inventory, and customer services, the self-describing message
//! envelope they travel in, and the schema registry consumers use to
//! validate that an inbound message is one they can interpret.

pub mod envelope;
pub mod error;
pub mod events;
pub mod registry;

pub use envelope::{MessageEnvelope, MessageEnvelopeBuilder, headers};
pub use error::{ContractError, Result};
pub use events::{EventLineItem, IntegrationEvent, InventoryError, InventoryUpdated, OrderCreated};
pub use registry::{SchemaEntry, SchemaRegistry};
