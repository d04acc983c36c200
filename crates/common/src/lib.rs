//! Shared types used across every service in the order saga system.
//!
//! Identifiers are newtype wrappers around UUIDs (or raw integers for SKUs)
//! so that an order id can never be passed where a customer id is expected.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{CustomerId, MessageId, OrderId, SkuId};
