//! The inventory decision.

use serde::{Deserialize, Serialize};

/// The single, exclusive decision recorded for an order id.
///
/// Once recorded the decision never changes: redelivered `OrderCreated`
/// events re-emit the same outcome instead of re-evaluating stock. This is
/// what keeps an order from ever being both accepted and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Stock was reserved for every line item.
    Accepted,

    /// At least one line item could not be covered; nothing was reserved.
    Rejected,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Accepted => write!(f, "Accepted"),
            Decision::Rejected => write!(f, "Rejected"),
        }
    }
}
