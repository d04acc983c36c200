//! Saga timeout: the pending-order sweep.
//!
//! The choreography has no coordinator to notice a missing inventory
//! decision, so a lost `OrderCreated` (or a dead inventory service) would
//! leave orders pending forever. The sweep force-compensates any order
//! still pending past a configurable threshold; confirmed orders are
//! never touched.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::Result;
use crate::store::OrderStore;

/// Sweep configuration.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How long an order may stay pending before it is force-compensated.
    pub pending_threshold: chrono::Duration,

    /// How often the sweep runs.
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            pending_threshold: chrono::Duration::minutes(5),
            interval: Duration::from_secs(30),
        }
    }
}

/// Background task that force-compensates stale pending orders.
pub struct PendingSweep<S> {
    store: Arc<S>,
    config: SweepConfig,
}

impl<S: OrderStore + 'static> PendingSweep<S> {
    /// Creates a new sweep.
    pub fn new(store: Arc<S>, config: SweepConfig) -> Self {
        Self { store, config }
    }

    /// Runs a single sweep pass. Returns the number of orders compensated.
    #[tracing::instrument(skip(self))]
    pub async fn sweep_once(&self) -> Result<usize> {
        let cutoff = Utc::now() - self.config.pending_threshold;
        let stale = self.store.pending_created_before(cutoff).await?;
        let mut swept = 0;

        for order in stale {
            if self.store.remove(order.id).await? {
                swept += 1;
                metrics::counter!("orders_swept_total").increment(1);
                tracing::warn!(
                    order_id = %order.id,
                    order_date = %order.order_date,
                    "pending order exceeded threshold, force-compensated"
                );
            }
        }

        Ok(swept)
    }

    /// Spawns the sweep loop as a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(self.config.interval).await;
                if let Err(e) = self.sweep_once().await {
                    tracing::error!(error = %e, "pending sweep failed");
                }
            }
        })
    }
}
