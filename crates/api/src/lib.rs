//! HTTP facade and single-process wiring for the order fulfillment saga.
//!
//! Wires every saga participant onto one in-memory broker: the order-write
//! service with its outbox relay and pending sweep, the inventory decision
//! handler, the read projector, and the customer notifier. The HTTP layer
//! stays thin; all saga behavior lives in the service crates.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use broker::{DeadLetterConfig, EventSubscriber, InMemoryBroker, QueueConfig};
use contracts::SchemaRegistry;
use inventory::{InMemoryStockStore, InventoryDecisionHandler};
use metrics_exporter_prometheus::PrometheusHandle;
use notifications::{InMemoryNotificationStore, NotificationHandler};
use orders::{
    ConfirmationHandler, InMemoryOrderStore, InventoryErrorCompensator, OrderWriteService,
    OutboxRelay, OutboxRelayConfig, PendingSweep, SweepConfig,
};
use projections::{InMemoryOrderViewStore, OrderProjector};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;

/// Shared application state accessible from all HTTP handlers.
pub struct AppState {
    /// The order-write service (saga entry point).
    pub orders: OrderWriteService<InMemoryOrderStore>,

    /// Write-side store, queried by the status endpoint.
    pub order_store: Arc<InMemoryOrderStore>,

    /// Read-side view store, queried by the order endpoint.
    pub views: Arc<InMemoryOrderViewStore>,

    /// Notification store, queried by the customer endpoint.
    pub notifications: Arc<InMemoryNotificationStore>,

    /// Stock store for the inventory participant.
    pub stock: Arc<InMemoryStockStore>,
}

/// A fully wired saga deployment: shared state, the broker every
/// participant subscribes to, and the background tasks keeping the
/// choreography moving.
pub struct Services {
    /// Application state for the HTTP layer.
    pub state: Arc<AppState>,

    /// The broker connecting all participants.
    pub broker: Arc<InMemoryBroker>,

    tasks: Vec<JoinHandle<()>>,
}

impl Services {
    /// Stops the background tasks and the broker's consumers.
    pub fn shutdown(&self) {
        for task in &self.tasks {
            task.abort();
        }
        self.broker.shutdown();
    }
}

/// Subscribes every saga participant to the broker and starts the outbox
/// relay and the pending sweep.
///
/// Each participant gets its own durable queue, bounded retries, and the
/// shared dead-letter exchange, mirroring the per-service connections a
/// multi-process deployment would use.
pub async fn wire_services(config: &Config) -> broker::Result<Services> {
    let registry = SchemaRegistry::with_default_contracts();
    let broker = Arc::new(InMemoryBroker::new());

    let order_store = Arc::new(InMemoryOrderStore::new());
    let views = Arc::new(InMemoryOrderViewStore::new());
    let notifications = Arc::new(InMemoryNotificationStore::new());
    let stock = Arc::new(InMemoryStockStore::new());

    let dlx = format!("{}.dlx", config.exchange);
    let queue = |queue_name: &str, binding_key: &str| {
        QueueConfig::new(queue_name, config.exchange.as_str(), binding_key)
            .with_dead_letter(DeadLetterConfig::new(dlx.clone(), "dead"))
    };

    broker
        .subscribe(
            queue("inventory-service.order-created", "OrderCreated"),
            Arc::new(InventoryDecisionHandler::new(
                stock.clone(),
                broker.clone(),
                registry.clone(),
                config.exchange.clone(),
                "inventory-service",
            )),
        )
        .await?;
    broker
        .subscribe(
            queue("order-service.inventory-updated", "InventoryUpdated"),
            Arc::new(ConfirmationHandler::new(
                order_store.clone(),
                registry.clone(),
            )),
        )
        .await?;
    broker
        .subscribe(
            queue("order-service.inventory-error", "InventoryError"),
            Arc::new(InventoryErrorCompensator::new(
                order_store.clone(),
                registry.clone(),
            )),
        )
        .await?;
    broker
        .subscribe(
            queue("order-read-service.inventory-updated", "InventoryUpdated"),
            Arc::new(OrderProjector::new(views.clone(), registry.clone())),
        )
        .await?;
    broker
        .subscribe(
            queue("customer-service.inventory-updated", "InventoryUpdated"),
            Arc::new(NotificationHandler::new(
                notifications.clone(),
                registry.clone(),
            )),
        )
        .await?;

    let relay = OutboxRelay::new(
        order_store.clone(),
        broker.clone(),
        OutboxRelayConfig {
            exchange: config.exchange.clone(),
            poll_interval: config.outbox_poll_interval(),
            batch_size: 64,
        },
    )
    .spawn();
    let sweep = PendingSweep::new(
        order_store.clone(),
        SweepConfig {
            pending_threshold: config.sweep_threshold(),
            interval: config.sweep_interval(),
        },
    )
    .spawn();

    let state = Arc::new(AppState {
        orders: OrderWriteService::new(order_store.clone(), registry, "order-service"),
        order_store,
        views,
        notifications,
        stock,
    });

    Ok(Services {
        state,
        broker,
        tasks: vec![relay, sweep],
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create))
        .route("/orders/{id}", get(routes::orders::get_view))
        .route("/orders/{id}/status", get(routes::orders::status))
        .route(
            "/customers/{id}/notifications",
            get(routes::notifications::list_for_customer),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
