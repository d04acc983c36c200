//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,

    /// Outbox records awaiting relay. A number that keeps growing means the
    /// broker is unreachable and sagas are queuing up behind it.
    pub outbox_backlog: usize,
}

/// GET /health — liveness plus the saga's own early-warning signal.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let outbox_backlog = state.order_store.outbox_depth().await;
    Json(HealthResponse {
        status: "ok",
        outbox_backlog,
    })
}
