//! Customer notification query endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::CustomerId;
use notifications::{Notification, NotificationStore};
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub order_id: String,
    pub customer_id: String,
    pub message: String,
    pub order_date: String,
}

impl From<&Notification> for NotificationResponse {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            order_id: notification.order_id.to_string(),
            customer_id: notification.customer_id.to_string(),
            message: notification.message.clone(),
            order_date: notification.order_date.to_rfc3339(),
        }
    }
}

/// GET /customers/:id/notifications — notifications for a customer,
/// oldest first. An unknown customer gets an empty list, not a 404.
#[tracing::instrument(skip(state))]
pub async fn list_for_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let customer_id = uuid::Uuid::parse_str(&id)
        .map(CustomerId::from_uuid)
        .map_err(|e| ApiError::BadRequest(format!("Invalid customer id: {e}")))?;

    let notifications = state
        .notifications
        .get_by_customer(customer_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(
        notifications.iter().map(NotificationResponse::from).collect(),
    ))
}
