//! Order creation and query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{CustomerId, Money, OrderId};
use orders::{CreateOrder, NewLineItem, Order};
use projections::{OrderView, OrderViewStore};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: Option<String>,
    pub total_amount_cents: i64,
    pub line_items: Vec<LineItemRequest>,
}

#[derive(Deserialize)]
pub struct LineItemRequest {
    pub sku_id: i64,
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct LineItemResponse {
    pub sku_id: i64,
    pub quantity: u32,
}

/// The created write-side order.
#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub customer_id: String,
    pub order_date: String,
    pub total_amount_cents: i64,
    pub status: String,
    pub line_items: Vec<LineItemResponse>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            customer_id: order.customer_id.to_string(),
            order_date: order.order_date.to_rfc3339(),
            total_amount_cents: order.total_amount.cents(),
            status: order.status.to_string(),
            line_items: order
                .line_items
                .iter()
                .map(|item| LineItemResponse {
                    sku_id: item.sku_id.as_i64(),
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

/// The read-side projection of an accepted order.
#[derive(Serialize)]
pub struct OrderViewResponse {
    pub id: String,
    pub customer_id: String,
    pub order_date: String,
    pub total_amount_cents: i64,
    pub line_items: Vec<LineItemResponse>,
}

impl From<&OrderView> for OrderViewResponse {
    fn from(view: &OrderView) -> Self {
        Self {
            id: view.id.to_string(),
            customer_id: view.customer_id.to_string(),
            order_date: view.order_date.to_rfc3339(),
            total_amount_cents: view.total_amount.cents(),
            line_items: view
                .line_items
                .iter()
                .map(|item| LineItemResponse {
                    sku_id: item.sku_id.as_i64(),
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub struct OrderStatusResponse {
    pub order_id: String,
    pub status: String,
}

// -- Handlers --

/// POST /orders — create a new order and start the fulfillment saga.
///
/// Returns the persisted write-side record. The client sees the order as
/// pending until the saga's outcome reaches the read projection or the
/// compensation handler removes it.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let customer_id = req
        .customer_id
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("customer_id is required".to_string()))?;
    let customer_id = uuid::Uuid::parse_str(customer_id)
        .map(CustomerId::from_uuid)
        .map_err(|e| ApiError::BadRequest(format!("Invalid customer_id: {e}")))?;

    let cmd = CreateOrder::new(
        customer_id,
        Money::from_cents(req.total_amount_cents),
        req.line_items
            .iter()
            .map(|item| NewLineItem::new(item.sku_id, item.quantity))
            .collect(),
    );
    let order = state.orders.create_order(cmd).await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// GET /orders/:id — the read-side projection of an accepted order.
///
/// 404 until the saga confirms the order; queries never touch the write
/// store.
#[tracing::instrument(skip(state))]
pub async fn get_view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderViewResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let view = state
        .views
        .get(order_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    Ok(Json(OrderViewResponse::from(&view)))
}

/// GET /orders/:id/status — the write-side saga state of an order.
///
/// 404 covers both "never created" and "compensated": the write side keeps
/// no tombstones for removed orders.
#[tracing::instrument(skip(state))]
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderStatusResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .orders
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    Ok(Json(OrderStatusResponse {
        order_id: order.id.to_string(),
        status: order.status.to_string(),
    }))
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    uuid::Uuid::parse_str(id)
        .map(OrderId::from_uuid)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order id: {e}")))
}
