//! Order placement, listing and status endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{OrderId, UserId};
use domain::{Money, Order, OrderLine, PlaceOrder, StatusUpdate};
use serde::Deserialize;
use serde_json::Value;
use store::Store;

use super::{AppState, JsonBody, parse_id};
use crate::error::ApiError;

// -- Request types --

/// Checkout payload, as sent by the storefront client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub user_id: Option<UserId>,
    pub total_amount: Option<Money>,
    pub items: Option<Vec<OrderLine>>,
    #[serde(default)]
    pub shipping_address: Value,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
}

impl From<PlaceOrderRequest> for PlaceOrder {
    fn from(req: PlaceOrderRequest) -> Self {
        PlaceOrder {
            user_id: req.user_id,
            total_amount: req.total_amount,
            items: req.items.unwrap_or_default(),
            shipping_address: req.shipping_address,
            payment_method: req.payment_method,
            transaction_id: req.transaction_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
    #[serde(alias = "trackingId")]
    pub tracking_id: Option<String>,
}

// -- Handlers --

/// POST /api/orders: place an order.
///
/// Returns 201 with the stored order even when stock or notification
/// updates failed afterwards.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(req): JsonBody<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let placement = state.coordinator.place_order(req.into()).await?;
    Ok((StatusCode::CREATED, Json(placement.order)))
}

/// GET /api/orders: every order, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.coordinator.list_orders().await?))
}

/// GET /api/orders/{user_id}: one user's orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_for_user<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let user_id = UserId::new(parse_id(&user_id)?);
    Ok(Json(state.coordinator.list_orders_for_user(user_id).await?))
}

/// PUT /api/orders/{id}: change status and/or tracking reference.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateOrderRequest>,
) -> Result<Json<Order>, ApiError> {
    let id = OrderId::new(parse_id(&id)?);
    let update = StatusUpdate::parse(req.status.as_deref(), req.tracking_id)?;
    Ok(Json(state.coordinator.update_order(id, update).await?))
}
