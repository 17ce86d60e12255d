//! Product catalogue endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::ProductId;
use domain::{NewProduct, Product, product::validate_stock};
use serde::Deserialize;
use store::Store;

use super::{AppState, JsonBody, parse_id};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    #[serde(alias = "stockQuantity")]
    pub stock_quantity: i32,
}

/// GET /api/products
#[tracing::instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.store.list_products().await?))
}

/// GET /api/products/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = ProductId::new(parse_id(&id)?);
    state
        .store
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product"))
}

/// POST /api/products
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(req): JsonBody<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.store.insert_product(req.validate()?).await?;
    tracing::info!(product_id = %product.id, stock = product.stock_quantity, "product added");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id}/stock: overwrite the stock quantity.
#[tracing::instrument(skip(state, req))]
pub async fn set_stock<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<SetStockRequest>,
) -> Result<Json<Product>, ApiError> {
    let id = ProductId::new(parse_id(&id)?);
    let quantity = validate_stock(req.stock_quantity)?;
    state
        .store
        .set_stock(id, quantity)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product"))
}
