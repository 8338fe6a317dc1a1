//! Production order CRUD and pipeline actions.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::instrument;

use stitchworks_core::ProductionOrderId;

use crate::db::orders::OrderRepository;
use crate::db::styles::StyleRepository;
use crate::error::AppError;
use crate::models::order::{CreateOrderInput, OrderFilter, UpdateOrderInput};
use crate::state::AppState;

/// Routes under `/orders`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/orders/{id}/advance", post(advance_order))
}

/// List orders.
#[instrument(skip(state))]
async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<impl IntoResponse, AppError> {
    let orders = OrderRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(json!({ "orders": orders })))
}

/// Launch a new production order (created in the `Draft` stage).
#[instrument(skip(state, input))]
async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrderInput>,
) -> Result<impl IntoResponse, AppError> {
    if input.order_number.trim().is_empty() {
        return Err(AppError::BadRequest("order_number is required".to_string()));
    }
    // Reject a dangling style reference up front with a client error.
    let style_id = input.style_id;
    StyleRepository::new(state.pool())
        .get(style_id)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("unknown style {style_id}")))?;

    let order = OrderRepository::new(state.pool()).create(&input).await?;
    tracing::info!(order_id = %order.id, style_id = %order.style_id, "Order created");
    Ok((StatusCode::CREATED, Json(order)))
}

/// Get an order by ID.
#[instrument(skip(state))]
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let order = OrderRepository::new(state.pool())
        .get(ProductionOrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(order))
}

/// Update an order's editable fields.
#[instrument(skip(state, input))]
async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateOrderInput>,
) -> Result<impl IntoResponse, AppError> {
    let order = OrderRepository::new(state.pool())
        .update(ProductionOrderId::new(id), &input)
        .await?;
    Ok(Json(order))
}

/// Advance an order to the next pipeline stage.
#[instrument(skip(state))]
async fn advance_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(ProductionOrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let next = order.stage.next().ok_or_else(|| {
        AppError::BadRequest(format!("order {id} is already at {}", order.stage))
    })?;
    let updated = repo.set_stage(order.id, next).await?;
    tracing::info!(order_id = %updated.id, stage = %updated.stage, "Order advanced");
    Ok(Json(updated))
}

/// Soft-delete an order.
#[instrument(skip(state))]
async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = OrderRepository::new(state.pool())
        .soft_delete(ProductionOrderId::new(id))
        .await?;
    if !deleted {
        return Err(AppError::NotFound(format!("order {id}")));
    }
    tracing::info!(order_id = id, "Order soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}
