//! Material-requirement forecast endpoint.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use tracing::instrument;

use stitchworks_core::forecast::{self, FieldForecast};
use stitchworks_core::techpack::TemplateConfig;
use stitchworks_core::{ProductionOrderId, StyleId};

use crate::db::orders::OrderRepository;
use crate::db::styles::StyleRepository;
use crate::db::template;
use crate::error::AppError;
use crate::state::AppState;

/// Routes under `/orders/{id}/forecast`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/orders/{id}/forecast", get(order_forecast))
}

/// Forecast report for one order.
#[derive(Debug, Serialize)]
struct ForecastResponse {
    order_id: ProductionOrderId,
    style_id: StyleId,
    style_number: String,
    fields: Vec<FieldForecast>,
}

/// Compute the itemized material forecast for an order against its style's
/// tech pack.
#[instrument(skip(state))]
async fn order_forecast(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let order = OrderRepository::new(state.pool())
        .get(ProductionOrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let style = StyleRepository::new(state.pool())
        .get(order.style_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("style {}", order.style_id)))?;

    let template = template::get_template(state.pool())
        .await?
        .unwrap_or_else(TemplateConfig::default);

    let fields = forecast::resolve(&style.blueprint, &template, &order.quantities);
    Ok(Json(ForecastResponse {
        order_id: order.id,
        style_id: style.blueprint.id,
        style_number: style.blueprint.style_number,
        fields,
    }))
}
