//! Shared tech-pack template endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tracing::instrument;

use stitchworks_core::techpack::TemplateConfig;

use crate::db::template;
use crate::error::AppError;
use crate::state::AppState;

/// Routes under `/template`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/template", get(get_template).put(put_template))
}

/// Get the shared template config. An unsaved template reads as empty.
#[instrument(skip(state))]
async fn get_template(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let config = template::get_template(state.pool())
        .await?
        .unwrap_or_default();
    Ok(Json(config))
}

/// Replace the shared template config.
#[instrument(skip(state, config))]
async fn put_template(
    State(state): State<AppState>,
    Json(config): Json<TemplateConfig>,
) -> Result<impl IntoResponse, AppError> {
    template::set_template(state.pool(), &config).await?;
    tracing::info!(categories = config.0.len(), "Template updated");
    Ok(StatusCode::NO_CONTENT)
}
