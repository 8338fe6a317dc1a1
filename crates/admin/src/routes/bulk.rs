//! Bulk tech-pack edit handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde_json::json;
use tracing::instrument;

use stitchworks_core::merge::union_pools;
use stitchworks_core::techpack::StyleBlueprint;

use crate::db::styles::StyleRepository;
use crate::error::AppError;
use crate::models::bulk::{BulkEditRequest, UnionPoolsRequest, UnionPoolsResponse};
use crate::services::bulk_edit::{StyleOutcome, apply_bulk_edit};
use crate::state::AppState;

/// Routes under `/styles/bulk-edit`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/styles/bulk-edit", post(bulk_edit))
        .route("/styles/bulk-edit/pools", post(pools))
}

/// Apply one edit set to many styles.
///
/// Every target is attempted; the response carries a per-style outcome list.
/// Returns 200 when every style succeeded, 207 Multi-Status otherwise.
#[instrument(skip(state, request))]
async fn bulk_edit(
    State(state): State<AppState>,
    Json(request): Json<BulkEditRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.style_ids.is_empty() || request.edits.is_empty() {
        return Err(AppError::BadRequest(
            "No styles or edits specified".to_string(),
        ));
    }

    let repo = StyleRepository::new(state.pool());

    // Styles that fail to load are reported alongside merge/write failures,
    // never aborting the batch.
    let mut missing: Vec<StyleOutcome> = Vec::new();
    let mut targets: Vec<StyleBlueprint> = Vec::new();
    for style_id in &request.style_ids {
        match repo.get(*style_id).await {
            Ok(Some(record)) => targets.push(record.blueprint),
            Ok(None) => missing.push(StyleOutcome {
                style_id: *style_id,
                success: false,
                error: Some("style not found".to_string()),
            }),
            Err(e) => missing.push(StyleOutcome {
                style_id: *style_id,
                success: false,
                error: Some(e.to_string()),
            }),
        }
    }

    let edits = request.edit_map();
    let mut outcomes = apply_bulk_edit(&repo, &targets, &edits, request.strategy).await;
    outcomes.extend(missing);

    let failed = outcomes.iter().filter(|outcome| !outcome.success).count();
    let succeeded = outcomes.len() - failed;
    let status = if failed == 0 {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((
        status,
        Json(json!({
            "outcomes": outcomes,
            "succeeded": succeeded,
            "failed": failed,
        })),
    ))
}

/// Union color/size pools of the selected styles: the catalog the operator
/// designs a bulk edit against before per-style filtering.
#[instrument(skip(state, request))]
async fn pools(
    State(state): State<AppState>,
    Json(request): Json<UnionPoolsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let repo = StyleRepository::new(state.pool());
    let mut styles = Vec::with_capacity(request.style_ids.len());
    for style_id in request.style_ids {
        let record = repo
            .get(style_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("style {style_id}")))?;
        styles.push(record.blueprint);
    }

    let (colors, sizes) = union_pools(&styles);
    Ok(Json(UnionPoolsResponse { colors, sizes }))
}
