//! Asset upload endpoint.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use tracing::instrument;

use stitchworks_core::techpack::Attachment;

use crate::error::AppError;
use crate::services::assets::kind_for;
use crate::state::AppState;

/// Routes under `/assets`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/assets", post(upload_asset))
}

/// Store an uploaded file and return the attachment reference to embed in a
/// tech-pack node.
#[instrument(skip(state, multipart))]
async fn upload_asset(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let Some(file_name) = field.file_name().map(ToOwned::to_owned) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

        let url = state
            .assets()
            .upload(&file_name, &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("asset store: {e}")))?;

        let kind = kind_for(&file_name);
        tracing::info!(name = %file_name, url = %url, "Asset stored");
        return Ok((
            StatusCode::CREATED,
            Json(Attachment::new(file_name, url, kind)),
        ));
    }

    Err(AppError::BadRequest("no file field in upload".to_string()))
}
