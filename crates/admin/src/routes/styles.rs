//! Style CRUD and tech-pack field editing.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use stitchworks_core::StyleId;
use stitchworks_core::techpack::{FieldKey, InstructionNode};

use crate::db::styles::StyleRepository;
use crate::error::AppError;
use crate::models::style::{CopyStyleInput, CreateStyleInput, StyleFilter, UpdateStyleInput};
use crate::state::AppState;

/// Routes under `/styles`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/styles", get(list_styles).post(create_style))
        .route(
            "/styles/{id}",
            get(get_style).put(update_style).delete(delete_style),
        )
        .route("/styles/{id}/copy", post(copy_style))
        .route("/styles/{id}/techpack", put(set_field))
        .route(
            "/styles/{id}/techpack/{category}/{field}",
            axum::routing::delete(delete_field),
        )
        .route("/styles/{id}/techpack/split", post(split_field))
        .route("/styles/{id}/techpack/merge", post(merge_field))
}

/// List styles.
#[instrument(skip(state))]
async fn list_styles(
    State(state): State<AppState>,
    Query(filter): Query<StyleFilter>,
) -> Result<impl IntoResponse, AppError> {
    let repo = StyleRepository::new(state.pool());
    let styles = repo.list(&filter).await?;
    let total = repo.count(&filter).await?;
    Ok(Json(json!({ "styles": styles, "total": total })))
}

/// Create a style ("New Style", or "CSV import" with a pre-built tech pack).
#[instrument(skip(state, input))]
async fn create_style(
    State(state): State<AppState>,
    Json(input): Json<CreateStyleInput>,
) -> Result<impl IntoResponse, AppError> {
    if input.style_number.trim().is_empty() {
        return Err(AppError::BadRequest("style_number is required".to_string()));
    }
    let record = StyleRepository::new(state.pool()).create(&input).await?;
    tracing::info!(style_id = %record.blueprint.id, "Style created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Get a style by ID.
#[instrument(skip(state))]
async fn get_style(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let record = StyleRepository::new(state.pool())
        .get(StyleId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("style {id}")))?;
    Ok(Json(record))
}

/// Update a style's header fields (number, color pool, size pool).
#[instrument(skip(state, input))]
async fn update_style(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateStyleInput>,
) -> Result<impl IntoResponse, AppError> {
    let repo = StyleRepository::new(state.pool());
    let record = repo
        .get(StyleId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("style {id}")))?;

    let mut blueprint = record.blueprint;
    if let Some(style_number) = input.style_number {
        blueprint.style_number = style_number;
    }
    if let Some(colors) = input.available_colors {
        blueprint.available_colors = colors;
    }
    if let Some(sizes) = input.available_sizes {
        blueprint.available_sizes = sizes;
    }

    let updated = repo.put(&blueprint).await?;
    Ok(Json(updated))
}

/// Hard-delete a style.
#[instrument(skip(state))]
async fn delete_style(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = StyleRepository::new(state.pool())
        .delete(StyleId::new(id))
        .await?;
    if !deleted {
        return Err(AppError::NotFound(format!("style {id}")));
    }
    tracing::info!(style_id = id, "Style deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Copy a style (pools and full tech pack) under a new style number.
#[instrument(skip(state, input))]
async fn copy_style(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<CopyStyleInput>,
) -> Result<impl IntoResponse, AppError> {
    let repo = StyleRepository::new(state.pool());
    let source = repo
        .get(StyleId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("style {id}")))?;

    let record = repo
        .create(&CreateStyleInput {
            style_number: input.style_number,
            available_colors: source.blueprint.available_colors,
            available_sizes: source.blueprint.available_sizes,
            tech_pack: source.blueprint.tech_pack,
        })
        .await?;
    tracing::info!(source_id = id, style_id = %record.blueprint.id, "Style copied");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Body for setting one tech-pack field.
#[derive(Debug, Deserialize)]
struct SetFieldInput {
    category: String,
    field: String,
    node: InstructionNode,
}

/// Set one tech-pack field's node (the field-by-field editor write path).
#[instrument(skip(state, input))]
async fn set_field(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<SetFieldInput>,
) -> Result<impl IntoResponse, AppError> {
    let repo = StyleRepository::new(state.pool());
    let record = repo
        .get(StyleId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("style {id}")))?;

    let mut blueprint = record.blueprint;
    blueprint
        .tech_pack
        .insert(FieldKey::new(input.category, input.field), input.node);
    Ok(Json(repo.put(&blueprint).await?))
}

/// Remove one tech-pack field entry.
#[instrument(skip(state))]
async fn delete_field(
    State(state): State<AppState>,
    Path((id, category, field)): Path<(i32, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let repo = StyleRepository::new(state.pool());
    let record = repo
        .get(StyleId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("style {id}")))?;

    let mut blueprint = record.blueprint;
    blueprint.tech_pack.remove(&FieldKey::new(category, field));
    Ok(Json(repo.put(&blueprint).await?))
}

/// Body for splitting a field into color variants.
#[derive(Debug, Deserialize)]
struct SplitFieldInput {
    category: String,
    field: String,
    colors: Vec<String>,
}

/// Split a global field into color variants, seeding the first variant from
/// the prior global content.
#[instrument(skip(state, input))]
async fn split_field(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<SplitFieldInput>,
) -> Result<impl IntoResponse, AppError> {
    let repo = StyleRepository::new(state.pool());
    let record = repo
        .get(StyleId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("style {id}")))?;

    let mut blueprint = record.blueprint;
    let key = FieldKey::new(input.category, input.field);
    let node = blueprint.node_or_blank(&key).into_variants(input.colors);
    blueprint.tech_pack.insert(key, node);
    Ok(Json(repo.put(&blueprint).await?))
}

/// Body for collapsing a field's variants back into a global instruction.
#[derive(Debug, Deserialize)]
struct MergeFieldInput {
    category: String,
    field: String,
}

/// Collapse a field's color variants into a single global instruction,
/// preserving the first variant's content.
#[instrument(skip(state, input))]
async fn merge_field(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<MergeFieldInput>,
) -> Result<impl IntoResponse, AppError> {
    let repo = StyleRepository::new(state.pool());
    let record = repo
        .get(StyleId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("style {id}")))?;

    let mut blueprint = record.blueprint;
    let key = FieldKey::new(input.category, input.field);
    let node = blueprint.node_or_blank(&key).into_global();
    blueprint.tech_pack.insert(key, node);
    Ok(Json(repo.put(&blueprint).await?))
}
