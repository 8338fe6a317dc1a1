//! Shared tech-pack template storage.
//!
//! The template (category and field names) is shared across every style and
//! stored as a single JSONB settings row.

use sqlx::PgPool;
use sqlx::types::Json;

use stitchworks_core::techpack::TemplateConfig;

use super::RepositoryError;

const TEMPLATE_KEY: &str = "tech_pack_template";

/// Get the shared template config. `None` when no template has been saved.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_template(pool: &PgPool) -> Result<Option<TemplateConfig>, RepositoryError> {
    let row: Option<Json<TemplateConfig>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
            .bind(TEMPLATE_KEY)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|json| json.0))
}

/// Save the shared template config (upsert).
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn set_template(pool: &PgPool, template: &TemplateConfig) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES ($1, $2) \
         ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()",
    )
    .bind(TEMPLATE_KEY)
    .bind(Json(template))
    .execute(pool)
    .await?;

    Ok(())
}
