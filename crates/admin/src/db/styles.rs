//! Database operations for style blueprints.
//!
//! The tech pack and the color/size pools are stored as JSONB documents;
//! queries are runtime-checked.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use stitchworks_core::StyleId;
use stitchworks_core::techpack::{StyleBlueprint, TechPack};

use super::RepositoryError;
use crate::models::style::{CreateStyleInput, StyleFilter, StyleRecord};

/// Internal row type for style queries.
#[derive(Debug, sqlx::FromRow)]
struct StyleRow {
    id: i32,
    style_number: String,
    available_colors: Json<Vec<String>>,
    available_sizes: Json<Vec<String>>,
    tech_pack: Json<TechPack>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StyleRow> for StyleRecord {
    fn from(row: StyleRow) -> Self {
        Self {
            blueprint: StyleBlueprint {
                id: StyleId::new(row.id),
                style_number: row.style_number,
                available_colors: row.available_colors.0,
                available_sizes: row.available_sizes.0,
                tech_pack: row.tech_pack.0,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const STYLE_COLUMNS: &str =
    "id, style_number, available_colors, available_sizes, tech_pack, created_at, updated_at";

/// Repository for style blueprint database operations.
///
/// This is the record store the bulk merge engine writes through: one
/// independent `put` per target style.
pub struct StyleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StyleRepository<'a> {
    /// Create a new style repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new style.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the style number already
    /// exists. Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &CreateStyleInput) -> Result<StyleRecord, RepositoryError> {
        let sql = format!(
            "INSERT INTO style_blueprint \
                (style_number, available_colors, available_sizes, tech_pack) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {STYLE_COLUMNS}"
        );
        let row: StyleRow = sqlx::query_as(&sql)
            .bind(&input.style_number)
            .bind(Json(&input.available_colors))
            .bind(Json(&input.available_sizes))
            .bind(Json(&input.tech_pack))
            .fetch_one(self.pool)
            .await
            .map_err(map_style_number_conflict)?;

        Ok(row.into())
    }

    /// Get a style by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: StyleId) -> Result<Option<StyleRecord>, RepositoryError> {
        let sql = format!("SELECT {STYLE_COLUMNS} FROM style_blueprint WHERE id = $1");
        let row: Option<StyleRow> = sqlx::query_as(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// List styles with optional filtering.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &StyleFilter) -> Result<Vec<StyleRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {STYLE_COLUMNS} FROM style_blueprint \
             WHERE ($1::text IS NULL OR style_number ILIKE '%' || $1 || '%') \
             ORDER BY style_number \
             LIMIT $2 OFFSET $3"
        );
        let rows: Vec<StyleRow> = sqlx::query_as(&sql)
            .bind(filter.style_number.as_deref())
            .bind(filter.limit.unwrap_or(100))
            .bind(filter.offset.unwrap_or(0))
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Count styles matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &StyleFilter) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM style_blueprint \
             WHERE ($1::text IS NULL OR style_number ILIKE '%' || $1 || '%')",
        )
        .bind(filter.style_number.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Replace a style's blueprint wholesale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the style doesn't exist.
    /// Returns `RepositoryError::Conflict` if the style number collides.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn put(&self, blueprint: &StyleBlueprint) -> Result<StyleRecord, RepositoryError> {
        let sql = format!(
            "UPDATE style_blueprint SET \
                style_number = $2, \
                available_colors = $3, \
                available_sizes = $4, \
                tech_pack = $5, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {STYLE_COLUMNS}"
        );
        let row: Option<StyleRow> = sqlx::query_as(&sql)
            .bind(blueprint.id.as_i32())
            .bind(&blueprint.style_number)
            .bind(Json(&blueprint.available_colors))
            .bind(Json(&blueprint.available_sizes))
            .bind(Json(&blueprint.tech_pack))
            .fetch_optional(self.pool)
            .await
            .map_err(map_style_number_conflict)?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Delete a style. Styles are hard-deleted, unlike production orders.
    ///
    /// # Returns
    ///
    /// Returns `true` if the style was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: StyleId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM style_blueprint WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_style_number_conflict(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.constraint() == Some("style_blueprint_style_number_key")
    {
        return RepositoryError::Conflict("Style number already exists".to_string());
    }
    RepositoryError::Database(e)
}
