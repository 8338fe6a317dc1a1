//! Database operations for production orders.
//!
//! Orders are soft-deleted: `deleted_at` marks removal and the default
//! listing excludes marked rows. Styles, by contrast, hard-delete.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use stitchworks_core::order::{OrderQuantityMatrix, SizeFormat};
use stitchworks_core::{ProductionOrderId, StyleId};

use super::RepositoryError;
use crate::models::order::{
    CreateOrderInput, OrderFilter, ProductionOrder, ProductionStage, UpdateOrderInput,
};

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    style_id: i32,
    quantities: Json<OrderQuantityMatrix>,
    size_format: String,
    stage: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for ProductionOrder {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let size_format: SizeFormat = row
            .size_format
            .parse()
            .map_err(RepositoryError::DataCorruption)?;
        let stage: ProductionStage = row.stage.parse().map_err(RepositoryError::DataCorruption)?;
        Ok(Self {
            id: ProductionOrderId::new(row.id),
            order_number: row.order_number,
            style_id: StyleId::new(row.style_id),
            quantities: row.quantities.0,
            size_format,
            stage,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, order_number, style_id, quantities, size_format, stage, notes, \
                             created_at, updated_at, deleted_at";

/// Repository for production order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a production order in the `Draft` stage.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number already
    /// exists. Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &CreateOrderInput) -> Result<ProductionOrder, RepositoryError> {
        let sql = format!(
            "INSERT INTO production_order \
                (order_number, style_id, quantities, size_format, stage, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ORDER_COLUMNS}"
        );
        let row: OrderRow = sqlx::query_as(&sql)
            .bind(&input.order_number)
            .bind(input.style_id.as_i32())
            .bind(Json(&input.quantities))
            .bind(input.size_format.as_str())
            .bind(ProductionStage::Draft.as_str())
            .bind(input.notes.as_deref())
            .fetch_one(self.pool)
            .await
            .map_err(map_order_number_conflict)?;

        row.try_into()
    }

    /// Get an order by ID, soft-deleted or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: ProductionOrderId,
    ) -> Result<Option<ProductionOrder>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM production_order WHERE id = $1");
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List orders with optional filtering. Soft-deleted orders are excluded
    /// unless the filter asks for them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<ProductionOrder>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM production_order \
             WHERE ($1::int IS NULL OR style_id = $1) \
               AND ($2::text IS NULL OR stage = $2) \
               AND ($3::bool OR deleted_at IS NULL) \
             ORDER BY created_at DESC \
             LIMIT $4 OFFSET $5"
        );
        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(filter.style_id.map(|id| id.as_i32()))
            .bind(filter.stage.map(|stage| stage.as_str()))
            .bind(filter.include_deleted)
            .bind(filter.limit.unwrap_or(100))
            .bind(filter.offset.unwrap_or(0))
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Update an order's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductionOrderId,
        input: &UpdateOrderInput,
    ) -> Result<ProductionOrder, RepositoryError> {
        let sql = format!(
            "UPDATE production_order SET \
                order_number = COALESCE($2, order_number), \
                quantities = COALESCE($3, quantities), \
                size_format = COALESCE($4, size_format), \
                notes = COALESCE($5, notes), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        );
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id.as_i32())
            .bind(input.order_number.as_deref())
            .bind(input.quantities.as_ref().map(Json))
            .bind(input.size_format.map(|format| format.as_str()))
            .bind(input.notes.as_deref())
            .fetch_optional(self.pool)
            .await
            .map_err(map_order_number_conflict)?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Set an order's pipeline stage.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_stage(
        &self,
        id: ProductionOrderId,
        stage: ProductionStage,
    ) -> Result<ProductionOrder, RepositoryError> {
        let sql = format!(
            "UPDATE production_order SET stage = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        );
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id.as_i32())
            .bind(stage.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Soft-delete an order.
    ///
    /// # Returns
    ///
    /// Returns `true` if the order was marked deleted, `false` if it didn't
    /// exist or was already deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn soft_delete(&self, id: ProductionOrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE production_order SET deleted_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_order_number_conflict(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.constraint() == Some("production_order_order_number_key")
    {
        return RepositoryError::Conflict("Order number already exists".to_string());
    }
    RepositoryError::Database(e)
}
