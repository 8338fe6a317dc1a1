//! Production order domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stitchworks_core::order::{OrderQuantityMatrix, SizeFormat};
use stitchworks_core::{ProductionOrderId, StyleId};

/// Stage of a production order in the factory pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStage {
    /// Entered but not yet launched to the floor.
    #[default]
    Draft,
    /// Launched; cutting and materials staged.
    Launched,
    /// Sub-unit production in progress.
    SubUnits,
    /// Units in quality control.
    QualityControl,
    /// Materials requisition against the forecast.
    Requisition,
    /// Finished units committed to inventory.
    InventoryCommitted,
    /// Released to point-of-sale.
    PointOfSale,
}

impl ProductionStage {
    /// Canonical string form, matching the serde representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Launched => "launched",
            Self::SubUnits => "sub_units",
            Self::QualityControl => "quality_control",
            Self::Requisition => "requisition",
            Self::InventoryCommitted => "inventory_committed",
            Self::PointOfSale => "point_of_sale",
        }
    }

    /// The next stage in the pipeline, or `None` from the final stage.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Draft => Some(Self::Launched),
            Self::Launched => Some(Self::SubUnits),
            Self::SubUnits => Some(Self::QualityControl),
            Self::QualityControl => Some(Self::Requisition),
            Self::Requisition => Some(Self::InventoryCommitted),
            Self::InventoryCommitted => Some(Self::PointOfSale),
            Self::PointOfSale => None,
        }
    }
}

impl std::fmt::Display for ProductionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductionStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "launched" => Ok(Self::Launched),
            "sub_units" => Ok(Self::SubUnits),
            "quality_control" => Ok(Self::QualityControl),
            "requisition" => Ok(Self::Requisition),
            "inventory_committed" => Ok(Self::InventoryCommitted),
            "point_of_sale" => Ok(Self::PointOfSale),
            other => Err(format!("unknown production stage: {other}")),
        }
    }
}

/// A production order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrder {
    /// Unique order ID.
    pub id: ProductionOrderId,
    /// Factory order number.
    pub order_number: String,
    /// Style this order produces.
    pub style_id: StyleId,
    /// Color × size quantity matrix.
    pub quantities: OrderQuantityMatrix,
    /// Size label scheme of the matrix.
    pub size_format: SizeFormat,
    /// Pipeline stage.
    pub stage: ProductionStage,
    /// Optional notes.
    pub notes: Option<String>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the order was soft-deleted, if it was.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a production order.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderInput {
    /// Factory order number.
    pub order_number: String,
    /// Style this order produces.
    pub style_id: StyleId,
    /// Color × size quantity matrix.
    #[serde(default)]
    pub quantities: OrderQuantityMatrix,
    /// Size label scheme of the matrix.
    #[serde(default)]
    pub size_format: SizeFormat,
    /// Optional notes.
    pub notes: Option<String>,
}

/// Input for updating a production order.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderInput {
    /// Factory order number.
    pub order_number: Option<String>,
    /// Color × size quantity matrix.
    pub quantities: Option<OrderQuantityMatrix>,
    /// Size label scheme of the matrix.
    pub size_format: Option<SizeFormat>,
    /// Optional notes.
    pub notes: Option<String>,
}

/// Filter criteria for listing orders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    /// Filter by style.
    pub style_id: Option<StyleId>,
    /// Filter by pipeline stage.
    pub stage: Option<ProductionStage>,
    /// Include soft-deleted orders.
    #[serde(default)]
    pub include_deleted: bool,
    /// Maximum number of results.
    pub limit: Option<i64>,
    /// Number of results to skip.
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_pipeline_order() {
        let mut stage = ProductionStage::Draft;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            stage = next;
            seen.push(stage);
        }
        assert_eq!(seen.len(), 7);
        assert_eq!(stage, ProductionStage::PointOfSale);
    }

    #[test]
    fn test_stage_str_roundtrip() {
        let stage = ProductionStage::QualityControl;
        assert_eq!(stage.as_str().parse::<ProductionStage>(), Ok(stage));
    }
}
