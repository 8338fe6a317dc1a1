//! Style blueprint domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stitchworks_core::techpack::{StyleBlueprint, TechPack};

/// A persisted style blueprint with record timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleRecord {
    /// The blueprint itself.
    #[serde(flatten)]
    pub blueprint: StyleBlueprint,
    /// When the style was created.
    pub created_at: DateTime<Utc>,
    /// When the style was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new style.
///
/// A tech pack may be supplied up front (the "Copy Style" and CSV-import
/// paths); the plain "New Style" action starts empty.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStyleInput {
    /// Factory style number.
    pub style_number: String,
    /// Colors this style is produced in.
    #[serde(default)]
    pub available_colors: Vec<String>,
    /// Sizes this style is produced in.
    #[serde(default)]
    pub available_sizes: Vec<String>,
    /// Initial tech pack.
    #[serde(default)]
    pub tech_pack: TechPack,
}

/// Input for updating a style's header fields.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStyleInput {
    /// Factory style number.
    pub style_number: Option<String>,
    /// Colors this style is produced in.
    pub available_colors: Option<Vec<String>>,
    /// Sizes this style is produced in.
    pub available_sizes: Option<Vec<String>>,
}

/// Input for copying an existing style under a new number.
#[derive(Debug, Clone, Deserialize)]
pub struct CopyStyleInput {
    /// Style number for the copy.
    pub style_number: String,
}

/// Filter criteria for listing styles.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleFilter {
    /// Search by style number.
    pub style_number: Option<String>,
    /// Maximum number of results.
    pub limit: Option<i64>,
    /// Number of results to skip.
    pub offset: Option<i64>,
}
