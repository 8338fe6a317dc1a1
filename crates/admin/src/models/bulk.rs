//! Bulk tech-pack edit models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stitchworks_core::StyleId;
use stitchworks_core::merge::{EditFragment, MergeStrategy};
use stitchworks_core::techpack::FieldKey;

/// One enabled field edit of a bulk operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkFieldEdit {
    /// Category name.
    pub category: String,
    /// Field name within the category.
    pub field: String,
    /// The edit itself, scoped against the union pool.
    pub fragment: EditFragment,
}

/// Request body for a bulk tech-pack edit.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkEditRequest {
    /// Target styles, each written independently.
    pub style_ids: Vec<StyleId>,
    /// Overwrite or append.
    pub strategy: MergeStrategy,
    /// Enabled field edits.
    pub edits: Vec<BulkFieldEdit>,
}

impl BulkEditRequest {
    /// The enabled edits keyed for the merge engine. A field listed twice
    /// keeps the last fragment.
    #[must_use]
    pub fn edit_map(&self) -> BTreeMap<FieldKey, EditFragment> {
        self.edits
            .iter()
            .map(|edit| {
                (
                    FieldKey::new(edit.category.clone(), edit.field.clone()),
                    edit.fragment.clone(),
                )
            })
            .collect()
    }
}

/// Request body for computing the union pools of a bulk selection.
#[derive(Debug, Clone, Deserialize)]
pub struct UnionPoolsRequest {
    /// Styles the operator selected.
    pub style_ids: Vec<StyleId>,
}

/// Union pools the operator designs a bulk edit against.
#[derive(Debug, Clone, Serialize)]
pub struct UnionPoolsResponse {
    /// Union of available colors, first-seen order.
    pub colors: Vec<String>,
    /// Union of available sizes, schema order.
    pub sizes: Vec<String>,
}
