//! Bulk tech-pack edit batch application.
//!
//! The merge itself is pure (`stitchworks_core::merge`); this service owns
//! the batch half of the contract: one independent write per target style,
//! never halting on a failure, reporting a per-style outcome list. There is
//! no cross-style transaction - a bulk merge is best-effort-all with partial
//! success reported to the caller.

use std::collections::BTreeMap;
use std::future::Future;

use serde::Serialize;

use stitchworks_core::StyleId;
use stitchworks_core::merge::{self, EditFragment, MergeStrategy};
use stitchworks_core::techpack::{FieldKey, StyleBlueprint};

use crate::db::RepositoryError;
use crate::db::styles::StyleRepository;

/// Persistence seam for bulk edits, one write per style.
pub trait BlueprintWriter {
    /// Persist one style blueprint (full replace).
    fn put(
        &self,
        blueprint: &StyleBlueprint,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

impl BlueprintWriter for StyleRepository<'_> {
    async fn put(&self, blueprint: &StyleBlueprint) -> Result<(), RepositoryError> {
        Self::put(self, blueprint).await.map(|_| ())
    }
}

/// Outcome of one target style in a bulk edit.
#[derive(Debug, Clone, Serialize)]
pub struct StyleOutcome {
    /// Target style.
    pub style_id: StyleId,
    /// Whether the merge and the write both succeeded.
    pub success: bool,
    /// Failure detail for the caller's summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StyleOutcome {
    fn ok(style_id: StyleId) -> Self {
        Self {
            style_id,
            success: true,
            error: None,
        }
    }

    fn failed(style_id: StyleId, error: impl ToString) -> Self {
        Self {
            style_id,
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Apply a bulk edit to every target style and persist each result
/// independently.
///
/// A merge conflict or write failure on one style never aborts the batch;
/// the remaining styles are still attempted and the outcome list flags
/// exactly the styles that failed.
pub async fn apply_bulk_edit<W: BlueprintWriter>(
    writer: &W,
    styles: &[StyleBlueprint],
    edits: &BTreeMap<FieldKey, EditFragment>,
    strategy: MergeStrategy,
) -> Vec<StyleOutcome> {
    let mut outcomes = Vec::with_capacity(styles.len());

    for style in styles {
        let merged = match merge::apply_edits(style, edits, strategy) {
            Ok(merged) => merged,
            Err(e) => {
                tracing::warn!(style_id = %style.id, error = %e, "Bulk edit merge rejected");
                outcomes.push(StyleOutcome::failed(style.id, e));
                continue;
            }
        };

        match writer.put(&merged).await {
            Ok(()) => outcomes.push(StyleOutcome::ok(style.id)),
            Err(e) => {
                tracing::warn!(style_id = %style.id, error = %e, "Bulk edit write failed");
                outcomes.push(StyleOutcome::failed(style.id, e));
            }
        }
    }

    let failed = outcomes.iter().filter(|outcome| !outcome.success).count();
    if failed == 0 {
        tracing::info!(count = outcomes.len(), "Bulk edit completed");
    } else {
        tracing::warn!(
            count = outcomes.len(),
            failed,
            "Bulk edit completed with errors"
        );
    }

    outcomes
}
