//! Integration tests for StitchWorks.
//!
//! These tests exercise the public crate APIs end to end without a live
//! database: the bulk-edit persistence seam (`BlueprintWriter`) is satisfied
//! by an in-memory store that can inject write failures per style.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p stitchworks-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `forecast` - Forecast resolver behavior
//! - `bulk_merge` - Merge engine semantics
//! - `bulk_batch` - Batch application and partial-failure isolation

use std::collections::BTreeMap;
use std::sync::Mutex;

use stitchworks_admin::db::RepositoryError;
use stitchworks_admin::services::bulk_edit::BlueprintWriter;
use stitchworks_core::StyleId;
use stitchworks_core::techpack::{StyleBlueprint, TechPack};

/// In-memory blueprint store with per-style write-failure injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<StyleId, StyleBlueprint>>,
    fail_ids: Vec<StyleId>,
}

impl MemoryStore {
    /// A store that accepts every write.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes fail for the given style IDs.
    #[must_use]
    pub fn failing_for(fail_ids: Vec<StyleId>) -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            fail_ids,
        }
    }

    /// The stored blueprint for a style, if one was written.
    #[must_use]
    pub fn get(&self, id: StyleId) -> Option<StyleBlueprint> {
        self.records.lock().expect("store lock poisoned").get(&id).cloned()
    }

    /// Number of blueprints written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().expect("store lock poisoned").len()
    }

    /// True when nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlueprintWriter for MemoryStore {
    async fn put(&self, blueprint: &StyleBlueprint) -> Result<(), RepositoryError> {
        if self.fail_ids.contains(&blueprint.id) {
            return Err(RepositoryError::Conflict(
                "injected write failure".to_string(),
            ));
        }
        self.records
            .lock()
            .expect("store lock poisoned")
            .insert(blueprint.id, blueprint.clone());
        Ok(())
    }
}

/// Build a style blueprint with the given pools and an empty tech pack.
#[must_use]
pub fn style(id: i32, style_number: &str, colors: &[&str], sizes: &[&str]) -> StyleBlueprint {
    StyleBlueprint {
        id: StyleId::new(id),
        style_number: style_number.to_string(),
        available_colors: colors.iter().map(|&c| c.to_string()).collect(),
        available_sizes: sizes.iter().map(|&s| s.to_string()).collect(),
        tech_pack: TechPack::new(),
    }
}
