//! Style blueprints and the shared template config.

use serde::{Deserialize, Serialize};

use crate::types::StyleId;

use super::node::{FieldKey, InstructionNode, TechPack};

/// The fixed size schema. Styles may extend it with free-form labels
/// (e.g., "3XL", "28x32"); unknown labels sort after the schema.
pub const STANDARD_SIZES: [&str; 6] = ["XS", "S", "M", "L", "XL", "XXL"];

/// Sort size labels: schema sizes first in schema order, free-form labels
/// after, lexicographically.
pub fn sort_sizes(sizes: &mut [String]) {
    sizes.sort_by(|a, b| (schema_index(a), a).cmp(&(schema_index(b), b)));
}

fn schema_index(label: &str) -> usize {
    STANDARD_SIZES
        .iter()
        .position(|known| *known == label)
        .unwrap_or(STANDARD_SIZES.len())
}

/// One category of the shared template config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateCategory {
    /// Category name (e.g., "Fabric", "Trims", "Packing").
    pub name: String,
    /// Field names within the category, in display order.
    pub fields: Vec<String>,
}

/// The shared tech-pack template: category and field names, in display order.
///
/// Owned externally and merely referenced by styles; it fixes iteration order
/// for the forecast resolver and the bulk merge engine. A style's tech pack
/// may hold entries the template no longer lists (orphaned but preserved) and
/// may lack entries the template newly lists (blank defaults on read).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateConfig(pub Vec<TemplateCategory>);

impl TemplateConfig {
    /// Iterate every `(category, field)` key in template order.
    pub fn field_keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.0.iter().flat_map(|category| {
            category
                .fields
                .iter()
                .map(|field| FieldKey::new(category.name.clone(), field.clone()))
        })
    }
}

/// The complete technical specification of one manufacturing style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleBlueprint {
    /// Unique style ID.
    pub id: StyleId,
    /// Factory style number (e.g., "SW-2301").
    pub style_number: String,
    /// Colors this style is produced in, in entry order. May contain blank
    /// entries awaiting operator input.
    pub available_colors: Vec<String>,
    /// Sizes this style is produced in, in schema order.
    pub available_sizes: Vec<String>,
    /// Per-field instruction nodes.
    pub tech_pack: TechPack,
}

impl StyleBlueprint {
    /// Resolve the node for a field, falling back to a blank global node for
    /// fields the tech pack has no entry for.
    #[must_use]
    pub fn node_or_blank(&self, key: &FieldKey) -> InstructionNode {
        self.tech_pack
            .get(key)
            .cloned()
            .unwrap_or_else(InstructionNode::blank)
    }

    /// True when `label` is in the available-colors pool.
    #[must_use]
    pub fn has_color(&self, label: &str) -> bool {
        self.available_colors.iter().any(|color| color == label)
    }

    /// Add a size label to the available-sizes pool if it is not already
    /// present, keeping the pool sorted.
    pub fn add_size(&mut self, label: &str) {
        if !self.available_sizes.iter().any(|size| size == label) {
            self.available_sizes.push(label.to_owned());
            sort_sizes(&mut self.available_sizes);
        }
    }
}
