//! Instruction nodes: the per-field content tree of a tech pack.
//!
//! The node shapes are explicit tagged unions so that illegal combinations
//! (leaf text alongside a size split, for example) are unrepresentable.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::attachment::Attachment;
use super::rule::ConsumptionRule;

/// Key addressing one field of a tech pack: `(category, field)`.
///
/// Category and field names come from the shared template config; a tech pack
/// may hold entries for fields the current template no longer lists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldKey {
    /// Category name (e.g., "Trims").
    pub category: String,
    /// Field name within the category (e.g., "Zipper").
    pub field: String,
}

impl FieldKey {
    /// Create a new field key.
    #[must_use]
    pub fn new(category: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.category, self.field)
    }
}

/// The leaf payload shared by every level of the instruction tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstructionContent {
    /// Free-form instruction text.
    #[serde(default)]
    pub text: String,
    /// Referenced assets.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Optional quantitative rule. Without one the content is descriptive only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumption_rule: Option<ConsumptionRule>,
}

impl InstructionContent {
    /// Content with only text set.
    #[must_use]
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// True when the content carries nothing: empty text, no attachments,
    /// no consumption rule.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && self.attachments.is_empty() && self.consumption_rule.is_none()
    }
}

/// A size-scoped leaf inside a color variant. Leaf only; no further nesting.
///
/// `sizes` is a subset of the owning style's available-sizes pool. It may be
/// empty transiently during editing; an empty scope matches zero quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeSubVariant {
    /// Size labels this leaf applies to, compared as a set.
    pub sizes: Vec<String>,
    /// Leaf content.
    #[serde(flatten)]
    pub content: InstructionContent,
}

/// Body of a color variant: its own content, or a split into size leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantBody {
    /// The variant carries content directly.
    Leaf(InstructionContent),
    /// The variant is split into size-scoped leaves; content lives only there.
    SizeSplit(Vec<SizeSubVariant>),
}

impl VariantBody {
    /// True when the body carries nothing.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Leaf(content) => content.is_blank(),
            Self::SizeSplit(leaves) => leaves.is_empty(),
        }
    }
}

/// A color-scoped override of a field's instruction.
///
/// `colors` is a subset of the owning style's available-colors pool, compared
/// as a set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorVariant {
    /// Color labels this variant applies to.
    pub colors: Vec<String>,
    /// Variant body.
    pub body: VariantBody,
}

impl ColorVariant {
    /// A variant scoped to `colors` with blank leaf content.
    #[must_use]
    pub fn blank(colors: Vec<String>) -> Self {
        Self {
            colors,
            body: VariantBody::Leaf(InstructionContent::default()),
        }
    }
}

/// The content attached to one `(category, field)` of a tech pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionNode {
    /// One instruction for the whole style.
    Global(InstructionContent),
    /// Color-scoped overrides.
    Variants(Vec<ColorVariant>),
}

impl InstructionNode {
    /// A blank global node: the read-time default for fields the template
    /// lists but the tech pack has no entry for.
    #[must_use]
    pub const fn blank() -> Self {
        Self::Global(InstructionContent {
            text: String::new(),
            attachments: Vec::new(),
            consumption_rule: None,
        })
    }

    /// True when the node carries nothing a reader or the resolver would see.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Global(content) => content.is_blank(),
            Self::Variants(variants) => variants.is_empty(),
        }
    }

    /// Split a global node into color variants, seeding the first variant
    /// from the prior global content. A node that is already split is
    /// returned unchanged.
    #[must_use]
    pub fn into_variants(self, colors: Vec<String>) -> Self {
        match self {
            Self::Global(content) => Self::Variants(vec![ColorVariant {
                colors,
                body: VariantBody::Leaf(content),
            }]),
            node @ Self::Variants(_) => node,
        }
    }

    /// Collapse a variant set back into a single global node, preserving the
    /// first variant's content as the new global content. A size-split first
    /// variant contributes its first leaf's content. A global node is
    /// returned unchanged.
    #[must_use]
    pub fn into_global(self) -> Self {
        match self {
            node @ Self::Global(_) => node,
            Self::Variants(variants) => {
                let content = variants
                    .into_iter()
                    .next()
                    .map(|variant| match variant.body {
                        VariantBody::Leaf(content) => content,
                        VariantBody::SizeSplit(leaves) => leaves
                            .into_iter()
                            .next()
                            .map(|leaf| leaf.content)
                            .unwrap_or_default(),
                    })
                    .unwrap_or_default();
                Self::Global(content)
            }
        }
    }
}

/// Compare two label lists as sets (order-independent, duplicates collapse).
#[must_use]
pub(crate) fn set_eq(a: &[String], b: &[String]) -> bool {
    let left: BTreeSet<&str> = a.iter().map(String::as_str).collect();
    let right: BTreeSet<&str> = b.iter().map(String::as_str).collect();
    left == right
}

/// A style's tech pack: one instruction node per `(category, field)`.
///
/// Serializes as a list of entries so the JSON form stays readable and the
/// keys stay structured.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TechPackEntry>", into = "Vec<TechPackEntry>")]
pub struct TechPack(BTreeMap<FieldKey, InstructionNode>);

/// Serialized form of one tech-pack entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TechPackEntry {
    category: String,
    field: String,
    node: InstructionNode,
}

impl From<Vec<TechPackEntry>> for TechPack {
    fn from(entries: Vec<TechPackEntry>) -> Self {
        Self(
            entries
                .into_iter()
                .map(|entry| (FieldKey::new(entry.category, entry.field), entry.node))
                .collect(),
        )
    }
}

impl From<TechPack> for Vec<TechPackEntry> {
    fn from(pack: TechPack) -> Self {
        pack.0
            .into_iter()
            .map(|(key, node)| TechPackEntry {
                category: key.category,
                field: key.field,
                node,
            })
            .collect()
    }
}

impl TechPack {
    /// An empty tech pack.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Look up the node for a field, if the pack has an entry.
    #[must_use]
    pub fn get(&self, key: &FieldKey) -> Option<&InstructionNode> {
        self.0.get(key)
    }

    /// Insert or replace the node for a field.
    pub fn insert(&mut self, key: FieldKey, node: InstructionNode) {
        self.0.insert(key, node);
    }

    /// Remove the entry for a field.
    pub fn remove(&mut self, key: &FieldKey) -> Option<InstructionNode> {
        self.0.remove(key)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &InstructionNode)> {
        self.0.iter()
    }

    /// Iterate keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.0.keys()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the pack has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(FieldKey, InstructionNode)> for TechPack {
    fn from_iter<I: IntoIterator<Item = (FieldKey, InstructionNode)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
