//! Bulk blueprint merge engine.
//!
//! An operator designs one edit per field against the union of the target
//! styles' color/size pools; the engine filters and merges that edit into
//! each target. Variant identity is exact set equality on the color/size
//! selection - a fragment scoped to `{Red, Blue}` never merges into a
//! variant scoped to `{Red, Blue, Green}`.
//!
//! The engine is pure: it returns an updated copy per style and leaves
//! persistence (one independent write per style) to the caller.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::techpack::node::set_eq;
use crate::techpack::{
    ColorVariant, FieldKey, InstructionContent, InstructionNode, SizeSubVariant, StyleBlueprint,
    VariantBody, sort_sizes,
};

/// An edit authored for one field of a bulk operation.
///
/// Shaped like an instruction node; its color/size selections are drawn from
/// the union pool of all target styles and filtered per target by the engine.
pub type EditFragment = InstructionNode;

/// How a bulk edit combines with existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Replace the field's node (and its entire variant list) with what the
    /// fragment describes. Idempotent.
    Overwrite,
    /// Add to matching scopes, leave everything else untouched. Each
    /// application is a genuine addition, not idempotent.
    Append,
}

/// Shape of a node or variant body, used in conflict reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeShape {
    /// A single global instruction.
    Global,
    /// A set of color variants.
    Variants,
    /// Leaf content inside a color variant.
    Leaf,
    /// A size split inside a color variant.
    SizeSplit,
}

impl fmt::Display for NodeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Global => "global",
            Self::Variants => "color-variant",
            Self::Leaf => "leaf",
            Self::SizeSplit => "size-split",
        };
        write!(f, "{label}")
    }
}

/// Errors reported by the merge engine.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MergeError {
    /// Append was asked to combine content of mismatched shapes. No merge
    /// semantics exist for that combination, so the engine reports it
    /// instead of guessing.
    #[error("field {field}: cannot append {fragment} content onto existing {existing} content")]
    ShapeConflict {
        /// Field the conflict occurred on.
        field: FieldKey,
        /// Shape already present in the target style.
        existing: NodeShape,
        /// Shape of the edit fragment.
        fragment: NodeShape,
    },
}

/// Union of the available color and size pools across target styles.
///
/// Colors keep first-seen order; sizes sort into schema order. This is the
/// pool the operator designs an edit against.
#[must_use]
pub fn union_pools(styles: &[StyleBlueprint]) -> (Vec<String>, Vec<String>) {
    let mut colors: Vec<String> = Vec::new();
    let mut sizes: Vec<String> = Vec::new();
    for style in styles {
        for color in &style.available_colors {
            if !color.is_empty() && !colors.contains(color) {
                colors.push(color.clone());
            }
        }
        for size in &style.available_sizes {
            if !sizes.contains(size) {
                sizes.push(size.clone());
            }
        }
    }
    sort_sizes(&mut sizes);
    (colors, sizes)
}

/// Apply a batch of field edits to one style, returning the updated copy.
///
/// The input style is never mutated. A shape conflict on any field rejects
/// the whole style so a bulk run never persists a half-applied edit set.
///
/// # Errors
///
/// Returns [`MergeError::ShapeConflict`] when `Append` meets an existing
/// node of a different shape (see [`MergeError`]).
pub fn apply_edits(
    style: &StyleBlueprint,
    edits: &BTreeMap<FieldKey, EditFragment>,
    strategy: MergeStrategy,
) -> Result<StyleBlueprint, MergeError> {
    let mut updated = style.clone();
    for (key, fragment) in edits {
        merge_field(&mut updated, key, fragment, strategy)?;
    }
    Ok(updated)
}

/// Merge one field's fragment into the style.
fn merge_field(
    style: &mut StyleBlueprint,
    key: &FieldKey,
    fragment: &EditFragment,
    strategy: MergeStrategy,
) -> Result<(), MergeError> {
    // A blank or missing node has no content to conflict with; it adopts the
    // fragment's shape.
    let existing = style
        .tech_pack
        .get(key)
        .filter(|node| !node.is_blank())
        .cloned();

    let merged = match fragment {
        InstructionNode::Global(fragment_content) => {
            merge_global(key, existing.as_ref(), fragment_content, strategy)?
        }
        InstructionNode::Variants(fragment_variants) => {
            merge_variants(style, key, existing.as_ref(), fragment_variants, strategy)?
        }
    };
    style.tech_pack.insert(key.clone(), merged);
    Ok(())
}

fn merge_global(
    key: &FieldKey,
    existing: Option<&InstructionNode>,
    fragment: &InstructionContent,
    strategy: MergeStrategy,
) -> Result<InstructionNode, MergeError> {
    match (strategy, existing) {
        (MergeStrategy::Overwrite, _) | (MergeStrategy::Append, None) => {
            Ok(InstructionNode::Global(fragment.clone()))
        }
        (MergeStrategy::Append, Some(InstructionNode::Global(current))) => {
            Ok(InstructionNode::Global(append_content(current, fragment)))
        }
        (MergeStrategy::Append, Some(InstructionNode::Variants(_))) => {
            Err(MergeError::ShapeConflict {
                field: key.clone(),
                existing: NodeShape::Variants,
                fragment: NodeShape::Global,
            })
        }
    }
}

fn merge_variants(
    style: &mut StyleBlueprint,
    key: &FieldKey,
    existing: Option<&InstructionNode>,
    fragment_variants: &[ColorVariant],
    strategy: MergeStrategy,
) -> Result<InstructionNode, MergeError> {
    // Overwrite replaces the entire variant list once per field, before the
    // fragment's variants merge in.
    let mut variants: Vec<ColorVariant> = match (strategy, existing) {
        (MergeStrategy::Overwrite, _) | (MergeStrategy::Append, None) => Vec::new(),
        (MergeStrategy::Append, Some(InstructionNode::Variants(current))) => current.clone(),
        (MergeStrategy::Append, Some(InstructionNode::Global(_))) => {
            return Err(MergeError::ShapeConflict {
                field: key.clone(),
                existing: NodeShape::Global,
                fragment: NodeShape::Variants,
            });
        }
    };

    for fragment_variant in fragment_variants {
        let valid_colors = dedup(
            fragment_variant
                .colors
                .iter()
                .filter(|color| style.has_color(color)),
        );
        // A target lacking every selected color skips this fragment-variant.
        if valid_colors.is_empty() {
            continue;
        }

        let index = find_or_create_variant(&mut variants, valid_colors);
        let target = variants
            .get_mut(index)
            .unwrap_or_else(|| unreachable!("variant index just found or pushed"));

        match &fragment_variant.body {
            VariantBody::Leaf(fragment_content) => {
                merge_leaf_body(key, target, fragment_content, strategy)?;
            }
            VariantBody::SizeSplit(fragment_leaves) => {
                merge_size_split(key, target, fragment_leaves, strategy)?;
                // Pool-widening side effect: sizes named by the edit join the
                // target's available sizes.
                for leaf in fragment_leaves {
                    for size in &leaf.sizes {
                        style.add_size(size);
                    }
                }
            }
        }
    }

    Ok(InstructionNode::Variants(variants))
}

fn merge_leaf_body(
    key: &FieldKey,
    target: &mut ColorVariant,
    fragment_content: &InstructionContent,
    strategy: MergeStrategy,
) -> Result<(), MergeError> {
    match (strategy, &mut target.body) {
        (MergeStrategy::Overwrite, body) => {
            *body = VariantBody::Leaf(fragment_content.clone());
            Ok(())
        }
        (MergeStrategy::Append, VariantBody::Leaf(current)) => {
            let merged = append_content(current, fragment_content);
            *current = merged;
            Ok(())
        }
        (MergeStrategy::Append, VariantBody::SizeSplit(_)) => Err(MergeError::ShapeConflict {
            field: key.clone(),
            existing: NodeShape::SizeSplit,
            fragment: NodeShape::Leaf,
        }),
    }
}

fn merge_size_split(
    key: &FieldKey,
    target: &mut ColorVariant,
    fragment_leaves: &[SizeSubVariant],
    strategy: MergeStrategy,
) -> Result<(), MergeError> {
    // Normalize the target body to a size split before merging leaves.
    let needs_reset = match (strategy, &target.body) {
        (MergeStrategy::Overwrite, _) => true,
        (MergeStrategy::Append, VariantBody::Leaf(current)) if current.is_blank() => true,
        (MergeStrategy::Append, VariantBody::Leaf(_)) => {
            return Err(MergeError::ShapeConflict {
                field: key.clone(),
                existing: NodeShape::Leaf,
                fragment: NodeShape::SizeSplit,
            });
        }
        (MergeStrategy::Append, VariantBody::SizeSplit(_)) => false,
    };
    if needs_reset {
        target.body = VariantBody::SizeSplit(Vec::new());
    }
    let VariantBody::SizeSplit(leaves) = &mut target.body else {
        unreachable!("body normalized to a size split");
    };

    for fragment_leaf in fragment_leaves {
        let scope_sizes = dedup(fragment_leaf.sizes.iter());
        let index = leaves
            .iter()
            .position(|leaf| set_eq(&leaf.sizes, &scope_sizes))
            .unwrap_or_else(|| {
                leaves.push(SizeSubVariant {
                    sizes: scope_sizes,
                    content: InstructionContent::default(),
                });
                leaves.len() - 1
            });
        let leaf = leaves
            .get_mut(index)
            .unwrap_or_else(|| unreachable!("leaf index just found or pushed"));

        leaf.content = match strategy {
            MergeStrategy::Overwrite => fragment_leaf.content.clone(),
            MergeStrategy::Append => append_content(&leaf.content, &fragment_leaf.content),
        };
    }

    Ok(())
}

/// Find the variant whose colors exactly equal `valid_colors` (as a set),
/// or push a blank one, returning its index.
fn find_or_create_variant(variants: &mut Vec<ColorVariant>, valid_colors: Vec<String>) -> usize {
    variants
        .iter()
        .position(|variant| set_eq(&variant.colors, &valid_colors))
        .unwrap_or_else(|| {
            variants.push(ColorVariant::blank(valid_colors));
            variants.len() - 1
        })
}

/// Append-merge content: newline-joined text, concatenated attachments, and
/// the fragment's rule winning whenever it supplies one.
fn append_content(existing: &InstructionContent, fragment: &InstructionContent) -> InstructionContent {
    let text = match (existing.text.is_empty(), fragment.text.is_empty()) {
        (_, true) => existing.text.clone(),
        (true, false) => fragment.text.clone(),
        (false, false) => format!("{}\n{}", existing.text, fragment.text),
    };
    let mut attachments = existing.attachments.clone();
    attachments.extend(fragment.attachments.iter().cloned());
    InstructionContent {
        text,
        attachments,
        consumption_rule: fragment.consumption_rule.or(existing.consumption_rule),
    }
}

/// Deduplicate labels preserving first-seen order.
fn dedup<'a, I: Iterator<Item = &'a String>>(labels: I) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        if !out.contains(label) {
            out.push(label.clone());
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::techpack::TechPack;
    use crate::types::StyleId;

    fn style() -> StyleBlueprint {
        StyleBlueprint {
            id: StyleId::new(1),
            style_number: "SW-1".to_string(),
            available_colors: vec!["Red".to_string(), "Blue".to_string(), "Green".to_string()],
            available_sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
            tech_pack: TechPack::new(),
        }
    }

    fn key() -> FieldKey {
        FieldKey::new("Trims", "Zipper")
    }

    fn edits(fragment: EditFragment) -> BTreeMap<FieldKey, EditFragment> {
        BTreeMap::from([(key(), fragment)])
    }

    #[test]
    fn test_append_global_concatenates_with_newline() {
        let mut base = style();
        base.tech_pack.insert(
            key(),
            InstructionNode::Global(InstructionContent::text_only("A")),
        );
        let fragment = InstructionNode::Global(InstructionContent::text_only("B"));

        let once = apply_edits(&base, &edits(fragment.clone()), MergeStrategy::Append).unwrap();
        let twice = apply_edits(&once, &edits(fragment), MergeStrategy::Append).unwrap();

        let InstructionNode::Global(content) = twice.tech_pack.get(&key()).unwrap() else {
            panic!("expected global");
        };
        assert_eq!(content.text, "A\nB\nB");
    }

    #[test]
    fn test_overwrite_is_idempotent() {
        let mut base = style();
        base.tech_pack.insert(
            key(),
            InstructionNode::Global(InstructionContent::text_only("old")),
        );
        let fragment = InstructionNode::Variants(vec![ColorVariant {
            colors: vec!["Red".to_string()],
            body: VariantBody::Leaf(InstructionContent::text_only("new")),
        }]);

        let once = apply_edits(&base, &edits(fragment.clone()), MergeStrategy::Overwrite).unwrap();
        let twice = apply_edits(&once, &edits(fragment), MergeStrategy::Overwrite).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_exact_set_identity_creates_new_variant() {
        let mut base = style();
        base.tech_pack.insert(
            key(),
            InstructionNode::Variants(vec![ColorVariant {
                colors: vec!["Red".to_string(), "Blue".to_string(), "Green".to_string()],
                body: VariantBody::Leaf(InstructionContent::text_only("wide")),
            }]),
        );
        let fragment = InstructionNode::Variants(vec![ColorVariant {
            colors: vec!["Red".to_string(), "Blue".to_string()],
            body: VariantBody::Leaf(InstructionContent::text_only("narrow")),
        }]);

        let merged = apply_edits(&base, &edits(fragment), MergeStrategy::Append).unwrap();
        let InstructionNode::Variants(variants) = merged.tech_pack.get(&key()).unwrap() else {
            panic!("expected variants");
        };
        assert_eq!(variants.len(), 2);
        assert_eq!(
            variants.get(1).unwrap().colors,
            vec!["Red".to_string(), "Blue".to_string()]
        );
    }

    #[test]
    fn test_set_match_is_order_independent() {
        let mut base = style();
        base.tech_pack.insert(
            key(),
            InstructionNode::Variants(vec![ColorVariant {
                colors: vec!["Blue".to_string(), "Red".to_string()],
                body: VariantBody::Leaf(InstructionContent::text_only("X")),
            }]),
        );
        let fragment = InstructionNode::Variants(vec![ColorVariant {
            colors: vec!["Red".to_string(), "Blue".to_string()],
            body: VariantBody::Leaf(InstructionContent::text_only("Y")),
        }]);

        let merged = apply_edits(&base, &edits(fragment), MergeStrategy::Append).unwrap();
        let InstructionNode::Variants(variants) = merged.tech_pack.get(&key()).unwrap() else {
            panic!("expected variants");
        };
        assert_eq!(variants.len(), 1);
        let VariantBody::Leaf(content) = &variants.first().unwrap().body else {
            panic!("expected leaf");
        };
        assert_eq!(content.text, "X\nY");
    }

    #[test]
    fn test_missing_colors_skip_fragment_variant() {
        let base = style();
        let fragment = InstructionNode::Variants(vec![ColorVariant {
            colors: vec!["Mauve".to_string()],
            body: VariantBody::Leaf(InstructionContent::text_only("skip me")),
        }]);

        let merged = apply_edits(&base, &edits(fragment), MergeStrategy::Append).unwrap();
        let InstructionNode::Variants(variants) = merged.tech_pack.get(&key()).unwrap() else {
            panic!("expected variants");
        };
        assert!(variants.is_empty());
    }

    #[test]
    fn test_selection_filters_to_target_pool() {
        let base = style();
        let fragment = InstructionNode::Variants(vec![ColorVariant {
            colors: vec!["Red".to_string(), "Mauve".to_string()],
            body: VariantBody::Leaf(InstructionContent::text_only("partial")),
        }]);

        let merged = apply_edits(&base, &edits(fragment), MergeStrategy::Append).unwrap();
        let InstructionNode::Variants(variants) = merged.tech_pack.get(&key()).unwrap() else {
            panic!("expected variants");
        };
        assert_eq!(variants.first().unwrap().colors, vec!["Red".to_string()]);
    }

    #[test]
    fn test_size_injection_widens_pool() {
        let base = style();
        let fragment = InstructionNode::Variants(vec![ColorVariant {
            colors: vec!["Red".to_string()],
            body: VariantBody::SizeSplit(vec![SizeSubVariant {
                sizes: vec!["3XL".to_string()],
                content: InstructionContent::text_only("extended"),
            }]),
        }]);

        let merged = apply_edits(&base, &edits(fragment), MergeStrategy::Append).unwrap();
        assert!(merged.available_sizes.contains(&"3XL".to_string()));
        // Schema sizes stay in front; the free-form label sorts after.
        assert_eq!(merged.available_sizes, vec!["S", "M", "L", "3XL"]);
    }

    #[test]
    fn test_append_global_onto_variants_is_conflict() {
        let mut base = style();
        base.tech_pack.insert(
            key(),
            InstructionNode::Variants(vec![ColorVariant {
                colors: vec!["Red".to_string()],
                body: VariantBody::Leaf(InstructionContent::text_only("variant")),
            }]),
        );
        let fragment = InstructionNode::Global(InstructionContent::text_only("global"));

        let err = apply_edits(&base, &edits(fragment), MergeStrategy::Append).unwrap_err();
        assert_eq!(
            err,
            MergeError::ShapeConflict {
                field: key(),
                existing: NodeShape::Variants,
                fragment: NodeShape::Global,
            }
        );
    }

    #[test]
    fn test_append_onto_blank_field_adopts_fragment_shape() {
        let base = style();
        let fragment = InstructionNode::Variants(vec![ColorVariant {
            colors: vec!["Red".to_string()],
            body: VariantBody::Leaf(InstructionContent::text_only("fresh")),
        }]);

        let merged = apply_edits(&base, &edits(fragment), MergeStrategy::Append).unwrap();
        assert!(matches!(
            merged.tech_pack.get(&key()),
            Some(InstructionNode::Variants(_))
        ));
    }

    #[test]
    fn test_overwrite_clears_untouched_variants() {
        let mut base = style();
        base.tech_pack.insert(
            key(),
            InstructionNode::Variants(vec![
                ColorVariant {
                    colors: vec!["Red".to_string()],
                    body: VariantBody::Leaf(InstructionContent::text_only("keep?")),
                },
                ColorVariant {
                    colors: vec!["Green".to_string()],
                    body: VariantBody::Leaf(InstructionContent::text_only("gone")),
                },
            ]),
        );
        let fragment = InstructionNode::Variants(vec![ColorVariant {
            colors: vec!["Blue".to_string()],
            body: VariantBody::Leaf(InstructionContent::text_only("only me")),
        }]);

        let merged = apply_edits(&base, &edits(fragment), MergeStrategy::Overwrite).unwrap();
        let InstructionNode::Variants(variants) = merged.tech_pack.get(&key()).unwrap() else {
            panic!("expected variants");
        };
        assert_eq!(variants.len(), 1);
        assert_eq!(variants.first().unwrap().colors, vec!["Blue".to_string()]);
    }

    #[test]
    fn test_append_rule_wins_only_when_fragment_supplies_one() {
        use crate::techpack::{ConsumptionMethod, ConsumptionRule};

        let rule_a = ConsumptionRule::new(ConsumptionMethod::ItemsPerUnit, 2.into());
        let rule_b = ConsumptionRule::new(ConsumptionMethod::ItemsPerUnit, 5.into());

        let mut base = style();
        base.tech_pack.insert(
            key(),
            InstructionNode::Global(InstructionContent {
                text: "A".to_string(),
                attachments: Vec::new(),
                consumption_rule: Some(rule_a),
            }),
        );

        // Fragment without a rule keeps the existing one.
        let no_rule = InstructionNode::Global(InstructionContent::text_only("B"));
        let merged = apply_edits(&base, &edits(no_rule), MergeStrategy::Append).unwrap();
        let InstructionNode::Global(content) = merged.tech_pack.get(&key()).unwrap() else {
            panic!("expected global");
        };
        assert_eq!(content.consumption_rule, Some(rule_a));

        // Fragment with a rule replaces it outright, never merged numerically.
        let with_rule = InstructionNode::Global(InstructionContent {
            text: "C".to_string(),
            attachments: Vec::new(),
            consumption_rule: Some(rule_b),
        });
        let merged = apply_edits(&merged, &edits(with_rule), MergeStrategy::Append).unwrap();
        let InstructionNode::Global(content) = merged.tech_pack.get(&key()).unwrap() else {
            panic!("expected global");
        };
        assert_eq!(content.consumption_rule, Some(rule_b));
    }

    #[test]
    fn test_union_pools_dedupe_and_sort() {
        let mut a = style();
        a.available_colors = vec!["Red".to_string(), String::new(), "Blue".to_string()];
        a.available_sizes = vec!["M".to_string(), "3XL".to_string()];
        let mut b = style();
        b.available_colors = vec!["Blue".to_string(), "Black".to_string()];
        b.available_sizes = vec!["S".to_string(), "M".to_string()];

        let (colors, sizes) = union_pools(&[a, b]);
        assert_eq!(colors, vec!["Red", "Blue", "Black"]);
        assert_eq!(sizes, vec!["S", "M", "3XL"]);
    }
}
