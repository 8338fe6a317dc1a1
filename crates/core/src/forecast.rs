//! Material-requirement forecast resolver.
//!
//! Walks every `(category, field)` instruction node of a blueprint, matches
//! order matrix rows against each node's color/size scope, applies the
//! consumption rule, and emits an itemized breakdown with per-field totals.
//!
//! The resolver never fails: rule-less nodes are descriptive only, unmatched
//! rows are ignored, and a zero divide ratio skips the line instead of
//! faulting.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::order::OrderQuantityMatrix;
use crate::techpack::{
    Attachment, FieldKey, InstructionContent, InstructionNode, StyleBlueprint, TemplateConfig,
    VariantBody,
};

/// Scope label used for order-wide global lines.
pub const GLOBAL_SCOPE: &str = "Global";

/// One itemized line of a field's forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastLine {
    /// Human-readable scope: `Global`, a color set, or `colors / sizes`.
    pub scope: String,
    /// Produced units matched by this line's scope.
    pub matched_qty: u64,
    /// Required material quantity, ceiling-rounded to 2 decimals.
    ///
    /// The rounded figure is the canonical one: consumers rely on it being
    /// sufficient, so the raw value is not carried.
    pub required_qty: Decimal,
    /// Instruction text of the matched node.
    pub text: String,
    /// Attachments of the matched node.
    pub attachments: Vec<Attachment>,
}

/// The forecast for one `(category, field)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldForecast {
    /// Field addressed.
    pub key: FieldKey,
    /// Ceiling-rounded sum of the (already rounded) line quantities.
    pub total: Decimal,
    /// Itemized lines.
    pub lines: Vec<ForecastLine>,
}

/// Round a required quantity up to 2 decimal places.
///
/// Over-provisioning policy: the hundredths digit always rounds toward
/// positive infinity so the reported figure is never below the raw need.
#[must_use]
pub fn round_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::ToPositiveInfinity)
}

/// Resolve the material forecast for one order against one blueprint.
///
/// Fields iterate in template order; orphaned tech-pack entries (fields the
/// template no longer lists) follow in key order. Fields whose rounded total
/// is not positive are omitted - a field with no resolvable quantity is
/// absent from the report, not zero.
#[must_use]
pub fn resolve(
    blueprint: &StyleBlueprint,
    template: &TemplateConfig,
    matrix: &OrderQuantityMatrix,
) -> Vec<FieldForecast> {
    let template_keys: Vec<FieldKey> = template.field_keys().collect();
    let orphaned: Vec<FieldKey> = blueprint
        .tech_pack
        .keys()
        .filter(|key| !template_keys.contains(*key))
        .cloned()
        .collect();

    template_keys
        .into_iter()
        .chain(orphaned)
        .filter_map(|key| {
            let node = blueprint.tech_pack.get(&key)?;
            let lines = resolve_node(node, matrix);
            let total = round_up(lines.iter().map(|line| line.required_qty).sum());
            (total > Decimal::ZERO).then_some(FieldForecast { key, total, lines })
        })
        .collect()
}

/// Resolve one instruction node into forecast lines.
fn resolve_node(node: &InstructionNode, matrix: &OrderQuantityMatrix) -> Vec<ForecastLine> {
    match node {
        InstructionNode::Global(content) => {
            // A global rule matches the whole order regardless of color mix.
            make_line(content, GLOBAL_SCOPE.to_owned(), matrix.grand_total())
                .into_iter()
                .collect()
        }
        InstructionNode::Variants(variants) => {
            let mut lines = Vec::new();
            for variant in variants {
                let matching: Vec<_> = matrix.rows_for_colors(&variant.colors).collect();
                if matching.is_empty() {
                    continue;
                }
                match &variant.body {
                    VariantBody::Leaf(content) => {
                        let matched = matching.iter().map(|row| row.total()).sum();
                        lines.extend(make_line(content, variant.colors.join(", "), matched));
                    }
                    VariantBody::SizeSplit(leaves) => {
                        for leaf in leaves {
                            let matched: u64 = matching
                                .iter()
                                .map(|row| row.total_at_sizes(&leaf.sizes))
                                .sum();
                            if matched == 0 {
                                continue;
                            }
                            let scope =
                                format!("{} / {}", variant.colors.join(", "), leaf.sizes.join(", "));
                            lines.extend(make_line(&leaf.content, scope, matched));
                        }
                    }
                }
            }
            lines
        }
    }
}

/// Build one line from content + matched quantity, or nothing when the
/// content has no rule (descriptive only) or the rule cannot resolve.
fn make_line(content: &InstructionContent, scope: String, matched_qty: u64) -> Option<ForecastLine> {
    let rule = content.consumption_rule.as_ref()?;
    let required = rule.required_for(matched_qty)?;
    Some(ForecastLine {
        scope,
        matched_qty,
        required_qty: round_up(required),
        text: content.text.clone(),
        attachments: content.attachments.clone(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::order::QuantityRow;
    use crate::techpack::{
        ColorVariant, ConsumptionMethod, ConsumptionRule, SizeSubVariant, TechPack,
        TemplateCategory,
    };
    use crate::types::StyleId;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn rule(method: ConsumptionMethod, ratio: &str) -> ConsumptionRule {
        ConsumptionRule::new(method, dec(ratio))
    }

    fn ruled_content(method: ConsumptionMethod, ratio: &str) -> InstructionContent {
        InstructionContent {
            text: String::new(),
            attachments: Vec::new(),
            consumption_rule: Some(rule(method, ratio)),
        }
    }

    fn template() -> TemplateConfig {
        TemplateConfig(vec![TemplateCategory {
            name: "Trims".to_string(),
            fields: vec!["Zipper".to_string(), "Label".to_string()],
        }])
    }

    fn style_with(field: &str, node: InstructionNode) -> StyleBlueprint {
        let mut tech_pack = TechPack::new();
        tech_pack.insert(FieldKey::new("Trims", field), node);
        StyleBlueprint {
            id: StyleId::new(1),
            style_number: "SW-1".to_string(),
            available_colors: vec!["Red".to_string(), "Blue".to_string(), "Green".to_string()],
            available_sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
            tech_pack,
        }
    }

    #[test]
    fn test_round_up_is_ceiling_and_idempotent() {
        assert_eq!(round_up(dec("1.001")), dec("1.01"));
        assert_eq!(round_up(dec("1.0000001")), dec("1.01"));
        assert_eq!(round_up(dec("1.01")), dec("1.01"));
        assert_eq!(round_up(round_up(dec("7.123"))), round_up(dec("7.123")));
    }

    #[test]
    fn test_global_rule_matches_whole_order() {
        let style = style_with(
            "Zipper",
            InstructionNode::Global(ruled_content(ConsumptionMethod::ItemsPerUnit, "2")),
        );
        let matrix = OrderQuantityMatrix(vec![
            QuantityRow::new("Red", &[("S", 60)]),
            QuantityRow::new("Blue", &[("M", 40)]),
        ]);

        let report = resolve(&style, &template(), &matrix);
        assert_eq!(report.len(), 1);
        let field = report.first().unwrap();
        assert_eq!(field.lines.len(), 1);
        let line = field.lines.first().unwrap();
        assert_eq!(line.scope, "Global");
        assert_eq!(line.matched_qty, 100);
        assert_eq!(line.required_qty, dec("200.00"));
        assert_eq!(field.total, dec("200.00"));
    }

    #[test]
    fn test_descriptive_only_field_omitted() {
        let style = style_with(
            "Zipper",
            InstructionNode::Global(InstructionContent::text_only("hand-finish")),
        );
        let matrix = OrderQuantityMatrix(vec![QuantityRow::new("Red", &[("S", 10)])]);

        assert!(resolve(&style, &template(), &matrix).is_empty());
    }

    #[test]
    fn test_color_variants_match_only_their_rows() {
        let style = style_with(
            "Zipper",
            InstructionNode::Variants(vec![
                ColorVariant {
                    colors: vec!["Red".to_string()],
                    body: VariantBody::Leaf(ruled_content(ConsumptionMethod::ItemsPerUnit, "1")),
                },
                ColorVariant {
                    colors: vec!["Blue".to_string()],
                    body: VariantBody::Leaf(ruled_content(ConsumptionMethod::ItemsPerUnit, "1")),
                },
            ]),
        );
        let matrix = OrderQuantityMatrix(vec![
            QuantityRow::new("Red", &[("S", 10)]),
            QuantityRow::new("Blue", &[("S", 5)]),
            QuantityRow::new("Green", &[("S", 3)]),
        ]);

        let report = resolve(&style, &template(), &matrix);
        let field = report.first().unwrap();
        assert_eq!(field.lines.len(), 2);
        assert_eq!(field.lines.first().unwrap().matched_qty, 10);
        assert_eq!(field.lines.get(1).unwrap().matched_qty, 5);
        // Green matches neither variant and contributes nowhere.
        assert_eq!(field.total, dec("15.00"));
    }

    #[test]
    fn test_size_leaf_counts_exactly_its_sizes() {
        let style = style_with(
            "Zipper",
            InstructionNode::Variants(vec![ColorVariant {
                colors: vec!["Red".to_string()],
                body: VariantBody::SizeSplit(vec![SizeSubVariant {
                    sizes: vec!["S".to_string(), "M".to_string()],
                    content: ruled_content(ConsumptionMethod::UnitsPerItem, "2"),
                }]),
            }]),
        );
        let matrix =
            OrderQuantityMatrix(vec![QuantityRow::new("Red", &[("S", 4), ("M", 6), ("L", 10)])]);

        let report = resolve(&style, &template(), &matrix);
        let line = report.first().unwrap().lines.first().unwrap();
        assert_eq!(line.matched_qty, 10);
        assert_eq!(line.required_qty, dec("5.00"));
        assert_eq!(line.scope, "Red / S, M");
    }

    #[test]
    fn test_overlapping_variants_double_count() {
        // A color may appear in two variants of one field; its quantity
        // counts toward every matching variant independently.
        let style = style_with(
            "Zipper",
            InstructionNode::Variants(vec![
                ColorVariant {
                    colors: vec!["Red".to_string()],
                    body: VariantBody::Leaf(ruled_content(ConsumptionMethod::ItemsPerUnit, "1")),
                },
                ColorVariant {
                    colors: vec!["Red".to_string(), "Blue".to_string()],
                    body: VariantBody::Leaf(ruled_content(ConsumptionMethod::ItemsPerUnit, "1")),
                },
            ]),
        );
        let matrix = OrderQuantityMatrix(vec![QuantityRow::new("Red", &[("S", 10)])]);

        let report = resolve(&style, &template(), &matrix);
        let field = report.first().unwrap();
        assert_eq!(field.lines.len(), 2);
        assert_eq!(field.total, dec("20.00"));
    }

    #[test]
    fn test_zero_divide_ratio_skips_line() {
        let style = style_with(
            "Zipper",
            InstructionNode::Global(ruled_content(ConsumptionMethod::UnitsPerItem, "0")),
        );
        let matrix = OrderQuantityMatrix(vec![QuantityRow::new("Red", &[("S", 10)])]);

        assert!(resolve(&style, &template(), &matrix).is_empty());
    }

    #[test]
    fn test_variant_matching_no_rows_is_skipped() {
        let style = style_with(
            "Zipper",
            InstructionNode::Variants(vec![ColorVariant {
                colors: vec!["Black".to_string()],
                body: VariantBody::Leaf(ruled_content(ConsumptionMethod::ItemsPerUnit, "3")),
            }]),
        );
        let matrix = OrderQuantityMatrix(vec![QuantityRow::new("Red", &[("S", 10)])]);

        assert!(resolve(&style, &template(), &matrix).is_empty());
    }

    #[test]
    fn test_orphaned_field_still_resolves_after_template_fields() {
        let mut style = style_with(
            "Zipper",
            InstructionNode::Global(ruled_content(ConsumptionMethod::ItemsPerUnit, "1")),
        );
        // "Retired" is not in the template but keeps its entry.
        style.tech_pack.insert(
            FieldKey::new("Legacy", "Retired"),
            InstructionNode::Global(ruled_content(ConsumptionMethod::ItemsPerUnit, "2")),
        );
        let matrix = OrderQuantityMatrix(vec![QuantityRow::new("Red", &[("S", 10)])]);

        let report = resolve(&style, &template(), &matrix);
        assert_eq!(report.len(), 2);
        assert_eq!(report.first().unwrap().key, FieldKey::new("Trims", "Zipper"));
        assert_eq!(report.get(1).unwrap().key, FieldKey::new("Legacy", "Retired"));
    }

    #[test]
    fn test_rounding_is_per_line_then_per_total() {
        // Two lines at 1/3 each: each line rounds up to 0.34, the total is
        // the rounded sum of rounded lines (0.68), not round(2/3) = 0.67.
        let style = style_with(
            "Zipper",
            InstructionNode::Variants(vec![
                ColorVariant {
                    colors: vec!["Red".to_string()],
                    body: VariantBody::Leaf(ruled_content(ConsumptionMethod::UnitsPerItem, "3")),
                },
                ColorVariant {
                    colors: vec!["Blue".to_string()],
                    body: VariantBody::Leaf(ruled_content(ConsumptionMethod::UnitsPerItem, "3")),
                },
            ]),
        );
        let matrix = OrderQuantityMatrix(vec![
            QuantityRow::new("Red", &[("S", 1)]),
            QuantityRow::new("Blue", &[("S", 1)]),
        ]);

        let report = resolve(&style, &template(), &matrix);
        let field = report.first().unwrap();
        assert_eq!(field.lines.first().unwrap().required_qty, dec("0.34"));
        assert_eq!(field.total, dec("0.68"));
    }
}
