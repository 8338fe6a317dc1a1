//! Integration tests for the bulk merge engine.

use std::collections::BTreeMap;

use stitchworks_core::merge::{
    EditFragment, MergeError, MergeStrategy, NodeShape, apply_edits, union_pools,
};
use stitchworks_core::techpack::{
    ColorVariant, FieldKey, InstructionContent, InstructionNode, SizeSubVariant, VariantBody,
};

use stitchworks_integration_tests::style;

fn key() -> FieldKey {
    FieldKey::new("Trims", "Zipper")
}

fn edits(fragment: EditFragment) -> BTreeMap<FieldKey, EditFragment> {
    BTreeMap::from([(key(), fragment)])
}

fn text(value: &str) -> InstructionContent {
    InstructionContent::text_only(value)
}

#[test]
fn test_overwrite_applied_twice_is_identical() {
    let mut base = style(1, "SW-1", &["Red", "Blue"], &["S", "M"]);
    base.tech_pack
        .insert(key(), InstructionNode::Global(text("original")));

    let fragment = InstructionNode::Variants(vec![ColorVariant {
        colors: vec!["Red".to_string()],
        body: VariantBody::Leaf(text("replacement")),
    }]);

    let once =
        apply_edits(&base, &edits(fragment.clone()), MergeStrategy::Overwrite).expect("merge ok");
    let twice = apply_edits(&once, &edits(fragment), MergeStrategy::Overwrite).expect("merge ok");
    assert_eq!(once, twice);
}

#[test]
fn test_append_applied_twice_doubles_text() {
    let mut base = style(1, "SW-1", &["Red"], &["S"]);
    base.tech_pack.insert(key(), InstructionNode::Global(text("A")));

    let fragment = InstructionNode::Global(text("B"));
    let once = apply_edits(&base, &edits(fragment.clone()), MergeStrategy::Append).expect("merge ok");
    let twice = apply_edits(&once, &edits(fragment), MergeStrategy::Append).expect("merge ok");

    let InstructionNode::Global(content) = twice.tech_pack.get(&key()).expect("node present")
    else {
        panic!("expected global node");
    };
    assert_eq!(content.text, "A\nB\nB");
}

#[test]
fn test_exact_set_identity_never_merges_into_superset() {
    let mut base = style(1, "SW-1", &["Red", "Blue", "Green"], &["S"]);
    base.tech_pack.insert(
        key(),
        InstructionNode::Variants(vec![ColorVariant {
            colors: vec!["Red".to_string(), "Blue".to_string(), "Green".to_string()],
            body: VariantBody::Leaf(text("all colors")),
        }]),
    );

    let fragment = InstructionNode::Variants(vec![ColorVariant {
        colors: vec!["Red".to_string(), "Blue".to_string()],
        body: VariantBody::Leaf(text("two colors")),
    }]);

    let merged = apply_edits(&base, &edits(fragment), MergeStrategy::Append).expect("merge ok");
    let InstructionNode::Variants(variants) = merged.tech_pack.get(&key()).expect("node present")
    else {
        panic!("expected variants");
    };
    assert_eq!(variants.len(), 2, "superset variant must not absorb the edit");

    let VariantBody::Leaf(untouched) = &variants.first().expect("first variant").body else {
        panic!("expected leaf");
    };
    assert_eq!(untouched.text, "all colors");
}

#[test]
fn test_size_injection_adds_to_available_sizes() {
    let base = style(1, "SW-1", &["Red"], &["S", "M", "L"]);
    let fragment = InstructionNode::Variants(vec![ColorVariant {
        colors: vec!["Red".to_string()],
        body: VariantBody::SizeSplit(vec![SizeSubVariant {
            sizes: vec!["3XL".to_string()],
            content: text("extended sizing"),
        }]),
    }]);

    let merged = apply_edits(&base, &edits(fragment.clone()), MergeStrategy::Append).expect("merge ok");
    assert_eq!(merged.available_sizes, vec!["S", "M", "L", "3XL"]);

    // Re-applying does not duplicate the injected size.
    let again = apply_edits(&merged, &edits(fragment), MergeStrategy::Append).expect("merge ok");
    assert_eq!(again.available_sizes, vec!["S", "M", "L", "3XL"]);
}

#[test]
fn test_shape_mismatched_append_is_reported() {
    let mut base = style(1, "SW-1", &["Red"], &["S"]);
    base.tech_pack.insert(
        key(),
        InstructionNode::Variants(vec![ColorVariant {
            colors: vec!["Red".to_string()],
            body: VariantBody::Leaf(text("variant content")),
        }]),
    );

    let fragment = InstructionNode::Global(text("global content"));
    let err = apply_edits(&base, &edits(fragment), MergeStrategy::Append).expect_err("conflict");
    assert_eq!(
        err,
        MergeError::ShapeConflict {
            field: key(),
            existing: NodeShape::Variants,
            fragment: NodeShape::Global,
        }
    );

    // Overwrite is always allowed to change the shape.
    let fragment = InstructionNode::Global(text("global content"));
    let merged = apply_edits(&base, &edits(fragment), MergeStrategy::Overwrite).expect("merge ok");
    assert!(matches!(
        merged.tech_pack.get(&key()),
        Some(InstructionNode::Global(_))
    ));
}

#[test]
fn test_operator_pool_is_union_of_targets() {
    let a = style(1, "SW-1", &["Red", "Blue"], &["S", "M"]);
    let b = style(2, "SW-2", &["Blue", "Black"], &["M", "3XL"]);

    let (colors, sizes) = union_pools(&[a, b]);
    assert_eq!(colors, vec!["Red", "Blue", "Black"]);
    assert_eq!(sizes, vec!["S", "M", "3XL"]);
}

#[test]
fn test_edit_against_union_pool_filters_per_target() {
    // The operator picks {Red, Black} from the union; each target keeps only
    // the colors it actually has.
    let style_a = style(1, "SW-1", &["Red", "Blue"], &["S"]);
    let style_b = style(2, "SW-2", &["Black"], &["S"]);

    let fragment = InstructionNode::Variants(vec![ColorVariant {
        colors: vec!["Red".to_string(), "Black".to_string()],
        body: VariantBody::Leaf(text("shared trim")),
    }]);

    let merged_a =
        apply_edits(&style_a, &edits(fragment.clone()), MergeStrategy::Append).expect("merge ok");
    let InstructionNode::Variants(variants_a) =
        merged_a.tech_pack.get(&key()).expect("node present")
    else {
        panic!("expected variants");
    };
    assert_eq!(variants_a.first().expect("variant").colors, vec!["Red"]);

    let merged_b = apply_edits(&style_b, &edits(fragment), MergeStrategy::Append).expect("merge ok");
    let InstructionNode::Variants(variants_b) =
        merged_b.tech_pack.get(&key()).expect("node present")
    else {
        panic!("expected variants");
    };
    assert_eq!(variants_b.first().expect("variant").colors, vec!["Black"]);
}
