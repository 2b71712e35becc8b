//! Feature reflection through the public Ast API.

#![allow(clippy::unwrap_used)]

use kolasu::model::DebugPrintConfiguration;
use kolasu::{FeatureKind, ModelError, Multiplicity, ReferenceByName, Value};

use crate::helpers::*;

// ============================================================================
// FEATURE DESCRIPTIONS
// ============================================================================

#[test]
fn test_group_features_in_declaration_order() {
    let fixture = fixture();
    let features = fixture.ast.features(fixture.small);
    let shapes: Vec<_> = features.iter().map(|f| (f.name, f.kind, f.multiplicity)).collect();
    assert_eq!(
        shapes,
        vec![
            ("name", FeatureKind::Attribute, Multiplicity::Singular),
            ("children", FeatureKind::Containment, Multiplicity::Many),
        ]
    );
    assert_eq!(features[0].value, Value::String("small".into()));
    assert_eq!(
        features[1].value,
        Value::Nodes(fixture.leaves[2..5].to_vec())
    );
}

#[test]
fn test_optional_reference_feature() {
    let mut ast = kolasu::Ast::new(metamodel());
    let node = ast.add(Ref { target: None }).unwrap();
    let target = &ast.features(node)[0];
    assert_eq!(target.kind, FeatureKind::Reference);
    assert_eq!(target.multiplicity, Multiplicity::Optional);
    assert_eq!(target.value, Value::Null);
    assert_eq!(ast.get_reference(node, "target").unwrap(), None);
}

#[test]
fn test_children_follow_containment_order() {
    let fixture = fixture();
    assert_eq!(
        labels(&fixture.ast, fixture.ast.children(fixture.root)),
        vec!["first", "2", "big", "6"]
    );
    assert_eq!(fixture.ast.parent(fixture.small), Some(fixture.big));
    assert_eq!(fixture.ast.parent(fixture.root), None);
}

// ============================================================================
// WRITES
// ============================================================================

#[test]
fn test_set_attribute_by_name() {
    let mut fixture = fixture();
    fixture
        .ast
        .set_attribute(fixture.first, "name", Value::String("renamed".into()))
        .unwrap();
    assert_eq!(fixture.ast.get::<Group>(fixture.first).unwrap().name, "renamed");
    assert_eq!(fixture.ast.name_of(fixture.first).as_deref(), Some("renamed"));
}

#[test]
fn test_unknown_feature_is_an_error() {
    let fixture = fixture();
    let result = fixture.ast.feature_value(fixture.root, "missing");
    assert!(matches!(result, Err(ModelError::UnknownFeature { feature, .. }) if feature == "missing"));
}

#[test]
fn test_attribute_write_on_containment_is_rejected() {
    let mut fixture = fixture();
    let result = fixture.ast.set_attribute(fixture.root, "children", Value::Null);
    assert!(matches!(result, Err(ModelError::WrongFeatureKind { expected: "attribute", .. })));
}

#[test]
fn test_set_feature_moves_parents() {
    let mut fixture = fixture();
    let six = fixture.leaves[5];
    fixture
        .ast
        .set_feature(fixture.first, "children", Value::Nodes(vec![six]))
        .unwrap();
    assert_eq!(fixture.ast.parent(six), Some(fixture.first));
    assert_eq!(fixture.ast.parent(fixture.leaves[0]), None);
    assert!(!fixture.ast.children(fixture.root).contains(&six));
    assert!(fixture.ast.has_valid_parents(fixture.root));
}

#[test]
fn test_reference_binding() {
    let mut ast = kolasu::Ast::new(metamodel());
    let target = group(&mut ast, "target", vec![], kolasu::Range::from_coords(1, 0, 1, 6));
    let node = ast
        .add(Ref {
            target: Some(ReferenceByName::new("target")),
        })
        .unwrap();
    ast.set_reference_referred(node, "target", Some(target)).unwrap();
    let reference = ast.get_reference(node, "target").unwrap().unwrap();
    assert!(reference.is_resolved());
    assert_eq!(reference.referred, Some(target));
}

// ============================================================================
// EQUALITY AND PRINTING
// ============================================================================

#[test]
fn test_structural_equality_ignores_ranges() {
    let left = fixture();
    let mut right = fixture();
    right.ast.set_range(right.small, None);
    assert!(left.ast.subtree_eq(left.root, &right.ast, right.root));

    right
        .ast
        .set_attribute(right.leaves[3], "value", Value::Integer(40))
        .unwrap();
    assert!(!left.ast.subtree_eq(left.root, &right.ast, right.root));
}

#[test]
fn test_debug_print_nests_children() {
    let fixture = fixture();
    let printed = fixture
        .ast
        .debug_print(fixture.first, &DebugPrintConfiguration::default());
    assert!(printed.starts_with("Group {\n"));
    assert!(printed.contains("name = first"));
    assert!(printed.contains("Leaf {"));
    assert!(printed.contains("value = 1"));
}
