#![allow(clippy::unwrap_used)]

use kolasu::lionweb::{LanguageConverter, LwFeatureKind, ast_node, integer_type, string_type};

use crate::helpers::*;

#[test]
fn test_fixture_language_shape() {
    let mut converter = LanguageConverter::new();
    let language = converter.export_metamodel(&metamodel()).unwrap();
    assert_eq!(language.key, "fixture");
    assert_eq!(language.id, "starlasu_language_fixture");

    let group = language.classifier("fixture_Group").unwrap();
    assert!(group.is_concept());
    assert!(!group.is_abstract());
    assert_eq!(group.supertypes(), vec![&ast_node()]);

    let name = group.feature("name").unwrap();
    assert_eq!(name.kind, LwFeatureKind::Property);
    assert_eq!(name.feature_type, string_type());
    assert!(!name.optional);
    assert_eq!(name.key, "fixture_Group_name");

    let children = group.feature("children").unwrap();
    assert_eq!(children.kind, LwFeatureKind::Containment);
    assert!(children.multiple);
    assert!(children.optional);

    let value = language.classifier("fixture_Leaf").unwrap().feature("value").unwrap();
    assert_eq!(value.feature_type, integer_type());

    let target = language.classifier("fixture_Ref").unwrap().feature("target").unwrap();
    assert_eq!(target.kind, LwFeatureKind::Reference);
    assert!(target.optional);
    assert!(!target.multiple);
    assert_eq!(target.feature_type.key, "fixture_Group");
}

#[test]
fn test_node_types_map_both_ways() {
    let mut converter = LanguageConverter::new();
    converter.export_metamodel(&metamodel()).unwrap();
    let pointer = converter.corresponding_classifier("fixture.Leaf").unwrap().clone();
    assert_eq!(pointer.key, "fixture_Leaf");
    assert_eq!(converter.corresponding_node_type(&pointer).unwrap(), "fixture.Leaf");
}
