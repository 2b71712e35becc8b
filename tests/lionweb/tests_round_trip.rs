//! Trees through LionWeb nodes and JSON chunks and back.

#![allow(clippy::unwrap_used)]

use kolasu::lionweb::{LanguageConverter, LwNodeId, ModelConverter, ast_node_range};
use kolasu::{Ast, NodeId, ReferenceByName};

use crate::helpers::*;

fn converter() -> ModelConverter {
    let mut languages = LanguageConverter::new();
    languages.export_metamodel(&metamodel()).unwrap();
    ModelConverter::new(languages)
}

/// The sample tree with a trailing reference to `first`.
fn fixture_with_reference() -> (Fixture, NodeId) {
    let mut fixture = fixture();
    let reference = fixture
        .ast
        .add(Ref {
            target: Some(ReferenceByName::resolved("first", fixture.first)),
        })
        .unwrap();
    fixture
        .ast
        .add_to_containment(fixture.root, "children", reference)
        .unwrap();
    (fixture, reference)
}

const ROOT: &str = "UNKNOWN_SOURCE_root";

#[test]
fn test_export_ids_and_ranges() {
    let (fixture, _) = fixture_with_reference();
    let model = converter().export_to_lionweb(&fixture.ast, fixture.root).unwrap();
    assert_eq!(model.len(), 11);

    let ids: Vec<&str> = model.nodes().map(|n| n.id.as_str()).collect();
    assert_eq!(ids[0], ROOT);
    assert!(ids.contains(&"UNKNOWN_SOURCE_root_children_2_children_children_1"));

    let four = model
        .get(&"UNKNOWN_SOURCE_root_children_2_children_children_1".into())
        .unwrap();
    assert_eq!(four.get_property_value(&ast_node_range()), Some("L6:6-L6:7"));
    assert_eq!(
        four.parent,
        Some(LwNodeId::from("UNKNOWN_SOURCE_root_children_2_children"))
    );
    assert_eq!(model.roots().count(), 1);
}

#[test]
fn test_import_rebuilds_an_equal_tree() {
    let (fixture, _) = fixture_with_reference();
    let converter = converter();
    let model = converter.export_to_lionweb(&fixture.ast, fixture.root).unwrap();

    let mut imported = Ast::new(metamodel());
    let root = converter
        .import_from_lionweb(&model, &ROOT.into(), &mut imported)
        .unwrap();
    assert!(fixture.ast.subtree_eq(fixture.root, &imported, root));
    let walked = labels(&imported, imported.walk(root));
    assert_eq!(walked[..10], ["root", "first", "1", "2", "big", "small", "3", "4", "5", "6"]);
    assert_eq!(imported.node_type(imported.children(root)[4]), "fixture.Ref");
    for (original, copy) in fixture.ast.walk(fixture.root).zip(imported.walk(root)) {
        assert_eq!(fixture.ast.range(original), imported.range(copy));
    }
    assert!(imported.has_valid_parents(root));
}

#[test]
fn test_imported_reference_points_into_the_copy() {
    let (fixture, _) = fixture_with_reference();
    let converter = converter();
    let model = converter.export_to_lionweb(&fixture.ast, fixture.root).unwrap();

    let mut imported = Ast::new(metamodel());
    let root = converter
        .import_from_lionweb(&model, &ROOT.into(), &mut imported)
        .unwrap();
    let children = imported.children(root);
    let target = imported.get::<Ref>(children[4]).unwrap().target.clone().unwrap();
    assert_eq!(target.name, "first");
    assert_eq!(target.referred, Some(children[0]));
}

#[test]
fn test_re_export_reproduces_the_model() {
    let (fixture, _) = fixture_with_reference();
    let converter = converter();
    let model = converter.export_to_lionweb(&fixture.ast, fixture.root).unwrap();
    let mut imported = Ast::new(metamodel());
    let root = converter
        .import_from_lionweb(&model, &ROOT.into(), &mut imported)
        .unwrap();
    assert_eq!(converter.export_to_lionweb(&imported, root).unwrap(), model);
}

#[test]
fn test_importing_a_subtree() {
    let (fixture, _) = fixture_with_reference();
    let converter = converter();
    let model = converter.export_to_lionweb(&fixture.ast, fixture.root).unwrap();
    let mut imported = Ast::new(metamodel());
    let big = converter
        .import_from_lionweb(&model, &"UNKNOWN_SOURCE_root_children_2".into(), &mut imported)
        .unwrap();
    assert!(fixture.ast.subtree_eq(fixture.big, &imported, big));
    assert_eq!(imported.len(), 5);
}

#[cfg(feature = "json")]
mod json {
    use kolasu::lionweb::json;

    use super::*;

    #[test]
    fn test_json_round_trip() {
        let (fixture, _) = fixture_with_reference();
        let converter = converter();
        let model = converter.export_to_lionweb(&fixture.ast, fixture.root).unwrap();

        let text = json::serialize(&model).unwrap();
        let read = json::deserialize(&text).unwrap();
        assert_eq!(read, model);

        let mut imported = Ast::new(metamodel());
        let root = converter
            .import_from_lionweb(&read, &ROOT.into(), &mut imported)
            .unwrap();
        assert!(fixture.ast.subtree_eq(fixture.root, &imported, root));
    }

    #[test]
    fn test_json_names_languages_and_reference_targets() {
        let (fixture, _) = fixture_with_reference();
        let model = converter().export_to_lionweb(&fixture.ast, fixture.root).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json::serialize(&model).unwrap()).unwrap();

        let languages = value["languages"].as_array().unwrap();
        assert!(languages.contains(&serde_json::json!({ "key": "fixture", "version": "1" })));
        assert!(languages.contains(&serde_json::json!({ "key": "com_strumenta_starlasu", "version": "1" })));

        let reference = value["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|node| node["id"] == "UNKNOWN_SOURCE_root_children_4")
            .unwrap();
        assert_eq!(reference["references"][0]["targets"][0]["resolveInfo"], "first");
        assert_eq!(
            reference["references"][0]["targets"][0]["reference"],
            "UNKNOWN_SOURCE_root_children"
        );
    }
}
