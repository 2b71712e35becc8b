#![allow(clippy::unwrap_used)]

use kolasu::Source;
use kolasu::ids::{IdError, NodeIdProvider, SequentialIdProvider, StructuralIdProvider, UuidIdProvider};

use crate::helpers::*;

#[test]
fn test_structural_ids_follow_containment() {
    let mut fixture = fixture();
    fixture.ast.set_source(fixture.root, Some(Source::file("src/main.x")));
    let mut ids = StructuralIdProvider::default();
    let id = |ids: &mut StructuralIdProvider, node| ids.id(&fixture.ast, node).unwrap();

    assert_eq!(id(&mut ids, fixture.root), "file_src-main-x_root");
    assert_eq!(id(&mut ids, fixture.first), "file_src-main-x_root_children");
    assert_eq!(id(&mut ids, fixture.leaves[0]), "file_src-main-x_root_children_children");
    assert_eq!(id(&mut ids, fixture.leaves[1]), "file_src-main-x_root_children_1");
    assert_eq!(id(&mut ids, fixture.leaves[3]), "file_src-main-x_root_children_2_children_children_1");
}

#[test]
fn test_root_without_source_fails() {
    let fixture = fixture();
    let result = StructuralIdProvider::default().id(&fixture.ast, fixture.small);
    assert!(matches!(result, Err(IdError::SourceNotSet(_))));
}

#[test]
fn test_descendants_build_on_existing_identifiers() {
    let mut fixture = fixture();
    fixture.ast.set_identifier(fixture.big, Some("big-one".into()));
    let mut ids = StructuralIdProvider::with_source_id("unused");
    assert_eq!(ids.id(&fixture.ast, fixture.leaves[4]).unwrap(), "big-one_children_children_2");
}

#[test]
fn test_assign_ids_stores_identifiers() {
    let mut fixture = fixture();
    fixture
        .ast
        .assign_ids(fixture.root, &mut SequentialIdProvider::new())
        .unwrap();
    let assigned: Vec<&str> = fixture
        .ast
        .walk(fixture.root)
        .map(|node| fixture.ast.identifier(node).unwrap())
        .collect();
    assert_eq!(assigned, vec!["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]);
}

#[test]
fn test_uuid_ids_are_stable_per_node() {
    let fixture = fixture();
    let mut ids = UuidIdProvider::new();
    let first = ids.id(&fixture.ast, fixture.first).unwrap();
    assert_eq!(ids.id(&fixture.ast, fixture.first).unwrap(), first);
    assert_ne!(ids.id(&fixture.ast, fixture.big).unwrap(), first);
    assert_eq!(first.len(), 36);
}
