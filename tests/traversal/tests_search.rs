#![allow(clippy::unwrap_used)]

use crate::helpers::*;

#[test]
fn test_collect_by_type() {
    let fixture = fixture();
    assert_eq!(
        labels(&fixture.ast, fixture.ast.collect_by_type(fixture.root, "fixture.Group")),
        vec!["root", "first", "big", "small"]
    );
    assert!(fixture.ast.collect_by_type(fixture.root, "fixture.Ref").is_empty());
}

#[test]
fn test_nodes_of_kind_gives_typed_views() {
    let fixture = fixture();
    let values: Vec<i64> = fixture
        .ast
        .nodes_of_kind::<Leaf>(fixture.big)
        .map(|(_, leaf)| leaf.value)
        .collect();
    assert_eq!(values, vec![3, 4, 5]);
}

#[test]
fn test_find_first_match_in_pre_order() {
    let fixture = fixture();
    let found = fixture
        .ast
        .find(fixture.root, |ast, node| ast.get::<Leaf>(node).is_some_and(|l| l.value > 2));
    assert_eq!(found, Some(fixture.leaves[2]));
}

#[test]
fn test_find_ancestor_of_type() {
    let fixture = fixture();
    assert_eq!(
        fixture.ast.find_ancestor_of_type(fixture.leaves[0], "fixture.Group"),
        Some(fixture.first)
    );
    assert_eq!(fixture.ast.find_ancestor_of_type(fixture.root, "fixture.Group"), None);
}

#[test]
fn test_process_nodes_of_type_may_edit() {
    let mut fixture = fixture();
    fixture
        .ast
        .process_nodes_of_type(fixture.root, "fixture.Leaf", |ast, node| {
            let leaf = ast.get_mut::<Leaf>(node).unwrap();
            leaf.value *= 10;
            Ok::<_, kolasu::ModelError>(())
        })
        .unwrap();
    let values: Vec<i64> = fixture
        .ast
        .nodes_of_kind::<Leaf>(fixture.root)
        .map(|(_, leaf)| leaf.value)
        .collect();
    assert_eq!(values, vec![10, 20, 30, 40, 50, 60]);
}

#[test]
fn test_parents_are_consistent() {
    let fixture = fixture();
    assert!(fixture.ast.has_valid_parents(fixture.root));
}
