#![allow(clippy::unwrap_used)]

use kolasu::transform::TransformOptions;
use kolasu::{Ast, ModelError, NodeId};

use crate::helpers::*;

/// Replaces every group with an upper-cased copy, keeping its range.
fn shout(ast: &mut Ast, node: NodeId) -> Result<NodeId, ModelError> {
    let Some(group) = ast.get::<Group>(node).cloned() else {
        return Ok(node);
    };
    let range = ast.range(node);
    let renamed = ast.add(Group {
        name: group.name.to_uppercase(),
        children: group.children,
    })?;
    ast.set_range(renamed, range);
    Ok(renamed)
}

#[test]
fn test_identity_returns_the_same_tree() {
    let mut fixture = fixture();
    let before = fixture.ast.len();
    let result = fixture
        .ast
        .transform_tree(fixture.root, |_, node| Ok(node), TransformOptions::default())
        .unwrap();
    assert_eq!(result, fixture.root);
    assert_eq!(fixture.ast.len(), before);
    assert_eq!(fixture.ast.walk(result).count(), 10);
}

#[test]
fn test_rename_everywhere() {
    let mut fixture = fixture();
    let mut visits = 0;
    let result = fixture
        .ast
        .transform_tree(
            fixture.root,
            |ast, node| {
                visits += 1;
                shout(ast, node)
            },
            TransformOptions::default(),
        )
        .unwrap();

    assert_eq!(visits, 10);
    assert_eq!(
        labels(&fixture.ast, fixture.ast.walk(result)),
        vec!["ROOT", "FIRST", "1", "2", "BIG", "SMALL", "3", "4", "5", "6"]
    );
    assert_eq!(fixture.ast.range(result), fixture.ast.range(fixture.root));
    assert!(fixture.ast.has_valid_parents(result));
    assert_eq!(fixture.ast.get::<Group>(fixture.root).unwrap().name, "root");
}

#[test]
fn test_unchanged_leaves_are_shared() {
    let mut fixture = fixture();
    let result = fixture
        .ast
        .transform_tree(fixture.root, shout, TransformOptions::default())
        .unwrap();
    let leaves: Vec<NodeId> = fixture.ast.nodes_of_kind::<Leaf>(result).map(|(id, _)| id).collect();
    assert_eq!(leaves, fixture.leaves);
}

#[test]
fn test_operation_sees_rebuilt_parent() {
    let mut fixture = fixture();
    let small = fixture.small;
    let mut seen_small_children = Vec::new();
    fixture
        .ast
        .transform_tree(
            fixture.root,
            |ast, node| {
                if let Some(leaf) = ast.get::<Leaf>(node) {
                    if leaf.value == 4 {
                        return ast.add(Leaf { value: 44 });
                    }
                }
                if ast.get::<Group>(node).is_some_and(|g| g.name == "small") {
                    assert_ne!(node, small);
                    seen_small_children = labels(ast, ast.children(node));
                }
                Ok(node)
            },
            TransformOptions::default(),
        )
        .unwrap();
    assert_eq!(seen_small_children, vec!["3", "44", "5"]);
}

#[test]
fn test_original_tree_keeps_its_parents() {
    let mut fixture = fixture();
    let result = fixture
        .ast
        .transform_tree(
            fixture.root,
            |ast, node| match ast.get::<Leaf>(node).map(|leaf| leaf.value) {
                Some(4) => ast.add(Leaf { value: 44 }),
                _ => Ok(node),
            },
            TransformOptions::default(),
        )
        .unwrap();

    assert!(fixture.ast.has_valid_parents(fixture.root));
    assert_eq!(
        labels(&fixture.ast, fixture.ast.children(fixture.small)),
        vec!["3", "4", "5"]
    );
    assert_eq!(fixture.ast.parent(fixture.leaves[2]), Some(fixture.small));
    assert_eq!(
        labels(&fixture.ast, fixture.ast.walk(result)),
        vec!["root", "first", "1", "2", "big", "small", "3", "44", "5", "6"]
    );

    fixture.ast.assign_parents(result).unwrap();
    assert!(fixture.ast.has_valid_parents(result));
}

#[test]
fn test_structurally_equal_results_keep_the_original() {
    let mut fixture = fixture();
    let result = fixture
        .ast
        .transform_tree(
            fixture.root,
            |ast, node| match ast.get::<Leaf>(node).cloned() {
                Some(leaf) => ast.add(leaf),
                None => Ok(node),
            },
            TransformOptions::default(),
        )
        .unwrap();
    assert_eq!(result, fixture.root);
}

#[test]
fn test_in_place_is_rejected() {
    let mut fixture = fixture();
    let result = fixture.ast.transform_tree(
        fixture.root,
        |_, node| Ok(node),
        TransformOptions::default().with_in_place(true),
    );
    assert!(matches!(result, Err(ModelError::Unsupported(_))));
}

// ============================================================================
// ONE LEVEL
// ============================================================================

#[test]
fn test_map_children_rebuilds_only_on_change() {
    let mut fixture = fixture();
    let same = fixture.ast.map_children(fixture.small, |_, child| Ok(child)).unwrap();
    assert_eq!(same, fixture.small);

    let doubled = fixture
        .ast
        .map_children(fixture.small, |ast, child| {
            let value = ast.get::<Leaf>(child).unwrap().value;
            ast.add(Leaf { value: value * 2 })
        })
        .unwrap();
    assert_ne!(doubled, fixture.small);
    assert_eq!(labels(&fixture.ast, fixture.ast.children(doubled)), vec!["6", "8", "10"]);
    assert_eq!(fixture.ast.range(doubled), fixture.ast.range(fixture.small));
}

#[test]
fn test_transform_children_writes_back() {
    let mut fixture = fixture();
    fixture
        .ast
        .transform_children(fixture.root, |ast, child| match ast.get::<Leaf>(child) {
            Some(_) => ast.add(Leaf { value: 0 }),
            None => Ok(child),
        })
        .unwrap();
    assert_eq!(
        labels(&fixture.ast, fixture.ast.children(fixture.root)),
        vec!["first", "0", "big", "0"]
    );
    assert_eq!(fixture.ast.parent(fixture.leaves[1]), None);
    assert!(fixture.ast.has_valid_parents(fixture.root));
}
