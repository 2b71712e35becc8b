//! In-place list editing with parent bookkeeping.

#![allow(clippy::unwrap_used)]

use kolasu::{Ast, ModelError, NodeId, Range};

use crate::helpers::*;

/// `list(a, b, c)` plus two loose leaves `x` and `y`.
struct Lists {
    ast: Ast,
    list: NodeId,
    a: NodeId,
    b: NodeId,
    c: NodeId,
    x: NodeId,
    y: NodeId,
}

fn lists() -> Lists {
    let mut ast = Ast::new(metamodel());
    fn named(ast: &mut Ast, value: i64) -> NodeId {
        leaf(ast, value, Range::from_coords(1, 0, 1, 1))
    }
    let a = named(&mut ast, 1);
    let b = named(&mut ast, 2);
    let c = named(&mut ast, 3);
    let x = named(&mut ast, 10);
    let y = named(&mut ast, 20);
    let list = group(&mut ast, "list", vec![a, b, c], Range::from_coords(1, 0, 3, 0));
    Lists { ast, list, a, b, c, x, y }
}

fn items(lists: &Lists) -> Vec<NodeId> {
    lists.ast.get::<Group>(lists.list).unwrap().children.clone()
}

#[test]
fn test_replace_with_several() {
    let mut l = lists();
    l.ast.replace_with_several(l.b, &[l.x, l.y]).unwrap();
    assert_eq!(items(&l), vec![l.a, l.x, l.y, l.c]);
    assert_eq!(l.ast.parent(l.x), Some(l.list));
    assert_eq!(l.ast.parent(l.y), Some(l.list));
    assert_eq!(l.ast.parent(l.b), None);
}

#[test]
fn test_replace_detached_node_fails() {
    let mut l = lists();
    l.ast.replace_with_several(l.b, &[l.x]).unwrap();
    let result = l.ast.replace_with_several(l.b, &[l.y]);
    assert!(matches!(result, Err(ModelError::ParentNotSet(_))));
    assert_eq!(items(&l), vec![l.a, l.x, l.c]);
}

#[test]
fn test_replace_root_fails() {
    let mut l = lists();
    let result = l.ast.replace_with(l.list, l.x);
    assert!(matches!(result, Err(ModelError::ParentNotSet(_))));
}

#[test]
fn test_replace_with_keeps_position() {
    let mut l = lists();
    l.ast.replace_with(l.c, l.x).unwrap();
    assert_eq!(items(&l), vec![l.a, l.b, l.x]);
    assert_eq!(l.ast.parent(l.c), None);
}

#[test]
fn test_add_several_before_and_after() {
    let mut l = lists();
    l.ast.add_several_before(l.a, &[l.x]).unwrap();
    l.ast.add_several_after(l.c, &[l.y]).unwrap();
    assert_eq!(items(&l), vec![l.x, l.a, l.b, l.c, l.y]);
    assert!(l.ast.has_valid_parents(l.list));
}

#[test]
fn test_remove_from_list() {
    let mut l = lists();
    l.ast.remove_from_list(l.a).unwrap();
    assert_eq!(items(&l), vec![l.b, l.c]);
    assert_eq!(l.ast.parent(l.a), None);
}

#[test]
fn test_detach_leaves_roots_alone() {
    let mut l = lists();
    l.ast.detach(l.list).unwrap();
    l.ast.detach(l.b).unwrap();
    assert_eq!(items(&l), vec![l.a, l.c]);
    assert_eq!(l.ast.parent(l.b), None);
}
