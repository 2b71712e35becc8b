//! The sample tree used across suites.
//!
//! ```text
//!  1 root {
//!  2   first { 1 }
//!  3   2
//!  4   big {
//!  5     small { 3
//!  6       4
//!  7     5 }
//!  8   }
//!  9   6
//! 10 }
//! ```

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use kolasu::{Ast, Metamodel, NodeId, Range, ReferenceByName};

kolasu::node_type! {
    pub struct Leaf : "fixture.Leaf" {
        pub value: i64,
    }
}

kolasu::node_type! {
    pub struct Group : "fixture.Group" {
        pub name: String,
        pub children: Vec<NodeId>,
    }
}

kolasu::node_type! {
    /// Points at a group by name.
    pub struct Ref : "fixture.Ref" {
        pub target: Option<ReferenceByName> as "fixture.Group",
    }
}

pub fn metamodel() -> Arc<Metamodel> {
    let mut metamodel = Metamodel::new("fixture");
    metamodel
        .register::<Leaf>()
        .unwrap()
        .register::<Group>()
        .unwrap()
        .register::<Ref>()
        .unwrap();
    Arc::new(metamodel)
}

pub struct Fixture {
    pub ast: Ast,
    pub root: NodeId,
    pub first: NodeId,
    pub big: NodeId,
    pub small: NodeId,
    /// Leaves by value: `leaves[0]` holds 1.
    pub leaves: Vec<NodeId>,
}

pub fn leaf(ast: &mut Ast, value: i64, range: Range) -> NodeId {
    ast.add_with_range(Leaf { value }, range).unwrap()
}

pub fn group(ast: &mut Ast, name: &str, children: Vec<NodeId>, range: Range) -> NodeId {
    ast.add_with_range(
        Group {
            name: name.to_string(),
            children,
        },
        range,
    )
    .unwrap()
}

pub fn fixture() -> Fixture {
    let mut ast = Ast::new(metamodel());
    let one = leaf(&mut ast, 1, Range::from_coords(2, 10, 2, 11));
    let first = group(&mut ast, "first", vec![one], Range::from_coords(2, 2, 2, 13));
    let two = leaf(&mut ast, 2, Range::from_coords(3, 2, 3, 3));
    let three = leaf(&mut ast, 3, Range::from_coords(5, 12, 5, 13));
    let four = leaf(&mut ast, 4, Range::from_coords(6, 6, 6, 7));
    let five = leaf(&mut ast, 5, Range::from_coords(7, 4, 7, 5));
    let small = group(&mut ast, "small", vec![three, four, five], Range::from_coords(5, 4, 7, 7));
    let big = group(&mut ast, "big", vec![small], Range::from_coords(4, 2, 8, 3));
    let six = leaf(&mut ast, 6, Range::from_coords(9, 2, 9, 3));
    let root = group(&mut ast, "root", vec![first, two, big, six], Range::from_coords(1, 0, 10, 1));
    Fixture {
        ast,
        root,
        first,
        big,
        small,
        leaves: vec![one, two, three, four, five, six],
    }
}

/// Group name or leaf value.
pub fn label(ast: &Ast, node: NodeId) -> String {
    if let Some(group) = ast.get::<Group>(node) {
        return group.name.clone();
    }
    ast.get::<Leaf>(node)
        .map(|leaf| leaf.value.to_string())
        .unwrap_or_else(|| ast.describe(node))
}

pub fn labels(ast: &Ast, nodes: impl IntoIterator<Item = NodeId>) -> Vec<String> {
    nodes.into_iter().map(|node| label(ast, node)).collect()
}
