//! Lazy tree traversals.
//!
//! Every method returns a fresh iterator borrowing the [`Ast`]; iterators are
//! consumed once. Children are enumerated through non-derived containments in
//! declaration order.
//!
//! | Method | Order |
//! |--------|-------|
//! | [`Ast::walk`] | pre-order, parents before descendants |
//! | [`Ast::walk_leaves_first`] | post-order, descendants before parents |
//! | [`Ast::walk_within`] | maximal subtrees inside a range |
//! | [`Ast::walk_ancestors`] | parent chain, nearest first |
//! | [`Ast::walk_descendants`] | pre-order without the root |
//!
//! [`Ast::search_by_range`] and [`Ast::search_by_position`] return the chain of
//! nodes leading to the innermost node covering a range or a point.

mod relations;

use crate::base::{Point, Range};
use crate::model::{Ast, NodeId, NodeKind};

// ============================================================================
// ITERATORS
// ============================================================================

/// Depth-first pre-order traversal.
pub struct Walk<'a> {
    ast: &'a Ast,
    stack: Vec<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack.extend(self.ast.children(node).into_iter().rev());
        Some(node)
    }
}

/// Depth-first post-order traversal.
pub struct WalkLeavesFirst<'a> {
    ast: &'a Ast,
    /// Sibling lists from the root level down, each with the index of the
    /// sibling being visited.
    levels: Vec<(Vec<NodeId>, usize)>,
}

impl Iterator for WalkLeavesFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let (siblings, cursor) = self.levels.last_mut()?;
            if let Some(&node) = siblings.get(*cursor) {
                let children = self.ast.children(node);
                if children.is_empty() {
                    *cursor += 1;
                    return Some(node);
                }
                self.levels.push((children, 0));
            } else {
                self.levels.pop();
                let (siblings, cursor) = self.levels.last_mut()?;
                let node = siblings[*cursor];
                *cursor += 1;
                return Some(node);
            }
        }
    }
}

/// Subtrees whose range lies within a query range.
pub struct WalkWithin<'a> {
    ast: &'a Ast,
    range: Range,
    /// Pending nodes, flagged when already known to be inside the range.
    stack: Vec<(NodeId, bool)>,
}

impl Iterator for WalkWithin<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some((node, inside)) = self.stack.pop() {
            if inside {
                self.push_children(node, true);
                return Some(node);
            }
            let Some(node_range) = self.ast.range(node) else {
                continue;
            };
            if self.range.contains(&node_range) {
                self.push_children(node, true);
                return Some(node);
            }
            if node_range.overlaps(&self.range) {
                self.push_children(node, false);
            }
        }
        None
    }
}

impl WalkWithin<'_> {
    fn push_children(&mut self, node: NodeId, inside: bool) {
        self.stack
            .extend(self.ast.children(node).into_iter().rev().map(|c| (c, inside)));
    }
}

/// Parent chain of a node.
pub struct WalkAncestors<'a> {
    ast: &'a Ast,
    current: Option<NodeId>,
}

impl Iterator for WalkAncestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.ast.parent(self.current?);
        self.current = node;
        node
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

impl Ast {
    pub fn walk(&self, root: NodeId) -> Walk<'_> {
        Walk {
            ast: self,
            stack: vec![root],
        }
    }

    pub fn walk_leaves_first(&self, root: NodeId) -> WalkLeavesFirst<'_> {
        WalkLeavesFirst {
            ast: self,
            levels: vec![(vec![root], 0)],
        }
    }

    /// Yields every maximal subtree of `root` whose range is contained in `range`.
    ///
    /// Nodes that merely overlap the range are not yielded but their children
    /// are still searched. Nodes disjoint from the range are pruned without
    /// visiting their descendants, as are nodes without a range.
    pub fn walk_within(&self, root: NodeId, range: Range) -> WalkWithin<'_> {
        WalkWithin {
            ast: self,
            range,
            stack: vec![(root, false)],
        }
    }

    /// Parents of `node`, nearest first. Empty when parents were never assigned.
    pub fn walk_ancestors(&self, node: NodeId) -> WalkAncestors<'_> {
        WalkAncestors {
            ast: self,
            current: Some(node),
        }
    }

    pub fn walk_descendants(&self, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.walk(root).skip(1)
    }

    // ── Search ──────────────────────────────────────────────────────

    /// Path from `root` down to the innermost node whose range contains `range`.
    ///
    /// Only the first child subtree with a match is followed. With
    /// `self_contained` set, subtrees whose root does not contain `range` are
    /// skipped; otherwise every subtree is searched and the path may start with
    /// nodes that do not themselves contain `range`.
    pub fn search_by_range(&self, root: NodeId, range: &Range, self_contained: bool) -> Vec<NodeId> {
        let mut path = Vec::new();
        self.search_covering(root, &|r: &Range| r.contains(range), self_contained, &mut path);
        path
    }

    /// The innermost node of the subtree containing `range`.
    pub fn find_by_range(&self, root: NodeId, range: &Range, self_contained: bool) -> Option<NodeId> {
        self.search_by_range(root, range, self_contained).pop()
    }

    /// Same as [`Ast::search_by_range`] for a single point.
    pub fn search_by_position(&self, root: NodeId, point: Point, self_contained: bool) -> Vec<NodeId> {
        let mut path = Vec::new();
        self.search_covering(root, &|r: &Range| r.contains_point(point), self_contained, &mut path);
        path
    }

    pub fn find_by_position(&self, root: NodeId, point: Point, self_contained: bool) -> Option<NodeId> {
        self.search_by_position(root, point, self_contained).pop()
    }

    /// Pushes the matching path under `node` onto `path`, returning whether
    /// anything matched.
    fn search_covering(
        &self,
        node: NodeId,
        covers: &dyn Fn(&Range) -> bool,
        self_contained: bool,
        path: &mut Vec<NodeId>,
    ) -> bool {
        let contains = self.range(node).is_some_and(|r| covers(&r));
        if self_contained && !contains {
            return false;
        }
        path.push(node);
        for child in self.children(node) {
            if self.search_covering(child, covers, self_contained, path) {
                return true;
            }
        }
        if !contains {
            path.pop();
        }
        contains
    }


    /// First node of the subtree, in pre-order, matching `predicate`.
    pub fn find(&self, root: NodeId, mut predicate: impl FnMut(&Ast, NodeId) -> bool) -> Option<NodeId> {
        self.walk(root).find(|node| predicate(self, *node))
    }

    /// Nodes of the subtree that are instances of `type_name`, which may be a role.
    pub fn collect_by_type(&self, root: NodeId, type_name: &str) -> Vec<NodeId> {
        self.walk(root)
            .filter(|node| self.is_instance_of(*node, type_name))
            .collect()
    }

    /// Typed view of the nodes of kind `T` in the subtree.
    pub fn nodes_of_kind<T: NodeKind>(&self, root: NodeId) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        self.walk(root)
            .filter_map(|node| self.get::<T>(node).map(|data| (node, data)))
    }

    pub fn find_ancestor_of_type(&self, node: NodeId, type_name: &str) -> Option<NodeId> {
        self.walk_ancestors(node)
            .find(|ancestor| self.is_instance_of(*ancestor, type_name))
    }

    /// Runs `operation` on each instance of `type_name` in the subtree.
    ///
    /// Targets are collected before the first call, so `operation` may edit the tree.
    pub fn process_nodes_of_type<E>(
        &mut self,
        root: NodeId,
        type_name: &str,
        mut operation: impl FnMut(&mut Ast, NodeId) -> Result<(), E>,
    ) -> Result<(), E> {
        for node in self.collect_by_type(root, type_name) {
            operation(self, node)?;
        }
        Ok(())
    }

    /// Checks every node of the subtree was registered under the right parent.
    pub fn has_valid_parents(&self, root: NodeId) -> bool {
        self.walk(root)
            .all(|node| self.children(node).iter().all(|child| self.parent(*child) == Some(node)))
    }

    /// Nodes without a range, or whose range leaks outside their parent's.
    pub fn invalid_ranges(&self, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.walk(root).filter(|node| match self.range(*node) {
            None => true,
            Some(range) => self
                .parent(*node)
                .and_then(|parent| self.range(parent))
                .is_some_and(|parent_range| {
                    !(parent_range.contains_point(range.start) && parent_range.contains_point(range.end))
                }),
        })
    }

    pub fn find_invalid_range(&self, root: NodeId) -> Option<NodeId> {
        self.invalid_ranges(root).next()
    }
}
