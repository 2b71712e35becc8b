//! Structural transformations.
//!
//! Two families of operations live here:
//!
//! - **Rebuilding** ([`Ast::transform_tree`], [`Ast::map_children`]): nodes are
//!   never modified; a node whose children change is rebuilt through its
//!   type's constructor into a new node, unchanged subtrees are shared and
//!   keep their original parent.
//! - **Editing** ([`Ast::replace_with`], the list splicing helpers,
//!   [`Ast::detach`]): containments of existing nodes are rewritten, and
//!   parent pointers follow.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::model::{Ast, FeatureValues, ModelError, NodeId, Value};

/// Options for [`Ast::transform_tree`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TransformOptions {
    /// Rewrite the existing nodes instead of building new ones. Not supported.
    pub in_place: bool,
}

impl TransformOptions {
    pub fn with_in_place(mut self, in_place: bool) -> Self {
        self.in_place = in_place;
        self
    }
}

/// Node transformations memoized by node identity.
struct TreeTransformer<F> {
    operation: F,
    results: FxHashMap<NodeId, NodeId>,
    in_progress: FxHashSet<NodeId>,
}

impl<F> TreeTransformer<F>
where
    F: FnMut(&mut Ast, NodeId) -> Result<NodeId, ModelError>,
{
    fn transform(&mut self, ast: &mut Ast, node: NodeId) -> Result<NodeId, ModelError> {
        if let Some(result) = self.results.get(&node) {
            return Ok(*result);
        }
        if !self.in_progress.insert(node) {
            return Err(ModelError::ContainmentCycle(ast.describe(node)));
        }

        let changes = ast.child_changes(node, |ast, child| self.transform(ast, child))?;
        let instance = if changes.is_empty() {
            node
        } else {
            ast.rebuild(node, changes)?
        };
        let result = (self.operation)(ast, instance)?;

        self.in_progress.remove(&node);
        self.results.insert(node, result);
        Ok(result)
    }
}

impl Ast {
    /// Applies `operation` bottom-up to every node of the tree rooted at `root`.
    ///
    /// Children are transformed before their parent. A node is rebuilt when the
    /// result for one of its children is not structurally equal to the child,
    /// then `operation` receives the rebuilt node; otherwise it receives the
    /// original. The operation runs once per node, and a subtree reachable
    /// twice reuses its first result. Returns the result for `root`.
    ///
    /// Unchanged subtrees are shared with the original tree and keep their
    /// parent there, so the original stays consistent. Run
    /// [`Ast::assign_parents`] on the result to move them under the new tree.
    pub fn transform_tree<F>(&mut self, root: NodeId, operation: F, options: TransformOptions) -> Result<NodeId, ModelError>
    where
        F: FnMut(&mut Ast, NodeId) -> Result<NodeId, ModelError>,
    {
        if options.in_place {
            return Err(ModelError::Unsupported("in-place tree transformation"));
        }
        let mut transformer = TreeTransformer {
            operation,
            results: FxHashMap::default(),
            in_progress: FxHashSet::default(),
        };
        let result = transformer.transform(self, root)?;
        trace!(root = %root, result = %result, visited = transformer.results.len(), "transformed tree");
        Ok(result)
    }

    /// Applies `operation` to each direct child of `node`.
    ///
    /// Returns `node` when every result is structurally equal to the child it
    /// replaces, a rebuilt node otherwise.
    pub fn map_children<F>(&mut self, node: NodeId, mut operation: F) -> Result<NodeId, ModelError>
    where
        F: FnMut(&mut Ast, NodeId) -> Result<NodeId, ModelError>,
    {
        let changes = self.child_changes(node, &mut operation)?;
        if changes.is_empty() {
            return Ok(node);
        }
        self.rebuild(node, changes)
    }

    /// Replaces the children of `node` in place with the results of `operation`.
    ///
    /// Only results that are different nodes are written back.
    pub fn transform_children<F>(&mut self, node: NodeId, mut operation: F) -> Result<(), ModelError>
    where
        F: FnMut(&mut Ast, NodeId) -> Result<NodeId, ModelError>,
    {
        let node_type = Arc::clone(self.node_type_info(node));
        for containment in node_type.containments() {
            let children = self.get_children(node, containment.name)?;
            let mut replaced = Vec::with_capacity(children.len());
            for child in &children {
                replaced.push(operation(self, *child)?);
            }
            if replaced == children {
                continue;
            }
            let value = if containment.is_many() {
                Value::Nodes(replaced)
            } else {
                replaced.first().map_or(Value::Null, |child| Value::Node(*child))
            };
            self.set_feature(node, containment.name, value)?;
        }
        Ok(())
    }

    /// Transformed values of the containments whose children changed.
    fn child_changes<F>(&mut self, node: NodeId, mut operation: F) -> Result<IndexMap<&'static str, Value>, ModelError>
    where
        F: FnMut(&mut Ast, NodeId) -> Result<NodeId, ModelError>,
    {
        let node_type = Arc::clone(self.node_type_info(node));
        let mut changes = IndexMap::new();
        for containment in node_type.containments() {
            let children = self.get_children(node, containment.name)?;
            let mut changed = false;
            let mut results = Vec::with_capacity(children.len());
            for child in children {
                let result = operation(self, child)?;
                changed |= result != child && !self.structurally_equal(child, result);
                results.push(result);
            }
            if !changed {
                continue;
            }
            let value = if containment.is_many() {
                Value::Nodes(results)
            } else {
                results.first().map_or(Value::Null, |child| Value::Node(*child))
            };
            changes.insert(containment.name, value);
        }
        Ok(changes)
    }

    /// A new node of the same type as `node`, with `changes` applied.
    ///
    /// The rebuilt node keeps the original's range, origin and source. It adopts
    /// the children it is built with that have no parent yet; unchanged
    /// children stay with `node`.
    fn rebuild(&mut self, node: NodeId, changes: IndexMap<&'static str, Value>) -> Result<NodeId, ModelError> {
        let node_type = Arc::clone(self.node_type_info(node));
        let mut values: FeatureValues = node_type
            .features
            .iter()
            .map(|f| (f.name.to_string(), self.data(node).feature_value(f.name).unwrap_or(Value::Null)))
            .collect();
        for (name, value) in changes {
            values.insert(name.to_string(), value);
        }
        let data = node_type.construct(values).map_err(|source| ModelError::Construction {
            node_type: node_type.name.to_string(),
            source,
        })?;
        let rebuilt = self.add_boxed_sharing(data)?;
        self.set_range(rebuilt, self.range(node));
        self.set_source(rebuilt, self.source(node));
        self.set_origin(rebuilt, self.origin(node).cloned())?;
        trace!(original = %node, rebuilt = %rebuilt, node_type = node_type.name, "rebuilt node");
        Ok(rebuilt)
    }

    // ========================================================================
    // EDITING
    // ========================================================================

    /// Puts `other` in the place `node` occupies in its parent.
    ///
    /// Works on singular and list containments; the position in a list is kept.
    pub fn replace_with(&mut self, node: NodeId, other: NodeId) -> Result<(), ModelError> {
        let parent = self.require_parent(node)?;
        let node_type = Arc::clone(self.node_type_info(parent));
        for containment in node_type.containments() {
            let mut children = self.get_children(parent, containment.name)?;
            let Some(index) = children.iter().position(|child| *child == node) else {
                continue;
            };
            let value = if containment.is_many() {
                children[index] = other;
                Value::Nodes(children)
            } else {
                Value::Node(other)
            };
            return self.set_feature(parent, containment.name, value);
        }
        Err(ModelError::ChildNotFound {
            child: self.describe(node),
            parent: self.describe(parent),
            scope: "containment",
        })
    }

    /// Replaces `node` with `replacements` in its parent's list containment.
    pub fn replace_with_several(&mut self, node: NodeId, replacements: &[NodeId]) -> Result<(), ModelError> {
        self.splice_around(node, |list, index| {
            list.splice(index..=index, replacements.iter().copied());
        })
    }

    /// Inserts `additions` before `node` in its parent's list containment.
    pub fn add_several_before(&mut self, node: NodeId, additions: &[NodeId]) -> Result<(), ModelError> {
        self.splice_around(node, |list, index| {
            list.splice(index..index, additions.iter().copied());
        })
    }

    /// Inserts `additions` after `node` in its parent's list containment.
    pub fn add_several_after(&mut self, node: NodeId, additions: &[NodeId]) -> Result<(), ModelError> {
        self.splice_around(node, |list, index| {
            list.splice(index + 1..index + 1, additions.iter().copied());
        })
    }

    /// Removes `node` from its parent's list containment.
    pub fn remove_from_list(&mut self, node: NodeId) -> Result<(), ModelError> {
        self.splice_around(node, |list, index| {
            list.remove(index);
        })
    }

    /// Removes `node` from whatever containment of its parent holds it.
    ///
    /// Roots are left untouched. Emptying a mandatory containment fails.
    pub fn detach(&mut self, node: NodeId) -> Result<(), ModelError> {
        let Some(parent) = self.parent(node) else {
            return Ok(());
        };
        let Some(containment) = self.containing_containment(node)?.map(|c| c.name) else {
            return Ok(());
        };
        self.remove_from_containment(parent, containment, node)
    }

    fn require_parent(&self, node: NodeId) -> Result<NodeId, ModelError> {
        self.parent(node)
            .ok_or_else(|| ModelError::ParentNotSet(self.describe(node)))
    }

    /// Finds the list containment of the parent holding `node` and rewrites it.
    fn splice_around(&mut self, node: NodeId, edit: impl FnOnce(&mut Vec<NodeId>, usize)) -> Result<(), ModelError> {
        let parent = self.require_parent(node)?;
        let node_type = Arc::clone(self.node_type_info(parent));
        for containment in node_type.containments().filter(|c| c.is_many()) {
            let mut children = self.get_children(parent, containment.name)?;
            let Some(index) = children.iter().position(|child| *child == node) else {
                continue;
            };
            edit(&mut children, index);
            return self.set_feature(parent, containment.name, Value::Nodes(children));
        }
        Err(ModelError::ChildNotFound {
            child: self.describe(node),
            parent: self.describe(parent),
            scope: "list containment",
        })
    }
}
