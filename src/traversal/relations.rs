//! Position of a node among its parent's children.

use crate::model::{Ast, FeatureDescriptor, ModelError, NodeId};

impl Ast {
    /// The parent's containment holding `node`, `None` for roots.
    ///
    /// A parent that does not list the node in any containment is an error.
    pub fn containing_containment(&self, node: NodeId) -> Result<Option<&FeatureDescriptor>, ModelError> {
        let Some(parent) = self.parent(node) else {
            return Ok(None);
        };
        let node_type = self.node_type_info(parent);
        for containment in node_type.containments() {
            if self.get_children(parent, containment.name)?.contains(&node) {
                return Ok(Some(containment));
            }
        }
        Err(ModelError::ChildNotFound {
            child: self.describe(node),
            parent: self.describe(parent),
            scope: "containment",
        })
    }

    /// Index of `node` inside its containing feature, `None` for roots.
    pub fn index_in_containing_feature(&self, node: NodeId) -> Result<Option<usize>, ModelError> {
        let Some(containment) = self.containing_containment(node)? else {
            return Ok(None);
        };
        let Some(parent) = self.parent(node) else {
            return Ok(None);
        };
        Ok(self
            .get_children(parent, containment.name)?
            .iter()
            .position(|child| *child == node))
    }

    /// The next node among all of the parent's children, optionally restricted
    /// to instances of `type_name`.
    pub fn next_sibling(&self, node: NodeId, type_name: Option<&str>) -> Option<NodeId> {
        let siblings = self.siblings(node, type_name);
        let index = siblings.iter().position(|sibling| *sibling == node)?;
        siblings.get(index + 1).copied()
    }

    pub fn previous_sibling(&self, node: NodeId, type_name: Option<&str>) -> Option<NodeId> {
        let siblings = self.siblings(node, type_name);
        let index = siblings.iter().position(|sibling| *sibling == node)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    /// The parent's children, keeping `node` itself regardless of the filter.
    fn siblings(&self, node: NodeId, type_name: Option<&str>) -> Vec<NodeId> {
        let Some(parent) = self.parent(node) else {
            return Vec::new();
        };
        self.children(parent)
            .into_iter()
            .filter(|child| *child == node || type_name.is_none_or(|t| self.is_instance_of(*child, t)))
            .collect()
    }
}
