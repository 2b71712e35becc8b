//! Generic LionWeb nodes (the M1 level).
//!
//! ```text
//! LwModel
//! ├── nodes: IndexMap<LwNodeId, LwNode>  (insertion order)
//! └── each LwNode
//!     ├── classifier: MetaPointer
//!     ├── properties:   feature → serialized value
//!     ├── containments: feature → child ids
//!     └── references:   feature → [ReferenceValue]
//! ```
//!
//! Property values are kept in their serialized string form, so nodes of
//! languages this crate knows nothing about survive a read and write unchanged.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::error::ConversionError;
use super::language::MetaPointer;

// ============================================================================
// IDs
// ============================================================================

/// Identifier of a LionWeb node, unique within a model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LwNodeId(pub Arc<str>);

impl LwNodeId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LwNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LwNodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for LwNodeId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

// ============================================================================
// NODES
// ============================================================================

/// Target of a reference: a node id, a textual hint, or both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceValue {
    pub referred: Option<LwNodeId>,
    pub resolve_info: Option<String>,
}

impl ReferenceValue {
    pub fn new(referred: Option<LwNodeId>, resolve_info: Option<String>) -> Self {
        Self { referred, resolve_info }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LwNode {
    pub id: LwNodeId,
    pub classifier: MetaPointer,
    pub parent: Option<LwNodeId>,
    properties: IndexMap<MetaPointer, Option<String>>,
    containments: IndexMap<MetaPointer, Vec<LwNodeId>>,
    references: IndexMap<MetaPointer, Vec<ReferenceValue>>,
}

impl LwNode {
    pub fn new(id: impl Into<LwNodeId>, classifier: MetaPointer) -> Self {
        Self {
            id: id.into(),
            classifier,
            parent: None,
            properties: IndexMap::new(),
            containments: IndexMap::new(),
            references: IndexMap::new(),
        }
    }

    pub fn classifier(&self) -> &MetaPointer {
        &self.classifier
    }

    /// Serialized value of a property, `None` when unset or null.
    pub fn get_property_value(&self, property: &MetaPointer) -> Option<&str> {
        self.properties.get(property)?.as_deref()
    }

    pub fn set_property_value(&mut self, property: MetaPointer, value: Option<String>) {
        self.properties.insert(property, value);
    }

    pub fn properties(&self) -> impl Iterator<Item = (&MetaPointer, Option<&str>)> {
        self.properties.iter().map(|(k, v)| (k, v.as_deref()))
    }

    pub fn get_children(&self, containment: &MetaPointer) -> &[LwNodeId] {
        self.containments
            .get(containment)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn containments(&self) -> impl Iterator<Item = (&MetaPointer, &[LwNodeId])> {
        self.containments.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Children of every containment, in order.
    pub fn all_children(&self) -> impl Iterator<Item = &LwNodeId> {
        self.containments.values().flatten()
    }

    /// Declares a containment with no children yet, so it is serialized.
    pub fn ensure_containment(&mut self, containment: MetaPointer) {
        self.containments.entry(containment).or_default();
    }

    pub fn get_reference_values(&self, reference: &MetaPointer) -> &[ReferenceValue] {
        self.references
            .get(reference)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn add_reference_value(&mut self, reference: MetaPointer, value: ReferenceValue) {
        self.references.entry(reference).or_default().push(value);
    }

    /// Declares a reference with no targets yet, so it is serialized.
    pub fn ensure_reference(&mut self, reference: MetaPointer) {
        self.references.entry(reference).or_default();
    }

    pub fn references(&self) -> impl Iterator<Item = (&MetaPointer, &[ReferenceValue])> {
        self.references.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

// ============================================================================
// MODEL
// ============================================================================

/// A set of LionWeb nodes, typically one serialization chunk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LwModel {
    nodes: IndexMap<LwNodeId, LwNode>,
}

impl LwModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a node; ids must be unique.
    pub fn add_node(&mut self, node: LwNode) -> Result<(), ConversionError> {
        if self.nodes.contains_key(&node.id) {
            return Err(ConversionError::DuplicateNode(node.id.to_string()));
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub fn get(&self, id: &LwNodeId) -> Option<&LwNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &LwNodeId) -> Option<&mut LwNode> {
        self.nodes.get_mut(id)
    }

    fn require(&self, id: &LwNodeId) -> Result<&LwNode, ConversionError> {
        self.get(id)
            .ok_or_else(|| ConversionError::UnknownNode(id.to_string()))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &LwNode> {
        self.nodes.values()
    }

    /// Nodes without a parent inside this model.
    pub fn roots(&self) -> impl Iterator<Item = &LwNode> {
        self.nodes
            .values()
            .filter(|n| n.parent.as_ref().is_none_or(|p| !self.nodes.contains_key(p)))
    }

    /// Appends `child` to a containment of `parent` and records the parent.
    pub fn add_child(
        &mut self,
        parent: &LwNodeId,
        containment: MetaPointer,
        child: &LwNodeId,
    ) -> Result<(), ConversionError> {
        self.require(child)?;
        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return Err(ConversionError::UnknownNode(parent.to_string()));
        };
        parent_node
            .containments
            .entry(containment)
            .or_default()
            .push(child.clone());
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = Some(parent.clone());
        }
        Ok(())
    }

    /// `root` and every node below it, in pre-order.
    pub fn this_and_all_descendants(&self, root: &LwNodeId) -> Result<Vec<&LwNode>, ConversionError> {
        let mut result = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.require(id)?;
            result.push(node);
            let children: Vec<&LwNodeId> = node.all_children().collect();
            stack.extend(children.into_iter().rev());
        }
        Ok(result)
    }
}
