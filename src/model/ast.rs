//! The node arena.
//!
//! An [`Ast`] owns every node of one or more trees, together with the
//! bookkeeping that is not part of the model: parent pointers, origins, ranges,
//! sources, identifiers and destinations.
//!
//! ## Parent maintenance
//!
//! Every containment write that goes through the `Ast` (adding a node, the
//! homogeneous setters, the editing helpers in [`crate::transform`]) keeps
//! parent pointers in sync and each child in a single containment: adopting a
//! child that already has an owner removes it from that owner first. Raw
//! access through [`Ast::get_mut`] does neither; run [`Ast::assign_parents`]
//! after editing containments that way.
//!
//! ## Panics
//!
//! Accessors taking a [`NodeId`] panic if the id was not produced by this `Ast`.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::base::{Range, Source};

use super::error::{ModelError, ValueError};
use super::feature::{FeatureDescription, FeatureDescriptor, FeatureKind, Multiplicity};
use super::metamodel::{Metamodel, NodeType};
use super::node::{NodeData, NodeId, NodeKind};
use super::origin::{Destination, Origin};
use super::reference::ReferenceByName;
use super::value::{FeatureValue, Value};

/// How a new node treats children that already have an owner.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Adoption {
    Move,
    Orphans,
}

/// A child to remove from its current owner's containment.
struct Release {
    owner: NodeId,
    feature: &'static str,
    child: NodeId,
}

struct Slot {
    node_type: Arc<NodeType>,
    data: Box<dyn NodeData>,
    id: Option<String>,
    parent: Option<NodeId>,
    origin: Option<Origin>,
    range: Option<Range>,
    source: Option<Source>,
    destinations: Vec<Destination>,
}

/// Arena of nodes built on a [`Metamodel`].
pub struct Ast {
    metamodel: Arc<Metamodel>,
    slots: Vec<Slot>,
}

impl fmt::Debug for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ast")
            .field("metamodel", &self.metamodel.name())
            .field("nodes", &self.slots.len())
            .finish()
    }
}

impl Ast {
    pub fn new(metamodel: Arc<Metamodel>) -> Self {
        Self {
            metamodel,
            slots: Vec::new(),
        }
    }

    pub fn metamodel(&self) -> &Arc<Metamodel> {
        &self.metamodel
    }

    /// Number of nodes ever added, detached ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.slots.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.slots.len()).filter_map(NodeId::try_new)
    }

    /// Nodes without a parent.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.node_ids().filter(|id| self.parent(*id).is_none())
    }

    fn slot(&self, id: NodeId) -> &Slot {
        &self.slots[id.index()]
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut Slot {
        &mut self.slots[id.index()]
    }

    // ========================================================================
    // INSERTION
    // ========================================================================

    /// Adds a node, which becomes the parent of every node in its containments.
    ///
    /// Children must already belong to this `Ast`. A child owned by another
    /// node is moved: its previous owner stops listing it.
    pub fn add<T: NodeKind>(&mut self, node: T) -> Result<NodeId, ModelError> {
        let node_type = self
            .metamodel
            .node_type_of::<T>()
            .cloned()
            .ok_or_else(|| ModelError::UnregisteredType(T::NODE_TYPE.to_string()))?;
        self.insert(node_type, Box::new(node), Adoption::Move)
    }

    /// Adds a node and sets its range.
    pub fn add_with_range<T: NodeKind>(&mut self, node: T, range: Range) -> Result<NodeId, ModelError> {
        let id = self.add(node)?;
        self.set_range(id, Some(range));
        Ok(id)
    }

    /// Adds a type-erased node, looking its type up by name. Children are
    /// moved as with [`Ast::add`].
    pub fn add_boxed(&mut self, data: Box<dyn NodeData>) -> Result<NodeId, ModelError> {
        self.insert_boxed(data, Adoption::Move)
    }

    /// Adds a node sharing its children with their current owners: only
    /// children without a parent are adopted.
    pub(crate) fn add_boxed_sharing(&mut self, data: Box<dyn NodeData>) -> Result<NodeId, ModelError> {
        self.insert_boxed(data, Adoption::Orphans)
    }

    fn insert_boxed(&mut self, data: Box<dyn NodeData>, adoption: Adoption) -> Result<NodeId, ModelError> {
        let node_type = self
            .metamodel
            .node_type(data.node_type())
            .cloned()
            .ok_or_else(|| ModelError::UnregisteredType(data.node_type().to_string()))?;
        self.insert(node_type, data, adoption)
    }

    fn insert(&mut self, node_type: Arc<NodeType>, data: Box<dyn NodeData>, adoption: Adoption) -> Result<NodeId, ModelError> {
        let index = self.slots.len();
        let id = NodeId::try_new(index).ok_or(ModelError::ArenaFull(index))?;
        let children = children_of(&node_type, data.as_ref());
        self.check_children(node_type.name, &children)?;
        let releases = match adoption {
            Adoption::Move => self.releases(None, &children)?,
            Adoption::Orphans => Vec::new(),
        };
        for release in releases {
            self.remove_from_containment(release.owner, release.feature, release.child)?;
        }
        self.slots.push(Slot {
            node_type,
            data,
            id: None,
            parent: None,
            origin: None,
            range: None,
            source: None,
            destinations: Vec::new(),
        });
        for child in children {
            if adoption == Adoption::Move || self.parent(child).is_none() {
                self.slot_mut(child).parent = Some(id);
            }
        }
        Ok(id)
    }

    /// Children must exist and appear once.
    fn check_children(&self, parent: &str, children: &[NodeId]) -> Result<(), ModelError> {
        let mut seen = FxHashSet::default();
        for child in children {
            if !self.contains(*child) {
                return Err(ModelError::UnknownNode(child.to_string()));
            }
            if !seen.insert(*child) {
                return Err(ModelError::DuplicateChild {
                    child: self.describe(*child),
                    parent: parent.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Containments that must let go of `children` before they move under a
    /// new parent. Children already in `target` stay where they are.
    ///
    /// Fails when a child fills a mandatory containment of its owner.
    fn releases(&self, target: Option<(NodeId, &str)>, children: &[NodeId]) -> Result<Vec<Release>, ModelError> {
        let mut releases = Vec::new();
        for child in children {
            let Some(owner) = self.parent(*child) else {
                continue;
            };
            // A stale parent pointer has nothing to release.
            let Some(holder) = self.holding_containment(owner, *child) else {
                continue;
            };
            if target == Some((owner, holder.name)) {
                continue;
            }
            if holder.multiplicity == Multiplicity::Singular {
                return Err(ModelError::MandatoryChild {
                    child: self.describe(*child),
                    owner: self.describe(owner),
                    feature: holder.name.to_string(),
                });
            }
            releases.push(Release {
                owner,
                feature: holder.name,
                child: *child,
            });
        }
        Ok(releases)
    }

    fn holding_containment(&self, owner: NodeId, child: NodeId) -> Option<&FeatureDescriptor> {
        let slot = self.slot(owner);
        slot.node_type.containments().find(|containment| {
            slot.data
                .feature_value(containment.name)
                .is_some_and(|value| value.nodes().contains(&child))
        })
    }

    // ========================================================================
    // TYPED ACCESS
    // ========================================================================

    pub fn get<T: NodeKind>(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.index())?.data.as_any().downcast_ref()
    }

    /// Raw mutable access. Containment edits made here do not update parents.
    pub fn get_mut<T: NodeKind>(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(id.index())?.data.as_any_mut().downcast_mut()
    }

    pub fn data(&self, id: NodeId) -> &dyn NodeData {
        self.slot(id).data.as_ref()
    }

    /// Qualified name of the node's type.
    pub fn node_type(&self, id: NodeId) -> &'static str {
        self.slot(id).node_type.name
    }

    pub fn node_type_info(&self, id: NodeId) -> &Arc<NodeType> {
        &self.slot(id).node_type
    }

    /// Whether the node's type is `type_name` or one of its subtypes (roles included).
    pub fn is_instance_of(&self, id: NodeId, type_name: &str) -> bool {
        self.metamodel.is_subtype(self.node_type(id), type_name)
    }

    /// Readable identification for errors: `type@range` or `type#index`.
    pub fn describe(&self, id: NodeId) -> String {
        if !self.contains(id) {
            return id.to_string();
        }
        match self.range(id) {
            Some(range) => format!(
                "{}@{}:{}-{}:{}",
                self.node_type(id),
                range.start.line,
                range.start.column,
                range.end.line,
                range.end.column
            ),
            None => format!("{}{}", self.node_type(id), id),
        }
    }

    // ========================================================================
    // FEATURES
    // ========================================================================

    /// Features of the node with their current values, in declaration order.
    pub fn features(&self, id: NodeId) -> Vec<FeatureDescription> {
        let slot = self.slot(id);
        slot.node_type
            .features
            .iter()
            .map(|f| FeatureDescription::new(f, slot.data.feature_value(f.name).unwrap_or(Value::Null)))
            .collect()
    }

    fn descriptor(&self, id: NodeId, feature: &str) -> Result<&FeatureDescriptor, ModelError> {
        self.slot(id)
            .node_type
            .feature(feature)
            .ok_or_else(|| ModelError::unknown_feature(self.describe(id), feature))
    }

    fn descriptor_of_kind(
        &self,
        id: NodeId,
        feature: &str,
        kind: FeatureKind,
    ) -> Result<&FeatureDescriptor, ModelError> {
        let descriptor = self.descriptor(id, feature)?;
        if descriptor.kind != kind {
            return Err(ModelError::wrong_kind(self.describe(id), feature, kind.name()));
        }
        Ok(descriptor)
    }

    /// Current value of any feature.
    pub fn feature_value(&self, id: NodeId, feature: &str) -> Result<Value, ModelError> {
        self.descriptor(id, feature)?;
        Ok(self.data(id).feature_value(feature).unwrap_or(Value::Null))
    }

    /// Child nodes in non-derived containments, in declaration order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let slot = self.slot(id);
        children_of(&slot.node_type, slot.data.as_ref())
    }

    /// The value of a containment, normalized to a list.
    pub fn get_children(&self, id: NodeId, feature: &str) -> Result<Vec<NodeId>, ModelError> {
        self.descriptor_of_kind(id, feature, FeatureKind::Containment)?;
        Ok(self.data(id).feature_value(feature).map(|v| v.nodes()).unwrap_or_default())
    }

    /// Homogeneous name for [`Ast::get_children`].
    pub fn get_containment(&self, id: NodeId, feature: &str) -> Result<Vec<NodeId>, ModelError> {
        self.get_children(id, feature)
    }

    pub fn get_reference(&self, id: NodeId, feature: &str) -> Result<Option<ReferenceByName>, ModelError> {
        self.descriptor_of_kind(id, feature, FeatureKind::Reference)?;
        match self.data(id).feature_value(feature) {
            Some(Value::Reference(r)) => Ok(Some(r)),
            _ => Ok(None),
        }
    }

    /// The value of an attribute. A missing mandatory value is an error.
    pub fn get_attribute_value(&self, id: NodeId, feature: &str) -> Result<Value, ModelError> {
        let descriptor = self.descriptor_of_kind(id, feature, FeatureKind::Attribute)?;
        let value = self.data(id).feature_value(feature).unwrap_or(Value::Null);
        if value.is_null() && descriptor.multiplicity == Multiplicity::Singular {
            return Err(ModelError::MissingMandatoryAttribute {
                node: self.describe(id),
                feature: feature.to_string(),
            });
        }
        Ok(value)
    }

    /// Typed read of an attribute.
    pub fn get_attribute<V: FeatureValue>(&self, id: NodeId, feature: &str) -> Result<V, ModelError> {
        let value = self.get_attribute_value(id, feature)?;
        V::from_value(value).map_err(|e| ModelError::invalid_value(self.describe(id), feature, e))
    }

    pub fn set_attribute(&mut self, id: NodeId, feature: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        self.descriptor_of_kind(id, feature, FeatureKind::Attribute)?;
        self.write(id, feature, value.into())
    }

    /// Writes any feature. Containment writes detach replaced children and
    /// adopt new ones, taking each one away from its previous owner.
    ///
    /// A containment cannot hold the node itself or one of its ancestors.
    pub fn set_feature(&mut self, id: NodeId, feature: &str, value: Value) -> Result<(), ModelError> {
        let descriptor = self.descriptor(id, feature)?;
        if descriptor.kind != FeatureKind::Containment {
            return self.write(id, feature, value);
        }
        let feature_name = descriptor.name;
        let new_children = value.nodes();
        self.check_children(&self.describe(id), &new_children)?;
        if new_children.contains(&id) {
            return Err(ModelError::SelfParenting(self.describe(id)));
        }
        if let Some(ancestor) = self.walk_ancestors(id).find(|a| new_children.contains(a)) {
            return Err(ModelError::ContainmentCycle(self.describe(ancestor)));
        }
        let releases = self.releases(Some((id, feature_name)), &new_children)?;
        let old_children = self.get_children(id, feature)?;
        self.write(id, feature, value)?;
        for old in old_children {
            if !new_children.contains(&old) && self.parent(old) == Some(id) {
                self.slot_mut(old).parent = None;
            }
        }
        for release in releases {
            trace!(child = %release.child, owner = %release.owner, "moving child");
            self.remove_from_containment(release.owner, release.feature, release.child)?;
        }
        for child in new_children {
            self.slot_mut(child).parent = Some(id);
        }
        Ok(())
    }

    /// Appends to a many-valued containment, or sets a single-valued one.
    pub fn add_to_containment(&mut self, id: NodeId, feature: &str, child: NodeId) -> Result<(), ModelError> {
        let descriptor = self.descriptor_of_kind(id, feature, FeatureKind::Containment)?;
        let value = if descriptor.is_many() {
            let mut children = self.get_children(id, feature)?;
            children.push(child);
            Value::Nodes(children)
        } else {
            Value::Node(child)
        };
        self.set_feature(id, feature, value)
    }

    /// Removes a child from a containment. Emptying a singular containment fails.
    pub fn remove_from_containment(&mut self, id: NodeId, feature: &str, child: NodeId) -> Result<(), ModelError> {
        let descriptor = self.descriptor_of_kind(id, feature, FeatureKind::Containment)?;
        let many = descriptor.is_many();
        let mut children = self.get_children(id, feature)?;
        let Some(index) = children.iter().position(|c| *c == child) else {
            return Err(ModelError::ChildNotFound {
                child: self.describe(child),
                parent: self.describe(id),
                scope: "containment",
            });
        };
        children.remove(index);
        let value = if many { Value::Nodes(children) } else { Value::Null };
        self.set_feature(id, feature, value)
    }

    /// Binds (or clears) the target of an existing reference.
    pub fn set_reference_referred(&mut self, id: NodeId, feature: &str, referred: Option<NodeId>) -> Result<(), ModelError> {
        let Some(mut reference) = self.get_reference(id, feature)? else {
            return Err(ModelError::invalid_value(
                self.describe(id),
                feature,
                ValueError::MissingValue,
            ));
        };
        reference.referred = referred;
        self.write(id, feature, Value::Reference(reference))
    }

    /// Resolves a reference feature against candidates, by name.
    pub fn try_to_resolve_reference(
        &mut self,
        id: NodeId,
        feature: &str,
        candidates: impl IntoIterator<Item = NodeId>,
        case_insensitive: bool,
    ) -> Result<bool, ModelError> {
        let Some(mut reference) = self.get_reference(id, feature)? else {
            return Ok(false);
        };
        let resolved = reference.try_to_resolve(self, candidates, case_insensitive);
        self.write(id, feature, Value::Reference(reference))?;
        Ok(resolved)
    }

    fn write(&mut self, id: NodeId, feature: &str, value: Value) -> Result<(), ModelError> {
        let description = self.describe(id);
        self.slot_mut(id)
            .data
            .set_feature_value(feature, value)
            .map_err(|e| ModelError::invalid_value(description, feature, e))
    }

    /// The `name` attribute, when the node has a string one.
    pub fn name_of(&self, id: NodeId) -> Option<String> {
        self.slot(id).node_type.feature("name")?;
        match self.data(id).feature_value("name")? {
            Value::String(name) => Some(name),
            _ => None,
        }
    }

    // ========================================================================
    // BOOKKEEPING
    // ========================================================================

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).parent
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.slot_mut(id).parent = parent;
    }

    /// Sets every child's parent below `root`.
    ///
    /// Repairs parent pointers after raw edits. Fails on a node containing itself.
    pub fn assign_parents(&mut self, root: NodeId) -> Result<(), ModelError> {
        let mut stack = vec![root];
        let mut visited = FxHashSet::default();
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                return Err(ModelError::ContainmentCycle(self.describe(node)));
            }
            for child in self.children(node) {
                if child == node {
                    return Err(ModelError::SelfParenting(self.describe(node)));
                }
                self.slot_mut(child).parent = Some(node);
                stack.push(child);
            }
        }
        trace!(root = %root, nodes = visited.len(), "assigned parents");
        Ok(())
    }

    pub fn identifier(&self, id: NodeId) -> Option<&str> {
        self.slot(id).id.as_deref()
    }

    pub fn set_identifier(&mut self, id: NodeId, identifier: Option<String>) {
        self.slot_mut(id).id = identifier;
    }

    pub fn origin(&self, id: NodeId) -> Option<&Origin> {
        self.slot(id).origin.as_ref()
    }

    /// A node cannot be its own origin.
    pub fn set_origin(&mut self, id: NodeId, origin: Option<Origin>) -> Result<(), ModelError> {
        if origin == Some(Origin::Node(id)) {
            return Err(ModelError::SelfOrigin(self.describe(id)));
        }
        self.slot_mut(id).origin = origin;
        Ok(())
    }

    /// The explicit range, falling back to the origin's range.
    pub fn range(&self, id: NodeId) -> Option<Range> {
        let mut current = id;
        let mut visited = FxHashSet::default();
        loop {
            let slot = self.slot(current);
            if let Some(range) = &slot.range {
                return Some(range.clone());
            }
            match slot.origin.as_ref()? {
                Origin::Simple { range, .. } | Origin::Composite { range, .. } => return range.clone(),
                Origin::Node(origin) => {
                    if !visited.insert(current) {
                        return None;
                    }
                    current = *origin;
                }
            }
        }
    }

    pub fn set_range(&mut self, id: NodeId, range: Option<Range>) {
        self.slot_mut(id).range = range;
    }

    /// The explicit source, then the range's source, then the origin's.
    pub fn source(&self, id: NodeId) -> Option<Source> {
        if let Some(source) = &self.slot(id).source {
            return Some(source.clone());
        }
        self.range(id).and_then(|r| r.source)
    }

    pub fn set_source(&mut self, id: NodeId, source: Option<Source>) {
        self.slot_mut(id).source = source;
    }

    /// Text the node was produced from, as recorded by its origin.
    pub fn source_text(&self, id: NodeId) -> Option<String> {
        let mut current = id;
        let mut visited = FxHashSet::default();
        loop {
            match self.slot(current).origin.as_ref()? {
                Origin::Simple { source_text, .. } | Origin::Composite { source_text, .. } => {
                    return source_text.clone();
                }
                Origin::Node(origin) => {
                    if !visited.insert(current) {
                        return None;
                    }
                    current = *origin;
                }
            }
        }
    }

    pub fn destinations(&self, id: NodeId) -> &[Destination] {
        &self.slot(id).destinations
    }

    pub fn add_destination(&mut self, id: NodeId, destination: Destination) {
        self.slot_mut(id).destinations.push(destination);
    }

    // ========================================================================
    // COMPARISON AND DISPLAY
    // ========================================================================

    /// Structural equality of two subtrees of this `Ast`.
    pub fn structurally_equal(&self, a: NodeId, b: NodeId) -> bool {
        self.subtree_eq(a, self, b)
    }

    /// Structural equality of a subtree of this `Ast` and one of `other`.
    ///
    /// Compares node types and non-derived feature values; references compare
    /// by name. Bookkeeping (ranges, origins, ids) is ignored.
    pub fn subtree_eq(&self, a: NodeId, other: &Ast, b: NodeId) -> bool {
        let mut pending = vec![(a, b)];
        while let Some((a, b)) = pending.pop() {
            if self.node_type(a) != other.node_type(b) {
                return false;
            }
            let node_type = self.node_type_info(a);
            for feature in node_type.features.iter().filter(|f| !f.derived) {
                let left = self.data(a).feature_value(feature.name).unwrap_or(Value::Null);
                let right = other.data(b).feature_value(feature.name).unwrap_or(Value::Null);
                if feature.kind == FeatureKind::Containment {
                    let (left, right) = (left.nodes(), right.nodes());
                    if left.len() != right.len() {
                        return false;
                    }
                    pending.extend(left.into_iter().zip(right));
                } else if left != right {
                    return false;
                }
            }
        }
        true
    }

    /// Single-line rendering: `type(feature=value, ...)`.
    ///
    /// Nested nodes render as `type(...)`, derived features are skipped.
    pub fn display(&self, id: NodeId) -> NodeDisplay<'_> {
        NodeDisplay { ast: self, id }
    }
}

fn children_of(node_type: &NodeType, data: &dyn NodeData) -> Vec<NodeId> {
    node_type
        .containments()
        .filter_map(|f| data.feature_value(f.name))
        .flat_map(|v| v.nodes())
        .collect()
}

/// See [`Ast::display`].
pub struct NodeDisplay<'a> {
    ast: &'a Ast,
    id: NodeId,
}

impl fmt::Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ast = self.ast;
        write!(f, "{}(", ast.node_type(self.id))?;
        let features = ast.features(self.id);
        let mut first = true;
        for feature in features.iter().filter(|feature| !feature.derived) {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}=", feature.name)?;
            match &feature.value {
                Value::Node(child) => write!(f, "{}(...)", ast.node_type(*child))?,
                Value::Nodes(children) => {
                    write!(f, "[")?;
                    for (i, child) in children.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}(...)", ast.node_type(*child))?;
                    }
                    write!(f, "]")?;
                }
                other => write!(f, "{other}")?,
            }
        }
        write!(f, ")")
    }
}
