//! The metamodel registry: node types, roles and enumerations.
//!
//! Node types register explicitly; their feature tables are validated and cached
//! here once, so nothing is rediscovered while walking trees. A [`Metamodel`] is
//! owned by the caller and shared with every [`Ast`](super::Ast) built on it.

use std::any::TypeId;
use std::collections::VecDeque;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::error::{ModelError, ValueError};
use super::feature::{FeatureDescriptor, FeatureKind};
use super::node::{Constructor, FeatureValues, NodeData, NodeEnum, NodeKind};
use super::value::ValueType;

/// Names no feature may use.
pub const RESERVED_FEATURE_NAMES: &[&str] = &["parent", "position", "range"];

// ============================================================================
// TYPES
// ============================================================================

/// A registered, concrete node type with its cached features.
#[derive(Debug)]
pub struct NodeType {
    pub name: &'static str,
    pub extends: Option<&'static str>,
    pub implements: Vec<&'static str>,
    pub features: Vec<FeatureDescriptor>,
    construct: Constructor,
    type_id: TypeId,
}

impl NodeType {
    /// The last segment of the qualified name.
    pub fn simple_name(&self) -> &'static str {
        simple_name(self.name)
    }

    pub fn feature(&self, name: &str) -> Option<&FeatureDescriptor> {
        self.features.iter().find(|f| f.name == name)
    }

    pub fn features_of_kind(&self, kind: FeatureKind) -> impl Iterator<Item = &FeatureDescriptor> {
        self.features.iter().filter(move |f| f.kind == kind)
    }

    /// Non-derived containments, in declaration order.
    pub fn containments(&self) -> impl Iterator<Item = &FeatureDescriptor> {
        self.features_of_kind(FeatureKind::Containment)
            .filter(|f| !f.derived)
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Builds a new instance from feature values.
    pub fn construct(&self, values: FeatureValues) -> Result<Box<dyn NodeData>, ValueError> {
        (self.construct)(values)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoleKind {
    /// A capability several node types share.
    Interface,
    /// An abstract supertype concrete node types extend.
    AbstractConcept,
}

/// A type that is not instantiated but that nodes can be queried by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleType {
    pub name: &'static str,
    pub kind: RoleKind,
    pub supertypes: Vec<&'static str>,
}

impl RoleType {
    pub fn interface(name: &'static str) -> Self {
        Self {
            name,
            kind: RoleKind::Interface,
            supertypes: Vec::new(),
        }
    }

    pub fn abstract_concept(name: &'static str) -> Self {
        Self {
            name,
            kind: RoleKind::AbstractConcept,
            supertypes: Vec::new(),
        }
    }

    pub fn with_supertype(mut self, supertype: &'static str) -> Self {
        self.supertypes.push(supertype);
        self
    }

    pub fn simple_name(&self) -> &'static str {
        simple_name(self.name)
    }
}

/// Where a node type may sit in a tree, for types declared as roots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RootPolicy {
    /// Always the root of its tree.
    Required,
    /// A root, or a child of another node.
    Allowed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumType {
    pub name: &'static str,
    pub literals: Vec<&'static str>,
}

impl EnumType {
    pub fn simple_name(&self) -> &'static str {
        simple_name(self.name)
    }
}

pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Registry of the node types, roles and enumerations of one language.
#[derive(Debug, Default)]
pub struct Metamodel {
    name: String,
    node_types: IndexMap<&'static str, Arc<NodeType>>,
    by_type_id: FxHashMap<TypeId, &'static str>,
    roles: IndexMap<&'static str, RoleType>,
    enums: IndexMap<&'static str, EnumType>,
    roots: FxHashMap<&'static str, RootPolicy>,
}

impl Metamodel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The qualified language name, e.g. `com.example.calc`.
    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Registration ────────────────────────────────────────────────

    /// Registers a node type and caches its features.
    ///
    /// Fails on duplicate registrations, duplicate feature names, reserved
    /// feature names and targets on attributes.
    pub fn register<T: NodeKind>(&mut self) -> Result<&mut Self, ModelError> {
        let declaration = T::declaration();
        let name = declaration.name;
        self.check_free(name)?;

        let mut seen = FxHashSet::default();
        for feature in &declaration.features {
            if RESERVED_FEATURE_NAMES.contains(&feature.name) {
                return Err(ModelError::ReservedFeatureName {
                    node_type: name.to_string(),
                    feature: feature.name.to_string(),
                });
            }
            if !seen.insert(feature.name) {
                return Err(ModelError::DuplicateFeature {
                    node_type: name.to_string(),
                    feature: feature.name.to_string(),
                });
            }
            if feature.kind == FeatureKind::Attribute && feature.target.is_some() {
                return Err(ModelError::invalid_declaration(
                    name,
                    format!("declares a target type on attribute `{}`", feature.name),
                ));
            }
        }

        debug!(
            node_type = name,
            features = declaration.features.len(),
            "registered node type"
        );
        let node_type = NodeType {
            name,
            extends: declaration.extends,
            implements: declaration.implements,
            features: declaration.features,
            construct: declaration.construct,
            type_id: TypeId::of::<T>(),
        };
        self.by_type_id.insert(node_type.type_id, name);
        self.node_types.insert(name, Arc::new(node_type));
        Ok(self)
    }

    pub fn register_role(&mut self, role: RoleType) -> Result<&mut Self, ModelError> {
        self.check_free(role.name)?;
        debug!(role = role.name, kind = ?role.kind, "registered role");
        self.roles.insert(role.name, role);
        Ok(self)
    }

    pub fn register_enum<E: NodeEnum>(&mut self) -> Result<&mut Self, ModelError> {
        self.check_free(E::ENUMERATION)?;
        self.enums.insert(
            E::ENUMERATION,
            EnumType {
                name: E::ENUMERATION,
                literals: E::LITERALS.to_vec(),
            },
        );
        Ok(self)
    }

    /// Declares a registered node type as a tree root.
    ///
    /// Once any type is declared, structural ids reject roots of undeclared types.
    pub fn declare_root(&mut self, node_type: &str, policy: RootPolicy) -> Result<&mut Self, ModelError> {
        let Some(name) = self.node_types.get(node_type).map(|t| t.name) else {
            return Err(ModelError::UnregisteredType(node_type.to_string()));
        };
        debug!(node_type = name, ?policy, "declared root type");
        self.roots.insert(name, policy);
        Ok(self)
    }

    fn check_free(&self, name: &str) -> Result<(), ModelError> {
        if self.node_types.contains_key(name)
            || self.roles.contains_key(name)
            || self.enums.contains_key(name)
        {
            return Err(ModelError::DuplicateType(name.to_string()));
        }
        Ok(())
    }

    /// Checks that every type named by a declaration is registered with a
    /// compatible kind. Call once all registrations are done.
    pub fn validate(&self) -> Result<(), ModelError> {
        for node_type in self.node_types.values() {
            if let Some(parent) = node_type.extends {
                match self.roles.get(parent) {
                    Some(role) if role.kind == RoleKind::AbstractConcept => {}
                    Some(_) => {
                        return Err(ModelError::invalid_declaration(
                            node_type.name,
                            format!("extends `{parent}`, which is not an abstract concept"),
                        ));
                    }
                    None => return Err(ModelError::UnregisteredType(parent.to_string())),
                }
            }
            for role in &node_type.implements {
                match self.roles.get(role) {
                    Some(r) if r.kind == RoleKind::Interface => {}
                    Some(_) => {
                        return Err(ModelError::invalid_declaration(
                            node_type.name,
                            format!("implements `{role}`, which is not an interface"),
                        ));
                    }
                    None => return Err(ModelError::UnregisteredType(role.to_string())),
                }
            }
            for feature in &node_type.features {
                if let Some(target) = feature.target {
                    if !self.is_node_type(target) {
                        return Err(ModelError::UnregisteredType(target.to_string()));
                    }
                }
                if let ValueType::Enum(enumeration) = feature.value_type {
                    if !self.enums.contains_key(enumeration) {
                        return Err(ModelError::UnregisteredType(enumeration.to_string()));
                    }
                }
            }
        }
        for role in self.roles.values() {
            for supertype in &role.supertypes {
                if !self.roles.contains_key(supertype) {
                    return Err(ModelError::UnregisteredType(supertype.to_string()));
                }
            }
        }
        Ok(())
    }

    // ── Query ───────────────────────────────────────────────────────

    pub fn node_type(&self, name: &str) -> Option<&Arc<NodeType>> {
        self.node_types.get(name)
    }

    pub fn node_type_of<T: 'static>(&self) -> Option<&Arc<NodeType>> {
        self.by_type_id
            .get(&TypeId::of::<T>())
            .and_then(|name| self.node_types.get(name))
    }

    pub fn node_types(&self) -> impl Iterator<Item = &Arc<NodeType>> {
        self.node_types.values()
    }

    pub fn role(&self, name: &str) -> Option<&RoleType> {
        self.roles.get(name)
    }

    pub fn roles(&self) -> impl Iterator<Item = &RoleType> {
        self.roles.values()
    }

    pub fn enumeration(&self, name: &str) -> Option<&EnumType> {
        self.enums.get(name)
    }

    pub fn enumerations(&self) -> impl Iterator<Item = &EnumType> {
        self.enums.values()
    }

    /// Whether `name` denotes nodes: a concrete node type or a role.
    pub fn is_node_type(&self, name: &str) -> bool {
        self.node_types.contains_key(name) || self.roles.contains_key(name)
    }

    /// Direct supertypes of a node type or role.
    pub fn direct_supertypes(&self, name: &str) -> Vec<&'static str> {
        if let Some(node_type) = self.node_types.get(name) {
            node_type
                .extends
                .iter()
                .chain(node_type.implements.iter())
                .copied()
                .collect()
        } else if let Some(role) = self.roles.get(name) {
            role.supertypes.clone()
        } else {
            Vec::new()
        }
    }

    /// Whether `sub` is `sup` or one of its transitive subtypes.
    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        if sub == sup {
            return true;
        }
        let mut queue: VecDeque<&str> = VecDeque::from([sub]);
        let mut visited = FxHashSet::default();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            for supertype in self.direct_supertypes(current) {
                if supertype == sup {
                    return true;
                }
                queue.push_back(supertype);
            }
        }
        false
    }

    /// Whether `a` is a strict subtype of `b`.
    pub fn is_more_specific(&self, a: &str, b: &str) -> bool {
        a != b && self.is_subtype(a, b)
    }

    /// The root declaration of a node type, if any.
    pub fn root_policy(&self, node_type: &str) -> Option<RootPolicy> {
        self.roots.get(node_type).copied()
    }

    pub fn declares_roots(&self) -> bool {
        !self.roots.is_empty()
    }
}
