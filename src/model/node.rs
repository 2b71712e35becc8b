//! Node identity and the traits node types implement.
//!
//! Node types are plain structs declared with [`node_type!`](crate::node_type).
//! Their instances live in an [`Ast`](super::Ast) arena and are addressed by
//! [`NodeId`]. Containment fields hold the `NodeId`s of their children.

use std::any::Any;
use std::fmt;

use indexmap::IndexMap;

use super::error::ValueError;
use super::feature::FeatureDescriptor;
use super::value::Value;

/// Identity of a node inside an [`Ast`](super::Ast).
///
/// Two structurally equal nodes still have distinct ids; every identity-keyed
/// map in the crate uses this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Id for an arena index, `None` once the index no longer fits in a `u32`.
    pub fn try_new(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    /// Get the index into the arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Feature values keyed by feature name, used to build nodes generically.
pub type FeatureValues = IndexMap<String, Value>;

/// Builds a node of a specific type from feature values.
pub type Constructor = fn(FeatureValues) -> Result<Box<dyn NodeData>, ValueError>;

/// Type-erased access to a node's fields.
///
/// Only fields that are features are visible here: internal and link fields are not.
pub trait NodeData: Any + fmt::Debug {
    /// Qualified name of the node type.
    fn node_type(&self) -> &'static str;

    /// Current value of a feature, `None` if the type has no such feature.
    fn feature_value(&self, feature: &str) -> Option<Value>;

    fn set_feature_value(&mut self, feature: &str, value: Value) -> Result<(), ValueError>;

    fn clone_data(&self) -> Box<dyn NodeData>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl Clone for Box<dyn NodeData> {
    fn clone(&self) -> Self {
        self.clone_data()
    }
}

/// Static description of a node type, produced by [`NodeKind::declaration`].
#[derive(Clone, Debug)]
pub struct NodeTypeDeclaration {
    pub name: &'static str,
    /// An abstract concept role this type specializes.
    pub extends: Option<&'static str>,
    /// Interface roles this type plays.
    pub implements: Vec<&'static str>,
    /// Features in declaration order.
    pub features: Vec<FeatureDescriptor>,
    pub construct: Constructor,
}

/// A concrete node type.
pub trait NodeKind: NodeData + Clone + Sized {
    const NODE_TYPE: &'static str;

    fn declaration() -> NodeTypeDeclaration;

    /// Builds an instance, taking the values it needs out of `values`.
    ///
    /// Missing optional and many-valued features default to empty; a missing
    /// mandatory feature is an error.
    fn from_features(values: &mut FeatureValues) -> Result<Self, ValueError>;
}

/// An enumeration usable as an attribute type.
pub trait NodeEnum: Sized + Copy + 'static {
    const ENUMERATION: &'static str;
    const LITERALS: &'static [&'static str];

    fn literal(&self) -> &'static str;

    fn from_literal(literal: &str) -> Option<Self>;
}
