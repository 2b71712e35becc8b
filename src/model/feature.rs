//! Feature descriptors: the declared shape of node types.

use super::value::{FeatureValue, Value, ValueType};

/// How a feature relates its node to its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Plain data: primitives, strings, enumerations.
    Attribute,
    /// Owned child nodes.
    Containment,
    /// A name-based pointer to a node elsewhere.
    Reference,
}

impl FeatureKind {
    pub fn name(self) -> &'static str {
        match self {
            FeatureKind::Attribute => "attribute",
            FeatureKind::Containment => "containment",
            FeatureKind::Reference => "reference",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    Singular,
    Optional,
    Many,
}

/// One feature of a node type, computed once at registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureDescriptor {
    pub name: &'static str,
    pub kind: FeatureKind,
    pub multiplicity: Multiplicity,
    pub value_type: ValueType,
    /// Secondary values, excluded from structural equality and serialization.
    pub derived: bool,
    /// Node type (or role) expected for containments and references, if declared.
    pub target: Option<&'static str>,
}

impl FeatureDescriptor {
    /// Describe a field of type `T`.
    pub fn of<T: FeatureValue>(name: &'static str) -> Self {
        Self {
            name,
            kind: T::VALUE_TYPE.feature_kind(),
            multiplicity: T::MULTIPLICITY,
            value_type: T::VALUE_TYPE,
            derived: false,
            target: None,
        }
    }

    pub fn with_target(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    pub fn derived(mut self) -> Self {
        self.derived = true;
        self
    }

    pub fn is_many(&self) -> bool {
        self.multiplicity == Multiplicity::Many
    }

    pub fn is_optional(&self) -> bool {
        self.multiplicity != Multiplicity::Singular
    }

    /// Whether this feature holds child nodes.
    pub fn provides_nodes(&self) -> bool {
        self.kind == FeatureKind::Containment
    }
}

/// A feature of a specific node instance, with its current value.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureDescription {
    pub name: &'static str,
    pub kind: FeatureKind,
    pub multiplicity: Multiplicity,
    pub derived: bool,
    pub value: Value,
}

impl FeatureDescription {
    pub fn new(descriptor: &FeatureDescriptor, value: Value) -> Self {
        Self {
            name: descriptor.name,
            kind: descriptor.kind,
            multiplicity: descriptor.multiplicity,
            derived: descriptor.derived,
            value,
        }
    }

    pub fn provides_nodes(&self) -> bool {
        self.kind == FeatureKind::Containment
    }
}
