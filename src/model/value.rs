//! Type-erased feature values.
//!
//! Generic tooling (serializers, the LionWeb converter, transformations) reads and
//! writes node features through [`Value`]. Typed fields convert to and from it via
//! [`FeatureValue`], which also tells the metamodel the field's multiplicity and
//! value type.

use std::fmt;

use super::error::ValueError;
use super::feature::{FeatureKind, Multiplicity};
use super::node::NodeId;
use super::reference::ReferenceByName;

// ============================================================================
// VALUES
// ============================================================================

/// A literal of a registered enumeration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumLiteral {
    pub enumeration: String,
    pub literal: String,
}

impl EnumLiteral {
    pub fn new(enumeration: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            enumeration: enumeration.into(),
            literal: literal.into(),
        }
    }
}

/// The runtime value of a feature.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Char(char),
    String(String),
    Enum(EnumLiteral),
    /// A multi-valued attribute.
    List(Vec<Value>),
    /// A single contained node.
    Node(NodeId),
    /// A multi-valued containment, in order.
    Nodes(Vec<NodeId>),
    Reference(ReferenceByName),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the value's variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Node(_) => "node",
            Value::Nodes(_) => "nodes",
            Value::Reference(_) => "reference",
        }
    }

    /// Contained nodes, normalized to a list.
    pub fn nodes(&self) -> Vec<NodeId> {
        match self {
            Value::Node(id) => vec![*id],
            Value::Nodes(ids) => ids.clone(),
            _ => Vec::new(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&ReferenceByName> {
        match self {
            Value::Reference(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Enum(e) => write!(f, "{}", e.literal),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Node(id) => write!(f, "{id}"),
            Value::Nodes(ids) => write!(f, "{ids:?}"),
            Value::Reference(r) => write!(f, "{r}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<NodeId> for Value {
    fn from(v: NodeId) -> Self {
        Value::Node(v)
    }
}

impl From<Vec<NodeId>> for Value {
    fn from(v: Vec<NodeId>) -> Self {
        Value::Nodes(v)
    }
}

impl From<ReferenceByName> for Value {
    fn from(v: ReferenceByName) -> Self {
        Value::Reference(v)
    }
}

// ============================================================================
// VALUE TYPES
// ============================================================================

/// The declared type of a feature's elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Boolean,
    Integer,
    Real,
    Char,
    String,
    /// A registered enumeration, by qualified name.
    Enum(&'static str),
    Node,
    Reference,
}

impl ValueType {
    /// Features holding nodes are containments, name references are references,
    /// anything else is an attribute.
    pub fn feature_kind(self) -> FeatureKind {
        match self {
            ValueType::Node => FeatureKind::Containment,
            ValueType::Reference => FeatureKind::Reference,
            _ => FeatureKind::Attribute,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Real => "real",
            ValueType::Char => "char",
            ValueType::String => "string",
            ValueType::Enum(name) => name,
            ValueType::Node => "node",
            ValueType::Reference => "reference",
        }
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// A single attribute value: primitives and enumerations.
pub trait AttributeScalar: Sized {
    const VALUE_TYPE: ValueType;

    fn to_scalar(&self) -> Value;

    /// Converts a non-null value.
    fn from_scalar(value: Value) -> Result<Self, ValueError>;
}

/// A node field that is part of the model.
///
/// Implemented for attribute scalars, `NodeId`, `ReferenceByName`, and their
/// `Option`/`Vec` wrappers. The wrapper decides the multiplicity.
pub trait FeatureValue: Sized {
    const MULTIPLICITY: Multiplicity;
    const VALUE_TYPE: ValueType;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, ValueError>;
}

impl<T: AttributeScalar> FeatureValue for Option<T> {
    const MULTIPLICITY: Multiplicity = Multiplicity::Optional;
    const VALUE_TYPE: ValueType = T::VALUE_TYPE;

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::to_scalar)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_scalar(other).map(Some),
        }
    }
}

impl<T: AttributeScalar> FeatureValue for Vec<T> {
    const MULTIPLICITY: Multiplicity = Multiplicity::Many;
    const VALUE_TYPE: ValueType = T::VALUE_TYPE;

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(T::to_scalar).collect())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::List(items) => items.into_iter().map(T::from_scalar).collect(),
            other => Err(ValueError::mismatch("list", &other)),
        }
    }
}

/// Implements [`FeatureValue`] for a singular [`AttributeScalar`].
#[doc(hidden)]
#[macro_export]
macro_rules! __singular_feature_value {
    ($ty:ty) => {
        impl $crate::model::FeatureValue for $ty {
            const MULTIPLICITY: $crate::model::Multiplicity = $crate::model::Multiplicity::Singular;
            const VALUE_TYPE: $crate::model::ValueType =
                <$ty as $crate::model::AttributeScalar>::VALUE_TYPE;

            fn to_value(&self) -> $crate::model::Value {
                $crate::model::AttributeScalar::to_scalar(self)
            }

            fn from_value(
                value: $crate::model::Value,
            ) -> ::std::result::Result<Self, $crate::model::ValueError> {
                match value {
                    $crate::model::Value::Null => Err($crate::model::ValueError::MissingValue),
                    other => <$ty as $crate::model::AttributeScalar>::from_scalar(other),
                }
            }
        }
    };
}

macro_rules! primitive_scalar {
    ($ty:ty, $value_type:ident, $variant:ident, $expected:literal) => {
        impl AttributeScalar for $ty {
            const VALUE_TYPE: ValueType = ValueType::$value_type;

            fn to_scalar(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_scalar(value: Value) -> Result<Self, ValueError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(ValueError::mismatch($expected, &other)),
                }
            }
        }

        crate::__singular_feature_value!($ty);
    };
}

primitive_scalar!(bool, Boolean, Boolean, "boolean");
primitive_scalar!(i64, Integer, Integer, "integer");
primitive_scalar!(f64, Real, Real, "real");
primitive_scalar!(char, Char, Char, "char");
primitive_scalar!(String, String, String, "string");

impl AttributeScalar for i32 {
    const VALUE_TYPE: ValueType = ValueType::Integer;

    fn to_scalar(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_scalar(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Integer(v) => i32::try_from(v).map_err(|_| ValueError::OutOfRange {
                value: v,
                target: "i32",
            }),
            other => Err(ValueError::mismatch("integer", &other)),
        }
    }
}

crate::__singular_feature_value!(i32);

// Containments.

impl FeatureValue for NodeId {
    const MULTIPLICITY: Multiplicity = Multiplicity::Singular;
    const VALUE_TYPE: ValueType = ValueType::Node;

    fn to_value(&self) -> Value {
        Value::Node(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Node(id) => Ok(id),
            Value::Nodes(ids) if ids.len() == 1 => Ok(ids[0]),
            Value::Null => Err(ValueError::MissingValue),
            other => Err(ValueError::mismatch("node", &other)),
        }
    }
}

impl FeatureValue for Option<NodeId> {
    const MULTIPLICITY: Multiplicity = Multiplicity::Optional;
    const VALUE_TYPE: ValueType = ValueType::Node;

    fn to_value(&self) -> Value {
        self.map_or(Value::Null, Value::Node)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            Value::Node(id) => Ok(Some(id)),
            Value::Nodes(ids) if ids.len() <= 1 => Ok(ids.first().copied()),
            other => Err(ValueError::mismatch("node", &other)),
        }
    }
}

impl FeatureValue for Vec<NodeId> {
    const MULTIPLICITY: Multiplicity = Multiplicity::Many;
    const VALUE_TYPE: ValueType = ValueType::Node;

    fn to_value(&self) -> Value {
        Value::Nodes(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Node(id) => Ok(vec![id]),
            Value::Nodes(ids) => Ok(ids),
            other => Err(ValueError::mismatch("nodes", &other)),
        }
    }
}

// References.

impl FeatureValue for ReferenceByName {
    const MULTIPLICITY: Multiplicity = Multiplicity::Singular;
    const VALUE_TYPE: ValueType = ValueType::Reference;

    fn to_value(&self) -> Value {
        Value::Reference(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Reference(r) => Ok(r),
            Value::Null => Err(ValueError::MissingValue),
            other => Err(ValueError::mismatch("reference", &other)),
        }
    }
}

impl FeatureValue for Option<ReferenceByName> {
    const MULTIPLICITY: Multiplicity = Multiplicity::Optional;
    const VALUE_TYPE: ValueType = ValueType::Reference;

    fn to_value(&self) -> Value {
        self.clone().map_or(Value::Null, Value::Reference)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            Value::Reference(r) => Ok(Some(r)),
            other => Err(ValueError::mismatch("reference", &other)),
        }
    }
}
