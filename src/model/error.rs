//! Error types for the node model.

use thiserror::Error;

/// Errors converting between [`Value`](super::Value) and typed fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("expected a {expected} value, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing value for a mandatory feature")]
    MissingValue,

    #[error("`{literal}` is not a literal of enumeration `{enumeration}`")]
    UnknownLiteral { enumeration: String, literal: String },

    #[error("{value} does not fit in {target}")]
    OutOfRange { value: i64, target: &'static str },

    #[error("unknown feature `{0}`")]
    UnknownFeature(String),

    #[error("feature `{feature}`: {source}")]
    InFeature {
        feature: String,
        #[source]
        source: Box<ValueError>,
    },
}

impl ValueError {
    pub fn mismatch(expected: &'static str, found: &super::Value) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.kind_name(),
        }
    }

    /// Attach the name of the feature being converted.
    pub fn in_feature(self, feature: &str) -> Self {
        match self {
            Self::InFeature { .. } => self,
            other => Self::InFeature {
                feature: feature.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Errors raised by the metamodel and by structural operations on an [`Ast`](super::Ast).
///
/// Nodes are identified by their description (`type@range` or `type#index`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A node type or role was used before being registered.
    #[error("type `{0}` is not registered in the metamodel")]
    UnregisteredType(String),

    #[error("type `{0}` is already registered")]
    DuplicateType(String),

    #[error("node type `{node_type}` declares feature `{feature}` more than once")]
    DuplicateFeature { node_type: String, feature: String },

    #[error("node type `{node_type}` cannot use the reserved feature name `{feature}`")]
    ReservedFeatureName { node_type: String, feature: String },

    #[error("node type `{node_type}` {message}")]
    InvalidDeclaration { node_type: String, message: String },

    #[error("unknown node {0}")]
    UnknownNode(String),

    #[error("{node} has no feature `{feature}`")]
    UnknownFeature { node: String, feature: String },

    #[error("feature `{feature}` of {node} is not a {expected}")]
    WrongFeatureKind {
        node: String,
        feature: String,
        expected: &'static str,
    },

    #[error("mandatory attribute `{feature}` of {node} is not set")]
    MissingMandatoryAttribute { node: String, feature: String },

    #[error("invalid value for `{feature}` of {node}: {source}")]
    InvalidValue {
        node: String,
        feature: String,
        #[source]
        source: ValueError,
    },

    #[error("cannot build a `{node_type}`: {source}")]
    Construction {
        node_type: String,
        #[source]
        source: ValueError,
    },

    #[error("{0} has no parent")]
    ParentNotSet(String),

    #[error("{child} is not contained in any {scope} of {parent}")]
    ChildNotFound {
        child: String,
        parent: String,
        scope: &'static str,
    },

    #[error("{0} cannot be its own parent")]
    SelfParenting(String),

    #[error("{0} cannot be its own origin")]
    SelfOrigin(String),

    #[error("{0} is not supported")]
    Unsupported(&'static str),

    #[error("{0} is reachable from its own containments")]
    ContainmentCycle(String),

    #[error("{child} appears more than once among the children of {parent}")]
    DuplicateChild { child: String, parent: String },

    /// Moving the child would leave a mandatory containment empty.
    #[error("{child} cannot leave mandatory containment `{feature}` of {owner}")]
    MandatoryChild {
        child: String,
        owner: String,
        feature: String,
    },

    #[error("the arena cannot hold more than {0} nodes")]
    ArenaFull(usize),
}

impl ModelError {
    pub fn unknown_feature(node: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::UnknownFeature {
            node: node.into(),
            feature: feature.into(),
        }
    }

    pub fn wrong_kind(
        node: impl Into<String>,
        feature: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::WrongFeatureKind {
            node: node.into(),
            feature: feature.into(),
            expected,
        }
    }

    pub fn invalid_value(
        node: impl Into<String>,
        feature: impl Into<String>,
        source: ValueError,
    ) -> Self {
        Self::InvalidValue {
            node: node.into(),
            feature: feature.into(),
            source,
        }
    }

    pub fn invalid_declaration(node_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDeclaration {
            node_type: node_type.into(),
            message: message.into(),
        }
    }
}
