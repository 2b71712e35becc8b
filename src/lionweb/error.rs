//! Error types for LionWeb conversion.

use thiserror::Error;

use crate::ids::IdError;
use crate::model::ModelError;

use super::language::MetaPointer;

/// Errors raised while converting languages and models to or from LionWeb.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// A node type was never exported or associated with a concept.
    #[error("node type `{0}` has no corresponding concept")]
    NoConcept(String),

    #[error("no node type corresponds to classifier {0}")]
    UnknownClassifier(MetaPointer),

    #[error("unknown language `{key}` version `{version}`")]
    UnknownLanguage { key: String, version: String },

    /// A concept feature with no counterpart among the node type's features.
    #[error("feature `{feature}` of concept `{concept}` has no counterpart in node type `{node_type}`")]
    MissingFeature {
        concept: String,
        feature: String,
        node_type: String,
    },

    #[error("feature `{feature}` of node type `{node_type}` cannot be represented: {reason}")]
    UnsupportedFeature {
        node_type: String,
        feature: String,
        reason: &'static str,
    },

    #[error("node `{0}` appears more than once")]
    DuplicateNode(String),

    #[error("node `{0}` is not part of the model")]
    UnknownNode(String),

    #[error("invalid {expected} value `{value}` for `{feature}`")]
    InvalidPropertyValue {
        feature: String,
        value: String,
        expected: &'static str,
    },

    #[error("`{feature}` of node `{node}` holds {count} values, at most one is allowed")]
    TooManyValues {
        node: String,
        feature: String,
        count: usize,
    },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("unsupported serialization format version `{0}`")]
    UnsupportedVersion(String),

    #[error(transparent)]
    Ids(#[from] IdError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ConversionError {
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json(message.into())
    }

    pub fn invalid_property(feature: impl Into<String>, value: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidPropertyValue {
            feature: feature.into(),
            value: value.into(),
            expected,
        }
    }

    pub fn unsupported_feature(node_type: impl Into<String>, feature: impl Into<String>, reason: &'static str) -> Self {
        Self::UnsupportedFeature {
            node_type: node_type.into(),
            feature: feature.into(),
            reason,
        }
    }
}
