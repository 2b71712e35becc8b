use thiserror::Error;

use crate::model::ModelError;

/// Errors raised while registering scope definitions or computing scopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticsError {
    #[error("type `{0}` is not registered in the metamodel")]
    UnknownType(String),

    #[error("node type `{node_type}` has no reference feature `{feature}`")]
    NotAReference { node_type: String, feature: String },

    #[error("a scope for {key} in context `{context}` is already defined")]
    DuplicateDefinition { key: String, context: String },

    /// Two definitions for the same key apply to a context and neither is more specific.
    #[error("scope definitions for {key} in contexts `{first}` and `{second}` are ambiguous")]
    AmbiguousDefinition {
        key: String,
        first: String,
        second: String,
    },

    #[error("{0} has no name and cannot be defined in a scope")]
    Unnamed(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}
