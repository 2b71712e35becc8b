//! Error types for id assignment.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ModelError;

/// Errors that can occur while computing or persisting node ids.
#[derive(Debug, Error)]
pub enum IdError {
    /// A root node has no source to derive its id from.
    #[error("source should be set for {0}")]
    SourceNotSet(String),

    /// A file source outside the base directory of a relative provider.
    #[error("{path} is not below {base}")]
    OutsideBaseDirectory { path: PathBuf, base: PathBuf },

    /// A kind of source the provider cannot name.
    #[error("cannot compute an id for source {0}")]
    UnsupportedSource(String),

    /// A line of a persisted id map that does not parse.
    #[error("malformed line {line_number} in {path}: `{line}`")]
    MalformedLine {
        path: PathBuf,
        line_number: usize,
        line: String,
    },

    /// A node of a type declared as always-root sits below a parent.
    #[error("{0} should be root")]
    NodeShouldBeRoot(String),

    /// A root whose type is not declared as a root type.
    #[error("{0} should not be root")]
    NodeShouldNotBeRoot(String),

    #[error("no id rule applies to {0}")]
    NoMatchingRule(String),

    /// IO error while reading or writing a persisted id map.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl IdError {
    pub fn malformed(path: impl Into<PathBuf>, line_number: usize, line: impl Into<String>) -> Self {
        Self::MalformedLine {
            path: path.into(),
            line_number,
            line: line.into(),
        }
    }
}
