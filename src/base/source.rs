//! Logical sources a range can refer to.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A named group of files sharing a root directory.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceSet {
    pub name: String,
    pub root: PathBuf,
}

impl SourceSet {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }
}

/// Where a piece of code comes from.
///
/// Nodes without textual provenance (e.g. inferred types) use [`Source::Synthetic`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    /// A file on disk.
    File(PathBuf),
    /// An in-memory buffer, optionally keeping its text.
    String(Option<Arc<str>>),
    /// A remote resource.
    Url(String),
    /// A file identified relative to a [`SourceSet`].
    SourceSetElement {
        source_set: Arc<SourceSet>,
        relative_path: PathBuf,
    },
    /// A file in a named code base.
    CodeBase {
        code_base: String,
        relative_path: String,
    },
    /// A computed source with a human readable description.
    Synthetic { description: String },
    /// A source known only by an identifier.
    WithId(String),
}

impl Source {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn string(code: impl Into<Arc<str>>) -> Self {
        Self::String(Some(code.into()))
    }

    pub fn synthetic(description: impl Into<String>) -> Self {
        Self::Synthetic {
            description: description.into(),
        }
    }

    /// The path of file-like sources.
    pub fn path(&self) -> Option<PathBuf> {
        match self {
            Self::File(path) => Some(path.clone()),
            Self::SourceSetElement {
                source_set,
                relative_path,
            } => Some(source_set.root.join(relative_path)),
            Self::CodeBase { relative_path, .. } => Some(PathBuf::from(relative_path)),
            _ => None,
        }
    }

    /// The path relative to `base`, when this source is a file below it.
    pub fn relative_to(&self, base: &Path) -> Option<PathBuf> {
        match self {
            Self::SourceSetElement { relative_path, .. } => Some(relative_path.clone()),
            other => other
                .path()
                .and_then(|path| path.strip_prefix(base).ok().map(Path::to_path_buf)),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::String(_) => write!(f, "<string>"),
            Self::Url(url) => write!(f, "{url}"),
            Self::SourceSetElement {
                source_set,
                relative_path,
            } => write!(f, "{}:{}", source_set.name, relative_path.display()),
            Self::CodeBase {
                code_base,
                relative_path,
            } => write!(f, "{code_base}:{relative_path}"),
            Self::Synthetic { description } => write!(f, "<synthetic: {description}>"),
            Self::WithId(id) => write!(f, "{id}"),
        }
    }
}
