//! Identifiers for sources, used as prefixes of structural node ids.

use std::path::{Component, Path, PathBuf};

use crate::base::Source;

use super::error::IdError;

/// Id used for a missing source when the provider accepts it.
pub const UNKNOWN_SOURCE_ID: &str = "UNKNOWN_SOURCE";

/// Computes an identifier for a source, or for the absence of one.
pub trait SourceIdProvider {
    fn source_id(&self, source: Option<&Source>) -> Result<String, IdError>;
}

/// Makes a path or description usable inside an id.
pub fn clean_id(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            '.' | '/' | '\\' => '-',
            ' ' => '_',
            other => other,
        })
        .collect()
}

fn missing(accept: bool) -> Result<String, IdError> {
    if accept {
        Ok(UNKNOWN_SOURCE_ID.to_string())
    } else {
        Err(IdError::SourceNotSet("the node".to_string()))
    }
}

/// Path segments joined with `/`, whatever the platform separator.
fn portable(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::RootDir => Some(String::new()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Names sources after their kind and location.
///
/// | Source | Id |
/// |--------|----|
/// | `File` | `file_{path}` |
/// | `Synthetic` | `synthetic_{description}` |
/// | `CodeBase` | `codebase_{name}_relpath_{path}` |
/// | `SourceSetElement` | `sourceset_{name}_relpath_{path}` |
/// | `WithId` | the id, unchanged |
#[derive(Clone, Debug, Default)]
pub struct SimpleSourceIdProvider {
    pub accept_missing_source: bool,
}

impl SimpleSourceIdProvider {
    pub fn with_accept_missing_source(mut self, accept: bool) -> Self {
        self.accept_missing_source = accept;
        self
    }
}

impl SourceIdProvider for SimpleSourceIdProvider {
    fn source_id(&self, source: Option<&Source>) -> Result<String, IdError> {
        let Some(source) = source else {
            return missing(self.accept_missing_source);
        };
        match source {
            Source::File(path) => Ok(clean_id(&format!("file_{}", portable(path)))),
            Source::Synthetic { description } => Ok(clean_id(&format!("synthetic_{description}"))),
            Source::CodeBase {
                code_base,
                relative_path,
            } => Ok(clean_id(&format!("codebase_{code_base}_relpath_{relative_path}"))),
            Source::SourceSetElement {
                source_set,
                relative_path,
            } => Ok(clean_id(&format!(
                "sourceset_{}_relpath_{}",
                source_set.name,
                portable(relative_path)
            ))),
            Source::WithId(id) => Ok(id.clone()),
            other => Err(IdError::UnsupportedSource(other.to_string())),
        }
    }
}

/// Always answers the same id.
#[derive(Clone, Debug)]
pub struct ConstantSourceIdProvider(pub String);

impl ConstantSourceIdProvider {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl SourceIdProvider for ConstantSourceIdProvider {
    fn source_id(&self, _source: Option<&Source>) -> Result<String, IdError> {
        Ok(self.0.clone())
    }
}

/// Names file sources by their path relative to a base directory, optionally
/// prefixed with `{root_name}___`.
#[derive(Clone, Debug)]
pub struct RelativeSourceIdProvider {
    pub base_dir: PathBuf,
    pub root_name: Option<String>,
    pub accept_missing_source: bool,
}

impl RelativeSourceIdProvider {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            root_name: None,
            accept_missing_source: false,
        }
    }

    pub fn with_root_name(mut self, root_name: impl Into<String>) -> Self {
        self.root_name = Some(root_name.into());
        self
    }

    pub fn with_accept_missing_source(mut self, accept: bool) -> Self {
        self.accept_missing_source = accept;
        self
    }
}

impl SourceIdProvider for RelativeSourceIdProvider {
    fn source_id(&self, source: Option<&Source>) -> Result<String, IdError> {
        let Some(source) = source else {
            return missing(self.accept_missing_source);
        };
        let Source::File(path) = source else {
            return Err(IdError::UnsupportedSource(source.to_string()));
        };
        let relative = path
            .strip_prefix(&self.base_dir)
            .map_err(|_| IdError::OutsideBaseDirectory {
                path: path.clone(),
                base: self.base_dir.clone(),
            })?;
        let relative = portable(relative);
        let id = match &self.root_name {
            Some(root) => format!("{root}___{relative}"),
            None => relative,
        };
        Ok(clean_id(&id))
    }
}
