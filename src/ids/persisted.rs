//! Id providers backed by append-only files.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::model::{Ast, NodeId};

use super::NodeIdProvider;
use super::error::IdError;

fn read_lines(path: &Path) -> Result<Vec<(usize, String)>, IdError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    Ok(fs::read_to_string(path)?
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index + 1, line.to_string()))
        .collect())
}

fn open_append(path: &Path) -> Result<BufWriter<File>, IdError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}

/// Replaces the ids of another provider with short sequential ones.
///
/// The mapping lives in a file with one `originalID,shortID` line per id. It
/// is loaded when the shortener opens, so ids stay stable across runs, and
/// every new mapping is appended and flushed as soon as it is assigned.
pub struct FileBasedIdShortener<P> {
    base: P,
    path: PathBuf,
    to_short: FxHashMap<String, String>,
    to_original: FxHashMap<String, String>,
    next: u64,
    writer: BufWriter<File>,
}

impl<P: NodeIdProvider> FileBasedIdShortener<P> {
    pub fn open(path: impl Into<PathBuf>, base: P) -> Result<Self, IdError> {
        let path = path.into();
        let mut to_short = FxHashMap::default();
        let mut to_original = FxHashMap::default();
        let mut next = 1;
        for (line_number, line) in read_lines(&path)? {
            let Some((original, short)) = line.rsplit_once(',') else {
                return Err(IdError::malformed(&path, line_number, line));
            };
            let Ok(number) = short.trim().parse::<u64>() else {
                return Err(IdError::malformed(&path, line_number, line));
            };
            next = next.max(number + 1);
            to_short.insert(original.to_string(), short.trim().to_string());
            to_original.insert(short.trim().to_string(), original.to_string());
        }
        debug!(path = %path.display(), mappings = to_short.len(), "loaded id map");
        let writer = open_append(&path)?;
        Ok(Self {
            base,
            path,
            to_short,
            to_original,
            next,
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The short id for an original id, assigning and persisting a new one if needed.
    pub fn shorten(&mut self, original: &str) -> Result<String, IdError> {
        if let Some(short) = self.to_short.get(original) {
            return Ok(short.clone());
        }
        let short = self.next.to_string();
        writeln!(self.writer, "{original},{short}")?;
        self.writer.flush()?;
        self.next += 1;
        self.to_short.insert(original.to_string(), short.clone());
        self.to_original.insert(short.clone(), original.to_string());
        Ok(short)
    }

    pub fn original_id(&self, short: &str) -> Option<&str> {
        self.to_original.get(short).map(String::as_str)
    }

    pub fn flush(&mut self) -> Result<(), IdError> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<P: NodeIdProvider> NodeIdProvider for FileBasedIdShortener<P> {
    fn id(&mut self, ast: &Ast, node: NodeId) -> Result<String, IdError> {
        let original = self.base.id(ast, node)?;
        self.shorten(&original)
    }
}

/// Sequential ids continuing the sequence recorded in a file.
///
/// The file lists one assigned number per line; numbering resumes after the
/// largest one.
pub struct SequenceIdAssigner {
    next: u64,
    cache: FxHashMap<NodeId, String>,
    writer: BufWriter<File>,
}

impl SequenceIdAssigner {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IdError> {
        let path = path.as_ref();
        let mut next = 1;
        for (line_number, line) in read_lines(path)? {
            let Ok(number) = line.trim().parse::<u64>() else {
                return Err(IdError::malformed(path, line_number, line));
            };
            next = next.max(number + 1);
        }
        Ok(Self {
            next,
            cache: FxHashMap::default(),
            writer: open_append(path)?,
        })
    }

    pub fn flush(&mut self) -> Result<(), IdError> {
        self.writer.flush()?;
        Ok(())
    }
}

impl NodeIdProvider for SequenceIdAssigner {
    fn id(&mut self, _ast: &Ast, node: NodeId) -> Result<String, IdError> {
        if let Some(id) = self.cache.get(&node) {
            return Ok(id.clone());
        }
        let id = self.next.to_string();
        writeln!(self.writer, "{id}")?;
        self.writer.flush()?;
        self.next += 1;
        self.cache.insert(node, id.clone());
        Ok(id)
    }
}
