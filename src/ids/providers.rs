//! In-memory node id providers.

use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::model::{Ast, NodeId, RootPolicy};

use super::error::IdError;
use super::source_id::{ConstantSourceIdProvider, SimpleSourceIdProvider, SourceIdProvider};
use super::{Coordinates, NodeIdProvider};

/// A random UUID per node, stable for the provider's lifetime.
#[derive(Debug, Default)]
pub struct UuidIdProvider {
    cache: FxHashMap<NodeId, String>,
}

impl UuidIdProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeIdProvider for UuidIdProvider {
    fn id(&mut self, _ast: &Ast, node: NodeId) -> Result<String, IdError> {
        Ok(self
            .cache
            .entry(node)
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone())
    }
}

/// Consecutive numbers in first-request order, starting at 1.
#[derive(Debug)]
pub struct SequentialIdProvider {
    next: u64,
    cache: FxHashMap<NodeId, String>,
}

impl Default for SequentialIdProvider {
    fn default() -> Self {
        Self {
            next: 1,
            cache: FxHashMap::default(),
        }
    }
}

impl SequentialIdProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeIdProvider for SequentialIdProvider {
    fn id(&mut self, _ast: &Ast, node: NodeId) -> Result<String, IdError> {
        if let Some(id) = self.cache.get(&node) {
            return Ok(id.clone());
        }
        let id = self.next.to_string();
        self.next += 1;
        self.cache.insert(node, id.clone());
        Ok(id)
    }
}

/// Ids derived from a node's position in its tree.
///
/// A root is `{source id}_root`; any other node is
/// `{parent id}_{containment}` when first in its containment and
/// `{parent id}_{containment}_{index}` otherwise. Nodes that already carry an
/// identifier keep it, and their descendants build on it.
///
/// When the metamodel declares root types, a root of any other type and a
/// non-root of a [`RootPolicy::Required`] type are errors.
pub struct StructuralIdProvider {
    source_ids: Box<dyn SourceIdProvider>,
}

impl std::fmt::Debug for StructuralIdProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuralIdProvider").finish_non_exhaustive()
    }
}

impl Default for StructuralIdProvider {
    fn default() -> Self {
        Self::new(SimpleSourceIdProvider::default())
    }
}

impl StructuralIdProvider {
    pub fn new(source_ids: impl SourceIdProvider + 'static) -> Self {
        Self {
            source_ids: Box::new(source_ids),
        }
    }

    /// Every root gets `{source_id}_root`, whatever its source.
    pub fn with_source_id(source_id: impl Into<String>) -> Self {
        Self::new(ConstantSourceIdProvider::new(source_id))
    }

    /// The id of a node placed at `coordinates`.
    pub fn id_using_coordinates(
        &self,
        ast: &Ast,
        node: NodeId,
        coordinates: &Coordinates,
    ) -> Result<String, IdError> {
        if let Some(id) = ast.identifier(node) {
            return Ok(id.to_string());
        }
        check_placement(ast, node, coordinates)?;
        match coordinates {
            Coordinates::Root => {
                let source_id = self
                    .source_ids
                    .source_id(ast.source(node).as_ref())
                    .map_err(|e| match e {
                        IdError::SourceNotSet(_) => IdError::SourceNotSet(ast.describe(node)),
                        other => other,
                    })?;
                Ok(format!("{source_id}_root"))
            }
            Coordinates::NonRoot {
                container_id,
                containment,
                index: 0,
            } => Ok(format!("{container_id}_{containment}")),
            Coordinates::NonRoot {
                container_id,
                containment,
                index,
            } => Ok(format!("{container_id}_{containment}_{index}")),
        }
    }
}

fn check_placement(ast: &Ast, node: NodeId, coordinates: &Coordinates) -> Result<(), IdError> {
    let metamodel = ast.metamodel();
    let policy = metamodel.root_policy(ast.node_type(node));
    match coordinates {
        Coordinates::Root if metamodel.declares_roots() && policy.is_none() => {
            Err(IdError::NodeShouldNotBeRoot(ast.describe(node)))
        }
        Coordinates::NonRoot { .. } if policy == Some(RootPolicy::Required) => {
            Err(IdError::NodeShouldBeRoot(ast.describe(node)))
        }
        _ => Ok(()),
    }
}

impl NodeIdProvider for StructuralIdProvider {
    fn id(&mut self, ast: &Ast, node: NodeId) -> Result<String, IdError> {
        // Topmost first: the nearest ancestor with an identifier, or the root.
        let mut chain = vec![node];
        let mut current = node;
        while ast.identifier(current).is_none() {
            let Some(parent) = ast.parent(current) else {
                break;
            };
            chain.push(parent);
            current = parent;
        }

        let mut id = self.id_using_coordinates(ast, current, &Coordinates::Root)?;
        for child in chain.into_iter().rev().skip(1) {
            let coordinates = Coordinates::of(ast, child, id)?;
            id = self.id_using_coordinates(ast, child, &coordinates)?;
        }
        Ok(id)
    }
}
