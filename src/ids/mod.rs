//! Node id assignment.
//!
//! Nodes have no intrinsic identity outside their [`Ast`]; exporters need
//! stable string ids. A [`NodeIdProvider`] computes them, and must answer the
//! same id for the same node within one pass.
//!
//! | Provider | Ids |
//! |----------|-----|
//! | [`StructuralIdProvider`] | positional path below a source id |
//! | [`UuidIdProvider`] | random UUIDs |
//! | [`SequentialIdProvider`] | `1`, `2`, ... |
//! | [`DeclarativeIdProvider`] | user rules per node type |
//! | [`FileBasedIdShortener`] | short sequential aliases of another provider's ids, persisted |
//! | [`SequenceIdAssigner`] | sequential ids continuing a persisted sequence |

mod declarative;
mod error;
mod persisted;
mod providers;
mod source_id;

use tracing::debug;

use crate::model::{Ast, ModelError, NodeId};

pub use declarative::{DeclarativeIdProvider, RuleContext};
pub use error::IdError;
pub use persisted::{FileBasedIdShortener, SequenceIdAssigner};
pub use providers::{SequentialIdProvider, StructuralIdProvider, UuidIdProvider};
pub use source_id::{
    ConstantSourceIdProvider, RelativeSourceIdProvider, SimpleSourceIdProvider, SourceIdProvider,
    UNKNOWN_SOURCE_ID, clean_id,
};

/// Strategy mapping nodes to stable string ids.
pub trait NodeIdProvider {
    fn id(&mut self, ast: &Ast, node: NodeId) -> Result<String, IdError>;
}

impl<P: NodeIdProvider + ?Sized> NodeIdProvider for Box<P> {
    fn id(&mut self, ast: &Ast, node: NodeId) -> Result<String, IdError> {
        (**self).id(ast, node)
    }
}

/// Where a node sits in its tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Coordinates {
    Root,
    NonRoot {
        container_id: String,
        containment: &'static str,
        /// Index within the containment, 0 for singular ones.
        index: usize,
    },
}

impl Coordinates {
    /// Coordinates of `node` below a parent whose id is `container_id`.
    ///
    /// Roots get [`Coordinates::Root`] whatever `container_id` is.
    pub fn of(ast: &Ast, node: NodeId, container_id: String) -> Result<Self, ModelError> {
        let Some(containment) = ast.containing_containment(node)?.map(|c| c.name) else {
            return Ok(Self::Root);
        };
        let index = ast.index_in_containing_feature(node)?.unwrap_or(0);
        Ok(Self::NonRoot {
            container_id,
            containment,
            index,
        })
    }
}

impl Ast {
    /// Stores an id from `provider` on every node of the tree rooted at `root`,
    /// parents before children.
    pub fn assign_ids(&mut self, root: NodeId, provider: &mut dyn NodeIdProvider) -> Result<(), IdError> {
        let nodes: Vec<NodeId> = self.walk(root).collect();
        for node in &nodes {
            let id = provider.id(self, *node)?;
            self.set_identifier(*node, Some(id));
        }
        debug!(root = %root, nodes = nodes.len(), "assigned node ids");
        Ok(())
    }
}
