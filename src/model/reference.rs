//! Name-based references between nodes.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::ast::Ast;
use super::node::NodeId;

/// A deferred pointer to a named node.
///
/// Created unresolved by parsers and bound later by resolution passes. Equality
/// and hashing only consider the name.
#[derive(Clone, Debug)]
pub struct ReferenceByName {
    pub name: String,
    pub referred: Option<NodeId>,
    /// Identifier of a target that lives outside the current [`Ast`].
    pub identifier: Option<String>,
}

impl ReferenceByName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            referred: None,
            identifier: None,
        }
    }

    pub fn resolved(name: impl Into<String>, referred: NodeId) -> Self {
        Self {
            name: name.into(),
            referred: Some(referred),
            identifier: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.referred.is_some() || self.identifier.is_some()
    }

    /// Binds this reference to the first candidate whose name matches.
    ///
    /// The referred slot is overwritten with the result, so a miss leaves the
    /// reference unresolved.
    pub fn try_to_resolve(
        &mut self,
        ast: &Ast,
        candidates: impl IntoIterator<Item = NodeId>,
        case_insensitive: bool,
    ) -> bool {
        self.referred = candidates.into_iter().find(|candidate| {
            ast.name_of(*candidate).is_some_and(|name| {
                if case_insensitive {
                    name.to_lowercase() == self.name.to_lowercase()
                } else {
                    name == self.name
                }
            })
        });
        self.referred.is_some()
    }

    /// Binds this reference to `candidate` when it is present.
    pub fn try_to_resolve_value(&mut self, candidate: Option<NodeId>) -> bool {
        match candidate {
            Some(node) => {
                self.referred = Some(node);
                true
            }
            None => false,
        }
    }
}

impl PartialEq for ReferenceByName {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ReferenceByName {}

impl Hash for ReferenceByName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for ReferenceByName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_resolved() { "Solved" } else { "Unsolved" };
        write!(f, "Ref({})[{status}]", self.name)
    }
}
