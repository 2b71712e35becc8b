//! Provenance (origins) and emission targets (destinations) of nodes.

use crate::base::Range;

use super::node::NodeId;

/// Where a node comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum Origin {
    /// A portion of source text.
    Simple {
        range: Option<Range>,
        source_text: Option<String>,
    },
    /// Several origins merged into one.
    Composite {
        elements: Vec<Origin>,
        range: Option<Range>,
        source_text: Option<String>,
    },
    /// Another node of the same [`Ast`](super::Ast), e.g. the input of a transformation.
    Node(NodeId),
}

impl Origin {
    pub fn simple(range: Range) -> Self {
        Self::Simple {
            range: Some(range),
            source_text: None,
        }
    }

    pub fn with_text(range: Option<Range>, source_text: impl Into<String>) -> Self {
        Self::Simple {
            range,
            source_text: Some(source_text.into()),
        }
    }
}

/// Where a node was emitted to, for round-trip tooling.
#[derive(Clone, Debug, PartialEq)]
pub enum Destination {
    /// A range of generated text.
    Text(Range),
    /// A node produced from this one.
    Node(NodeId),
    Composite(Vec<Destination>),
}
