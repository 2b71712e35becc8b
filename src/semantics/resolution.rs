use std::sync::Arc;

use tracing::{debug, warn};

use crate::model::{Ast, FeatureKind, NodeId};

use super::error::SemanticsError;
use super::provider::ScopeProvider;

/// Options for [`resolve_references`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ResolutionOptions {
    /// Match names regardless of case, even in case-sensitive scopes.
    pub case_insensitive: bool,
}

impl ResolutionOptions {
    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }
}

/// Outcome of a [`resolve_references`] pass: `(node, feature)` pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub resolved: Vec<(NodeId, &'static str)>,
    pub unresolved: Vec<(NodeId, &'static str)>,
}

impl ResolutionSummary {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Resolves every reference in the tree rooted at `root`.
///
/// Each reference is looked up by name in the scope `provider` computes for
/// it, restricted to the feature's target type. The outcome overwrites the
/// reference's target, so a miss clears a previous binding. Absent (`None`)
/// references and derived features are skipped.
pub fn resolve_references(
    ast: &mut Ast,
    root: NodeId,
    provider: &dyn ScopeProvider,
    options: ResolutionOptions,
) -> Result<ResolutionSummary, SemanticsError> {
    let mut summary = ResolutionSummary::default();
    let nodes: Vec<NodeId> = ast.walk(root).collect();
    for node in nodes {
        let node_type = Arc::clone(ast.node_type_info(node));
        for feature in node_type
            .features_of_kind(FeatureKind::Reference)
            .filter(|f| !f.derived)
        {
            let Some(reference) = ast.get_reference(node, feature.name)? else {
                continue;
            };
            let scope = provider.scope_for(ast, node, feature.name)?;
            let referred = if options.case_insensitive {
                scope.resolve_ignoring_case(ast, &reference.name, feature.target)
            } else {
                scope.resolve(ast, &reference.name, feature.target)
            };
            ast.set_reference_referred(node, feature.name, referred)?;
            if referred.is_some() {
                summary.resolved.push((node, feature.name));
            } else {
                warn!(
                    node = %ast.describe(node),
                    feature = feature.name,
                    name = %reference.name,
                    "unresolved reference"
                );
                summary.unresolved.push((node, feature.name));
            }
        }
    }
    debug!(
        root = %root,
        resolved = summary.resolved.len(),
        unresolved = summary.unresolved.len(),
        "resolved references"
    );
    Ok(summary)
}
