use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::model::{Ast, FeatureKind, Metamodel, NodeId};

use super::error::SemanticsError;
use super::scope::Scope;

/// Computes the scope in which a reference is resolved.
pub trait ScopeProvider {
    /// The scope for reference `feature` of `node`. Finding nothing is an
    /// empty scope, not an error.
    fn scope_for(&self, ast: &Ast, node: NodeId, feature: &str) -> Result<Scope, SemanticsError>;
}

/// A scope definition. Returning `None` defers to the definitions of the
/// enclosing nodes.
pub type ScopeDefinitionFn = Box<dyn Fn(&Ast, NodeId) -> Option<Scope>>;

struct ScopeDefinition {
    /// Node type or role the context node must be an instance of.
    context_type: &'static str,
    function: ScopeDefinitionFn,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum DefinitionKey {
    Feature { node_type: &'static str, feature: String },
    Target(&'static str),
}

impl fmt::Display for DefinitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKey::Feature { node_type, feature } => write!(f, "`{node_type}::{feature}`"),
            DefinitionKey::Target(target) => write!(f, "references to `{target}`"),
        }
    }
}

/// Scope provider assembled from registered definitions.
///
/// A definition applies either to one reference feature of a node type, or to
/// every reference whose target is a given type. Each carries a context type.
/// To compute a scope, the provider starts at the referencing node and climbs
/// its ancestors. At each level, feature definitions are tried before target
/// definitions, and among those whose context type the level's node is an
/// instance of, the most specific context type is used.
///
/// ```ignore
/// let mut provider = DeclarativeScopeProvider::new(metamodel);
/// provider.scope_for_feature("calc.Ref", "target", "calc.Block", |ast, block| {
///     Some(Scope::of_named(ast, ast.children(block)))
/// })?;
/// ```
pub struct DeclarativeScopeProvider {
    metamodel: Arc<Metamodel>,
    definitions: IndexMap<DefinitionKey, Vec<ScopeDefinition>>,
}

impl fmt::Debug for DeclarativeScopeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclarativeScopeProvider")
            .field("metamodel", &self.metamodel.name())
            .field("definitions", &self.definitions.len())
            .finish()
    }
}

impl DeclarativeScopeProvider {
    pub fn new(metamodel: Arc<Metamodel>) -> Self {
        Self {
            metamodel,
            definitions: IndexMap::new(),
        }
    }

    /// Defines the scope of reference `feature` of `node_type` nodes, for
    /// contexts that are instances of `context_type`.
    pub fn scope_for_feature<F>(
        &mut self,
        node_type: &str,
        feature: &str,
        context_type: &str,
        definition: F,
    ) -> Result<&mut Self, SemanticsError>
    where
        F: Fn(&Ast, NodeId) -> Option<Scope> + 'static,
    {
        let declaring = self
            .metamodel
            .node_type(node_type)
            .ok_or_else(|| SemanticsError::UnknownType(node_type.to_string()))?;
        let descriptor = declaring
            .feature(feature)
            .filter(|f| f.kind == FeatureKind::Reference)
            .ok_or_else(|| SemanticsError::NotAReference {
                node_type: node_type.to_string(),
                feature: feature.to_string(),
            })?;
        let key = DefinitionKey::Feature {
            node_type: declaring.name,
            feature: descriptor.name.to_string(),
        };
        self.insert(key, context_type, Box::new(definition))
    }

    /// Defines the scope of every reference targeting `target_type`, for
    /// contexts that are instances of `context_type`.
    pub fn scope_for_target<F>(
        &mut self,
        target_type: &str,
        context_type: &str,
        definition: F,
    ) -> Result<&mut Self, SemanticsError>
    where
        F: Fn(&Ast, NodeId) -> Option<Scope> + 'static,
    {
        let target = self.registered_name(target_type)?;
        self.insert(DefinitionKey::Target(target), context_type, Box::new(definition))
    }

    /// The `'static` name under which a node type or role is registered.
    fn registered_name(&self, name: &str) -> Result<&'static str, SemanticsError> {
        self.metamodel
            .node_type(name)
            .map(|t| t.name)
            .or_else(|| self.metamodel.role(name).map(|r| r.name))
            .ok_or_else(|| SemanticsError::UnknownType(name.to_string()))
    }

    fn insert(
        &mut self,
        key: DefinitionKey,
        context_type: &str,
        function: ScopeDefinitionFn,
    ) -> Result<&mut Self, SemanticsError> {
        let context_type = self.registered_name(context_type)?;
        let existing = self.definitions.get(&key).map(Vec::as_slice).unwrap_or_default();
        for other in existing {
            if other.context_type == context_type {
                return Err(SemanticsError::DuplicateDefinition {
                    key: key.to_string(),
                    context: context_type.to_string(),
                });
            }
            if self.is_ambiguous(context_type, other.context_type) {
                return Err(SemanticsError::AmbiguousDefinition {
                    key: key.to_string(),
                    first: other.context_type.to_string(),
                    second: context_type.to_string(),
                });
            }
        }
        debug!(key = %key, context = context_type, "registered scope definition");
        self.definitions.entry(key).or_default().push(ScopeDefinition {
            context_type,
            function,
        });
        Ok(self)
    }

    /// Two unrelated context types that some registered node type is an instance of both.
    fn is_ambiguous(&self, a: &str, b: &str) -> bool {
        let metamodel = &self.metamodel;
        if metamodel.is_subtype(a, b) || metamodel.is_subtype(b, a) {
            return false;
        }
        metamodel
            .node_types()
            .any(|t| metamodel.is_subtype(t.name, a) && metamodel.is_subtype(t.name, b))
    }

    /// The applicable definition with the most specific context type for `context`.
    fn most_specific<'d>(
        &self,
        ast: &Ast,
        key: &DefinitionKey,
        definitions: &'d [ScopeDefinition],
        context: NodeId,
    ) -> Result<Option<&'d ScopeDefinition>, SemanticsError> {
        let metamodel = &self.metamodel;
        let mut best: Option<&ScopeDefinition> = None;
        for definition in definitions.iter().filter(|d| ast.is_instance_of(context, d.context_type)) {
            best = match best {
                None => Some(definition),
                Some(current) if metamodel.is_more_specific(definition.context_type, current.context_type) => {
                    Some(definition)
                }
                Some(current) if metamodel.is_more_specific(current.context_type, definition.context_type) => {
                    Some(current)
                }
                Some(current) => {
                    return Err(SemanticsError::AmbiguousDefinition {
                        key: key.to_string(),
                        first: current.context_type.to_string(),
                        second: definition.context_type.to_string(),
                    });
                }
            };
        }
        Ok(best)
    }
}

impl ScopeProvider for DeclarativeScopeProvider {
    fn scope_for(&self, ast: &Ast, node: NodeId, feature: &str) -> Result<Scope, SemanticsError> {
        let node_type = ast.node_type_info(node);
        let descriptor = node_type
            .feature(feature)
            .filter(|f| f.kind == FeatureKind::Reference)
            .ok_or_else(|| SemanticsError::NotAReference {
                node_type: node_type.name.to_string(),
                feature: feature.to_string(),
            })?;

        let feature_keys: Vec<&DefinitionKey> = self
            .definitions
            .keys()
            .filter(|key| match key {
                DefinitionKey::Feature { node_type, feature: name } => {
                    name == feature && ast.is_instance_of(node, node_type)
                }
                DefinitionKey::Target(_) => false,
            })
            .collect();
        let target_key = descriptor.target.map(DefinitionKey::Target);
        let keys: Vec<&DefinitionKey> = feature_keys
            .into_iter()
            .chain(target_key.as_ref().filter(|key| self.definitions.contains_key(*key)))
            .collect();
        if keys.is_empty() {
            trace!(node = %ast.describe(node), feature, "no scope definitions");
            return Ok(Scope::new());
        }

        let levels = std::iter::once(node).chain(ast.walk_ancestors(node));
        for context in levels {
            for key in &keys {
                let Some(definitions) = self.definitions.get(*key) else {
                    continue;
                };
                let Some(definition) = self.most_specific(ast, key, definitions, context)? else {
                    continue;
                };
                if let Some(scope) = (definition.function)(ast, context) {
                    trace!(
                        node = %ast.describe(node),
                        feature,
                        context = %ast.describe(context),
                        "computed scope"
                    );
                    return Ok(scope);
                }
            }
        }
        debug!(node = %ast.describe(node), feature, "no applicable scope definition");
        Ok(Scope::new())
    }
}
