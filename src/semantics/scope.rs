use std::sync::Arc;

use indexmap::IndexMap;

use crate::model::{Ast, NodeId};

use super::error::SemanticsError;

/// A node visible under a name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub name: String,
    pub node: NodeId,
}

/// Chained symbol table.
///
/// Several symbols may share a name, typically nodes of different types.
/// Lookups try the local table first, then the parent chain.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    symbols: IndexMap<String, Vec<Symbol>>,
    parent: Option<Arc<Scope>>,
    ignore_case: bool,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty scope whose names are compared case-insensitively.
    pub fn ignoring_case() -> Self {
        Self {
            ignore_case: true,
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<Arc<Scope>>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.parent.as_deref()
    }

    pub fn is_ignore_case(&self) -> bool {
        self.ignore_case
    }

    fn key(&self, name: &str) -> String {
        if self.ignore_case {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }

    pub fn define(&mut self, name: impl Into<String>, node: NodeId) {
        let name = name.into();
        let key = self.key(&name);
        self.symbols
            .entry(key)
            .or_default()
            .push(Symbol { name, node });
    }

    /// Defines `node` under its `name` attribute.
    pub fn define_named(&mut self, ast: &Ast, node: NodeId) -> Result<(), SemanticsError> {
        let name = ast
            .name_of(node)
            .ok_or_else(|| SemanticsError::Unnamed(ast.describe(node)))?;
        self.define(name, node);
        Ok(())
    }

    /// A scope holding every named node of `nodes`; unnamed nodes are skipped.
    pub fn of_named(ast: &Ast, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let mut scope = Self::new();
        for node in nodes {
            if let Some(name) = ast.name_of(node) {
                scope.define(name, node);
            }
        }
        scope
    }

    /// Local symbols defined under `name`.
    pub fn lookup(&self, name: &str) -> &[Symbol] {
        self.symbols
            .get(&self.key(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Local symbols in definition order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values().flatten()
    }

    /// Local symbols followed by those of every ancestor scope.
    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        std::iter::successors(Some(self), |scope| scope.parent()).flat_map(Scope::symbols)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.parent.as_ref().is_none_or(|p| p.is_empty())
    }

    /// First node defined as `name` that is an instance of `type_name`,
    /// searching this scope then its parents.
    pub fn resolve(&self, ast: &Ast, name: &str, type_name: Option<&str>) -> Option<NodeId> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            let found = current
                .lookup(name)
                .iter()
                .find(|symbol| type_name.is_none_or(|t| ast.is_instance_of(symbol.node, t)));
            if let Some(symbol) = found {
                return Some(symbol.node);
            }
            scope = current.parent();
        }
        None
    }

    /// Like [`Scope::resolve`], comparing names case-insensitively at every level.
    pub fn resolve_ignoring_case(&self, ast: &Ast, name: &str, type_name: Option<&str>) -> Option<NodeId> {
        let wanted = name.to_lowercase();
        self.all_symbols()
            .find(|symbol| {
                symbol.name.to_lowercase() == wanted
                    && type_name.is_none_or(|t| ast.is_instance_of(symbol.node, t))
            })
            .map(|symbol| symbol.node)
    }
}
