//! Ids computed by rules registered per node type.

use std::cmp::Ordering;
use std::fmt;

use tracing::{error, info, warn};

use crate::model::{Ast, NodeId};

use super::NodeIdProvider;
use super::error::IdError;

type RuleFn = dyn Fn(&RuleContext<'_>) -> Result<String, IdError>;

struct IdRule {
    node_type: String,
    rule: Box<RuleFn>,
}

/// What a rule sees while computing the id of one node.
pub struct RuleContext<'a> {
    pub ast: &'a Ast,
    pub node: NodeId,
    provider: &'a DeclarativeIdProvider,
}

impl RuleContext<'_> {
    /// The id another node gets from the same rules, e.g. its parent.
    pub fn id_of(&self, node: NodeId) -> Result<String, IdError> {
        self.provider.compute(self.ast, node)
    }

    pub fn info(&self, message: &str) {
        info!(node = %self.ast.describe(self.node), "{message}");
    }

    pub fn warning(&self, message: &str) {
        warn!(node = %self.ast.describe(self.node), "{message}");
    }

    pub fn error(&self, message: &str) {
        error!(node = %self.ast.describe(self.node), "{message}");
    }
}

/// Node ids from user rules keyed by node type or role.
///
/// The rule for the most specific type a node is an instance of wins; rules
/// for unrelated types are tried in name order. A node no rule applies to is
/// an error.
///
/// ```ignore
/// let provider = DeclarativeIdProvider::new()
///     .id_for("calc.Statement", |cx| Ok(format!("stmt-{}", cx.node)))
///     .id_for("calc.Assignment", |cx| Ok(cx.ast.name_of(cx.node).unwrap_or_default()));
/// ```
#[derive(Default)]
pub struct DeclarativeIdProvider {
    rules: Vec<IdRule>,
}

impl fmt::Debug for DeclarativeIdProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclarativeIdProvider")
            .field("rules", &self.rules.iter().map(|r| r.node_type.as_str()).collect::<Vec<_>>())
            .finish()
    }
}

impl DeclarativeIdProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `rule` for instances of `node_type`.
    pub fn id_for(
        mut self,
        node_type: impl Into<String>,
        rule: impl Fn(&RuleContext<'_>) -> Result<String, IdError> + 'static,
    ) -> Self {
        self.rules.push(IdRule {
            node_type: node_type.into(),
            rule: Box::new(rule),
        });
        self
    }

    /// Runs the rule applying to `node`.
    pub fn compute(&self, ast: &Ast, node: NodeId) -> Result<String, IdError> {
        let rule = self
            .rule_for(ast, node)
            .ok_or_else(|| IdError::NoMatchingRule(ast.describe(node)))?;
        let context = RuleContext {
            ast,
            node,
            provider: self,
        };
        (rule.rule)(&context)
    }

    fn rule_for(&self, ast: &Ast, node: NodeId) -> Option<&IdRule> {
        let metamodel = ast.metamodel();
        self.rules
            .iter()
            .filter(|r| ast.is_instance_of(node, &r.node_type))
            .min_by(|a, b| {
                if metamodel.is_more_specific(&a.node_type, &b.node_type) {
                    Ordering::Less
                } else if metamodel.is_more_specific(&b.node_type, &a.node_type) {
                    Ordering::Greater
                } else {
                    a.node_type.cmp(&b.node_type)
                }
            })
    }
}

impl NodeIdProvider for DeclarativeIdProvider {
    fn id(&mut self, ast: &Ast, node: NodeId) -> Result<String, IdError> {
        self.compute(ast, node)
    }
}
