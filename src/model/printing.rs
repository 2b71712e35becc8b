//! Multi-line debug dumps of trees.

use std::fmt::Write;

use super::ast::Ast;
use super::node::NodeId;
use super::value::Value;

/// What [`Ast::debug_print`] shows and how.
#[derive(Clone, Debug)]
pub struct DebugPrintConfiguration {
    pub skip_empty_collections: bool,
    pub skip_null: bool,
    pub force_show_range: bool,
    /// Feature names to leave out.
    pub hide: Vec<String>,
    pub indent_block: String,
}

impl Default for DebugPrintConfiguration {
    fn default() -> Self {
        Self {
            skip_empty_collections: false,
            skip_null: false,
            force_show_range: false,
            hide: Vec::new(),
            indent_block: "  ".to_string(),
        }
    }
}

impl DebugPrintConfiguration {
    pub fn with_skip_empty_collections(mut self, skip: bool) -> Self {
        self.skip_empty_collections = skip;
        self
    }

    pub fn with_skip_null(mut self, skip: bool) -> Self {
        self.skip_null = skip;
        self
    }

    pub fn with_force_show_range(mut self, show: bool) -> Self {
        self.force_show_range = show;
        self
    }

    pub fn hiding(mut self, feature: impl Into<String>) -> Self {
        self.hide.push(feature.into());
        self
    }
}

impl Ast {
    /// Indented dump of the subtree rooted at `root`, one feature per line.
    pub fn debug_print(&self, root: NodeId, configuration: &DebugPrintConfiguration) -> String {
        let mut out = String::new();
        self.debug_print_into(&mut out, root, "", configuration);
        out
    }

    fn debug_print_into(
        &self,
        out: &mut String,
        node: NodeId,
        indent: &str,
        configuration: &DebugPrintConfiguration,
    ) {
        let block = configuration.indent_block.as_str();
        let inner = format!("{indent}{block}");
        let nested = format!("{indent}{block}{block}");
        let type_name = self.node_type_info(node).simple_name();

        let range = self.range(node).filter(|_| configuration.force_show_range);
        let features: Vec<_> = self
            .features(node)
            .into_iter()
            .filter(|f| !f.derived && !configuration.hide.iter().any(|h| h == f.name))
            .collect();
        if features.is_empty() && range.is_none() {
            let _ = writeln!(out, "{indent}{type_name}");
            return;
        }

        let _ = writeln!(out, "{indent}{type_name} {{");
        if let Some(range) = range {
            let _ = writeln!(out, "{inner}range = {range}");
        }
        for feature in features {
            match feature.value {
                Value::Null => {
                    if !configuration.skip_null {
                        let _ = writeln!(out, "{inner}{} = null", feature.name);
                    }
                }
                Value::Node(child) => {
                    let _ = writeln!(out, "{inner}{} = [", feature.name);
                    self.debug_print_into(out, child, &nested, configuration);
                    let _ = writeln!(out, "{inner}]");
                }
                Value::Nodes(children) => {
                    if children.is_empty() {
                        if !configuration.skip_empty_collections {
                            let _ = writeln!(out, "{inner}{} = []", feature.name);
                        }
                        continue;
                    }
                    let _ = writeln!(out, "{inner}{} = [", feature.name);
                    for child in children {
                        self.debug_print_into(out, child, &nested, configuration);
                    }
                    let _ = writeln!(out, "{inner}]");
                }
                Value::List(items) => {
                    if items.is_empty() {
                        if !configuration.skip_empty_collections {
                            let _ = writeln!(out, "{inner}{} = []", feature.name);
                        }
                        continue;
                    }
                    let _ = writeln!(out, "{inner}{} = [", feature.name);
                    for item in items {
                        let _ = writeln!(out, "{nested}{item}");
                    }
                    let _ = writeln!(out, "{inner}]");
                }
                other => {
                    let _ = writeln!(out, "{inner}{} = {other}", feature.name);
                }
            }
        }
        let _ = writeln!(out, "{indent}}}");
    }
}
