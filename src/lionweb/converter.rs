//! Converts trees to and from LionWeb nodes.
//!
//! Export runs in two passes over the tree: the first allocates one LionWeb
//! node per node and records the pair, the second fills properties,
//! containments and references, so references may point anywhere in the tree.
//! Import instantiates children before their parents and fills references in
//! once every node exists.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::ids::{NodeIdProvider, SimpleSourceIdProvider, StructuralIdProvider};
use crate::model::{
    Ast, EnumLiteral, FeatureDescriptor, FeatureKind, FeatureValues, ModelError, NodeId, NodeType,
    ReferenceByName, Value, ValueType,
};

use super::builtins::{self, STARLASU_KEY};
use super::error::ConversionError;
use super::language::{Feature, LwFeatureKind, MetaPointer};
use super::language_converter::LanguageConverter;
use super::model::{LwModel, LwNode, LwNodeId, ReferenceValue};

/// Pairs of nodes and their LionWeb counterparts, for one conversion.
#[derive(Debug, Default)]
struct NodeMapping {
    to_lw: FxHashMap<NodeId, LwNodeId>,
    to_node: FxHashMap<LwNodeId, NodeId>,
}

impl NodeMapping {
    fn associate(&mut self, node: NodeId, lw: LwNodeId) {
        self.to_lw.insert(node, lw.clone());
        self.to_node.insert(lw, node);
    }

    fn lw(&self, node: NodeId) -> Option<&LwNodeId> {
        self.to_lw.get(&node)
    }

    fn node(&self, lw: &LwNodeId) -> Option<NodeId> {
        self.to_node.get(lw).copied()
    }
}

/// Converts trees of the associated metamodels.
#[derive(Clone, Debug, Default)]
pub struct ModelConverter {
    languages: LanguageConverter,
}

impl ModelConverter {
    pub fn new(languages: LanguageConverter) -> Self {
        Self { languages }
    }

    pub fn languages(&self) -> &LanguageConverter {
        &self.languages
    }

    pub fn languages_mut(&mut self) -> &mut LanguageConverter {
        &mut self.languages
    }

    /// Exports the tree rooted at `root` with structural ids.
    ///
    /// A root without a source gets the `UNKNOWN_SOURCE` source id.
    pub fn export_to_lionweb(&self, ast: &Ast, root: NodeId) -> Result<LwModel, ConversionError> {
        let mut ids = StructuralIdProvider::new(SimpleSourceIdProvider::default().with_accept_missing_source(true));
        self.export_with_ids(ast, root, &mut ids)
    }

    pub fn export_with_ids(
        &self,
        ast: &Ast,
        root: NodeId,
        ids: &mut dyn NodeIdProvider,
    ) -> Result<LwModel, ConversionError> {
        let nodes: Vec<NodeId> = ast.walk(root).collect();
        let mut mapping = NodeMapping::default();
        let mut model = LwModel::new();
        for node in &nodes {
            let classifier = self.languages.corresponding_classifier(ast.node_type(*node))?;
            let id = LwNodeId::from(ids.id(ast, *node)?);
            model.add_node(LwNode::new(id.clone(), classifier.clone()))?;
            mapping.associate(*node, id);
        }

        for node in &nodes {
            let Some(lw_id) = mapping.lw(*node).cloned() else {
                continue;
            };
            let node_type = ast.node_type_info(*node);
            let classifier = self.languages.corresponding_classifier(node_type.name)?;
            for (pointer, feature) in self.languages.registry().all_features(classifier)? {
                if pointer == builtins::ast_node_range() {
                    let range = ast.range(*node).map(|r| builtins::serialize_range(&r));
                    lw_node(&mut model, &lw_id)?.set_property_value(pointer, range);
                    continue;
                }
                if pointer.language == STARLASU_KEY {
                    continue;
                }
                let descriptor = counterpart(node_type, feature)?;
                let value = ast.feature_value(*node, descriptor.name)?;
                match feature.kind {
                    LwFeatureKind::Property => {
                        let serialized = self.serialize_property(node_type, descriptor, &value)?;
                        lw_node(&mut model, &lw_id)?.set_property_value(pointer, serialized);
                    }
                    LwFeatureKind::Containment => {
                        lw_node(&mut model, &lw_id)?.ensure_containment(pointer.clone());
                        for child in value.nodes() {
                            let child = mapping
                                .lw(child)
                                .ok_or_else(|| ModelError::UnknownNode(child.to_string()))?;
                            model.add_child(&lw_id, pointer.clone(), child)?;
                        }
                    }
                    LwFeatureKind::Reference => {
                        lw_node(&mut model, &lw_id)?.ensure_reference(pointer.clone());
                        if let Value::Reference(reference) = value {
                            let target = reference_target(ast, &mapping, ids, &reference)?;
                            lw_node(&mut model, &lw_id)?.add_reference_value(pointer, target);
                        }
                    }
                }
            }
        }
        debug!(root = %ast.describe(root), nodes = model.len(), "exported tree to LionWeb");
        Ok(model)
    }

    /// Builds nodes in `ast` from the LionWeb subtree rooted at `root`.
    ///
    /// Imported nodes keep their LionWeb id as identifier, so exporting them
    /// again reproduces the same ids.
    pub fn import_from_lionweb(
        &self,
        model: &LwModel,
        root: &LwNodeId,
        ast: &mut Ast,
    ) -> Result<NodeId, ConversionError> {
        let lw_nodes = model.this_and_all_descendants(root)?;
        let mut mapping = NodeMapping::default();
        // Keyed by owner and feature, filled in once every node exists.
        let mut postponed: IndexMap<(NodeId, &'static str), ReferenceValue> = IndexMap::new();

        // Reverse pre-order puts every child before its parent.
        for lw in lw_nodes.iter().rev() {
            let type_name = self.languages.corresponding_node_type(&lw.classifier)?;
            let node_type = ast
                .metamodel()
                .node_type(type_name)
                .cloned()
                .ok_or_else(|| ModelError::UnregisteredType(type_name.to_string()))?;
            let mut values = FeatureValues::new();
            let mut references = Vec::new();
            let mut range = None;
            for (pointer, feature) in self.languages.registry().all_features(&lw.classifier)? {
                if pointer == builtins::ast_node_range() {
                    range = lw
                        .get_property_value(&pointer)
                        .map(builtins::deserialize_range)
                        .transpose()?;
                    continue;
                }
                if pointer.language == STARLASU_KEY {
                    continue;
                }
                let descriptor = counterpart(&node_type, feature)?;
                let value = match feature.kind {
                    LwFeatureKind::Property => {
                        self.deserialize_property(descriptor, lw.get_property_value(&pointer))?
                    }
                    LwFeatureKind::Containment => {
                        let children = lw
                            .get_children(&pointer)
                            .iter()
                            .map(|child| {
                                mapping
                                    .node(child)
                                    .ok_or_else(|| ConversionError::UnknownNode(child.to_string()))
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        if descriptor.is_many() {
                            Value::Nodes(children)
                        } else {
                            match children.as_slice() {
                                [] => Value::Null,
                                [child] => Value::Node(*child),
                                more => return Err(too_many(lw, feature, more.len())),
                            }
                        }
                    }
                    LwFeatureKind::Reference => match lw.get_reference_values(&pointer) {
                        [] => Value::Null,
                        [target] => {
                            references.push((descriptor.name, target.clone()));
                            let name = target.resolve_info.clone().unwrap_or_default();
                            Value::Reference(ReferenceByName::new(name))
                        }
                        more => return Err(too_many(lw, feature, more.len())),
                    },
                };
                values.insert(descriptor.name.to_string(), value);
            }

            let data = node_type
                .construct(values)
                .map_err(|source| ModelError::Construction {
                    node_type: type_name.to_string(),
                    source,
                })?;
            let node = ast.add_boxed(data)?;
            ast.set_range(node, range);
            ast.set_identifier(node, Some(lw.id.to_string()));
            trace!(id = %lw.id, node = %node, "imported LionWeb node");
            mapping.associate(node, lw.id.clone());
            for (feature, target) in references {
                postponed.insert((node, feature), target);
            }
        }

        for ((node, feature), target) in postponed {
            let Some(referred) = target.referred else {
                continue;
            };
            match mapping.node(&referred) {
                Some(found) => ast.set_reference_referred(node, feature, Some(found))?,
                None => {
                    // Outside the imported subtree: keep the id only.
                    if let Some(mut reference) = ast.get_reference(node, feature)? {
                        reference.identifier = Some(referred.to_string());
                        ast.set_feature(node, feature, Value::Reference(reference))?;
                    }
                }
            }
        }

        let imported = mapping
            .node(root)
            .ok_or_else(|| ConversionError::UnknownNode(root.to_string()))?;
        debug!(root = %root, nodes = lw_nodes.len(), "imported tree from LionWeb");
        Ok(imported)
    }

    fn serialize_property(
        &self,
        node_type: &NodeType,
        descriptor: &FeatureDescriptor,
        value: &Value,
    ) -> Result<Option<String>, ConversionError> {
        let serialized = match value {
            Value::Null => return Ok(None),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(r) => r.to_string(),
            Value::Char(c) => c.to_string(),
            Value::String(s) => s.clone(),
            Value::Enum(literal) => self.literal_key(descriptor, literal)?,
            _ => {
                return Err(ConversionError::unsupported_feature(
                    node_type.name,
                    descriptor.name,
                    "value is not a property",
                ));
            }
        };
        Ok(Some(serialized))
    }

    fn deserialize_property(
        &self,
        descriptor: &FeatureDescriptor,
        serialized: Option<&str>,
    ) -> Result<Value, ConversionError> {
        let Some(serialized) = serialized else {
            return Ok(Value::Null);
        };
        let invalid = |expected| ConversionError::invalid_property(descriptor.name, serialized, expected);
        let value = match descriptor.value_type {
            ValueType::Boolean => Value::Boolean(serialized.parse().map_err(|_| invalid("boolean"))?),
            ValueType::Integer => Value::Integer(serialized.parse().map_err(|_| invalid("integer"))?),
            ValueType::Real => Value::Real(serialized.parse().map_err(|_| invalid("real"))?),
            ValueType::Char => {
                let mut chars = serialized.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Value::Char(c),
                    _ => return Err(invalid("char")),
                }
            }
            ValueType::String => Value::String(serialized.to_string()),
            ValueType::Enum(enumeration) => {
                let literal = self
                    .languages
                    .corresponding_enumeration(enumeration)
                    .and_then(|pointer| self.languages.registry().enumeration(pointer))
                    .and_then(|found| found.literal_by_key(serialized))
                    .ok_or_else(|| invalid("enumeration literal"))?;
                Value::Enum(EnumLiteral::new(enumeration, &literal.name))
            }
            ValueType::Node | ValueType::Reference => return Err(invalid("property")),
        };
        Ok(value)
    }

    fn literal_key(&self, descriptor: &FeatureDescriptor, literal: &EnumLiteral) -> Result<String, ConversionError> {
        self.languages
            .corresponding_enumeration(&literal.enumeration)
            .and_then(|pointer| self.languages.registry().enumeration(pointer))
            .and_then(|found| found.literal_by_name(&literal.literal))
            .map(|found| found.key.clone())
            .ok_or_else(|| ConversionError::invalid_property(descriptor.name, &literal.literal, "enumeration literal"))
    }
}

/// The node feature a LionWeb feature maps to, by name and kind.
fn counterpart<'a>(node_type: &'a NodeType, feature: &Feature) -> Result<&'a FeatureDescriptor, ConversionError> {
    let expected = match feature.kind {
        LwFeatureKind::Property => FeatureKind::Attribute,
        LwFeatureKind::Containment => FeatureKind::Containment,
        LwFeatureKind::Reference => FeatureKind::Reference,
    };
    node_type
        .feature(&feature.name)
        .filter(|d| !d.derived && d.kind == expected)
        .ok_or_else(|| ConversionError::MissingFeature {
            concept: node_type.simple_name().to_string(),
            feature: feature.name.clone(),
            node_type: node_type.name.to_string(),
        })
}

fn lw_node<'m>(model: &'m mut LwModel, id: &LwNodeId) -> Result<&'m mut LwNode, ConversionError> {
    model
        .get_mut(id)
        .ok_or_else(|| ConversionError::UnknownNode(id.to_string()))
}

/// Target inside the tree, proxy by id, or just the name.
fn reference_target(
    ast: &Ast,
    mapping: &NodeMapping,
    ids: &mut dyn NodeIdProvider,
    reference: &ReferenceByName,
) -> Result<ReferenceValue, ConversionError> {
    let referred = match (reference.referred, &reference.identifier) {
        (Some(target), _) => match mapping.lw(target) {
            Some(id) => Some(id.clone()),
            None => Some(LwNodeId::from(ids.id(ast, target)?)),
        },
        (None, Some(identifier)) => Some(LwNodeId::from(identifier.as_str())),
        (None, None) => None,
    };
    Ok(ReferenceValue::new(referred, Some(reference.name.clone())))
}

fn too_many(lw: &LwNode, feature: &Feature, count: usize) -> ConversionError {
    ConversionError::TooManyValues {
        node: lw.id.to_string(),
        feature: feature.name.clone(),
        count,
    }
}
