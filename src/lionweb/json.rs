//! LionWeb JSON serialization chunks.
//!
//! ```json
//! {
//!   "serializationFormatVersion": "2023.1",
//!   "languages": [{ "key": "my-lang", "version": "1" }],
//!   "nodes": [{
//!     "id": "file_a_root",
//!     "classifier": { "language": "my-lang", "version": "1", "key": "my-lang_Root" },
//!     "properties": [{ "property": { ... }, "value": "L1:0-L3:1" }],
//!     "containments": [{ "containment": { ... }, "children": ["file_a_root_items"] }],
//!     "references": [{ "reference": { ... }, "targets": [{ "resolveInfo": "x", "reference": null }] }],
//!     "annotations": [],
//!     "parent": null
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::builtins::LIONWEB_VERSION;
use super::error::ConversionError;
use super::language::MetaPointer;
use super::model::{LwModel, LwNode, LwNodeId, ReferenceValue};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerializationChunk {
    serialization_format_version: String,
    #[serde(default)]
    languages: Vec<UsedLanguage>,
    nodes: Vec<SerializedNode>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
struct UsedLanguage {
    key: String,
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedNode {
    id: String,
    classifier: MetaPointer,
    #[serde(default)]
    properties: Vec<SerializedProperty>,
    #[serde(default)]
    containments: Vec<SerializedContainment>,
    #[serde(default)]
    references: Vec<SerializedReference>,
    #[serde(default)]
    annotations: Vec<String>,
    parent: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedProperty {
    property: MetaPointer,
    value: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedContainment {
    containment: MetaPointer,
    children: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedReference {
    reference: MetaPointer,
    targets: Vec<SerializedTarget>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerializedTarget {
    resolve_info: Option<String>,
    reference: Option<String>,
}

/// Writes `model` as a pretty-printed serialization chunk.
pub fn serialize(model: &LwModel) -> Result<String, ConversionError> {
    let mut languages: Vec<UsedLanguage> = Vec::new();
    let mut use_language = |pointer: &MetaPointer| {
        let used = UsedLanguage {
            key: pointer.language.clone(),
            version: pointer.version.clone(),
        };
        if !languages.contains(&used) {
            languages.push(used);
        }
    };

    let mut nodes = Vec::with_capacity(model.len());
    for node in model.nodes() {
        use_language(&node.classifier);
        let properties = node
            .properties()
            .map(|(property, value)| {
                use_language(property);
                SerializedProperty {
                    property: property.clone(),
                    value: value.map(str::to_string),
                }
            })
            .collect();
        let containments = node
            .containments()
            .map(|(containment, children)| {
                use_language(containment);
                SerializedContainment {
                    containment: containment.clone(),
                    children: children.iter().map(|c| c.to_string()).collect(),
                }
            })
            .collect();
        let references = node
            .references()
            .map(|(reference, values)| {
                use_language(reference);
                SerializedReference {
                    reference: reference.clone(),
                    targets: values
                        .iter()
                        .map(|v| SerializedTarget {
                            resolve_info: v.resolve_info.clone(),
                            reference: v.referred.as_ref().map(|r| r.to_string()),
                        })
                        .collect(),
                }
            })
            .collect();
        nodes.push(SerializedNode {
            id: node.id.to_string(),
            classifier: node.classifier.clone(),
            properties,
            containments,
            references,
            annotations: Vec::new(),
            parent: node.parent.as_ref().map(|p| p.to_string()),
        });
    }

    let chunk = SerializationChunk {
        serialization_format_version: LIONWEB_VERSION.to_string(),
        languages,
        nodes,
    };
    serde_json::to_string_pretty(&chunk).map_err(|e| ConversionError::json(e.to_string()))
}

/// Reads a serialization chunk. Every child listed must be part of the chunk.
pub fn deserialize(input: &str) -> Result<LwModel, ConversionError> {
    let chunk: SerializationChunk =
        serde_json::from_str(input).map_err(|e| ConversionError::json(e.to_string()))?;
    if chunk.serialization_format_version != LIONWEB_VERSION {
        return Err(ConversionError::UnsupportedVersion(chunk.serialization_format_version));
    }

    let mut model = LwModel::new();
    let mut containments = Vec::new();
    for serialized in chunk.nodes {
        let id = LwNodeId::from(serialized.id);
        let mut node = LwNode::new(id.clone(), serialized.classifier);
        node.parent = serialized.parent.map(LwNodeId::from);
        for property in serialized.properties {
            node.set_property_value(property.property, property.value);
        }
        for reference in serialized.references {
            node.ensure_reference(reference.reference.clone());
            for target in reference.targets {
                node.add_reference_value(
                    reference.reference.clone(),
                    ReferenceValue::new(target.reference.map(LwNodeId::from), target.resolve_info),
                );
            }
        }
        for containment in serialized.containments {
            node.ensure_containment(containment.containment.clone());
            containments.push((id.clone(), containment));
        }
        model.add_node(node)?;
    }
    for (parent, containment) in containments {
        for child in containment.children {
            model.add_child(&parent, containment.containment.clone(), &LwNodeId::from(child))?;
        }
    }
    debug!(nodes = model.len(), "read LionWeb chunk");
    Ok(model)
}
