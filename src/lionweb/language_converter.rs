//! Maps metamodels to LionWeb languages.
//!
//! Exporting derives keys and ids from the metamodel name:
//!
//! | Element | Key | Id |
//! |---------|-----|----|
//! | language | name with `.` replaced by `-` | `starlasu_language_{key}` |
//! | concept, interface | `{language key}_{Name}` | `{language id}_{Name}` |
//! | feature | `{classifier key}_{name}` | `{classifier id}_{name}` |
//! | enumeration | `{Name}` | `{language id}_{Name}` |
//!
//! Node types become concepts extending `ASTNode` (or the concept of the
//! abstract role they extend), interface roles become interfaces.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::model::{FeatureDescriptor, FeatureKind, Metamodel, ModelError, Multiplicity, NodeType, RoleKind, ValueType};

use super::builtins;
use super::error::ConversionError;
use super::language::{
    Classifier, ClassifierKind, Enumeration, Language, LanguageElement, LanguageRegistry, LwFeatureKind,
    MetaPointer,
};

/// Bidirectional association between node types and classifiers.
#[derive(Clone, Debug, Default)]
pub struct LanguageConverter {
    registry: LanguageRegistry,
    classifiers: FxHashMap<&'static str, MetaPointer>,
    node_types: FxHashMap<MetaPointer, &'static str>,
    enumerations: FxHashMap<&'static str, MetaPointer>,
}

impl LanguageConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Builds the language describing `metamodel`, registers it and associates
    /// every node type, role and enumeration with its counterpart.
    pub fn export_metamodel(&mut self, metamodel: &Metamodel) -> Result<Arc<Language>, ConversionError> {
        let key = metamodel.name().replace('.', "-");
        let id = format!("starlasu_language_{key}");
        let mut language = Language::new(metamodel.name(), id, key, "1");
        language.add_dependency(&builtins::lioncore_builtins());
        language.add_dependency(&builtins::starlasu_language());

        let mut pointers: FxHashMap<&'static str, MetaPointer> = FxHashMap::default();
        let mut enumerations = FxHashMap::default();
        let add = |language: &mut Language,
                   name: &'static str,
                   element: LanguageElement|
         -> Result<MetaPointer, ConversionError> {
            if language.element(element.key()).is_some() {
                return Err(ConversionError::Model(ModelError::DuplicateType(name.to_string())));
            }
            Ok(language.add(element))
        };

        for enumeration in metamodel.enumerations() {
            let simple = enumeration.simple_name();
            let element = Enumeration::new(
                simple,
                format!("{}_{simple}", language.id),
                simple,
                enumeration.literals.iter().copied(),
            );
            let pointer = add(&mut language, enumeration.name, LanguageElement::Enumeration(element))?;
            enumerations.insert(enumeration.name, pointer);
        }

        // Classifiers first, so features and supertypes can point at any of them.
        for role in metamodel.roles() {
            let (id, key) = contained(&language, role.simple_name());
            let classifier = match role.kind {
                RoleKind::Interface => Classifier::interface(role.simple_name(), id, key),
                RoleKind::AbstractConcept => Classifier::concept(role.simple_name(), id, key),
            };
            let pointer = add(&mut language, role.name, LanguageElement::Classifier(classifier))?;
            pointers.insert(role.name, pointer);
        }
        for node_type in metamodel.node_types() {
            let (id, key) = contained(&language, node_type.simple_name());
            let classifier = Classifier::concept(node_type.simple_name(), id, key);
            let pointer = add(&mut language, node_type.name, LanguageElement::Classifier(classifier))?;
            pointers.insert(node_type.name, pointer);
        }

        let lookup = |name: &str| {
            pointers
                .get(name)
                .cloned()
                .ok_or_else(|| ConversionError::Model(ModelError::UnregisteredType(name.to_string())))
        };

        for role in metamodel.roles() {
            let kind = match role.kind {
                RoleKind::Interface => ClassifierKind::Interface {
                    extends: role
                        .supertypes
                        .iter()
                        .map(|s| lookup(*s))
                        .collect::<Result<_, _>>()?,
                },
                RoleKind::AbstractConcept => {
                    let (concepts, interfaces): (Vec<&str>, Vec<&str>) = role
                        .supertypes
                        .iter()
                        .copied()
                        .partition(|s| metamodel.role(s).is_some_and(|r| r.kind == RoleKind::AbstractConcept));
                    ClassifierKind::Concept {
                        is_abstract: true,
                        extends: Some(match concepts.first() {
                            Some(parent) => lookup(*parent)?,
                            None => builtins::ast_node(),
                        }),
                        implements: interfaces.into_iter().map(lookup).collect::<Result<_, _>>()?,
                    }
                }
            };
            if let Some(classifier) = language.classifier_mut(&lookup(role.name)?.key) {
                classifier.kind = kind;
            }
        }

        for node_type in metamodel.node_types() {
            let pointer = lookup(node_type.name)?;
            let extends = match node_type.extends {
                Some(parent) => lookup(parent)?,
                None => builtins::ast_node(),
            };
            let implements = node_type
                .implements
                .iter()
                .map(|i| lookup(*i))
                .collect::<Result<Vec<_>, _>>()?;
            let mut features = Vec::new();
            for descriptor in node_type.features.iter().filter(|f| !f.derived) {
                features.push(feature_shape(node_type, descriptor, &lookup, &enumerations)?);
            }
            if let Some(classifier) = language.classifier_mut(&pointer.key) {
                classifier.kind = ClassifierKind::Concept {
                    is_abstract: false,
                    extends: Some(extends),
                    implements,
                };
                for (name, kind, feature_type, optional, multiple) in features {
                    classifier.add_feature(name, kind, feature_type, optional, multiple);
                }
            }
        }

        debug!(
            language = %language.key,
            elements = language.elements().count(),
            "exported metamodel"
        );
        for (name, pointer) in pointers {
            self.associate_classifier(name, pointer);
        }
        self.enumerations.extend(enumerations);
        Ok(self.registry.register(language))
    }

    /// Associates `metamodel` with an existing language, matching node types
    /// to concepts and enumerations by simple name.
    pub fn associate(&mut self, metamodel: &Metamodel, language: Language) -> Result<Arc<Language>, ConversionError> {
        for node_type in metamodel.node_types() {
            let concept = language
                .classifier_by_name(node_type.simple_name())
                .filter(|c| c.is_concept())
                .ok_or_else(|| ConversionError::NoConcept(node_type.name.to_string()))?;
            let pointer = language.meta_pointer(&concept.key);
            self.associate_classifier(node_type.name, pointer);
        }
        for enumeration in metamodel.enumerations() {
            let found = language.elements().find_map(|e| match e {
                LanguageElement::Enumeration(found) if found.name == enumeration.simple_name() => Some(found),
                _ => None,
            });
            if let Some(found) = found {
                self.enumerations
                    .insert(enumeration.name, language.meta_pointer(&found.key));
            }
        }
        debug!(language = %language.key, metamodel = metamodel.name(), "associated language");
        Ok(self.registry.register(language))
    }

    fn associate_classifier(&mut self, node_type: &'static str, pointer: MetaPointer) {
        self.node_types.insert(pointer.clone(), node_type);
        self.classifiers.insert(node_type, pointer);
    }

    pub fn corresponding_classifier(&self, node_type: &str) -> Result<&MetaPointer, ConversionError> {
        self.classifiers
            .get(node_type)
            .ok_or_else(|| ConversionError::NoConcept(node_type.to_string()))
    }

    pub fn corresponding_node_type(&self, classifier: &MetaPointer) -> Result<&'static str, ConversionError> {
        self.node_types
            .get(classifier)
            .copied()
            .ok_or_else(|| ConversionError::UnknownClassifier(classifier.clone()))
    }

    pub fn corresponding_enumeration(&self, enumeration: &str) -> Option<&MetaPointer> {
        self.enumerations.get(enumeration)
    }
}

fn contained(language: &Language, name: &str) -> (String, String) {
    (format!("{}_{name}", language.id), format!("{}_{name}", language.key))
}

type FeatureShape = (&'static str, LwFeatureKind, MetaPointer, bool, bool);

fn feature_shape(
    node_type: &NodeType,
    descriptor: &FeatureDescriptor,
    lookup: &impl Fn(&str) -> Result<MetaPointer, ConversionError>,
    enumerations: &FxHashMap<&'static str, MetaPointer>,
) -> Result<FeatureShape, ConversionError> {
    let optional = descriptor.multiplicity != Multiplicity::Singular;
    let target = |descriptor: &FeatureDescriptor| match descriptor.target {
        Some(target) => lookup(target),
        None => Ok(builtins::ast_node()),
    };
    match descriptor.kind {
        FeatureKind::Attribute => {
            if descriptor.is_many() {
                return Err(ConversionError::unsupported_feature(
                    node_type.name,
                    descriptor.name,
                    "many-valued attributes have no property counterpart",
                ));
            }
            let data_type = match descriptor.value_type {
                ValueType::Boolean => builtins::boolean_type(),
                ValueType::Integer => builtins::integer_type(),
                ValueType::String => builtins::string_type(),
                ValueType::Char => builtins::char_type(),
                ValueType::Real => builtins::real_type(),
                ValueType::Enum(name) => enumerations
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ConversionError::Model(ModelError::UnregisteredType(name.to_string())))?,
                ValueType::Node | ValueType::Reference => {
                    return Err(ConversionError::unsupported_feature(
                        node_type.name,
                        descriptor.name,
                        "attribute holding nodes",
                    ));
                }
            };
            Ok((descriptor.name, LwFeatureKind::Property, data_type, optional, false))
        }
        // Containments are always optional on the LionWeb side.
        FeatureKind::Containment => Ok((
            descriptor.name,
            LwFeatureKind::Containment,
            target(descriptor)?,
            true,
            descriptor.is_many(),
        )),
        FeatureKind::Reference => Ok((
            descriptor.name,
            LwFeatureKind::Reference,
            target(descriptor)?,
            optional,
            false,
        )),
    }
}
