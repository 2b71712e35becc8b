//! LionWeb language descriptions (the M2 level).
//!
//! Every element carries a name, an id and a key. Instances point at
//! classifiers and features through [`MetaPointer`]s, which combine the
//! language key and version with the element key.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use super::builtins;
use super::error::ConversionError;

// ============================================================================
// META POINTERS
// ============================================================================

/// Addresses a language element from outside its language.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct MetaPointer {
    pub language: String,
    pub version: String,
    pub key: String,
}

impl MetaPointer {
    pub fn new(language: impl Into<String>, version: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            version: version.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for MetaPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.language, self.version, self.key)
    }
}

// ============================================================================
// ELEMENTS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LwFeatureKind {
    Property,
    Containment,
    Reference,
}

/// A property, containment or reference of a classifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub id: String,
    pub key: String,
    pub kind: LwFeatureKind,
    pub optional: bool,
    pub multiple: bool,
    /// Data type for properties, classifier for links.
    pub feature_type: MetaPointer,
}

impl Feature {
    /// A feature whose key and id are derived from its container's.
    pub fn contained_in(
        container_id: &str,
        container_key: &str,
        name: &str,
        kind: LwFeatureKind,
        feature_type: MetaPointer,
    ) -> Self {
        Self {
            name: name.to_string(),
            id: format!("{container_id}_{name}"),
            key: format!("{container_key}_{name}"),
            kind,
            optional: false,
            multiple: false,
            feature_type,
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassifierKind {
    Concept {
        is_abstract: bool,
        extends: Option<MetaPointer>,
        implements: Vec<MetaPointer>,
    },
    Interface {
        extends: Vec<MetaPointer>,
    },
}

/// A concept or an interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classifier {
    pub name: String,
    pub id: String,
    pub key: String,
    pub kind: ClassifierKind,
    pub features: Vec<Feature>,
}

impl Classifier {
    pub fn concept(name: impl Into<String>, id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            key: key.into(),
            kind: ClassifierKind::Concept {
                is_abstract: false,
                extends: None,
                implements: Vec::new(),
            },
            features: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>, id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            key: key.into(),
            kind: ClassifierKind::Interface { extends: Vec::new() },
            features: Vec::new(),
        }
    }

    pub fn is_concept(&self) -> bool {
        matches!(self.kind, ClassifierKind::Concept { .. })
    }

    pub fn is_abstract(&self) -> bool {
        match &self.kind {
            ClassifierKind::Concept { is_abstract, .. } => *is_abstract,
            ClassifierKind::Interface { .. } => true,
        }
    }

    /// Extended concept first, then interfaces.
    pub fn supertypes(&self) -> Vec<&MetaPointer> {
        match &self.kind {
            ClassifierKind::Concept {
                extends, implements, ..
            } => extends.iter().chain(implements).collect(),
            ClassifierKind::Interface { extends } => extends.iter().collect(),
        }
    }

    /// A declared feature, by name.
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Adds a feature whose key and id derive from this classifier's.
    pub fn add_feature(
        &mut self,
        name: &str,
        kind: LwFeatureKind,
        feature_type: MetaPointer,
        optional: bool,
        multiple: bool,
    ) -> &mut Feature {
        let feature = Feature::contained_in(&self.id, &self.key, name, kind, feature_type)
            .optional(optional)
            .multiple(multiple);
        self.features.push(feature);
        let last = self.features.len() - 1;
        &mut self.features[last]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumerationLiteral {
    pub name: String,
    pub id: String,
    pub key: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enumeration {
    pub name: String,
    pub id: String,
    pub key: String,
    pub literals: Vec<EnumerationLiteral>,
}

impl Enumeration {
    /// An enumeration whose literal keys and ids are `{enumeration}-{literal}`.
    pub fn new<'a>(
        name: impl Into<String>,
        id: impl Into<String>,
        key: impl Into<String>,
        literals: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let (name, id, key) = (name.into(), id.into(), key.into());
        let literals = literals
            .into_iter()
            .map(|literal| EnumerationLiteral {
                name: literal.to_string(),
                id: format!("{id}-{literal}"),
                key: format!("{key}-{literal}"),
            })
            .collect();
        Self {
            name,
            id,
            key,
            literals,
        }
    }

    pub fn literal_by_name(&self, name: &str) -> Option<&EnumerationLiteral> {
        self.literals.iter().find(|l| l.name == name)
    }

    pub fn literal_by_key(&self, key: &str) -> Option<&EnumerationLiteral> {
        self.literals.iter().find(|l| l.key == key)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimitiveType {
    pub name: String,
    pub id: String,
    pub key: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LanguageElement {
    Classifier(Classifier),
    Enumeration(Enumeration),
    PrimitiveType(PrimitiveType),
}

impl LanguageElement {
    pub fn name(&self) -> &str {
        match self {
            LanguageElement::Classifier(c) => &c.name,
            LanguageElement::Enumeration(e) => &e.name,
            LanguageElement::PrimitiveType(p) => &p.name,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            LanguageElement::Classifier(c) => &c.key,
            LanguageElement::Enumeration(e) => &e.key,
            LanguageElement::PrimitiveType(p) => &p.key,
        }
    }
}

// ============================================================================
// LANGUAGE
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Language {
    pub name: String,
    pub id: String,
    pub key: String,
    pub version: String,
    /// `(key, version)` of the languages this one builds on.
    pub dependencies: Vec<(String, String)>,
    elements: IndexMap<String, LanguageElement>,
}

impl Language {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        key: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            key: key.into(),
            version: version.into(),
            dependencies: Vec::new(),
            elements: IndexMap::new(),
        }
    }

    /// Pointer to an element of this language, by key.
    pub fn meta_pointer(&self, key: impl Into<String>) -> MetaPointer {
        MetaPointer::new(&self.key, &self.version, key)
    }

    pub fn add_dependency(&mut self, language: &Language) {
        let dependency = (language.key.clone(), language.version.clone());
        if !self.dependencies.contains(&dependency) {
            self.dependencies.push(dependency);
        }
    }

    /// Adds an element, replacing any with the same key.
    pub fn add(&mut self, element: LanguageElement) -> MetaPointer {
        let pointer = self.meta_pointer(element.key());
        self.elements.insert(element.key().to_string(), element);
        pointer
    }

    pub fn elements(&self) -> impl Iterator<Item = &LanguageElement> {
        self.elements.values()
    }

    pub fn element(&self, key: &str) -> Option<&LanguageElement> {
        self.elements.get(key)
    }

    pub fn classifiers(&self) -> impl Iterator<Item = &Classifier> {
        self.elements.values().filter_map(|e| match e {
            LanguageElement::Classifier(c) => Some(c),
            _ => None,
        })
    }

    pub fn classifier(&self, key: &str) -> Option<&Classifier> {
        match self.elements.get(key)? {
            LanguageElement::Classifier(c) => Some(c),
            _ => None,
        }
    }

    pub fn classifier_mut(&mut self, key: &str) -> Option<&mut Classifier> {
        match self.elements.get_mut(key)? {
            LanguageElement::Classifier(c) => Some(c),
            _ => None,
        }
    }

    pub fn classifier_by_name(&self, name: &str) -> Option<&Classifier> {
        self.classifiers().find(|c| c.name == name)
    }

    pub fn enumeration(&self, key: &str) -> Option<&Enumeration> {
        match self.elements.get(key)? {
            LanguageElement::Enumeration(e) => Some(e),
            _ => None,
        }
    }

    pub fn primitive_type(&self, key: &str) -> Option<&PrimitiveType> {
        match self.elements.get(key)? {
            LanguageElement::PrimitiveType(p) => Some(p),
            _ => None,
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// The languages known to a conversion, addressed by key and version.
///
/// Always contains the LionCore built-ins and the StarLasu base language.
#[derive(Clone, Debug)]
pub struct LanguageRegistry {
    languages: IndexMap<(String, String), Arc<Language>>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        let mut registry = Self {
            languages: IndexMap::new(),
        };
        registry.register(builtins::lioncore_builtins());
        registry.register(builtins::starlasu_language());
        registry
    }
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a language, replacing a previous one with the same key and version.
    pub fn register(&mut self, language: Language) -> Arc<Language> {
        let language = Arc::new(language);
        self.languages.insert(
            (language.key.clone(), language.version.clone()),
            Arc::clone(&language),
        );
        language
    }

    pub fn language(&self, key: &str, version: &str) -> Option<&Arc<Language>> {
        self.languages.get(&(key.to_string(), version.to_string()))
    }

    pub fn languages(&self) -> impl Iterator<Item = &Arc<Language>> {
        self.languages.values()
    }

    fn language_of(&self, pointer: &MetaPointer) -> Result<&Arc<Language>, ConversionError> {
        self.language(&pointer.language, &pointer.version)
            .ok_or_else(|| ConversionError::UnknownLanguage {
                key: pointer.language.clone(),
                version: pointer.version.clone(),
            })
    }

    pub fn classifier(&self, pointer: &MetaPointer) -> Result<&Classifier, ConversionError> {
        self.language_of(pointer)?
            .classifier(&pointer.key)
            .ok_or_else(|| ConversionError::UnknownClassifier(pointer.clone()))
    }

    pub fn enumeration(&self, pointer: &MetaPointer) -> Option<&Enumeration> {
        self.language_of(pointer).ok()?.enumeration(&pointer.key)
    }

    /// Features of a classifier and of all its supertypes, each with its pointer.
    ///
    /// Own features come first, then those inherited breadth-first.
    pub fn all_features(&self, classifier: &MetaPointer) -> Result<Vec<(MetaPointer, &Feature)>, ConversionError> {
        let mut features = Vec::new();
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([classifier.clone()]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let found = self.classifier(&current)?;
            for feature in &found.features {
                let pointer = MetaPointer::new(&current.language, &current.version, &feature.key);
                features.push((pointer, feature));
            }
            queue.extend(found.supertypes().into_iter().cloned());
        }
        Ok(features)
    }

    /// Whether `sub` is `sup` or one of its descendants.
    pub fn is_subtype(&self, sub: &MetaPointer, sup: &MetaPointer) -> bool {
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([sub.clone()]);
        while let Some(current) = queue.pop_front() {
            if &current == sup {
                return true;
            }
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Ok(found) = self.classifier(&current) {
                queue.extend(found.supertypes().into_iter().cloned());
            }
        }
        false
    }
}
