//! LionWeb interchange.
//!
//! ```text
//! Metamodel ──LanguageConverter──► Language   (concepts, features, keys)
//!    │                                │
//! Ast ──────ModelConverter────────► LwModel   (generic nodes)
//!                                     │
//!                                   json      (serialization chunks, `json` feature)
//! ```
//!
//! A [`LanguageConverter`] exports a metamodel as a LionWeb language, or
//! associates it with an existing one, and remembers which node type maps to
//! which concept. A [`ModelConverter`] then translates trees in both
//! directions through that association.

mod builtins;
mod converter;
mod error;
mod language;
mod language_converter;
mod model;

#[cfg(feature = "json")]
pub mod json;

pub use builtins::{
    LIONCORE_BUILTINS_KEY, LIONWEB_VERSION, STARLASU_KEY, STARLASU_VERSION, ast_node, ast_node_range,
    boolean_type, char_type, deserialize_point, deserialize_range, inamed, integer_type, lioncore_builtins,
    point_type, range_type, real_type, serialize_point, serialize_range, starlasu_language, string_type,
};
pub use converter::ModelConverter;
pub use error::ConversionError;
pub use language::{
    Classifier, ClassifierKind, Enumeration, EnumerationLiteral, Feature, Language, LanguageElement,
    LanguageRegistry, LwFeatureKind, MetaPointer, PrimitiveType,
};
pub use language_converter::LanguageConverter;
pub use model::{LwModel, LwNode, LwNodeId, ReferenceValue};
