//! Languages every conversion depends on.
//!
//! - LionCore built-ins: `String`, `Integer`, `Boolean` and `INamed`
//! - StarLasu: the `ASTNode` concept every exported node type extends, with its
//!   `range` property, and the `Char`, `Point`, `Range` and `Real` primitives
//!
//! Points serialize as `L{line}:{column}` and ranges as `{start}-{end}`.

use crate::base::{Point, Range, START_LINE};

use super::error::ConversionError;
use super::language::{Classifier, ClassifierKind, Language, LanguageElement, LwFeatureKind, MetaPointer, PrimitiveType};

/// LionWeb release whose built-ins and serialization format are used.
pub const LIONWEB_VERSION: &str = "2023.1";

pub const LIONCORE_BUILTINS_KEY: &str = "LionCore-builtins";

pub const STARLASU_KEY: &str = "com_strumenta_starlasu";
pub const STARLASU_VERSION: &str = "1";
const STARLASU_ID: &str = "com-strumenta-StarLasu";

fn builtin(name: &str) -> MetaPointer {
    MetaPointer::new(LIONCORE_BUILTINS_KEY, LIONWEB_VERSION, format!("{LIONCORE_BUILTINS_KEY}-{name}"))
}

fn starlasu(name: &str) -> MetaPointer {
    MetaPointer::new(STARLASU_KEY, STARLASU_VERSION, format!("{STARLASU_KEY}_{name}"))
}

pub fn string_type() -> MetaPointer {
    builtin("String")
}

pub fn integer_type() -> MetaPointer {
    builtin("Integer")
}

pub fn boolean_type() -> MetaPointer {
    builtin("Boolean")
}

pub fn inamed() -> MetaPointer {
    builtin("INamed")
}

pub fn ast_node() -> MetaPointer {
    starlasu("ASTNode")
}

pub fn ast_node_range() -> MetaPointer {
    starlasu("ASTNode_range")
}

pub fn char_type() -> MetaPointer {
    starlasu("Char")
}

pub fn point_type() -> MetaPointer {
    starlasu("Point")
}

pub fn range_type() -> MetaPointer {
    starlasu("Range")
}

pub fn real_type() -> MetaPointer {
    starlasu("Real")
}

pub fn lioncore_builtins() -> Language {
    let mut language = Language::new(
        LIONCORE_BUILTINS_KEY,
        LIONCORE_BUILTINS_KEY,
        LIONCORE_BUILTINS_KEY,
        LIONWEB_VERSION,
    );
    for name in ["String", "Integer", "Boolean", "JSON"] {
        let key = format!("{LIONCORE_BUILTINS_KEY}-{name}");
        language.add(LanguageElement::PrimitiveType(PrimitiveType {
            name: name.to_string(),
            id: key.clone(),
            key,
        }));
    }
    let key = format!("{LIONCORE_BUILTINS_KEY}-INamed");
    let mut named = Classifier::interface("INamed", key.clone(), key);
    let name = named.add_feature("name", LwFeatureKind::Property, string_type(), false, false);
    // Built-in keys are joined with `-`.
    name.key = format!("{LIONCORE_BUILTINS_KEY}-INamed-name");
    name.id = name.key.clone();
    language.add(LanguageElement::Classifier(named));
    language
}

pub fn starlasu_language() -> Language {
    let mut language = Language::new("com.strumenta.StarLasu", STARLASU_ID, STARLASU_KEY, STARLASU_VERSION);
    for name in ["Char", "Point", "Range", "Real"] {
        language.add(LanguageElement::PrimitiveType(PrimitiveType {
            name: name.to_string(),
            id: format!("{STARLASU_ID}_{name}"),
            key: format!("{STARLASU_KEY}_{name}"),
        }));
    }
    let mut ast_node = Classifier::concept(
        "ASTNode",
        format!("{STARLASU_ID}_ASTNode"),
        format!("{STARLASU_KEY}_ASTNode"),
    );
    ast_node.kind = ClassifierKind::Concept {
        is_abstract: true,
        extends: None,
        implements: Vec::new(),
    };
    ast_node.add_feature("range", LwFeatureKind::Property, range_type(), true, false);
    language.add(LanguageElement::Classifier(ast_node));
    language
}

// ============================================================================
// PRIMITIVE SERIALIZATION
// ============================================================================

pub fn serialize_point(point: Point) -> String {
    format!("L{}:{}", point.line, point.column)
}

pub fn deserialize_point(serialized: &str) -> Result<Point, ConversionError> {
    let invalid = || ConversionError::invalid_property("point", serialized, "point");
    let (line, column) = serialized
        .strip_prefix('L')
        .and_then(|rest| rest.split_once(':'))
        .ok_or_else(invalid)?;
    let line: u32 = line.parse().map_err(|_| invalid())?;
    let column: u32 = column.parse().map_err(|_| invalid())?;
    if line < START_LINE {
        return Err(invalid());
    }
    Ok(Point { line, column })
}

pub fn serialize_range(range: &Range) -> String {
    format!("{}-{}", serialize_point(range.start), serialize_point(range.end))
}

pub fn deserialize_range(serialized: &str) -> Result<Range, ConversionError> {
    let invalid = || ConversionError::invalid_property("range", serialized, "range");
    let (start, end) = serialized.split_once('-').ok_or_else(invalid)?;
    let start = deserialize_point(start).map_err(|_| invalid())?;
    let end = deserialize_point(end).map_err(|_| invalid())?;
    if end < start {
        return Err(invalid());
    }
    Ok(Range::new(start, end))
}
