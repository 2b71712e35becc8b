//! # kolasu
//!
//! Language-agnostic AST infrastructure: a reflective node model, traversals,
//! tree transformations, name resolution scaffolding, node ids and LionWeb
//! interchange.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! lionweb    → LionWeb languages, node conversion, JSON chunks
//!   ↓
//! ids        → Node id providers (structural, UUID, sequential, persisted)
//!   ↓
//! semantics  → Scopes, scope providers, reference resolution
//!   ↓
//! transform  → transform_tree, map_children, in-place editing
//!   ↓
//! traversal  → walk, walk_leaves_first, walk_within, typed searches
//!   ↓
//! model      → Metamodel, Ast arena, features, values, references
//!   ↓
//! base       → Point, Range, Source
//! ```

// ============================================================================
// MODULES (dependency order: base → model → traversal → transform → semantics → ids → lionweb)
// ============================================================================

/// Foundation types: Point, Range, Source
pub mod base;

/// Node model: Metamodel, Ast, feature reflection
pub mod model;

/// Traversals over an Ast
pub mod traversal;

/// Rebuilding and editing trees
pub mod transform;

/// Scopes and reference resolution
pub mod semantics;

/// Stable node ids
pub mod ids;

/// LionWeb interchange
pub mod lionweb;

// Re-export foundation types
pub use base::{Point, Range, Source, SourceSet};

// Re-export the node model
pub use model::{
    Ast, FeatureDescription, FeatureKind, Metamodel, ModelError, Multiplicity, NodeId, ReferenceByName, Value,
};
