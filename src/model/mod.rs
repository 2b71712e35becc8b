//! The node model.
//!
//! ```text
//! Metamodel  (registered node types, roles, enumerations; feature cache)
//!    │ Arc
//!    ▼
//! Ast        (arena: NodeId → node data + parent/origin/range/source/id)
//!    │
//!    └── node data: structs declared with node_type!, fields are features
//! ```
//!
//! Features are classified from field types: `NodeId` fields are containments,
//! [`ReferenceByName`] fields are references, everything else is an attribute.
//! `Option` makes a feature optional, `Vec` makes it many-valued.

mod ast;
mod error;
mod feature;
mod macros;
mod metamodel;
mod node;
mod origin;
mod printing;
mod reference;
mod value;

pub use ast::{Ast, NodeDisplay};
pub use error::{ModelError, ValueError};
pub use feature::{FeatureDescription, FeatureDescriptor, FeatureKind, Multiplicity};
pub use metamodel::{
    EnumType, Metamodel, NodeType, RESERVED_FEATURE_NAMES, RoleKind, RoleType, RootPolicy, simple_name,
};
pub use node::{
    Constructor, FeatureValues, NodeData, NodeEnum, NodeId, NodeKind, NodeTypeDeclaration,
};
pub use origin::{Destination, Origin};
pub use printing::DebugPrintConfiguration;
pub use reference::ReferenceByName;
pub use value::{AttributeScalar, EnumLiteral, FeatureValue, Value, ValueType};
