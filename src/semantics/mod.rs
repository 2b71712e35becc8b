//! Name resolution scaffolding.
//!
//! A [`Scope`] maps names to the nodes they denote and chains to a parent
//! scope. A [`ScopeProvider`] computes the scope visible to a reference; the
//! [`DeclarativeScopeProvider`] does so from definitions registered per
//! reference feature or per target type. [`resolve_references`] drives a
//! provider over a whole tree.

mod error;
mod provider;
mod resolution;
mod scope;

pub use error::SemanticsError;
pub use provider::{DeclarativeScopeProvider, ScopeDefinitionFn, ScopeProvider};
pub use resolution::{ResolutionOptions, ResolutionSummary, resolve_references};
pub use scope::{Scope, Symbol};
