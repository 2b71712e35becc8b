//! Name resolution tests
//!
//! Scopes, declarative scope providers and whole-tree reference resolution.

pub mod tests_resolution;
pub mod tests_try_to_resolve;
