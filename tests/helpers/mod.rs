//! Shared fixtures for the integration suites.

pub mod tree_fixtures;

pub use tree_fixtures::*;
