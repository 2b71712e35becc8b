//! Traversal tests
//!
//! Walk orders, range-restricted walks, ancestors, siblings and typed searches
//! over the sample tree.

pub mod tests_search;
pub mod tests_walk;
