//! Node model tests
//!
//! Reflection over registered node types, feature access, child ownership
//! and ranges.

pub mod tests_ranges;
pub mod tests_reflection;
