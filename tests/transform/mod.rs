//! Transformation tests
//!
//! Bottom-up rebuilding with `transform_tree` and `map_children`, and in-place
//! editing of list containments.

pub mod tests_editing;
pub mod tests_transform_tree;
