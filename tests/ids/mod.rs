//! Node id tests
//!
//! Structural ids over the sample tree and the file-backed providers.

pub mod tests_persisted;
pub mod tests_structural;
