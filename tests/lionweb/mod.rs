//! LionWeb interchange tests
//!
//! Metamodel export, tree export and import, and JSON chunks.

pub mod tests_language;
pub mod tests_round_trip;
