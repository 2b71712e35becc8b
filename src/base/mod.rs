//! Foundation types for kolasu.
//!
//! This module provides the source-location vocabulary used by every other module:
//! - [`Point`] - A line/column location (1-based lines, 0-based columns)
//! - [`Range`] - An interval between two points, optionally tagged with a [`Source`]
//! - [`Source`], [`SourceSet`] - Where a piece of code comes from
//!
//! This module has NO dependencies on other kolasu modules.

mod position;
mod source;

pub use position::{Point, Range, START_COLUMN, START_LINE, START_POINT};
pub use source::{Source, SourceSet};
