//! Minimal outline document support.
//!
//! Reads and writes the small subset of org-mode used by the filing document:
//! headings, property drawers, tables and plain text lines.

mod document;
mod table;

pub use document::{Document, Node};
pub use table::{Row, Table};
