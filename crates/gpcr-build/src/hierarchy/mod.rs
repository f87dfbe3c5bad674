//! Indentation-based family taxonomy
//!
//! Each line of `proteins_and_families.txt` is either a family
//! (`name` or `name | scheme`) or a quoted receptor row. Four leading spaces
//! make one level of depth. [`HierarchyCursor`] tracks the open branch of
//! the tree while the file is walked top to bottom.

pub mod cursor;
pub mod line;

pub use cursor::HierarchyCursor;
pub use line::{FamilyLine, LineKind, ProteinLine, TaxonomyLine, INDENT_WIDTH};
