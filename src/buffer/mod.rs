//! The document buffer: raw Markdown text, cursor and modification flag.
//!
//! The buffer is the single source of truth for the pipeline. Style spans,
//! rendered markup and statistics are all recomputed from its text.

mod document;
mod stats;

pub use document::{Cursor, Direction, DocumentBuffer};
pub use stats::DocumentStats;
