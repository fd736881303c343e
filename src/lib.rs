// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. autosave::AutosaveTimer)
    clippy::module_name_repetitions
)]

//! # markstudio
//!
//! The live-rendering core of a Markdown editor.
//!
//! As the user types, markstudio keeps two views of the same text current:
//! - a styled HTML preview (tables, fenced code, table of contents, inline
//!   style attributes on every well-known tag)
//! - highlight spans for the editable surface (headings, lists, bold,
//!   italic, code, links)
//!
//! Edits are debounced so a burst of keystrokes costs one render, and an
//! autosave timer periodically writes the document back to its file.
//!
//! ## Architecture
//!
//! The [`app::Session`] follows The Elm Architecture (TEA):
//! - **Model**: the document buffer and its rendered projections
//! - **Message**: editing, cursor, file and setting requests
//! - **Update**: pure state transitions
//! - **Effects**: file I/O and notifications, applied by the session
//!
//! ## Modules
//!
//! - [`app`]: session, debounce and autosave timers, watch loop
//! - [`buffer`]: rope-backed document buffer and statistics
//! - [`highlight`]: line-oriented span tagger
//! - [`render`]: Markdown to styled markup, print export
//! - [`files`]: document file I/O
//! - [`watcher`]: file watching
//! - [`config`]: flag files
//! - [`perf`]: timing scopes and the render debug log

pub mod app;
pub mod buffer;
pub mod config;
pub mod error;
pub mod files;
pub mod highlight;
pub mod perf;
pub mod render;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{Message, Model, Notification, NotificationLevel, Session};
    pub use crate::buffer::{DocumentBuffer, DocumentStats};
    pub use crate::highlight::{SpanKind, StyleSpan, StyleSpans, Tagger};
    pub use crate::render::{StyleSheet, Transformer};
}
