//! Error types for the rendering pipeline.
//!
//! None of these are fatal: each is recovered where it occurs.
//! [`ParseError`] becomes diagnostic markup, [`FileError`] becomes a
//! user-facing notification, and [`ScanError`] drops the inline spans of one
//! line.

use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Markdown conversion failed.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The converter panicked while parsing or formatting
    #[error("markdown converter panicked: {0}")]
    Panicked(String),

    /// Writing the formatted markup failed
    #[error("failed to format markup: {0}")]
    Format(#[from] std::io::Error),

    /// The formatter produced bytes that are not UTF-8
    #[error("converter produced invalid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Reading or writing a document failed.
#[derive(Debug, Error)]
pub enum FileError {
    /// Could not read the file
    #[error("cannot open {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write the file
    #[error("cannot save {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Save requested but no file is bound to the document
    #[error("no file is bound to this document")]
    NotBound,

    /// An external renderer rejected the export
    #[error("export to {} failed: {reason}", path.display())]
    Export { path: PathBuf, reason: String },
}

/// Inline scanning of a single line failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    /// Line is longer than the inline scan limit
    #[error("line {line} has {len} characters, inline scan limit is {max}")]
    LineTooLong { line: usize, len: usize, max: usize },
}
