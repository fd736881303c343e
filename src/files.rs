//! Reading and writing document files.

use std::path::Path;

use crate::error::FileError;

/// Read a UTF-8 document.
///
/// # Errors
/// Returns [`FileError::Read`] if the file is missing, unreadable, or not
/// valid UTF-8.
pub fn read_document(path: &Path) -> Result<String, FileError> {
    std::fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `text` to `path` byte for byte.
///
/// # Errors
/// Returns [`FileError::Write`] if the file cannot be created or written.
pub fn write_document(path: &Path, text: &str) -> Result<(), FileError> {
    std::fs::write(path, text).map_err(|source| FileError::Write {
        path: path.to_path_buf(),
        source,
    })
}
