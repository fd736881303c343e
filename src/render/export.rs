//! Print-ready page for PDF export.

use std::path::Path;

use crate::error::FileError;

/// Font declared on the print page so CJK text survives rasterization.
pub const DEFAULT_PDF_FONT: &str = "STSong-Light";

/// Turns a print page into a document on disk.
pub trait PdfRenderer {
    /// # Errors
    /// Returns a [`FileError`] when the page cannot be rendered to `dest`.
    fn render(&self, page: &str, dest: &Path) -> Result<(), FileError>;
}

/// Wrap preview markup in a complete page with a UTF-8 charset and a
/// page-level font.
pub fn print_page(markup: &str, font: &str) -> String {
    let font = font.replace(['\'', '<', '>'], "");
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
<style>body {{ font-family: '{font}'; }}</style>\n</head>\n<body>\n{markup}</body>\n</html>\n"
    )
}

/// Writes the print page as HTML for an external PDF tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlFileRenderer;

impl PdfRenderer for HtmlFileRenderer {
    fn render(&self, page: &str, dest: &Path) -> Result<(), FileError> {
        crate::files::write_document(dest, page)
    }
}
