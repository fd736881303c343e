//! Markdown to styled preview markup.
//!
//! The transformer is a pure function of the buffer text:
//! - empty or whitespace-only text renders a fixed placeholder
//! - otherwise the text is converted to HTML (tables, fenced code, table of
//!   contents) and every well-known opening tag gets its style attribute
//! - a conversion failure renders a diagnostic view holding the error and
//!   the raw source, so the preview never goes blank

mod convert;
mod export;
mod style;

pub use convert::{ComrakConverter, Heading, collect_headings, slugify};
pub use export::{DEFAULT_PDF_FONT, HtmlFileRenderer, PdfRenderer, print_page};
pub use style::{StyleSheet, TagRule, inject_styles};

use crate::error::ParseError;

/// Converts Markdown source to unstyled HTML.
pub trait Converter {
    /// # Errors
    /// Returns a [`ParseError`] when the source cannot be converted.
    fn to_html(&self, source: &str) -> Result<String, ParseError>;
}

const PLACEHOLDER_BODY: &str = "<div style=\"text-align: center; padding: 50px;\">\n\
<h2 style=\"color: #89b4fa; font-size: 28px;\">Welcome to Markdown Studio</h2>\n\
<p style=\"color: #a6e3a1; font-size: 16px;\">Start writing Markdown in the editor</p>\n\
<p style=\"color: #cba6f7; font-size: 16px;\">The live preview appears here</p>\n\
</div>\n";

const ERROR_CONTAINER_STYLE: &str =
    "background-color: #1e1e2e; color: #f38ba8; font-family: Arial, sans-serif; padding: 15px; margin: 0;";

/// Renders buffer text into the markup shown in the preview surface.
pub struct Transformer {
    converter: Box<dyn Converter>,
    styles: StyleSheet,
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("styles", &self.styles)
            .finish_non_exhaustive()
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new(StyleSheet::default())
    }
}

impl Transformer {
    /// A comrak-backed transformer using `styles`.
    pub fn new(styles: StyleSheet) -> Self {
        Self::with_converter(ComrakConverter, styles)
    }

    pub fn with_converter(converter: impl Converter + 'static, styles: StyleSheet) -> Self {
        Self {
            converter: Box::new(converter),
            styles,
        }
    }

    pub const fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Transform `text` into styled preview markup. Never fails.
    pub fn transform(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return self.placeholder();
        }
        match self.converter.to_html(text) {
            Ok(html) => self.wrap(&self.styles.inject(&html)),
            Err(err) => {
                tracing::warn!(%err, "markdown conversion failed, showing diagnostic view");
                diagnostic_markup(&err, text)
            }
        }
    }

    /// Markup shown for an empty document.
    pub fn placeholder(&self) -> String {
        self.wrap(PLACEHOLDER_BODY)
    }

    fn wrap(&self, body: &str) -> String {
        format!(
            "<div class=\"markstudio-preview\" style=\"{}\">\n{body}</div>\n",
            self.styles.container_style()
        )
    }
}

/// Diagnostic view: the error and the untouched source.
pub fn diagnostic_markup(err: &ParseError, source: &str) -> String {
    format!(
        "<div class=\"markstudio-preview markstudio-error\" style=\"{ERROR_CONTAINER_STYLE}\">\n\
<h3 style=\"color: #f38ba8;\">Preview rendering failed</h3>\n\
<p style=\"color: #fab387;\">Error: {}</p>\n\
<h4 style=\"color: #cba6f7;\">Source:</h4>\n\
<pre>{}</pre>\n\
</div>\n",
        escape_html(&err.to_string()),
        escape_html(source)
    )
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = Vec::with_capacity(text.len());
    // Writing into a Vec cannot fail.
    comrak::html::escape(&mut out, text.as_bytes()).ok();
    String::from_utf8(out).unwrap_or_default()
}
