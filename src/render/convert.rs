//! Markdown conversion with comrak.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use comrak::nodes::{AstNode, NodeValue};
use comrak::{Arena, Options, format_html, parse_document};

use super::{Converter, escape_html};
use crate::error::ParseError;

/// Paragraph marker replaced by the table of contents.
const TOC_MARKER: &str = "<p>[TOC]</p>\n";

/// A heading found in the document, with its anchor id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    pub id: String,
}

/// Converter backed by comrak with tables, fenced code, emoji shortcodes
/// and a table of contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComrakConverter;

impl Converter for ComrakConverter {
    fn to_html(&self, source: &str) -> Result<String, ParseError> {
        panic::catch_unwind(AssertUnwindSafe(|| render_markdown(source)))
            .map_err(|payload| ParseError::Panicked(panic_message(payload.as_ref())))?
    }
}

fn create_options() -> Options {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.shortcodes = true;
    options
}

fn render_markdown(source: &str) -> Result<String, ParseError> {
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, source, &options);
    let headings = collect_headings(root);

    let mut out = Vec::with_capacity(source.len() * 2);
    format_html(root, &options, &mut out)?;
    let html = String::from_utf8(out)?;

    let html = assign_heading_ids(&html, &headings);
    Ok(insert_toc(&html, &headings))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Headings in document order, with unique anchor ids.
pub fn collect_headings<'a>(root: &'a AstNode<'a>) -> Vec<Heading> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut headings = Vec::new();

    for node in root.descendants() {
        let level = match &node.data.borrow().value {
            NodeValue::Heading(heading) => heading.level,
            _ => continue,
        };
        let text = extract_text(node);
        let base = slugify(&text);
        let id = match seen.get_mut(&base) {
            Some(count) => {
                *count += 1;
                format!("{base}_{count}")
            }
            None => {
                seen.insert(base.clone(), 0);
                base
            }
        };
        headings.push(Heading { level, text, id });
    }

    headings
}

/// Anchor id for a heading: lowercase, word characters kept, whitespace
/// and hyphen runs collapsed to one `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.trim().chars() {
        if ch.is_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(code) => text.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
        }
    }
}

/// Put `id` attributes on the heading tags, in document order.
///
/// Raw HTML is omitted and code is escaped by the formatter, so every
/// `<hN>` in its output is a real heading. If the counts disagree the
/// markup is returned unchanged.
fn assign_heading_ids(html: &str, headings: &[Heading]) -> String {
    let positions: Vec<usize> = html
        .match_indices("<h")
        .map(|(idx, _)| idx)
        .filter(|&idx| {
            let bytes = html.as_bytes();
            matches!(bytes.get(idx + 2), Some(b'1'..=b'6')) && bytes.get(idx + 3) == Some(&b'>')
        })
        .collect();

    if positions.len() != headings.len() {
        tracing::debug!(
            tags = positions.len(),
            headings = headings.len(),
            "heading count mismatch, skipping anchor ids"
        );
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len() + headings.len() * 16);
    let mut last = 0;
    for (pos, heading) in positions.iter().zip(headings) {
        let name_end = pos + 3;
        out.push_str(&html[last..name_end]);
        out.push_str(&format!(" id=\"{}\"", escape_html(&heading.id)));
        last = name_end;
    }
    out.push_str(&html[last..]);
    out
}

fn insert_toc(html: &str, headings: &[Heading]) -> String {
    if !html.contains(TOC_MARKER) {
        return html.to_string();
    }
    html.replace(TOC_MARKER, &toc_html(headings))
}

/// Nested list of links to the headings.
fn toc_html(headings: &[Heading]) -> String {
    let mut out = String::from("<div class=\"toc\">\n");
    let mut open: Vec<u8> = Vec::new();

    for heading in headings {
        match open.last() {
            None => {
                out.push_str("<ul>\n");
                open.push(heading.level);
            }
            Some(&level) if heading.level > level => {
                out.push_str("\n<ul>\n");
                open.push(heading.level);
            }
            Some(_) => {
                out.push_str("</li>\n");
                while open.len() > 1 && open.last().is_some_and(|&level| heading.level < level) {
                    out.push_str("</ul>\n</li>\n");
                    open.pop();
                }
            }
        }
        out.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            escape_html(&heading.id),
            escape_html(&heading.text)
        ));
    }

    for _ in &open {
        out.push_str("</li>\n</ul>\n");
    }
    out.push_str("</div>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headings(source: &str) -> Vec<Heading> {
        let arena = Arena::new();
        let root = parse_document(&arena, source, &create_options());
        collect_headings(root)
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust & Go -- fast!  "), "rust-go-fast");
        assert_eq!(slugify("快速 开始"), "快速-开始");
        assert_eq!(slugify("!!!"), "section");
    }

    #[test]
    fn test_duplicate_headings_get_suffixes() {
        let ids: Vec<_> = headings("# Intro\n## Intro\n### Intro")
            .into_iter()
            .map(|h| h.id)
            .collect();
        assert_eq!(ids, vec!["intro", "intro_1", "intro_2"]);
    }

    #[test]
    fn test_heading_text_includes_code() {
        let found = headings("## Using `cargo` *fast*");
        assert_eq!(found[0].text, "Using cargo fast");
        assert_eq!(found[0].level, 2);
    }

    #[test]
    fn test_converter_adds_heading_ids() {
        let html = ComrakConverter.to_html("# First\n\ntext\n\n## Second").unwrap();
        assert!(html.contains("<h1 id=\"first\">First</h1>"), "{html}");
        assert!(html.contains("<h2 id=\"second\">Second</h2>"), "{html}");
    }

    #[test]
    fn test_code_block_heading_text_is_not_an_anchor() {
        let html = ComrakConverter.to_html("```\n<h1>fake</h1>\n```\n\n# Real").unwrap();
        assert!(html.contains("<h1 id=\"real\">Real</h1>"), "{html}");
        assert!(html.contains("&lt;h1&gt;fake"), "{html}");
    }

    #[test]
    fn test_toc_marker_replaced_with_nested_list() {
        let html = ComrakConverter
            .to_html("[TOC]\n\n# A\n\n## B\n\n# C")
            .unwrap();
        assert!(!html.contains("[TOC]"), "{html}");
        let expected = "<div class=\"toc\">\n<ul>\n<li><a href=\"#a\">A</a>\n<ul>\n\
<li><a href=\"#b\">B</a></li>\n</ul>\n</li>\n<li><a href=\"#c\">C</a></li>\n</ul>\n</div>\n";
        assert!(html.starts_with(expected), "{html}");
    }

    #[test]
    fn test_toc_without_headings_is_empty_container() {
        assert_eq!(toc_html(&[]), "<div class=\"toc\">\n</div>\n");
    }

    #[test]
    fn test_toc_escapes_heading_text() {
        let toc = toc_html(&[Heading {
            level: 1,
            text: "a < b".to_string(),
            id: "a-b".to_string(),
        }]);
        assert!(toc.contains(">a &lt; b</a>"));
    }

    #[test]
    fn test_fenced_code_keeps_language_class() {
        let html = ComrakConverter.to_html("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains("<pre><code class=\"language-rust\">"), "{html}");
    }

    #[test]
    fn test_emoji_shortcodes() {
        let html = ComrakConverter.to_html("ship it :rocket:").unwrap();
        assert!(html.contains('\u{1F680}'), "{html}");
    }

    #[test]
    fn test_panic_message_extracts_str_and_string() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
