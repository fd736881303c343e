//! Markdown highlighting for the editable surface.
//!
//! The tagger scans the raw buffer line by line and produces a fresh set of
//! [`StyleSpan`]s on every pass. It is independent of the preview renderer:
//! it never parses Markdown structurally, it only classifies line prefixes
//! and a handful of inline delimiters.
//!
//! Per line, spans are produced in a fixed order:
//! 1. heading (`#` to `######` followed by a space), covering the full line
//! 2. list item (`- `, `* `, `+ `, `1. `), covering the full line
//! 3. inline bold, italic, code and link, each scanned left to right
//!
//! Inline spans of different kinds may overlap. The later kind in that order
//! wins when a single column has to be resolved, see
//! [`StyleSpans::inline_kind_at`].

mod inline;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::ScanError;

/// Lines longer than this are tagged with block spans only.
pub const DEFAULT_MAX_INLINE_CHARS: usize = 10_000;

static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\. ").expect("ordered list pattern"));

/// Classification of a highlighted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Bold,
    Italic,
    Code,
    Link,
    ListItem,
}

impl SpanKind {
    /// Heading kind for a level in `1..=6`.
    pub const fn heading(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::H1),
            2 => Some(Self::H2),
            3 => Some(Self::H3),
            4 => Some(Self::H4),
            5 => Some(Self::H5),
            6 => Some(Self::H6),
            _ => None,
        }
    }

    pub const fn is_heading(self) -> bool {
        matches!(
            self,
            Self::H1 | Self::H2 | Self::H3 | Self::H4 | Self::H5 | Self::H6
        )
    }

    /// Whether the span covers part of a line rather than the whole line.
    pub const fn is_inline(self) -> bool {
        matches!(self, Self::Bold | Self::Italic | Self::Code | Self::Link)
    }

    /// Stable tag name, matching what editor widgets use as tag identifiers.
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Code => "code",
            Self::Link => "link",
            Self::ListItem => "list",
        }
    }
}

/// A half-open character range `start..end` on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleSpan {
    /// Zero-based line index
    pub line: usize,
    /// First column (characters)
    pub start: usize,
    /// Column one past the end (characters)
    pub end: usize,
    pub kind: SpanKind,
}

impl StyleSpan {
    pub const fn new(line: usize, start: usize, end: usize, kind: SpanKind) -> Self {
        Self {
            line,
            start,
            end,
            kind,
        }
    }

    pub const fn contains(&self, line: usize, col: usize) -> bool {
        self.line == line && col >= self.start && col < self.end
    }
}

/// The complete span set produced by one tagging pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSpans {
    spans: Vec<StyleSpan>,
    line_count: usize,
}

impl StyleSpans {
    pub fn iter(&self) -> impl Iterator<Item = &StyleSpan> {
        self.spans.iter()
    }

    pub fn as_slice(&self) -> &[StyleSpan] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Number of lines the pass covered.
    pub const fn line_count(&self) -> usize {
        self.line_count
    }

    /// Spans on `line`, in the order they were applied.
    pub fn on_line(&self, line: usize) -> impl Iterator<Item = &StyleSpan> {
        self.spans.iter().filter(move |span| span.line == line)
    }

    /// The heading kind of `line`, if any.
    pub fn heading_on(&self, line: usize) -> Option<SpanKind> {
        self.on_line(line)
            .map(|span| span.kind)
            .find(|kind| kind.is_heading())
    }

    /// Effective inline kind at a column: the last applied inline span wins.
    pub fn inline_kind_at(&self, line: usize, col: usize) -> Option<SpanKind> {
        self.on_line(line)
            .filter(|span| span.kind.is_inline() && span.contains(line, col))
            .last()
            .map(|span| span.kind)
    }
}

/// Line-oriented Markdown tagger.
#[derive(Debug, Clone, Copy)]
pub struct Tagger {
    max_inline_chars: usize,
}

impl Default for Tagger {
    fn default() -> Self {
        Self::new()
    }
}

impl Tagger {
    pub const fn new() -> Self {
        Self {
            max_inline_chars: DEFAULT_MAX_INLINE_CHARS,
        }
    }

    /// Limit the line length the inline scanner accepts.
    pub const fn with_max_inline_chars(mut self, max: usize) -> Self {
        self.max_inline_chars = max;
        self
    }

    /// Tag every line of `text`, replacing any previous result.
    pub fn tag(&self, text: &str) -> StyleSpans {
        let mut spans = Vec::new();
        let mut line_count = 0;

        for (idx, raw) in text.split('\n').enumerate() {
            line_count += 1;
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let width = line.chars().count();

            if let Some(kind) = heading_level(line).and_then(SpanKind::heading) {
                spans.push(StyleSpan::new(idx, 0, width, kind));
            }
            if is_list_item(line) {
                spans.push(StyleSpan::new(idx, 0, width, SpanKind::ListItem));
            }

            match self.scan_line(idx, line, width) {
                Ok(inline) => spans.extend(inline),
                Err(err) => tracing::debug!(%err, "skipping inline highlight"),
            }
        }

        StyleSpans { spans, line_count }
    }

    fn scan_line(&self, idx: usize, line: &str, width: usize) -> Result<Vec<StyleSpan>, ScanError> {
        if width > self.max_inline_chars {
            return Err(ScanError::LineTooLong {
                line: idx,
                len: width,
                max: self.max_inline_chars,
            });
        }
        Ok(inline::scan(idx, line))
    }
}

/// Tag `text` with the default limits.
pub fn tag(text: &str) -> StyleSpans {
    Tagger::new().tag(text)
}

/// Heading level for a line starting with 1-6 `#` and a space.
pub fn heading_level(line: &str) -> Option<u8> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) || line.as_bytes().get(hashes) != Some(&b' ') {
        return None;
    }
    u8::try_from(hashes).ok()
}

/// Whether a line, trimmed, starts with a list marker.
pub fn is_list_item(line: &str) -> bool {
    let trimmed = line.trim();
    ["- ", "* ", "+ "]
        .iter()
        .any(|marker| trimmed.starts_with(marker))
        || ORDERED_ITEM.is_match(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_on(spans: &StyleSpans, line: usize) -> Vec<SpanKind> {
        spans.on_line(line).map(|s| s.kind).collect()
    }

    #[test]
    fn test_each_heading_level_spans_full_line() {
        for level in 1..=6u8 {
            let line = format!("{} Title here", "#".repeat(level as usize));
            let spans = tag(&line);
            let headings: Vec<_> = spans.iter().filter(|s| s.kind.is_heading()).collect();
            assert_eq!(headings.len(), 1, "level {level}");
            assert_eq!(headings[0].kind, SpanKind::heading(level).unwrap());
            assert_eq!(headings[0].start, 0);
            assert_eq!(headings[0].end, line.chars().count());
        }
    }

    #[test]
    fn test_seven_hashes_is_not_heading() {
        assert!(tag("####### too deep").is_empty());
    }

    #[test]
    fn test_hash_without_space_is_not_heading() {
        assert!(tag("#hashtag").is_empty());
        assert_eq!(heading_level("#"), None);
    }

    #[test]
    fn test_indented_hash_is_not_heading() {
        assert_eq!(heading_level("  # nope"), None);
    }

    #[test]
    fn test_bold_italic_code_example() {
        let spans = tag("**bold** and *italic* and `code`");
        let inline: Vec<_> = spans.iter().copied().collect();
        assert_eq!(
            inline,
            vec![
                StyleSpan::new(0, 0, 8, SpanKind::Bold),
                StyleSpan::new(0, 13, 21, SpanKind::Italic),
                StyleSpan::new(0, 26, 32, SpanKind::Code),
            ]
        );
    }

    #[test]
    fn test_list_markers() {
        for line in ["- item", "* item", "+ item", "  - nested", "12. numbered"] {
            let spans = tag(line);
            assert_eq!(kinds_on(&spans, 0).first(), Some(&SpanKind::ListItem), "{line}");
            assert_eq!(spans.as_slice()[0].end, line.chars().count());
        }
    }

    #[test]
    fn test_non_list_lines() {
        for line in ["-item", "1.item", "-", "a. letter", "*emphasis*"] {
            assert!(
                !kinds_on(&tag(line), 0).contains(&SpanKind::ListItem),
                "{line}"
            );
        }
    }

    #[test]
    fn test_list_item_carries_inline_spans() {
        let spans = tag("- a [link](http://x) here");
        assert_eq!(kinds_on(&spans, 0), vec![SpanKind::ListItem, SpanKind::Link]);
        let link = spans.as_slice()[1];
        assert_eq!((link.start, link.end), (4, 20));
    }

    #[test]
    fn test_heading_with_inline_code() {
        let spans = tag("## Using `cargo`");
        assert_eq!(kinds_on(&spans, 0), vec![SpanKind::H2, SpanKind::Code]);
    }

    #[test]
    fn test_spans_follow_line_indices() {
        let spans = tag("# One\n\ntext *em*\n- item");
        assert_eq!(spans.line_count(), 4);
        assert_eq!(spans.heading_on(0), Some(SpanKind::H1));
        assert!(kinds_on(&spans, 1).is_empty());
        assert_eq!(kinds_on(&spans, 2), vec![SpanKind::Italic]);
        assert_eq!(kinds_on(&spans, 3), vec![SpanKind::ListItem]);
    }

    #[test]
    fn test_crlf_line_width_excludes_carriage_return() {
        let spans = tag("# Title\r\nnext");
        assert_eq!(spans.as_slice()[0].end, 7);
    }

    #[test]
    fn test_columns_are_characters() {
        let spans = tag("你好 **粗体**");
        assert_eq!(spans.as_slice()[0], StyleSpan::new(0, 3, 9, SpanKind::Bold));
    }

    #[test]
    fn test_overlapping_categories_resolve_last_applied() {
        let spans = tag("**[a](b)**");
        assert_eq!(kinds_on(&spans, 0), vec![SpanKind::Bold, SpanKind::Link]);
        assert_eq!(spans.inline_kind_at(0, 0), Some(SpanKind::Bold));
        assert_eq!(spans.inline_kind_at(0, 3), Some(SpanKind::Link));
        assert_eq!(spans.inline_kind_at(0, 9), Some(SpanKind::Bold));
        assert_eq!(spans.inline_kind_at(0, 10), None);
    }

    #[test]
    fn test_italic_inside_bold_overlaps() {
        let spans = tag("**a *b* c**");
        assert_eq!(kinds_on(&spans, 0), vec![SpanKind::Bold, SpanKind::Italic]);
        assert_eq!(spans.inline_kind_at(0, 5), Some(SpanKind::Italic));
        assert_eq!(spans.inline_kind_at(0, 2), Some(SpanKind::Bold));
    }

    #[test]
    fn test_long_line_keeps_block_spans_only() {
        let tagger = Tagger::new().with_max_inline_chars(10);
        let spans = tagger.tag("# **bold** heading that is long\n**ok**");
        assert_eq!(kinds_on(&spans, 0), vec![SpanKind::H1]);
        assert_eq!(kinds_on(&spans, 1), vec![SpanKind::Bold]);
    }

    #[test]
    fn test_empty_text_has_one_line_and_no_spans() {
        let spans = tag("");
        assert!(spans.is_empty());
        assert_eq!(spans.line_count(), 1);
    }

    #[test]
    fn test_tag_names() {
        assert_eq!(SpanKind::H3.tag_name(), "h3");
        assert_eq!(SpanKind::ListItem.tag_name(), "list");
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn spans_stay_within_their_line(text in "[#*`\\[\\]()\\-+ 0-9a-z.\n]{0,200}") {
                let spans = tag(&text);
                let lines: Vec<&str> = text.split('\n').collect();
                prop_assert_eq!(spans.line_count(), lines.len());
                for span in spans.iter() {
                    prop_assert!(span.line < lines.len());
                    prop_assert!(span.start < span.end || (!span.kind.is_inline() && span.start == span.end));
                    prop_assert!(span.end <= lines[span.line].chars().count());
                }
            }

            #[test]
            fn same_kind_inline_spans_never_overlap(text in "[*`\\[\\]()a-c ]{0,80}") {
                let spans = tag(&text);
                let all = spans.as_slice();
                for (i, a) in all.iter().enumerate() {
                    for b in &all[i + 1..] {
                        if a.kind == b.kind && a.kind.is_inline() && a.line == b.line {
                            prop_assert!(a.end <= b.start || b.end <= a.start);
                        }
                    }
                }
            }

            #[test]
            fn at_most_one_heading_per_line(text in "[# a\n]{0,60}") {
                let spans = tag(&text);
                for line in 0..spans.line_count() {
                    prop_assert!(spans.on_line(line).filter(|s| s.kind.is_heading()).count() <= 1);
                }
            }
        }
    }
}
