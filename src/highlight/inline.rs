//! Ordered inline tokenizer: bold, italic, code, link.

use std::sync::LazyLock;

use regex::Regex;

use super::{SpanKind, StyleSpan};

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+?)\*").expect("italic pattern"));
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+?)`").expect("code pattern"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+?)\]\([^)]+?\)").expect("link pattern"));

/// Maps byte offsets within a line to character columns.
struct Columns {
    starts: Vec<usize>,
}

impl Columns {
    fn new(line: &str) -> Self {
        Self {
            starts: line.char_indices().map(|(byte, _)| byte).collect(),
        }
    }

    fn at(&self, byte: usize) -> usize {
        self.starts.partition_point(|&start| start < byte)
    }
}

/// Scan one line for inline spans, category by category.
pub(super) fn scan(line_idx: usize, line: &str) -> Vec<StyleSpan> {
    let columns = Columns::new(line);
    let mut spans = Vec::new();

    let mut push = |kind: SpanKind, start: usize, end: usize| {
        spans.push(StyleSpan::new(line_idx, columns.at(start), columns.at(end), kind));
    };

    for m in BOLD.find_iter(line) {
        push(SpanKind::Bold, m.start(), m.end());
    }
    for (start, end) in italic_ranges(line) {
        push(SpanKind::Italic, start, end);
    }
    for m in CODE.find_iter(line) {
        push(SpanKind::Code, m.start(), m.end());
    }
    for m in LINK.find_iter(line) {
        push(SpanKind::Link, m.start(), m.end());
    }

    spans
}

/// Single-star emphasis whose delimiters do not touch another `*`.
///
/// A rejected candidate resumes one byte after its opening star, so the
/// closing star of a rejected match can still open the next one.
fn italic_ranges(line: &str) -> Vec<(usize, usize)> {
    let bytes = line.as_bytes();
    let mut ranges = Vec::new();
    let mut pos = 0;

    while let Some(m) = ITALIC.find_at(line, pos) {
        let star_before = m.start() > 0 && bytes[m.start() - 1] == b'*';
        let star_after = bytes.get(m.end()) == Some(&b'*');
        if star_before || star_after {
            pos = m.start() + 1;
        } else {
            ranges.push((m.start(), m.end()));
            pos = m.end();
        }
    }

    ranges
}
