use serde::Serialize;

/// Counts shown in the status bar and statistics view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    /// Characters in the trimmed text
    pub chars: usize,
    /// Whitespace-separated words
    pub words: usize,
    /// Lines in the trimmed text
    pub lines: usize,
    /// Non-blank blocks separated by an empty line
    pub paragraphs: usize,
}

impl DocumentStats {
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        Self {
            chars: trimmed.chars().count(),
            words: trimmed.split_whitespace().count(),
            lines: trimmed.split('\n').count(),
            paragraphs: trimmed
                .split("\n\n")
                .filter(|p| !p.trim().is_empty())
                .count(),
        }
    }
}
