//! Style injection: presentation attributes on well-known opening tags.

/// Style attached to every opening tag named `tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRule {
    pub tag: String,
    pub style: String,
}

impl TagRule {
    pub fn new(tag: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            style: style.into(),
        }
    }
}

/// Immutable presentation settings for the preview.
///
/// Rules are applied in order, one pass per tag kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet {
    container: String,
    rules: Vec<TagRule>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::dark()
    }
}

impl StyleSheet {
    pub fn new(container: impl Into<String>, rules: Vec<TagRule>) -> Self {
        Self {
            container: container.into(),
            rules,
        }
    }

    /// The dark palette used by the editor's default theme.
    pub fn dark() -> Self {
        let rules = [
            ("h1", "color: #89b4fa; font-size: 28px; font-weight: bold; margin: 20px 0 15px 0;"),
            ("h2", "color: #a6e3a1; font-size: 24px; font-weight: bold; margin: 18px 0 12px 0;"),
            ("h3", "color: #cba6f7; font-size: 20px; font-weight: bold; margin: 15px 0 10px 0;"),
            ("h4", "color: #fab387; font-size: 18px; font-weight: bold; margin: 12px 0 8px 0;"),
            ("h5", "color: #f5c2e7; font-size: 16px; font-weight: bold; margin: 10px 0 6px 0;"),
            ("h6", "color: #f38ba8; font-size: 14px; font-weight: bold; margin: 8px 0 5px 0;"),
            ("p", "color: #cdd6f4; margin: 12px 0; line-height: 1.6;"),
            ("li", "color: #bac2de; margin: 5px 0;"),
            ("strong", "color: #f5c2e7; font-weight: bold;"),
            ("em", "color: #fab387; font-style: italic;"),
            (
                "code",
                "background-color: #313244; color: #a6e3a1; padding: 2px 6px; border-radius: 4px; font-family: monospace;",
            ),
            (
                "pre",
                "background-color: #313244; color: #a6e3a1; padding: 15px; margin: 15px 0; border-radius: 8px; overflow-x: auto;",
            ),
            (
                "blockquote",
                "border-left: 4px solid #fab387; background-color: rgba(49, 50, 68, 0.5); padding: 15px 20px; margin: 15px 0; color: #bac2de; font-style: italic;",
            ),
            ("a", "color: #89b4fa; text-decoration: underline;"),
            ("ul", "color: #cdd6f4; padding-left: 20px;"),
            ("ol", "color: #cdd6f4; padding-left: 20px;"),
            (
                "table",
                "border-collapse: collapse; width: 100%; margin: 15px 0; background-color: #313244; border-radius: 6px;",
            ),
            (
                "th",
                "background-color: #45475a; color: #cdd6f4; padding: 12px; border: 1px solid #6c7086; font-weight: bold;",
            ),
            ("td", "padding: 10px 12px; border: 1px solid #6c7086; color: #cdd6f4;"),
            (
                "hr",
                "border: none; height: 2px; background-color: #45475a; margin: 25px 0; border-radius: 1px;",
            ),
        ]
        .into_iter()
        .map(|(tag, style)| TagRule::new(tag, style))
        .collect();

        Self::new(
            "background-color: #1e1e2e; color: #cdd6f4; font-family: Arial, sans-serif; padding: 15px; margin: 0;",
            rules,
        )
    }

    pub fn container_style(&self) -> &str {
        &self.container
    }

    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    pub fn style_for(&self, tag: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.tag == tag)
            .map(|rule| rule.style.as_str())
    }

    /// Apply every rule to `html`.
    pub fn inject(&self, html: &str) -> String {
        inject_styles(html, &self.rules)
    }
}

/// Add `style` attributes to opening tags, one pass per rule.
///
/// Only whole tag names match, and a tag that already carries a style
/// attribute right after its name is left alone, so applying the same rules
/// twice changes nothing.
pub fn inject_styles(html: &str, rules: &[TagRule]) -> String {
    rules.iter().fold(html.to_string(), |acc, rule| {
        inject_tag(&acc, &rule.tag, &rule.style)
    })
}

fn inject_tag(html: &str, tag: &str, style: &str) -> String {
    let needle = format!("<{tag}");
    let attr = format!(" style=\"{style}\"");
    let mut out = String::with_capacity(html.len() + attr.len());
    let mut last = 0;

    for (idx, _) in html.match_indices(&needle) {
        let after = idx + needle.len();
        let rest = &html[after..];
        let boundary = rest
            .chars()
            .next()
            .is_some_and(|c| c == '>' || c == '/' || c.is_whitespace());
        if !boundary || rest.starts_with(" style=\"") {
            continue;
        }
        out.push_str(&html[last..after]);
        out.push_str(&attr);
        last = after;
    }
    out.push_str(&html[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_tag_names_only() {
        let rules = vec![TagRule::new("p", "c: 1;"), TagRule::new("th", "c: 2;")];
        let html = inject_styles("<pre>x</pre><p>y</p><thead><th>z</th></thead>", &rules);
        assert_eq!(
            html,
            "<pre>x</pre><p style=\"c: 1;\">y</p><thead><th style=\"c: 2;\">z</th></thead>"
        );
    }

    #[test]
    fn test_existing_attributes_are_kept() {
        let rules = vec![TagRule::new("a", "c: 1;")];
        let html = inject_styles("<a href=\"#x\">x</a>", &rules);
        assert_eq!(html, "<a style=\"c: 1;\" href=\"#x\">x</a>");
    }

    #[test]
    fn test_self_closing_tag() {
        let rules = vec![TagRule::new("hr", "c: 1;")];
        assert_eq!(inject_styles("<hr />", &rules), "<hr style=\"c: 1;\" />");
    }

    #[test]
    fn test_closing_tags_untouched() {
        let rules = vec![TagRule::new("em", "c: 1;")];
        assert_eq!(
            inject_styles("<em>a</em>", &rules),
            "<em style=\"c: 1;\">a</em>"
        );
    }

    #[test]
    fn test_injection_is_idempotent() {
        let sheet = StyleSheet::dark();
        let html = "<h1 id=\"a\">A</h1>\n<p>b <strong>c</strong> <a href=\"x\">d</a></p>\n<ul>\n<li>e</li>\n</ul>\n";
        let once = sheet.inject(html);
        assert_eq!(sheet.inject(&once), once);
    }

    #[test]
    fn test_dark_sheet_covers_known_tags_in_order() {
        let tags: Vec<_> = StyleSheet::dark()
            .rules()
            .iter()
            .map(|rule| rule.tag.clone())
            .collect();
        assert_eq!(
            tags,
            vec![
                "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "strong", "em", "code", "pre",
                "blockquote", "a", "ul", "ol", "table", "th", "td", "hr"
            ]
        );
    }

    #[test]
    fn test_style_for_lookup() {
        let sheet = StyleSheet::dark();
        assert!(sheet.style_for("blockquote").is_some());
        assert!(sheet.style_for("div").is_none());
    }
}
