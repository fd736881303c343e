use markstudio::app::{Message, NotificationLevel, Session};
use markstudio::highlight::SpanKind;
use markstudio::render::{StyleSheet, TagRule, Transformer};

const SAMPLE: &str = include_str!("fixtures/sample.md");

#[test]
fn test_sample_renders_toc_tables_and_code() {
    let mut session = Session::new();
    session.load_document(SAMPLE, None);
    let markup = session.styled_markup();

    assert!(markup.contains("<div class=\"toc\">"));
    assert!(markup.contains("<a style=\"color: #89b4fa; text-decoration: underline;\" href=\"#markdown-studio\">"));
    assert!(markup.contains("id=\"features\""));
    assert!(markup.contains("id=\"features_1\""));
    assert!(markup.contains("<table style="));
    assert!(markup.contains("<code style="));
    assert!(markup.contains("<blockquote style="));
    assert!(markup.contains("<hr style="));
    assert!(!markup.contains("[TOC]"));
}

#[test]
fn test_sample_spans() {
    let mut session = Session::new();
    session.load_document(SAMPLE, None);
    let spans = session.style_spans();

    assert_eq!(spans.heading_on(2), Some(SpanKind::H1));
    assert_eq!(spans.heading_on(6), Some(SpanKind::H2));
    assert_eq!(spans.inline_kind_at(4, 8), Some(SpanKind::Bold));
    assert!(spans.on_line(8).any(|s| s.kind == SpanKind::ListItem));
    assert!(spans.on_line(10).any(|s| s.kind == SpanKind::ListItem));
    assert!(spans.on_line(9).any(|s| s.kind == SpanKind::Link));
}

#[test]
fn test_typing_session_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.md");
    std::fs::write(&path, "# Notes\n").unwrap();

    let mut session = Session::new()
        .with_debounce_ms(200)
        .with_autosave_period_ms(5_000);
    session.handle(0, Message::Open(path.clone()));
    session.handle(100, Message::MoveToEnd);
    for (i, ch) in "- *todo*".chars().enumerate() {
        session.handle(100 + i as u64 * 30, Message::InsertChar(ch));
    }

    assert!(!session.tick(300).rendered);
    assert!(session.tick(510).rendered);
    assert_eq!(session.style_spans().heading_on(0), Some(SpanKind::H1));
    assert!(session.styled_markup().contains("<li style="));

    let outcome = session.tick(5_000);
    assert!(outcome.autosaved);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Notes\n- *todo*");
    let notice = session.active_notification().unwrap();
    assert_eq!(notice.level, NotificationLevel::Info);
}

#[test]
fn test_custom_stylesheet_is_used() {
    let styles = StyleSheet::new("margin: 0;", vec![TagRule::new("p", "color: red;")]);
    let html = Transformer::new(styles).transform("hello *there*");
    assert!(html.contains("<p style=\"color: red;\">hello <em>there</em></p>"), "{html}");
    assert!(html.contains("style=\"margin: 0;\""));
}
