//! Integration tests for the reading session.
//!
//! Each test builds an in-memory feed collection and drives the public
//! [`App`] API headless, the way the event loop would.

use chrono::{TimeZone, Utc};
use feedpager::app::{App, AppEvent, Flow};
use feedpager::content::{
    ContentError, ContentPipeline, FailurePolicy, HtmlConverter, MarkdownRenderer, PLACEHOLDER,
};
use feedpager::feed::{format_timestamp, Feed, FeedCollection, Item};
use feedpager::keybindings::{Action, KeybindingRegistry};
use feedpager::theme::{StyleConfig, ThemeVariant};
use feedpager::ui;
use pretty_assertions::assert_eq;
use ratatui::{backend::TestBackend, text::Line, Terminal};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn item(title: &str, description: &str) -> Item {
    Item {
        title: title.to_string(),
        description: description.to_string(),
        ..Item::default()
    }
}

fn feed(title: &str, items: Vec<Item>) -> Feed {
    Feed {
        title: title.to_string(),
        items,
    }
}

fn pipeline(policy: FailurePolicy) -> ContentPipeline {
    ContentPipeline::with_palette(ThemeVariant::Dark.palette(), policy)
}

fn session(feeds: Vec<Feed>) -> App {
    App::new(
        FeedCollection::new(feeds),
        StyleConfig::default(),
        pipeline(FailurePolicy::Abort),
        KeybindingRegistry::new(),
    )
}

fn start(app: &mut App, width: u16, height: u16) {
    app.handle_event(AppEvent::Resize { width, height }).unwrap();
}

fn press(app: &mut App, action: Action) -> Flow {
    app.handle_event(AppEvent::Key(action)).unwrap()
}

fn text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

fn long_item(title: &str) -> Item {
    item(title, &"<p>A paragraph long enough to need a few rows.</p>".repeat(40))
}

/// Draw one frame into an in-memory terminal and return its text, row by row.
fn draw(app: &App, width: u16, height: u16) -> Vec<String> {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|f| ui::render(f, app)).unwrap();
    let buffer = terminal.backend().buffer();
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect()
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_move_right_clamps_at_last_item() {
    let mut app = session(vec![feed(
        "Three",
        vec![item("a", "<p>a</p>"), item("b", "<p>b</p>"), item("c", "<p>c</p>")],
    )]);
    start(&mut app, 80, 24);
    assert_eq!(app.nav.item_index, 0);

    for _ in 0..4 {
        press(&mut app, Action::MoveRight);
    }

    assert_eq!(app.nav.item_index, 2);
    assert_eq!(app.header_title(), "c");
    assert!(text(&app.frame_lines()[23]).contains("3/3 articles"));
}

#[test]
fn test_move_left_at_first_item_is_noop() {
    let mut app = session(vec![feed("One", vec![item("only", "<p>x</p>")])]);
    start(&mut app, 80, 24);
    press(&mut app, Action::MoveLeft);
    assert_eq!(app.nav.item_index, 0);
    assert_eq!(app.header_title(), "only");
}

#[test]
fn test_move_right_on_last_item_keeps_scroll() {
    let mut app = session(vec![feed(
        "Two",
        vec![item("short", "<p>x</p>"), long_item("last")],
    )]);
    start(&mut app, 80, 24);
    press(&mut app, Action::MoveRight);
    press(&mut app, Action::PageDown);
    let offset = app.viewport.offset();
    assert!(offset > 0);

    press(&mut app, Action::MoveRight);
    assert_eq!(app.nav.item_index, 1);
    assert_eq!(app.viewport.offset(), offset);
    assert_eq!(app.header_title(), "last");
}

#[test]
fn test_feed_switching_reaches_every_feed() {
    let mut app = session(vec![
        feed("First", vec![item("f1", "<p>1</p>"), item("f2", "<p>2</p>")]),
        feed("Second", vec![item("s1", "<p>3</p>")]),
    ]);
    start(&mut app, 80, 24);
    press(&mut app, Action::MoveRight);
    assert_eq!(app.header_title(), "f2");

    press(&mut app, Action::NextFeed);
    assert_eq!((app.nav.feed_index, app.nav.item_index), (1, 0));
    assert_eq!(app.header_title(), "s1");

    // clamped at the last feed, no wrap
    press(&mut app, Action::NextFeed);
    assert_eq!(app.nav.feed_index, 1);

    press(&mut app, Action::PrevFeed);
    assert_eq!(app.header_title(), "f1");
}

#[test]
fn test_quit_ends_session() {
    let mut app = session(vec![feed("One", vec![item("only", "<p>x</p>")])]);
    start(&mut app, 80, 24);
    assert_eq!(press(&mut app, Action::ScrollDown), Flow::Continue);
    assert_eq!(press(&mut app, Action::Quit), Flow::Quit);
}

// ============================================================================
// Footer
// ============================================================================

#[test]
fn test_footer_falls_back_to_epoch() {
    let mut app = session(vec![feed("Dateless", vec![item("no dates", "<p>x</p>")])]);
    start(&mut app, 120, 24);

    let epoch = format_timestamp(Utc.timestamp_opt(0, 0).unwrap());
    assert_eq!(app.footer_info().updated, epoch);
    assert!(text(&app.frame_lines()[23]).contains(&format!("Last updated {epoch}")));
}

#[test]
fn test_footer_prefers_updated_over_published() {
    let published = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let updated = Utc.timestamp_opt(1_700_090_000, 0).unwrap();
    let dated = Item {
        published: Some(published),
        updated: Some(updated),
        authors: vec!["Ada".to_string(), "Grace".to_string()],
        ..item("dated", "<p>x</p>")
    };
    let mut app = session(vec![feed("Dated", vec![dated])]);
    start(&mut app, 120, 24);

    let info = app.footer_info();
    assert_eq!(info.updated, format_timestamp(updated));
    assert_ne!(info.updated, format_timestamp(published));
    assert_eq!(info.authors, "Ada, Grace");
}

// ============================================================================
// Placeholder
// ============================================================================

#[derive(Clone, Default)]
struct Counting(Arc<AtomicUsize>);

impl HtmlConverter for Counting {
    fn convert(&self, html: &str) -> Result<String, ContentError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(html.to_string())
    }
}

impl MarkdownRenderer for Counting {
    fn render(&self, markdown: &str, _width: usize) -> Result<Vec<Line<'static>>, ContentError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Line::from(markdown.to_string())])
    }
}

#[test]
fn test_empty_feed_shows_placeholder_without_conversion() {
    let calls = Counting::default();
    let pipeline = ContentPipeline::new(
        Box::new(calls.clone()),
        Box::new(calls.clone()),
        FailurePolicy::Abort,
        ThemeVariant::Dark.palette(),
    );
    let mut app = App::new(
        FeedCollection::new(vec![feed("Empty", Vec::new())]),
        StyleConfig::default(),
        pipeline,
        KeybindingRegistry::new(),
    );
    start(&mut app, 80, 24);
    press(&mut app, Action::MoveRight);

    assert_eq!(calls.0.load(Ordering::SeqCst), 0);
    assert_eq!(text(&app.viewport.visible_lines()[0]), PLACEHOLDER);
    assert_eq!(app.header_title(), "No content");
    assert!(text(&app.frame_lines()[23]).contains("0/0 articles"));
}

// ============================================================================
// Help overlay
// ============================================================================

#[test]
fn test_help_replaces_frame_and_keeps_scroll() {
    let mut app = session(vec![feed("Long", vec![long_item("Scrolled entry")])]);
    start(&mut app, 80, 24);
    press(&mut app, Action::PageDown);
    let offset = app.viewport.offset();
    assert!(offset > 0);
    let before = app.frame_lines();

    press(&mut app, Action::ToggleHelp);
    let screen = draw(&app, 80, 24).join("\n");
    assert!(screen.contains("Help"));
    assert!(screen.contains("-- Navigation --"));
    assert!(!screen.contains("Scrolled entry"));
    assert!(!screen.contains("1/1 articles"));

    press(&mut app, Action::ToggleHelp);
    assert_eq!(app.viewport.offset(), offset);
    assert_eq!(app.frame_lines(), before);
    assert!(draw(&app, 80, 24)[0].contains("Scrolled entry"));
}

#[test]
fn test_loading_frame_before_first_resize() {
    let app = session(vec![feed("One", vec![item("only", "<p>x</p>")])]);
    let screen = draw(&app, 40, 6);
    assert!(screen[1].contains("Loading content"));
}

// ============================================================================
// Render failures
// ============================================================================

struct Broken;

impl HtmlConverter for Broken {
    fn convert(&self, _html: &str) -> Result<String, ContentError> {
        Err(ContentError::Conversion("unbalanced markup".to_string()))
    }
}

fn broken_session(policy: FailurePolicy) -> App {
    let palette = ThemeVariant::Dark.palette();
    let pipeline = ContentPipeline::new(
        Box::new(Broken),
        Box::new(feedpager::content::TerminalRenderer::new(palette.clone())),
        policy,
        palette,
    );
    App::new(
        FeedCollection::new(vec![feed("Bad", vec![item("bad", "<p>plain words</p>")])]),
        StyleConfig::default(),
        pipeline,
        KeybindingRegistry::new(),
    )
}

#[test]
fn test_abort_policy_surfaces_error() {
    let mut app = broken_session(FailurePolicy::Abort);
    let err = app
        .handle_event(AppEvent::Resize {
            width: 80,
            height: 24,
        })
        .unwrap_err();
    assert!(matches!(err, ContentError::Conversion(_)));
}

#[test]
fn test_fallback_policy_keeps_session_alive() {
    let mut app = broken_session(FailurePolicy::Fallback);
    start(&mut app, 80, 24);
    let body: Vec<String> = app.viewport.visible_lines().iter().map(text).collect();
    assert!(body.iter().any(|l| l.contains("unbalanced markup")));
    assert!(body.iter().any(|l| l.contains("plain words")));
    assert_eq!(press(&mut app, Action::ScrollDown), Flow::Continue);
}
