//! Entry body rendering: HTML fragment in, styled terminal lines out.
//!
//! The pipeline runs three stages in order, each behind a narrow interface:
//!
//! 1. [`decode_entities`]: HTML entity decoding (total, never fails)
//! 2. [`HtmlConverter`]: HTML to markdown ([`HtmdConverter`] by default)
//! 3. [`MarkdownRenderer`]: markdown to wrapped ratatui lines
//!    ([`TerminalRenderer`] by default)
//!
//! What happens when a stage fails is decided by [`FailurePolicy`].

mod html;
mod markdown;

pub use html::{decode_entities, HtmdConverter};
pub use markdown::TerminalRenderer;

use crate::feed::{FeedCollection, Item};
use crate::theme::ColorPalette;
use crate::util::{strip_control_chars, strip_tags, wrap_line};
use ratatui::text::{Line, Span};
use serde::Deserialize;
use thiserror::Error;

/// Shown when the selected feed has no entry at the current index.
pub const PLACEHOLDER: &str = "No content here!";

/// Separator injected between description and content so the converter
/// renders the boundary as a horizontal rule.
const SECTION_BREAK: &str = "<hr>";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// HTML could not be turned into markdown
    #[error("HTML conversion failed: {0}")]
    Conversion(String),
    /// Markdown could not be laid out as terminal text
    #[error("Render failed: {0}")]
    Render(String),
}

/// What to do when a stage of the pipeline fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Propagate the error; the session ends.
    #[default]
    Abort,
    /// Show an error notice followed by a plain-text rendering and continue.
    Fallback,
}

pub trait HtmlConverter {
    fn convert(&self, html: &str) -> Result<String, ContentError>;
}

pub trait MarkdownRenderer {
    /// Render markdown to lines no wider than `width` columns.
    fn render(&self, markdown: &str, width: usize) -> Result<Vec<Line<'static>>, ContentError>;
}

/// The full entry-to-lines transform.
///
/// Holds no per-entry state: the same item at the same width always renders
/// to the same lines.
pub struct ContentPipeline {
    converter: Box<dyn HtmlConverter>,
    renderer: Box<dyn MarkdownRenderer>,
    policy: FailurePolicy,
    palette: ColorPalette,
}

impl ContentPipeline {
    pub fn new(
        converter: Box<dyn HtmlConverter>,
        renderer: Box<dyn MarkdownRenderer>,
        policy: FailurePolicy,
        palette: ColorPalette,
    ) -> Self {
        Self {
            converter,
            renderer,
            policy,
            palette,
        }
    }

    /// Pipeline built from the default stages, styled with `palette`.
    pub fn with_palette(palette: ColorPalette, policy: FailurePolicy) -> Self {
        Self::new(
            Box::new(HtmdConverter::new()),
            Box::new(TerminalRenderer::new(palette.clone())),
            policy,
            palette,
        )
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Render the item at `(feed_index, item_index)`.
    ///
    /// An empty feed or an out-of-range index yields the placeholder without
    /// touching the conversion stages.
    pub fn render_selection(
        &self,
        feeds: &FeedCollection,
        feed_index: usize,
        item_index: usize,
        width: usize,
    ) -> Result<Vec<Line<'static>>, ContentError> {
        match feeds.item(feed_index, item_index) {
            Some(item) => self.render_item(item, width),
            None => Ok(placeholder()),
        }
    }

    /// Render one item, applying the failure policy.
    pub fn render_item(&self, item: &Item, width: usize) -> Result<Vec<Line<'static>>, ContentError> {
        let html = format!("{}{}{}", item.description, SECTION_BREAK, item.content);
        // Entities can decode to escape bytes, so sanitize after decoding
        let decoded = decode_entities(&html);
        let decoded = strip_control_chars(&decoded);

        let result = self
            .converter
            .convert(&decoded)
            .and_then(|markdown| self.renderer.render(&markdown, width));

        match (result, self.policy) {
            (Ok(lines), _) => Ok(lines),
            (Err(err), FailurePolicy::Abort) => {
                tracing::error!(title = %item.title, error = %err, "Entry render failed");
                Err(err)
            }
            (Err(err), FailurePolicy::Fallback) => {
                tracing::warn!(title = %item.title, error = %err, "Entry render failed, showing plain text");
                Ok(self.fallback(&err, &decoded, width))
            }
        }
    }

    fn fallback(&self, err: &ContentError, html: &str, width: usize) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                format!("Failed to render content: {}", err),
                self.palette.error,
            )),
            Line::from(""),
            Line::from(Span::styled("Showing plain text:", self.palette.fallback)),
            Line::from(""),
        ];
        let text = strip_tags(html);
        for raw in text.lines() {
            lines.extend(wrap_line(
                &Line::from(raw.to_string()).style(self.palette.body),
                width,
            ));
        }
        lines
    }
}

fn placeholder() -> Vec<Line<'static>> {
    vec![Line::from(PLACEHOLDER)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Feed;
    use crate::theme::ThemeVariant;
    use std::cell::Cell;
    use std::rc::Rc;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    /// Converter that counts invocations.
    struct Counting(Rc<Cell<usize>>);

    impl HtmlConverter for Counting {
        fn convert(&self, html: &str) -> Result<String, ContentError> {
            self.0.set(self.0.get() + 1);
            Ok(html.to_string())
        }
    }

    struct Failing;

    impl HtmlConverter for Failing {
        fn convert(&self, _html: &str) -> Result<String, ContentError> {
            Err(ContentError::Conversion("unbalanced markup".to_string()))
        }
    }

    fn pipeline_with(converter: Box<dyn HtmlConverter>, policy: FailurePolicy) -> ContentPipeline {
        let palette = ThemeVariant::Dark.palette();
        ContentPipeline::new(
            converter,
            Box::new(TerminalRenderer::new(palette.clone())),
            policy,
            palette,
        )
    }

    fn item(description: &str, content: &str) -> Item {
        Item {
            title: "Entry".to_string(),
            description: description.to_string(),
            content: content.to_string(),
            ..Item::default()
        }
    }

    #[test]
    fn test_empty_feed_short_circuits() {
        let calls = Rc::new(Cell::new(0));
        let pipeline = pipeline_with(Box::new(Counting(calls.clone())), FailurePolicy::Abort);
        let feeds = FeedCollection::new(vec![Feed::default()]);

        let lines = pipeline.render_selection(&feeds, 0, 0, 80).unwrap();
        assert_eq!(plain(&lines), vec![PLACEHOLDER]);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_out_of_range_index_short_circuits() {
        let pipeline = pipeline_with(Box::new(Failing), FailurePolicy::Abort);
        let feeds = FeedCollection::new(vec![Feed {
            title: "One".to_string(),
            items: vec![item("<p>x</p>", "")],
        }]);
        assert!(pipeline.render_selection(&feeds, 0, 1, 80).is_ok());
        assert!(pipeline.render_selection(&feeds, 3, 0, 80).is_ok());
    }

    #[test]
    fn test_renders_description_and_content() {
        let pipeline = ContentPipeline::with_palette(ThemeVariant::Dark.palette(), FailurePolicy::Abort);
        let lines = pipeline
            .render_item(&item("<p>Summary &amp; more</p>", "<p>Full body</p>"), 40)
            .unwrap();
        let text = plain(&lines);
        let summary = text.iter().position(|l| l == "Summary & more").unwrap();
        let body = text.iter().position(|l| l == "Full body").unwrap();
        assert!(summary < body);
        // the injected break shows up as a rule between the two
        assert!(text[summary..body].iter().any(|l| l.starts_with('─')));
    }

    #[test]
    fn test_abort_policy_propagates() {
        let pipeline = pipeline_with(Box::new(Failing), FailurePolicy::Abort);
        let err = pipeline.render_item(&item("<p>x</p>", ""), 40).unwrap_err();
        assert_eq!(err, ContentError::Conversion("unbalanced markup".to_string()));
    }

    #[test]
    fn test_fallback_policy_shows_plain_text() {
        let pipeline = pipeline_with(Box::new(Failing), FailurePolicy::Fallback);
        let lines = pipeline
            .render_item(&item("<p>Hello <b>there</b></p>", "<p>Body</p>"), 40)
            .unwrap();
        let text = plain(&lines);
        assert!(text[0].starts_with("Failed to render content"));
        assert!(text.contains(&"Hello there".to_string()));
        assert!(text.contains(&"Body".to_string()));
    }

    #[test]
    fn test_zero_width_is_render_error() {
        let pipeline = ContentPipeline::with_palette(ThemeVariant::Dark.palette(), FailurePolicy::Abort);
        let result = pipeline.render_item(&item("<p>x</p>", ""), 0);
        assert!(matches!(result, Err(ContentError::Render(_))));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let pipeline = ContentPipeline::with_palette(ThemeVariant::Dark.palette(), FailurePolicy::Abort);
        let entry = item(
            "<h2>Title</h2><p>Some <em>styled</em> text with a <a href=\"https://x.test\">link</a>.</p>",
            "<ul><li>one</li><li>two</li></ul>",
        );
        let first = pipeline.render_item(&entry, 30).unwrap();
        let second = pipeline.render_item(&entry, 30).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_body_escape_sequences_are_stripped() {
        let entry = item(
            "<p>\x1b[31mred\x1b[0m text</p>",
            "<p>&#27;]0;owned&#7;after</p>",
        );

        let pipeline = ContentPipeline::with_palette(ThemeVariant::Dark.palette(), FailurePolicy::Abort);
        let text = plain(&pipeline.render_item(&entry, 40).unwrap()).join("\n");
        assert!(!text.contains('\x1b'));
        assert!(!text.contains('\x07'));
        assert!(text.contains("red text"));
        assert!(text.contains("after"));

        let fallback = pipeline_with(Box::new(Failing), FailurePolicy::Fallback);
        let text = plain(&fallback.render_item(&entry, 40).unwrap()).join("\n");
        assert!(!text.contains('\x1b'));
        assert!(text.contains("red text"));
    }
}
