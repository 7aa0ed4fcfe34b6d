//! Markdown to ratatui lines.
//!
//! Walks `pulldown_cmark` events, builds logical rows (a per-row prefix such
//! as the blockquote bar plus a styled body), then wraps each row to the
//! target width.

use super::{ContentError, MarkdownRenderer};
use crate::theme::ColorPalette;
use crate::util::{display_width, wrap_line};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Default [`MarkdownRenderer`]: styles constructs with a [`ColorPalette`]
/// and word-wraps to the viewport width.
pub struct TerminalRenderer {
    palette: ColorPalette,
}

impl TerminalRenderer {
    pub fn new(palette: ColorPalette) -> Self {
        Self { palette }
    }
}

impl MarkdownRenderer for TerminalRenderer {
    fn render(&self, markdown: &str, width: usize) -> Result<Vec<Line<'static>>, ContentError> {
        if width == 0 {
            return Err(ContentError::Render("cannot render at zero width".to_string()));
        }

        let mut opts = Options::empty();
        opts.insert(Options::ENABLE_STRIKETHROUGH);
        opts.insert(Options::ENABLE_TABLES);
        opts.insert(Options::ENABLE_TASKLISTS);

        let mut writer = Writer::new(&self.palette, width);
        for event in Parser::new_ext(markdown, opts) {
            writer.handle(event);
        }
        Ok(writer.finish())
    }
}

// ============================================================================
// Writer
// ============================================================================

/// One logical output row before wrapping.
struct Row {
    prefix: Vec<Span<'static>>,
    body: Line<'static>,
}

struct Writer<'a> {
    palette: &'a ColorPalette,
    width: usize,
    rows: Vec<Row>,
    /// Inline styles; nested styles compose via `patch`.
    styles: Vec<Style>,
    /// Blockquote bars, outermost first.
    prefixes: Vec<Span<'static>>,
    /// None = bullet list, Some(n) = ordered list at n.
    list_indices: Vec<Option<u64>>,
    in_code_block: bool,
    link_url: Option<String>,
    needs_newline: bool,
}

impl<'a> Writer<'a> {
    fn new(palette: &'a ColorPalette, width: usize) -> Self {
        Self {
            palette,
            width,
            rows: Vec::new(),
            styles: Vec::new(),
            prefixes: Vec::new(),
            list_indices: Vec::new(),
            in_code_block: false,
            link_url: None,
            needs_newline: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or(self.palette.body)
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn new_row(&mut self) {
        self.rows.push(Row {
            prefix: self.prefixes.clone(),
            body: Line::default(),
        });
    }

    fn push_span(&mut self, span: Span<'static>) {
        match self.rows.last_mut() {
            Some(row) => row.body.push_span(span),
            None => {
                self.new_row();
                self.push_span(span);
            }
        }
    }

    fn blank_line_if_needed(&mut self) {
        if self.needs_newline {
            self.new_row();
            self.needs_newline = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(text) => self.text(text),
            Event::Code(code) => {
                let style = self.style().patch(self.palette.inline_code);
                self.push_span(Span::styled(code.into_string(), style));
            }
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.new_row(),
            Event::Rule => {
                self.blank_line_if_needed();
                self.new_row();
                let rule_width = self.width.saturating_sub(display_width_of(&self.prefixes));
                self.push_span(Span::styled("─".repeat(rule_width), self.palette.rule));
                self.needs_newline = true;
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_span(Span::styled(marker, self.palette.list_marker));
            }
            // Raw HTML the converter passed through, footnotes, math
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // tight list items open a paragraph right after the marker
                if self.list_indices.is_empty() || self.needs_newline {
                    self.blank_line_if_needed();
                    self.new_row();
                }
            }
            Tag::Heading { level, .. } => {
                self.blank_line_if_needed();
                self.new_row();
                let marker = format!("{} ", "#".repeat(heading_depth(level)));
                self.push_span(Span::styled(marker, self.palette.heading));
                self.push_style(self.palette.heading);
            }
            Tag::BlockQuote(_) => {
                self.blank_line_if_needed();
                self.prefixes.push(Span::styled("│ ", self.palette.quote));
                self.push_style(self.palette.quote);
            }
            Tag::CodeBlock(kind) => {
                self.blank_line_if_needed();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.new_row();
                        self.push_span(Span::styled(lang.into_string(), self.palette.list_marker));
                    }
                }
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.list_indices.is_empty() {
                    self.blank_line_if_needed();
                }
                self.list_indices.push(start);
            }
            Tag::Item => {
                self.needs_newline = false;
                self.new_row();
                let indent = "  ".repeat(self.list_indices.len().saturating_sub(1));
                if let Some(index) = self.list_indices.last_mut() {
                    let marker = match index {
                        None => format!("{indent}• "),
                        Some(n) => {
                            let marker = format!("{indent}{n}. ");
                            *n += 1;
                            marker
                        }
                    };
                    self.push_span(Span::styled(marker, self.palette.list_marker));
                }
            }
            Tag::Emphasis => self.push_style(self.palette.emphasis),
            Tag::Strong => self.push_style(self.palette.strong),
            Tag::Strikethrough => self.push_style(self.palette.strikethrough),
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.into_string());
                self.push_style(self.palette.link);
            }
            Tag::Image { .. } => {
                self.push_span(Span::styled("[Image: ", self.palette.image));
                self.push_style(self.palette.image);
            }
            Tag::Table(_) => {
                self.blank_line_if_needed();
            }
            Tag::TableHead | Tag::TableRow => self.new_row(),
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.needs_newline = true,
            TagEnd::Heading(_) => {
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::BlockQuote(_) => {
                self.prefixes.pop();
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.needs_newline = true;
            }
            TagEnd::List(_) => {
                self.list_indices.pop();
                self.needs_newline = true;
            }
            TagEnd::Item => self.needs_newline = false,
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link_url.take() {
                    if !self.row_ends_with(&url) {
                        self.push_span(Span::styled(format!(" ({url})"), self.palette.rule));
                    }
                }
            }
            TagEnd::Image => {
                self.pop_style();
                self.push_span(Span::styled("]", self.palette.image));
            }
            TagEnd::TableCell => self.push_span(Span::styled(" │ ", self.palette.rule)),
            TagEnd::Table => self.needs_newline = true,
            _ => {}
        }
    }

    fn text(&mut self, text: CowStr<'_>) {
        let text = text.replace('\t', "    ");

        if self.in_code_block {
            let style = self.palette.code_block;
            for line in text.lines() {
                self.new_row();
                self.push_span(Span::styled(line.to_string(), style));
            }
            return;
        }

        let style = self.style();
        self.push_span(Span::styled(text, style));
    }

    /// Autolinks render their URL as the text; skip repeating it.
    fn row_ends_with(&self, text: &str) -> bool {
        self.rows.last().is_some_and(|row| {
            row.body
                .spans
                .last()
                .is_some_and(|span| span.content.as_ref() == text)
        })
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        while self
            .rows
            .last()
            .is_some_and(|row| row.body.spans.is_empty())
        {
            self.rows.pop();
        }

        let mut lines = Vec::with_capacity(self.rows.len());
        for row in self.rows {
            let prefix_width = display_width_of(&row.prefix);
            if prefix_width >= self.width {
                lines.extend(wrap_line(&row.body, self.width));
                continue;
            }
            for piece in wrap_line(&row.body, self.width - prefix_width) {
                let mut spans = row.prefix.clone();
                spans.extend(piece.spans);
                lines.push(Line::from(spans));
            }
        }
        lines
    }
}

fn display_width_of(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|s| display_width(&s.content)).sum()
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
