//! Scrollable window over the rendered entry.

use ratatui::text::Line;

/// Owns the rendered lines of the current entry and the scroll position.
///
/// The offset always stays within `[0, max_offset()]`.
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    width: u16,
    height: u16,
    content: Vec<Line<'static>>,
    offset: usize,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn content_height(&self) -> usize {
        self.content.len()
    }

    /// Replace the buffer and scroll back to the top.
    pub fn set_content(&mut self, content: Vec<Line<'static>>) {
        self.content = content;
        self.offset = 0;
    }

    /// Replace the buffer keeping the scroll offset, clamped to the new bounds.
    ///
    /// Used when the same entry is re-wrapped for a new width.
    pub fn replace_content(&mut self, content: Vec<Line<'static>>) {
        self.content = content;
        self.clamp();
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.clamp();
    }

    pub fn max_offset(&self) -> usize {
        self.content.len().saturating_sub(self.height as usize)
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.offset = self
            .offset
            .saturating_add_signed(delta)
            .min(self.max_offset());
    }

    pub fn line_up(&mut self) {
        self.scroll_by(-1);
    }

    pub fn line_down(&mut self) {
        self.scroll_by(1);
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-self.page());
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.page());
    }

    pub fn half_page_up(&mut self) {
        self.scroll_by(-(self.page() / 2).max(1));
    }

    pub fn half_page_down(&mut self) {
        self.scroll_by((self.page() / 2).max(1));
    }

    pub fn top(&mut self) {
        self.offset = 0;
    }

    pub fn bottom(&mut self) {
        self.offset = self.max_offset();
    }

    /// Scroll position as a fraction in `[0, 1]`; 0 when everything fits.
    pub fn scroll_percent(&self) -> f64 {
        let max = self.max_offset();
        if max == 0 {
            return 0.0;
        }
        (self.offset as f64 / max as f64).clamp(0.0, 1.0)
    }

    /// Exactly `height` lines starting at the offset, blank-padded.
    pub fn visible_lines(&self) -> Vec<Line<'static>> {
        let height = self.height as usize;
        let mut lines: Vec<Line<'static>> = self
            .content
            .iter()
            .skip(self.offset)
            .take(height)
            .cloned()
            .collect();
        lines.resize(height, Line::default());
        lines
    }

    fn page(&self) -> isize {
        (self.height as isize).max(1)
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}
