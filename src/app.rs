use crate::content::{ContentError, ContentPipeline};
use crate::feed::{format_timestamp, FeedCollection, Item};
use crate::keybindings::{Action, Context, KeybindingRegistry};
use crate::theme::StyleConfig;
use crate::ui::layout::{self, FooterInfo, NO_CONTENT_TITLE};
use crate::ui::Viewport;
use chrono::{DateTime, Utc};
use ratatui::text::Line;

/// Lines moved per mouse wheel notch.
pub const WHEEL_SCROLL_LINES: isize = 3;

// ============================================================================
// Events
// ============================================================================

/// One input to the session. Each is handled to completion before the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Key(Action),
    Resize { width: u16, height: u16 },
    /// Mouse wheel, in lines (negative is up)
    Scroll(isize),
}

/// Whether the session keeps running after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

// ============================================================================
// Navigation State
// ============================================================================

/// Which feed and item are selected, plus the overlay flags.
///
/// Indices never leave their bounds: out-of-range moves are no-ops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    pub feed_index: usize,
    pub item_index: usize,
    pub help_visible: bool,
    /// Set by the first resize; nothing is rendered before it
    pub ready: bool,
}

impl Navigation {
    /// Returns true when the selected item changed.
    pub fn move_left(&mut self) -> bool {
        if self.item_index > 0 {
            self.item_index -= 1;
            return true;
        }
        false
    }

    /// Returns true when the selected item changed.
    pub fn move_right(&mut self, item_count: usize) -> bool {
        if self.item_index + 1 < item_count {
            self.item_index += 1;
            return true;
        }
        false
    }

    /// Returns true when the selected feed changed.
    pub fn next_feed(&mut self, feed_count: usize) -> bool {
        if self.feed_index + 1 < feed_count {
            self.feed_index += 1;
            self.item_index = 0;
            return true;
        }
        false
    }

    /// Returns true when the selected feed changed.
    pub fn prev_feed(&mut self) -> bool {
        if self.feed_index > 0 {
            self.feed_index -= 1;
            self.item_index = 0;
            return true;
        }
        false
    }

    pub fn toggle_help(&mut self) {
        self.help_visible = !self.help_visible;
    }
}

// ============================================================================
// Application State
// ============================================================================

/// The reading session: immutable feeds and style, mutable selection and
/// viewport.
pub struct App {
    feeds: FeedCollection,
    style: StyleConfig,
    pipeline: ContentPipeline,
    pub keybindings: KeybindingRegistry,
    pub nav: Navigation,
    pub viewport: Viewport,
    /// Selection changed; render and scroll to top
    content_dirty: bool,
    /// Width changed; re-wrap the same entry keeping the scroll position
    needs_rewrap: bool,
    width: u16,
    height: u16,
}

impl App {
    pub fn new(
        feeds: FeedCollection,
        style: StyleConfig,
        pipeline: ContentPipeline,
        keybindings: KeybindingRegistry,
    ) -> Self {
        Self {
            feeds,
            style,
            pipeline,
            keybindings,
            nav: Navigation::default(),
            viewport: Viewport::default(),
            content_dirty: false,
            needs_rewrap: false,
            width: 0,
            height: 0,
        }
    }

    pub fn feeds(&self) -> &FeedCollection {
        &self.feeds
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Binding context for key lookup.
    pub fn key_context(&self) -> Context {
        if self.nav.help_visible {
            Context::Help
        } else {
            Context::Global
        }
    }

    pub fn item_count(&self) -> usize {
        self.feeds.item_count(self.nav.feed_index)
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.feeds.item(self.nav.feed_index, self.nav.item_index)
    }

    /// Apply one event, then re-render content if it became stale.
    ///
    /// Render failures surface here only under
    /// [`FailurePolicy::Abort`](crate::content::FailurePolicy::Abort).
    pub fn handle_event(&mut self, event: AppEvent) -> Result<Flow, ContentError> {
        match event {
            AppEvent::Key(action) => {
                if self.apply_action(action) == Flow::Quit {
                    tracing::debug!("Quit requested");
                    return Ok(Flow::Quit);
                }
            }
            AppEvent::Resize { width, height } => self.resize(width, height),
            AppEvent::Scroll(lines) => {
                if !self.nav.help_visible {
                    self.viewport.scroll_by(lines);
                }
            }
        }

        self.refresh_content()?;
        Ok(Flow::Continue)
    }

    fn apply_action(&mut self, action: Action) -> Flow {
        match action {
            Action::Quit => return Flow::Quit,
            Action::ToggleHelp => {
                self.nav.toggle_help();
                return Flow::Continue;
            }
            _ => {}
        }

        // The help overlay swallows everything else
        if self.nav.help_visible {
            return Flow::Continue;
        }

        match action {
            // Moves past either end are no-ops and keep the scroll position
            Action::MoveLeft => {
                if self.nav.move_left() {
                    self.content_dirty = true;
                }
            }
            Action::MoveRight => {
                if self.nav.move_right(self.item_count()) {
                    self.content_dirty = true;
                }
            }
            Action::NextFeed => {
                if self.nav.next_feed(self.feeds.len()) {
                    tracing::debug!(feed = self.nav.feed_index, "Switched feed");
                    self.content_dirty = true;
                }
            }
            Action::PrevFeed => {
                if self.nav.prev_feed() {
                    tracing::debug!(feed = self.nav.feed_index, "Switched feed");
                    self.content_dirty = true;
                }
            }
            Action::ScrollUp => self.viewport.line_up(),
            Action::ScrollDown => self.viewport.line_down(),
            Action::PageUp => self.viewport.page_up(),
            Action::PageDown => self.viewport.page_down(),
            Action::HalfPageUp => self.viewport.half_page_up(),
            Action::HalfPageDown => self.viewport.half_page_down(),
            Action::Top => self.viewport.top(),
            Action::Bottom => self.viewport.bottom(),
            Action::Quit | Action::ToggleHelp => {}
        }
        Flow::Continue
    }

    fn resize(&mut self, width: u16, height: u16) {
        let width_changed = width != self.viewport.width();
        self.width = width;
        self.height = height;
        self.viewport.resize(width, layout::body_height(height));

        if !self.nav.ready {
            tracing::debug!(width, height, "First layout, session ready");
            self.nav.ready = true;
            self.content_dirty = true;
        } else if width_changed {
            self.needs_rewrap = true;
        }
    }

    fn refresh_content(&mut self) -> Result<(), ContentError> {
        if !self.nav.ready || self.viewport.width() == 0 {
            return Ok(());
        }
        if !self.content_dirty && !self.needs_rewrap {
            return Ok(());
        }

        let lines = self.pipeline.render_selection(
            &self.feeds,
            self.nav.feed_index,
            self.nav.item_index,
            self.viewport.width() as usize,
        )?;

        if self.content_dirty {
            self.viewport.set_content(lines);
        } else {
            self.viewport.replace_content(lines);
        }
        self.content_dirty = false;
        self.needs_rewrap = false;
        Ok(())
    }

    // ========================================================================
    // Frame data
    // ========================================================================

    pub fn header_title(&self) -> &str {
        self.selected_item()
            .map_or(NO_CONTENT_TITLE, |item| item.title.as_str())
    }

    pub fn footer_info(&self) -> FooterInfo {
        let (authors, updated) = match self.selected_item() {
            Some(item) => (item.author_line(), item.last_updated()),
            None => (String::new(), DateTime::<Utc>::default()),
        };
        FooterInfo {
            percent: self.viewport.scroll_percent(),
            index: self.nav.item_index,
            count: self.item_count(),
            authors,
            updated: format_timestamp(updated),
        }
    }

    /// The reading frame: exactly `height` lines.
    pub fn frame_lines(&self) -> Vec<Line<'static>> {
        layout::compose(
            layout::header(self.header_title(), &self.style, self.width),
            self.viewport.visible_lines(),
            layout::footer(&self.footer_info(), &self.style, self.width),
            self.height,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
