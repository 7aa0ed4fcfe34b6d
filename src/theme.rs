//! Styling for the reading session.
//!
//! Two pieces live here:
//! - [`StyleConfig`]: the immutable chrome colors and padding handed to the
//!   session at startup (header bar, footer segments).
//! - [`ThemeVariant`] / [`ColorPalette`]: semantic roles used by the markdown
//!   renderer when it styles entry bodies.

use ratatui::style::{Color, Modifier, Style};
use thiserror::Error;

// ============================================================================
// Color identifiers
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("Empty color value for '{0}'")]
    Empty(&'static str),

    #[error("Invalid color '{value}' for '{field}': expected 0-255 or #rrggbb")]
    Invalid { field: &'static str, value: String },
}

/// Parse a terminal color identifier.
///
/// Accepts an ANSI palette index (`"33"`) or a hex triplet (`"#0087ff"`,
/// `"#08f"`). `field` names the config key for error messages.
pub fn parse_color(field: &'static str, value: &str) -> Result<Color, ColorParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ColorParseError::Empty(field));
    }

    let invalid = || ColorParseError::Invalid {
        field,
        value: value.to_string(),
    };

    if let Some(hex) = value.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(invalid()),
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
        return Ok(Color::Rgb(channel(0)?, channel(2)?, channel(4)?));
    }

    value.parse::<u8>().map(Color::Indexed).map_err(|_| invalid())
}

// ============================================================================
// Style Configuration
// ============================================================================

/// Colors and padding for the header and footer chrome.
///
/// Resolved once from configuration before the session starts and never
/// mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleConfig {
    pub accent: Color,
    pub text: Color,
    pub background: Color,
    /// Cells of padding left and right of each header/footer segment.
    pub horz_padding: u16,
    /// Rows of padding above and below the header title.
    pub vert_padding: u16,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            accent: Color::Indexed(33),
            text: Color::Indexed(15),
            background: Color::Indexed(233),
            horz_padding: 2,
            vert_padding: 0,
        }
    }
}

impl StyleConfig {
    /// Bold text on the accent color: header bar and scroll percentage.
    pub fn accent_style(&self) -> Style {
        Style::default()
            .bg(self.accent)
            .fg(self.text)
            .add_modifier(Modifier::BOLD)
    }

    /// Plain footer segment on the background color.
    pub fn footer_style(&self) -> Style {
        Style::default().bg(self.background)
    }

    /// Left border rule separating footer segments.
    pub fn border_style(&self) -> Style {
        self.footer_style().fg(self.text)
    }
}

// ============================================================================
// Theme Variant
// ============================================================================

/// Palette variants for rendered entry bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Styles for every markdown construct the renderer knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPalette {
    pub heading: Style,
    pub body: Style,
    pub code_block: Style,
    pub inline_code: Style,
    pub emphasis: Style,
    pub strong: Style,
    pub strikethrough: Style,
    pub link: Style,
    pub image: Style,
    pub quote: Style,
    pub rule: Style,
    pub list_marker: Style,
    pub error: Style,
    pub fallback: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            body: Style::default(),
            code_block: Style::default().fg(Color::Yellow).bg(Color::Black),
            inline_code: Style::default().fg(Color::Yellow),
            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: Style::default().add_modifier(Modifier::BOLD),
            strikethrough: Style::default().add_modifier(Modifier::CROSSED_OUT),
            link: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::UNDERLINED),
            image: Style::default().fg(Color::Blue),
            quote: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            rule: Style::default().fg(Color::DarkGray),
            list_marker: Style::default().fg(Color::DarkGray),
            error: Style::default().fg(Color::Red),
            fallback: Style::default().fg(Color::Yellow),
        }
    }

    fn light() -> Self {
        Self {
            heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            body: Style::default().fg(Color::Black),
            code_block: Style::default().fg(Color::DarkGray).bg(Color::White),
            inline_code: Style::default().fg(Color::DarkGray),
            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: Style::default().add_modifier(Modifier::BOLD),
            strikethrough: Style::default().add_modifier(Modifier::CROSSED_OUT),
            link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            image: Style::default().fg(Color::Blue),
            quote: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            rule: Style::default().fg(Color::Gray),
            list_marker: Style::default().fg(Color::DarkGray),
            error: Style::default().fg(Color::Red),
            fallback: Style::default().fg(Color::Magenta),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
