//! Frame composition for the reading view.
//!
//! Everything here is pure: given the selection, the viewport and the style,
//! produce the lines of one frame. Drawing them is `render`'s job.

use crate::theme::StyleConfig;
use crate::util::{display_width, truncate_to_width};
use ratatui::text::{Line, Span};

/// Rows reserved above the body.
pub const HEADER_HEIGHT: u16 = 3;
/// Rows reserved below the body.
pub const FOOTER_HEIGHT: u16 = 3;

/// Header text when no entry is selected.
pub const NO_CONTENT_TITLE: &str = "No content";
/// Shown until the first terminal size is known.
pub const LOADING_TEXT: &str = "\n Loading content";

const BORDER: &str = "│";

/// Rows left for the viewport in a terminal `total` rows tall.
pub fn body_height(total: u16) -> u16 {
    total.saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT)
}

/// Everything the footer shows, already resolved from the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FooterInfo {
    /// Scroll position in `[0, 1]`
    pub percent: f64,
    /// Zero-based selected index
    pub index: usize,
    /// Items in the current feed
    pub count: usize,
    pub authors: String,
    /// Already formatted last-updated time
    pub updated: String,
}

/// `"  0%"` .. `"100%"`.
pub fn percent_text(fraction: f64) -> String {
    format!("{:>3.0}%", fraction.clamp(0.0, 1.0) * 100.0)
}

/// One-based position over the total, `"0/0 articles"` for an empty feed.
pub fn counter_text(index: usize, count: usize) -> String {
    if count == 0 {
        return "0/0 articles".to_string();
    }
    format!("{}/{} articles", index + 1, count)
}

/// The title bar followed by blank rows, `HEADER_HEIGHT` lines in total.
///
/// The bar is bold text on the accent color, padded by the configured
/// amounts. Vertical padding is limited to what fits in the header rows.
pub fn header(title: &str, style: &StyleConfig, width: u16) -> Vec<Line<'static>> {
    let pad = style.horz_padding as usize;
    let max_title = (width as usize).saturating_sub(pad * 2);
    let title = truncate_to_width(title, max_title);
    let bar_width = display_width(&title) + pad * 2;

    let vert = (style.vert_padding as usize).min((HEADER_HEIGHT as usize - 1) / 2);
    let accent = style.accent_style();

    let mut lines = Vec::with_capacity(HEADER_HEIGHT as usize);
    for _ in 0..vert {
        lines.push(Line::from(Span::styled(" ".repeat(bar_width), accent)));
    }
    lines.push(Line::from(Span::styled(
        format!("{}{}{}", " ".repeat(pad), title, " ".repeat(pad)),
        accent,
    )));
    for _ in 0..vert {
        lines.push(Line::from(Span::styled(" ".repeat(bar_width), accent)));
    }
    lines.resize(HEADER_HEIGHT as usize, Line::default());
    lines
}

/// The footer bar: progress, counter, filler, authors, timestamp.
///
/// The filler absorbs whatever the other four segments leave of `width`, so
/// the bar is exactly `width` columns whenever the fixed segments fit. When
/// they don't, the filler is empty and the bar overflows (the terminal clips
/// it).
pub fn footer(info: &FooterInfo, style: &StyleConfig, width: u16) -> Line<'static> {
    let pad = " ".repeat(style.horz_padding as usize);
    let plain = style.footer_style();
    let border = style.border_style();

    let progress = Span::styled(
        format!("{pad}{}{pad}", percent_text(info.percent)),
        style.accent_style(),
    );
    let counter = Span::styled(
        format!("{pad}{}{pad}", counter_text(info.index, info.count)),
        plain,
    );
    let authors = [
        Span::styled(BORDER, border),
        Span::styled(format!("{pad}{}{pad}", info.authors), plain),
    ];
    let updated = [
        Span::styled(BORDER, border),
        Span::styled(format!("{pad}Last updated {}{pad}", info.updated), plain),
    ];

    let consumed: usize = [&progress, &counter]
        .into_iter()
        .chain(authors.iter())
        .chain(updated.iter())
        .map(|span| display_width(&span.content))
        .sum();
    let filler = Span::styled(" ".repeat((width as usize).saturating_sub(consumed)), plain);

    let mut spans = vec![progress, counter, filler];
    spans.extend(authors);
    spans.extend(updated);
    Line::from(spans)
}

/// Stack header, body and footer into exactly `height` lines.
///
/// The footer bar sits on the last row of its block. On terminals shorter
/// than the fixed blocks the frame is cut from the bottom.
pub fn compose(
    header: Vec<Line<'static>>,
    body: Vec<Line<'static>>,
    footer: Line<'static>,
    height: u16,
) -> Vec<Line<'static>> {
    let height = height as usize;
    let mut lines = header;
    lines.extend(body);
    lines.extend(std::iter::repeat(Line::default()).take(FOOTER_HEIGHT as usize - 1));
    lines.push(footer);

    if lines.len() > height {
        lines.truncate(height);
    } else {
        // body shorter than the viewport: keep the footer at the bottom
        let footer_start = lines.len() - FOOTER_HEIGHT as usize;
        let missing = height - lines.len();
        lines.splice(
            footer_start..footer_start,
            std::iter::repeat(Line::default()).take(missing),
        );
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn info() -> FooterInfo {
        FooterInfo {
            percent: 0.0,
            index: 0,
            count: 3,
            authors: "Ada".to_string(),
            updated: "2024-01-01 00:00:00 UTC".to_string(),
        }
    }

    #[test]
    fn test_percent_text_is_right_aligned() {
        assert_eq!(percent_text(0.0), "  0%");
        assert_eq!(percent_text(0.5), " 50%");
        assert_eq!(percent_text(1.0), "100%");
        assert_eq!(percent_text(2.0), "100%");
    }

    #[test]
    fn test_counter_is_one_based_over_total() {
        assert_eq!(counter_text(0, 3), "1/3 articles");
        assert_eq!(counter_text(2, 3), "3/3 articles");
        assert_eq!(counter_text(0, 0), "0/0 articles");
    }

    #[test]
    fn test_body_height() {
        assert_eq!(body_height(24), 18);
        assert_eq!(body_height(4), 0);
    }

    #[test]
    fn test_header_bar() {
        let style = StyleConfig::default();
        let lines = header("Hello", &style, 80);
        assert_eq!(lines.len(), HEADER_HEIGHT as usize);
        assert_eq!(text(&lines[0]), "  Hello  ");
        assert_eq!(lines[0].spans[0].style, style.accent_style());
        assert_eq!(lines[1], Line::default());
    }

    #[test]
    fn test_header_vertical_padding() {
        let style = StyleConfig {
            vert_padding: 1,
            ..StyleConfig::default()
        };
        let lines = header("Hi", &style, 80);
        assert_eq!(lines.len(), 3);
        assert_eq!(text(&lines[0]), "      ");
        assert_eq!(text(&lines[1]), "  Hi  ");
        assert_eq!(text(&lines[2]), "      ");
    }

    #[test]
    fn test_header_truncates_long_titles() {
        let style = StyleConfig::default();
        let lines = header("A very long article title indeed", &style, 20);
        assert_eq!(lines[0].width(), 20);
        assert!(text(&lines[0]).contains("..."));
    }

    #[test]
    fn test_footer_fills_width() {
        let style = StyleConfig::default();
        for width in [80u16, 100, 137] {
            let line = footer(&info(), &style, width);
            assert_eq!(line.width(), width as usize);
        }
    }

    #[test]
    fn test_footer_segments_in_order() {
        let line = footer(&info(), &StyleConfig::default(), 100);
        let rendered = text(&line);
        let percent = rendered.find("0%").unwrap();
        let counter = rendered.find("1/3 articles").unwrap();
        let authors = rendered.find("│  Ada").unwrap();
        let updated = rendered.find("│  Last updated 2024-01-01 00:00:00 UTC").unwrap();
        assert!(percent < counter && counter < authors && authors < updated);
        assert!(rendered.ends_with("UTC  "));
    }

    #[test]
    fn test_footer_narrow_terminal_has_no_filler() {
        let style = StyleConfig::default();
        let line = footer(&info(), &style, 10);
        assert_eq!(line.spans[2].content, "");
        assert!(line.width() > 10);
    }

    #[test]
    fn test_compose_is_exact_height() {
        let style = StyleConfig::default();
        let body = vec![Line::from("body"); 4];
        let frame = compose(header("T", &style, 40), body, footer(&info(), &style, 40), 20);
        assert_eq!(frame.len(), 20);
        assert_eq!(text(&frame[3]), "body");
        assert!(text(&frame[19]).contains("articles"));
    }

    #[test]
    fn test_compose_cuts_short_terminals() {
        let style = StyleConfig::default();
        let frame = compose(header("T", &style, 40), Vec::new(), footer(&info(), &style, 40), 2);
        assert_eq!(frame.len(), 2);
        assert_eq!(text(&frame[0]), "  T  ");
    }
}
