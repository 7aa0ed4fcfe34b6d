use std::borrow::Cow;
use std::ops::Range;

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Calculates the display width of a string in terminal columns.
///
/// CJK characters and most emoji count as two columns, combining marks as zero.
///
/// ```
/// use feedpager::util::display_width;
///
/// assert_eq!(display_width("Hello"), 5);
/// assert_eq!(display_width("你好"), 4);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Ellipsis appended to truncated text
const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Truncates a string to fit within `max_width` terminal columns.
///
/// Appends "..." when text was cut. Widths of 3 or less return as many
/// characters as fit, without the ellipsis. Returns `Cow::Borrowed` when the
/// string already fits.
///
/// ```
/// use feedpager::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let (budget, suffix) = if max_width <= ELLIPSIS_WIDTH {
        (max_width, "")
    } else {
        (max_width - ELLIPSIS_WIDTH, ELLIPSIS)
    };

    let mut used = 0;
    let mut cut = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        cut = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", &s[..cut], suffix))
}

/// Strip terminal control characters and ANSI escape sequences from feed text.
///
/// Titles, author names and entry bodies come straight off the network and
/// are written into the terminal, so CSI (`ESC [`), OSC (`ESC ]`, terminated by
/// BEL or `ESC \`), bare ESC, DEL and C0 controls are removed. Tab, newline and
/// carriage return survive.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    fn is_control(b: u8) -> bool {
        b == 0x1b || b == 0x7f || (b < 0x20 && b != b'\t' && b != b'\n' && b != b'\r')
    }

    let bytes = s.as_bytes();
    if !bytes.iter().any(|&b| is_control(b)) {
        return Cow::Borrowed(s);
    }

    let len = bytes.len();
    let mut out = String::with_capacity(len);
    let mut i = 0;

    while i < len {
        let b = bytes[i];
        if b == 0x1b {
            match bytes.get(i + 1) {
                Some(b'[') => {
                    i += 2;
                    while i < len {
                        let c = bytes[i];
                        i += 1;
                        if (0x40..=0x7e).contains(&c) {
                            break;
                        }
                    }
                }
                Some(b']') => {
                    i += 2;
                    while i < len {
                        if bytes[i] == 0x07 {
                            i += 1;
                            break;
                        }
                        if bytes[i] == 0x1b && bytes.get(i + 1) == Some(&b'\\') {
                            i += 2;
                            break;
                        }
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        } else if is_control(b) {
            i += 1;
        } else {
            let start = i;
            while i < len && !is_control(bytes[i]) {
                i += 1;
            }
            // Control bytes are ASCII and never split a code point.
            out.push_str(&s[start..i]);
        }
    }

    Cow::Owned(out)
}

/// Tags that end a visual block when reducing HTML to plain text.
const BLOCK_TAGS: [&str; 14] = [
    "p", "br", "div", "hr", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote",
];

/// Reduce an HTML fragment to plain text by dropping tags.
///
/// Block-level tags become line breaks and runs of blank lines collapse to a
/// single blank line. Entities are left alone; callers decode them first.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut chars = html.chars();

    while let Some(c) = chars.next() {
        if c != '<' {
            out.push(c);
            continue;
        }
        let mut tag = String::new();
        for t in chars.by_ref() {
            if t == '>' {
                break;
            }
            tag.push(t);
        }
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        if BLOCK_TAGS.contains(&name.as_str()) {
            out.push('\n');
        }
    }

    let mut collapsed = String::with_capacity(out.len());
    let mut blank_run = 0;
    for line in out.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 || collapsed.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        collapsed.push_str(line);
        collapsed.push('\n');
    }
    collapsed.trim_end().to_string()
}

/// Word-wrap a styled line to `width` columns, keeping span styles.
///
/// Line breaking is done by `textwrap` on the line's plain text (first fit,
/// words wider than the line split at character boundaries); each wrapped
/// piece is then cut back into the styled spans it covers. Whitespace at a
/// break is dropped and the line-level style carries over to every piece. A
/// zero width returns the line unchanged.
pub fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 || line.width() <= width {
        return vec![line.clone()];
    }

    let plain: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
    let options = textwrap::Options::new(width)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
        .wrap_algorithm(textwrap::WrapAlgorithm::FirstFit);

    // Byte range of each span within `plain`
    let mut ranges: Vec<(Range<usize>, Style)> = Vec::with_capacity(line.spans.len());
    let mut offset = 0;
    for span in &line.spans {
        let end = offset + span.content.len();
        ranges.push((offset..end, span.style));
        offset = end;
    }

    let mut cursor = 0;
    textwrap::wrap(&plain, options)
        .iter()
        .map(|piece| {
            // Pieces come back in order, separated only by dropped whitespace
            let Some(found) = plain[cursor..].find(piece.as_ref()) else {
                return Line::from(piece.to_string()).style(line.style);
            };
            let start = cursor + found;
            let end = start + piece.len();
            cursor = end;
            Line::from(styled_slice(&plain, &ranges, start..end)).style(line.style)
        })
        .collect()
}

/// The parts of `plain[window]` as spans, each with the style of the span it
/// came from.
fn styled_slice(
    plain: &str,
    ranges: &[(Range<usize>, Style)],
    window: Range<usize>,
) -> Vec<Span<'static>> {
    ranges
        .iter()
        .filter_map(|(range, style)| {
            let start = range.start.max(window.start);
            let end = range.end.min(window.end);
            (start < end).then(|| Span::styled(plain[start..end].to_string(), *style))
        })
        .collect()
}
