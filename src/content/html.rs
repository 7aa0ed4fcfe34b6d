use super::{ContentError, HtmlConverter};
use htmd::HtmlToMarkdown;
use std::borrow::Cow;

/// Decode HTML character references (`&amp;`, `&#8217;`, ...).
///
/// Feeds frequently double-encode their bodies, so this runs before the
/// HTML is parsed. Never fails; unknown references are left as written.
pub fn decode_entities(html: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(html)
}

/// HTML to markdown conversion backed by `htmd`.
pub struct HtmdConverter {
    inner: HtmlToMarkdown,
}

impl HtmdConverter {
    pub fn new() -> Self {
        Self {
            inner: HtmlToMarkdown::builder()
                .skip_tags(vec!["script", "style", "iframe", "head"])
                .build(),
        }
    }
}

impl Default for HtmdConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlConverter for HtmdConverter {
    fn convert(&self, html: &str) -> Result<String, ContentError> {
        self.inner
            .convert(html)
            .map_err(|e| ContentError::Conversion(e.to_string()))
    }
}
