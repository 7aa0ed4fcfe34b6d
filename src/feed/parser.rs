use super::model::{Feed, Item};
use super::FeedError;
use crate::util::strip_control_chars;
use feed_rs::parser;

/// Parse an RSS/Atom/JSON feed document into a [`Feed`].
///
/// Entry order is preserved. Missing entry titles become "Untitled"; missing
/// bodies become empty strings. Titles and author names are stripped of
/// terminal control sequences since they are drawn outside the renderer.
pub fn parse_feed(bytes: &[u8]) -> Result<Feed, FeedError> {
    let feed = parser::parse(bytes).map_err(|e| FeedError::Parse(e.to_string()))?;

    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let title = entry
                .title
                .map(|t| strip_control_chars(t.content.trim()).into_owned())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string());
            let description = entry.summary.map(|s| s.content).unwrap_or_default();
            let content = entry.content.and_then(|c| c.body).unwrap_or_default();
            let authors = entry
                .authors
                .into_iter()
                .map(|p| strip_control_chars(p.name.trim()).into_owned())
                .filter(|name| !name.is_empty())
                .collect();

            Item {
                title,
                description,
                content,
                authors,
                published: entry.published,
                updated: entry.updated,
            }
        })
        .collect();

    let title = feed
        .title
        .map(|t| strip_control_chars(t.content.trim()).into_owned())
        .unwrap_or_default();

    Ok(Feed { title, items })
}
