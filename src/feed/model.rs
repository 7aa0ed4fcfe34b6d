//! In-memory feed data handed to the reading session.
//!
//! Everything here is built once at startup and read-only afterwards.

use chrono::{DateTime, Local, Utc};

/// Display format for the footer timestamp.
///
/// The zone is written as a numeric UTC offset (`+02:00`). chrono's `Local`
/// only knows the offset, not the zone abbreviation, so `%Z` would print the
/// same thing; `%:z` says so explicitly.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

/// One syndication entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub title: String,
    /// HTML fragment (RSS description / Atom summary).
    pub description: String,
    /// HTML fragment with the full body; often empty.
    pub content: String,
    pub authors: Vec<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl Item {
    /// Best "last updated" time: updated, then published, then the Unix epoch.
    pub fn last_updated(&self) -> DateTime<Utc> {
        // DateTime<Utc>::default() is the epoch
        self.updated.or(self.published).unwrap_or_default()
    }

    /// Authors joined for display.
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }
}

/// Format a timestamp in the local zone for the footer.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}

/// A titled, ordered list of entries. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    pub title: String,
    pub items: Vec<Item>,
}

impl Feed {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// All feeds loaded for this run, in configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedCollection {
    feeds: Vec<Feed>,
}

impl FeedCollection {
    pub fn new(feeds: Vec<Feed>) -> Self {
        Self { feeds }
    }

    pub fn get(&self, index: usize) -> Option<&Feed> {
        self.feeds.get(index)
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Number of items in the feed at `index`; 0 for a missing feed.
    pub fn item_count(&self, index: usize) -> usize {
        self.get(index).map_or(0, Feed::len)
    }

    /// The item at `(feed, item)`, if both indices are in range.
    pub fn item(&self, feed: usize, item: usize) -> Option<&Item> {
        self.get(feed).and_then(|f| f.items.get(item))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feed> {
        self.feeds.iter()
    }
}

impl From<Vec<Feed>> for FeedCollection {
    fn from(feeds: Vec<Feed>) -> Self {
        Self::new(feeds)
    }
}
