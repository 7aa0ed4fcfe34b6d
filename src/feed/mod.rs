//! Feed retrieval and parsing.
//!
//! Feeds are fetched once, before the reading session starts:
//!
//! - [`parser`]: RSS/Atom/JSON documents into [`Feed`] values via `feed-rs`
//! - [`fetcher`]: sequential HTTP retrieval in the configured order
//! - [`model`]: the immutable [`FeedCollection`] handed to the session
//!
//! Any failure here is fatal to startup; the session never sees a partial
//! collection.

mod fetcher;
mod model;
mod parser;

pub use fetcher::{fetch_all, http_client, load_files};
pub use model::{format_timestamp, Feed, FeedCollection, Item, TIMESTAMP_FORMAT};
pub use parser::parse_feed;

use thiserror::Error;

/// Errors produced while turning a feed source into a [`Feed`].
#[derive(Debug, Error)]
pub enum FeedError {
    /// URL failed to parse or used a scheme other than http/https
    #[error("Invalid feed URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Response too large")]
    ResponseTooLarge,
    /// Document could not be parsed as RSS, Atom or JSON Feed
    #[error("Parse error: {0}")]
    Parse(String),
    /// Any failure of a single feed, tagged with its URL
    #[error("Failed to fetch '{url}'")]
    Fetch {
        url: String,
        #[source]
        source: Box<FeedError>,
    },
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
