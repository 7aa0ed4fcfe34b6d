use super::model::{Feed, FeedCollection};
use super::parser::parse_feed;
use super::FeedError;
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use url::Url;

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB
const USER_AGENT: &str = concat!("feedpager/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client used for feed retrieval.
pub fn http_client() -> Result<reqwest::Client, FeedError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(FeedError::Network)
}

/// Fetches every feed URL, one after another, in configured order.
///
/// Each request, body included, must finish within `timeout`. The first
/// failing feed aborts the whole operation. Failures other than an invalid
/// URL are wrapped in [`FeedError::Fetch`] so the message names the feed.
pub async fn fetch_all(
    client: &reqwest::Client,
    urls: &[String],
    timeout: Duration,
) -> Result<FeedCollection, FeedError> {
    let mut feeds: Vec<Feed> = Vec::with_capacity(urls.len());
    for url in urls {
        let feed = fetch_one(client, url, timeout)
            .await
            .map_err(|e| match e {
                FeedError::InvalidUrl { .. } => e,
                other => FeedError::Fetch {
                    url: url.clone(),
                    source: Box::new(other),
                },
            })?;
        feeds.push(feed);
    }

    tracing::info!(feeds = feeds.len(), "All feeds fetched");
    Ok(FeedCollection::new(feeds))
}

/// Parses local feed documents, in the order given.
pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<FeedCollection, FeedError> {
    let feeds = paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let bytes = std::fs::read(path).map_err(|source| FeedError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let feed = parse_feed(&bytes)?;
            tracing::debug!(path = %path.display(), items = feed.len(), "Loaded feed file");
            Ok(feed)
        })
        .collect::<Result<Vec<_>, FeedError>>()?;
    Ok(FeedCollection::new(feeds))
}

fn validate_url(raw: &str) -> Result<Url, FeedError> {
    let invalid = |reason: String| FeedError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

async fn fetch_one(
    client: &reqwest::Client,
    raw_url: &str,
    timeout: Duration,
) -> Result<Feed, FeedError> {
    let url = validate_url(raw_url)?;

    let bytes = tokio::time::timeout(timeout, async {
        let response = client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::HttpStatus(response.status().as_u16()));
        }
        read_limited_bytes(response, MAX_FEED_SIZE).await
    })
    .await
    .map_err(|_| FeedError::Timeout(timeout.as_secs()))?
    .inspect_err(|e| tracing::warn!(feed = %raw_url, error = %e, "Feed fetch failed"))?;

    let feed = parse_feed(&bytes)
        .inspect_err(|e| tracing::warn!(feed = %raw_url, error = %e, "Feed parse failed"))?;
    tracing::debug!(feed = %raw_url, items = feed.len(), "Fetched feed");
    Ok(feed)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FeedError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FeedError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FeedError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
