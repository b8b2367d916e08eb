//! Feed retrieval collaborator.
//!
//! The scheduler only sees the [`FeedSource`] trait; [`HttpFeedSource`] is the
//! production implementation (HTTP with timeout/proxy/browser headers, parsed
//! with feed-rs). Custom source types implement the same trait.

mod http;
mod parse;

pub use http::{HttpFeedSource, HttpFeedSourceConfig};
pub use parse::parse_feed;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::store::Feed;

/// Errors raised while retrieving or parsing a feed document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error fetching {url}: {message}")]
    Http { url: String, message: String },

    #[error("unexpected status {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("failed to parse feed {url}: {message}")]
    Parse { url: String, message: String },
}

/// A media attachment on a feed item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: String,
}

/// One item of a parsed feed, normalized across RSS and Atom.
#[derive(Debug, Clone, Default)]
pub struct FeedItem {
    /// Stable identity: the entry id, or a content hash when absent.
    pub guid: String,
    /// May be empty; the pipeline synthesizes a title from content then.
    pub title: String,
    pub link: String,
    /// Full content body, empty when the feed only carries a summary.
    pub content: String,
    /// Summary/description, empty when absent.
    pub description: String,
    pub published: Option<DateTime<Utc>>,
    /// Explicit image declared by the feed (media thumbnail etc.).
    pub image_url: Option<String>,
    pub enclosures: Vec<Enclosure>,
}

/// Source of feed documents.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Retrieve and parse the feed, returning its items.
    ///
    /// A feed with zero items is `Ok(vec![])`, not an error.
    async fn fetch(&self, feed: &Feed) -> Result<Vec<FeedItem>, FetchError>;
}
