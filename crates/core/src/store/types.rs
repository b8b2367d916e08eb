//! Storage entity types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A subscribed feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub id: i64,
    pub title: String,
    pub url: String,
}

/// An article as constructed by the per-feed pipeline, before persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewArticle {
    pub feed_id: i64,
    /// Stable identity: the feed entry id, or a content hash when absent.
    pub guid: String,
    pub title: String,
    pub url: String,
    pub image_url: String,
    pub content: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Empty when translation is disabled or failed.
    pub translated_title: String,
}

/// A persisted article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub feed_id: i64,
    pub guid: String,
    pub title: String,
    pub url: String,
    pub image_url: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
    pub translated_title: String,
}
