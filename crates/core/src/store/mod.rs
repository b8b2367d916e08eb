//! Persistence collaborators: articles, feeds and the settings key/value store.
//!
//! The refresh scheduler and translation resolver only ever see the
//! [`ArticleStore`] and [`SettingsStore`] traits; the SQLite implementation
//! lives in [`sqlite`].

mod sqlite;
mod types;

pub use sqlite::SqliteStore;
pub use types::{Article, Feed, NewArticle};

use thiserror::Error;

/// Errors surfaced by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("feed not found: {0}")]
    FeedNotFound(i64),

    #[error("article not found: {0}")]
    ArticleNotFound(i64),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// Store for feeds and the articles produced by the refresh pipeline.
pub trait ArticleStore: Send + Sync {
    /// List all subscribed feeds.
    fn list_feeds(&self) -> Result<Vec<Feed>, StoreError>;

    /// Look up a single feed by id.
    fn get_feed(&self, feed_id: i64) -> Result<Option<Feed>, StoreError>;

    /// Subscribe to a feed. Returns the stored feed with its assigned id.
    /// Re-adding an existing URL updates the title and returns the existing row.
    fn add_feed(&self, title: &str, url: &str) -> Result<Feed, StoreError>;

    /// Remove a feed and its articles.
    fn remove_feed(&self, feed_id: i64) -> Result<(), StoreError>;

    /// Persist a batch of articles. Articles whose guid already exists are
    /// ignored. Returns the number of newly inserted rows.
    fn save_articles(&self, articles: &[NewArticle]) -> Result<usize, StoreError>;

    /// List stored articles, newest first, optionally restricted to one feed.
    fn list_articles(&self, feed_id: Option<i64>, limit: usize) -> Result<Vec<Article>, StoreError>;

    /// Look up a single article by id.
    fn get_article(&self, article_id: i64) -> Result<Option<Article>, StoreError>;

    /// Replace the translated title of a single article.
    fn update_translation(&self, article_id: i64, translated: &str) -> Result<(), StoreError>;

    /// Clear every translated title.
    fn clear_translations(&self) -> Result<(), StoreError>;
}

/// String-keyed settings store.
///
/// Values are string-encoded (booleans as `"true"`/`"false"`, numbers as
/// digits). Business logic never consumes these directly; the scheduler
/// converts them into typed structures at cycle start.
pub trait SettingsStore: Send + Sync {
    fn get_setting(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_setting(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
