//! SQLite-backed implementation of the article and settings stores.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{Article, ArticleStore, Feed, NewArticle, SettingsStore, StoreError};

/// SQLite store holding feeds, articles and settings in one database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file and initialize the schema.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS feeds (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                feed_id INTEGER NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
                guid TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                image_url TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL DEFAULT '',
                published_at TEXT NOT NULL,
                translated_title TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_articles_feed ON articles(feed_id);
            CREATE INDEX IF NOT EXISTS idx_articles_published ON articles(published_at DESC);

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn row_to_feed(row: &rusqlite::Row) -> rusqlite::Result<Feed> {
        Ok(Feed {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
        })
    }

    fn row_to_article(row: &rusqlite::Row) -> rusqlite::Result<Article> {
        let published_at_str: String = row.get(7)?;
        let published_at = DateTime::parse_from_rfc3339(&published_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Article {
            id: row.get(0)?,
            feed_id: row.get(1)?,
            guid: row.get(2)?,
            title: row.get(3)?,
            url: row.get(4)?,
            image_url: row.get(5)?,
            content: row.get(6)?,
            published_at,
            translated_title: row.get(8)?,
        })
    }
}

impl ArticleStore for SqliteStore {
    fn list_feeds(&self) -> Result<Vec<Feed>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, title, url FROM feeds ORDER BY title")?;
        let feeds = stmt
            .query_map([], Self::row_to_feed)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(feeds)
    }

    fn get_feed(&self, feed_id: i64) -> Result<Option<Feed>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let feed = conn
            .query_row(
                "SELECT id, title, url FROM feeds WHERE id = ?1",
                params![feed_id],
                Self::row_to_feed,
            )
            .optional()?;
        Ok(feed)
    }

    fn add_feed(&self, title: &str, url: &str) -> Result<Feed, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO feeds (title, url) VALUES (?1, ?2)
             ON CONFLICT(url) DO UPDATE SET title = excluded.title",
            params![title, url],
        )?;
        let feed = conn.query_row(
            "SELECT id, title, url FROM feeds WHERE url = ?1",
            params![url],
            Self::row_to_feed,
        )?;
        Ok(feed)
    }

    fn remove_feed(&self, feed_id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM articles WHERE feed_id = ?1", params![feed_id])?;
        let removed = conn.execute("DELETE FROM feeds WHERE id = ?1", params![feed_id])?;
        if removed == 0 {
            return Err(StoreError::FeedNotFound(feed_id));
        }
        Ok(())
    }

    fn save_articles(&self, articles: &[NewArticle]) -> Result<usize, StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO articles
                 (feed_id, guid, title, url, image_url, content, published_at, translated_title)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for article in articles {
                let published = article.published_at.unwrap_or_else(Utc::now);
                inserted += stmt.execute(params![
                    article.feed_id,
                    article.guid,
                    article.title,
                    article.url,
                    article.image_url,
                    article.content,
                    published.to_rfc3339(),
                    article.translated_title,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn list_articles(&self, feed_id: Option<i64>, limit: usize) -> Result<Vec<Article>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut articles = Vec::new();
        match feed_id {
            Some(id) => {
                let mut stmt = conn.prepare(
                    "SELECT id, feed_id, guid, title, url, image_url, content, published_at, translated_title
                     FROM articles WHERE feed_id = ?1 ORDER BY published_at DESC LIMIT ?2",
                )?;
                let rows = stmt.query_map(params![id, limit as i64], Self::row_to_article)?;
                for row in rows {
                    articles.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, feed_id, guid, title, url, image_url, content, published_at, translated_title
                     FROM articles ORDER BY published_at DESC LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![limit as i64], Self::row_to_article)?;
                for row in rows {
                    articles.push(row?);
                }
            }
        }
        Ok(articles)
    }

    fn get_article(&self, article_id: i64) -> Result<Option<Article>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let article = conn
            .query_row(
                "SELECT id, feed_id, guid, title, url, image_url, content, published_at, translated_title
                 FROM articles WHERE id = ?1",
                params![article_id],
                Self::row_to_article,
            )
            .optional()?;
        Ok(article)
    }

    fn update_translation(&self, article_id: i64, translated: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE articles SET translated_title = ?1 WHERE id = ?2",
            params![translated, article_id],
        )?;
        if updated == 0 {
            return Err(StoreError::ArticleNotFound(article_id));
        }
        Ok(())
    }

    fn clear_translations(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("UPDATE articles SET translated_title = ''", [])?;
        Ok(())
    }
}

impl SettingsStore for SqliteStore {
    fn get_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}
