//! Per-feed refresh pipeline: fetch, extract, synthesize, translate.

use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::debug;

use super::types::{CycleSettings, RefreshError};
use crate::fetch::{FeedItem, FeedSource};
use crate::store::{Feed, NewArticle};
use crate::translation::TranslationResolver;

/// Titles synthesized from content are capped at this many characters.
const MAX_SYNTHESIZED_TITLE_CHARS: usize = 100;

/// Fallback title when an item has no title and no usable content.
const UNTITLED: &str = "Untitled Article";

static IMG_SRC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]+src="([^">]+)""#).unwrap());

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Turns one feed into a batch of articles.
///
/// Translation is best-effort: a resolver failure leaves the article's
/// translated title empty and never fails the feed.
pub struct FeedPipeline {
    source: Arc<dyn FeedSource>,
    resolver: Option<Arc<TranslationResolver>>,
}

impl FeedPipeline {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self {
            source,
            resolver: None,
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<TranslationResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Fetch the feed and build its articles. A feed with zero items yields
    /// an empty batch, not an error.
    pub async fn execute(
        &self,
        feed: &Feed,
        settings: &CycleSettings,
    ) -> Result<Vec<NewArticle>, RefreshError> {
        let items = self.source.fetch(feed).await?;

        let mut articles = Vec::with_capacity(items.len());
        for item in items {
            articles.push(self.build_article(feed, item, settings).await);
        }
        Ok(articles)
    }

    async fn build_article(
        &self,
        feed: &Feed,
        item: FeedItem,
        settings: &CycleSettings,
    ) -> NewArticle {
        let published_at = Some(item.published.unwrap_or_else(Utc::now));
        let image_url = extract_image_url(&item);

        // Prefer full content over the description.
        let content = if item.content.is_empty() {
            item.description.clone()
        } else {
            item.content.clone()
        };

        let title = if item.title.is_empty() {
            synthesize_title(&content)
        } else {
            item.title.clone()
        };

        let mut translated_title = String::new();
        if settings.translation_enabled {
            if let Some(ref resolver) = self.resolver {
                match resolver.translate(&title, &settings.target_language).await {
                    Ok(resolution) => translated_title = resolution.text,
                    Err(e) => {
                        debug!("Translation failed for feed {}: {}", feed.id, e);
                    }
                }
            }
        }

        NewArticle {
            feed_id: feed.id,
            guid: item.guid,
            title,
            url: item.link,
            image_url,
            content,
            published_at,
            translated_title,
        }
    }
}

/// Extract an image URL for the item, by priority: explicit image field,
/// first image-typed enclosure, `<img src="...">` found in the content or
/// description.
fn extract_image_url(item: &FeedItem) -> String {
    if let Some(ref url) = item.image_url {
        if !url.is_empty() {
            return url.clone();
        }
    }

    if let Some(enclosure) = item
        .enclosures
        .iter()
        .find(|e| e.mime_type.starts_with("image/"))
    {
        return enclosure.url.clone();
    }

    let html = if item.content.is_empty() {
        &item.description
    } else {
        &item.content
    };
    if let Some(captures) = IMG_SRC_RE.captures(html) {
        return captures[1].to_string();
    }

    String::new()
}

/// Build a title from article content when the feed item has none: tags
/// stripped, whitespace trimmed, truncated with an ellipsis.
fn synthesize_title(content: &str) -> String {
    if content.is_empty() {
        return UNTITLED.to_string();
    }

    let plain = HTML_TAG_RE.replace_all(content, "");
    let plain = plain.trim();

    if plain.is_empty() {
        return UNTITLED.to_string();
    }

    if plain.chars().count() > MAX_SYNTHESIZED_TITLE_CHARS {
        let truncated: String = plain.chars().take(MAX_SYNTHESIZED_TITLE_CHARS).collect();
        format!("{}...", truncated)
    } else {
        plain.to_string()
    }
}
