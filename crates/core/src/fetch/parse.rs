//! Feed document parsing.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::{Enclosure, FeedItem, FetchError};

/// Parse a raw feed document (RSS or Atom) into normalized items.
pub fn parse_feed(url: &str, bytes: &[u8]) -> Result<Vec<FeedItem>, FetchError> {
    let feed = feed_rs::parser::parse(bytes).map_err(|e| FetchError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let link = entry
                .links
                .iter()
                .find(|l| l.rel.as_deref() != Some("enclosure"))
                .map(|l| l.href.clone())
                .unwrap_or_default();
            let content = entry
                .content
                .and_then(|c| c.body)
                .unwrap_or_default();
            let description = entry.summary.map(|s| s.content).unwrap_or_default();
            let published = entry.published.or(entry.updated);

            // Explicit image: first media thumbnail, media-rss or itunes.
            let image_url = entry
                .media
                .iter()
                .flat_map(|m| m.thumbnails.iter())
                .map(|t| t.image.uri.clone())
                .next();

            // Enclosures arrive either as media content objects or as links
            // with rel="enclosure".
            let mut enclosures: Vec<Enclosure> = entry
                .media
                .iter()
                .flat_map(|m| m.content.iter())
                .filter_map(|c| {
                    c.url.as_ref().map(|u| Enclosure {
                        url: u.to_string(),
                        mime_type: c
                            .content_type
                            .as_ref()
                            .map(|t| t.to_string())
                            .unwrap_or_default(),
                    })
                })
                .collect();
            enclosures.extend(
                entry
                    .links
                    .iter()
                    .filter(|l| l.rel.as_deref() == Some("enclosure"))
                    .map(|l| Enclosure {
                        url: l.href.clone(),
                        mime_type: l.media_type.clone().unwrap_or_default(),
                    }),
            );

            let existing_id = if entry.id.trim().is_empty() {
                None
            } else {
                Some(entry.id.as_str())
            };
            let guid = item_guid(existing_id, &link, &title, published);

            FeedItem {
                guid,
                title,
                link,
                content,
                description,
                published,
                image_url,
                enclosures,
            }
        })
        .collect();

    Ok(items)
}

/// Derive a stable item identity: the feed-provided id when present, a content
/// hash otherwise.
fn item_guid(
    existing: Option<&str>,
    link: &str,
    title: &str,
    published: Option<DateTime<Utc>>,
) -> String {
    if let Some(guid) = existing {
        return guid.trim().to_string();
    }

    let input = format!(
        "{}|{}|{}",
        link,
        title,
        published.map(|p| p.timestamp().to_string()).unwrap_or_default()
    );
    let hash = Sha256::digest(input.as_bytes());
    format!("{:x}", hash)
}
