//! HTTP feed source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{parse_feed, FeedItem, FeedSource, FetchError};
use crate::store::Feed;

/// Browser-like user agent; some feed hosts reject generic client strings.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for [`HttpFeedSource`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpFeedSourceConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Optional proxy URL (e.g. `http://127.0.0.1:8080`, `socks5://...`).
    pub proxy: Option<String>,
}

impl Default for HttpFeedSourceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            proxy: None,
        }
    }
}

/// Feed source that retrieves documents over HTTP.
pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(config: HttpFeedSourceConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "application/rss+xml, application/atom+xml, application/xml, text/xml, */*",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers);

        if let Some(ref proxy_url) = config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| FetchError::Http {
                url: proxy_url.clone(),
                message: format!("invalid proxy: {}", e),
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| FetchError::Http {
            url: String::new(),
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, feed: &Feed) -> Result<Vec<FeedItem>, FetchError> {
        debug!("Fetching feed {} ({})", feed.id, feed.url);

        let response = self
            .client
            .get(&feed.url)
            .send()
            .await
            .map_err(|e| FetchError::Http {
                url: feed.url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: feed.url.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| FetchError::Http {
            url: feed.url.clone(),
            message: e.to_string(),
        })?;

        parse_feed(&feed.url, &bytes)
    }
}
