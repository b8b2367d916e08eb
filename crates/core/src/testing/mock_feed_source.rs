//! Mock feed source for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::fetch::{FeedItem, FeedSource, FetchError};
use crate::store::Feed;

/// Mock implementation of the FeedSource trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable items per feed (or shared defaults)
/// - Simulate failures and slow fetches
/// - Track fetch order and peak concurrency for assertions
pub struct MockFeedSource {
    /// Per-feed items, keyed by feed id.
    items: Arc<RwLock<HashMap<i64, Vec<FeedItem>>>>,
    /// Items returned for feeds without a per-feed entry.
    default_items: Arc<RwLock<Vec<FeedItem>>>,
    /// Feed ids whose fetches fail.
    failing: Arc<RwLock<HashSet<i64>>>,
    /// Simulated fetch duration.
    delay: Arc<RwLock<Option<Duration>>>,
    /// Feed ids in the order fetches started.
    fetch_log: Arc<RwLock<Vec<i64>>>,
    /// Fetches currently in flight.
    in_flight: Arc<AtomicUsize>,
    /// Highest number of simultaneous fetches observed.
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockFeedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFeedSource {
    /// Create a new mock feed source with no items.
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
            default_items: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            delay: Arc::new(RwLock::new(None)),
            fetch_log: Arc::new(RwLock::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the items returned for a specific feed.
    pub async fn set_items(&self, feed_id: i64, items: Vec<FeedItem>) {
        self.items.write().await.insert(feed_id, items);
    }

    /// Set the items returned for feeds without per-feed items.
    pub async fn set_default_items(&self, items: Vec<FeedItem>) {
        *self.default_items.write().await = items;
    }

    /// Make fetches for the given feed fail.
    pub async fn fail_feed(&self, feed_id: i64) {
        self.failing.write().await.insert(feed_id);
    }

    /// Simulate slow fetches.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Feed ids in the order their fetches started.
    pub async fn fetch_order(&self) -> Vec<i64> {
        self.fetch_log.read().await.clone()
    }

    /// Total fetches started.
    pub async fn fetch_count(&self) -> usize {
        self.fetch_log.read().await.len()
    }

    /// Highest number of simultaneous fetches observed.
    pub fn max_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for MockFeedSource {
    async fn fetch(&self, feed: &Feed) -> Result<Vec<FeedItem>, FetchError> {
        self.fetch_log.write().await.push(feed.id);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.failing.read().await.contains(&feed.id) {
            Err(FetchError::Status {
                url: feed.url.clone(),
                status: 503,
            })
        } else {
            let items = self.items.read().await;
            match items.get(&feed.id) {
                Some(items) => Ok(items.clone()),
                None => Ok(self.default_items.read().await.clone()),
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
