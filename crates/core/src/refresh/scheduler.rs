//! Refresh cycle scheduling and worker dispatch.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::pipeline::FeedPipeline;
use super::pool::TaskPool;
use super::progress::RefreshProgress;
use super::types::{
    Admission, CycleSettings, PoolTask, ProgressSnapshot, QueuedTask, RefreshError, RefreshReason,
    TaskEntry,
};
use crate::metrics;
use crate::store::{ArticleStore, Feed, SettingsStore};

/// Drives refresh cycles: admits feeds into the bounded pool, runs one worker
/// per slot, promotes the FIFO backlog and finishes the cycle when the pool
/// drains.
///
/// State machine per cycle: Idle -> Running -> Idle. `refresh` rejects a
/// request outright while a cycle runs; per-feed failures are logged, counted
/// as completed and never abort siblings.
pub struct RefreshScheduler {
    store: Arc<dyn ArticleStore>,
    settings: Arc<dyn SettingsStore>,
    pipeline: Arc<FeedPipeline>,
    progress: Arc<RefreshProgress>,
    /// Pool of the current (or most recent) cycle. Capacity is read from
    /// settings once per cycle, so each cycle gets a fresh pool.
    pool: Mutex<Option<Arc<TaskPool>>>,
}

impl RefreshScheduler {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        settings: Arc<dyn SettingsStore>,
        pipeline: Arc<FeedPipeline>,
    ) -> Self {
        Self {
            store,
            settings,
            pipeline,
            progress: Arc::new(RefreshProgress::new()),
            pool: Mutex::new(None),
        }
    }

    /// Start a refresh cycle over the given feeds.
    ///
    /// Returns immediately after dispatching; the cycle completes in the
    /// background. `RefreshError::AlreadyRunning` rejects the whole request
    /// while another cycle is in flight.
    pub fn refresh(
        self: &Arc<Self>,
        feeds: Vec<Feed>,
        reason: RefreshReason,
    ) -> Result<(), RefreshError> {
        // A feed requested twice in one cycle is one unit of work.
        let mut seen = HashSet::new();
        let feeds: Vec<Feed> = feeds
            .into_iter()
            .filter(|f| seen.insert(f.id))
            .collect();

        let cycle_settings = Arc::new(CycleSettings::load(self.settings.as_ref()));

        if !self.progress.try_start(feeds.len()) {
            return Err(RefreshError::AlreadyRunning);
        }

        info!(
            "Refresh cycle started: {} feeds, capacity {}, reason {}",
            feeds.len(),
            cycle_settings.capacity,
            reason.as_str()
        );
        metrics::REFRESH_CYCLES
            .with_label_values(&[reason.as_str()])
            .inc();

        let pool = Arc::new(TaskPool::new(cycle_settings.capacity));
        *self.pool.lock().unwrap() = Some(Arc::clone(&pool));

        for feed in feeds {
            match pool.submit(feed.clone(), reason) {
                Admission::Admitted => {
                    self.dispatch(&pool, TaskEntry { feed, reason }, Arc::clone(&cycle_settings));
                }
                Admission::Queued { position } => {
                    debug!("Feed {} queued at position {}", feed.id, position);
                }
                Admission::Duplicate => {
                    debug!("Feed {} already pending, submission absorbed", feed.id);
                }
            }
        }

        // An empty request has nothing to drain the cycle.
        if pool.is_drained() {
            self.progress.finish();
            info!("Refresh cycle finished: no feeds to refresh");
        }

        Ok(())
    }

    /// Current cycle progress.
    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }

    /// Feeds currently refreshing, sorted by title.
    pub fn pool_tasks(&self) -> Vec<PoolTask> {
        match self.pool.lock().unwrap().as_ref() {
            Some(pool) => pool.list_pool(),
            None => Vec::new(),
        }
    }

    /// First `limit` queued feeds in promotion order.
    pub fn queue_tasks(&self, limit: usize) -> Vec<QueuedTask> {
        match self.pool.lock().unwrap().as_ref() {
            Some(pool) => pool.list_queue(limit),
            None => Vec::new(),
        }
    }

    /// Block (poll) until the running cycle finishes or the timeout elapses.
    pub async fn wait_until_idle(&self, timeout: Duration) -> bool {
        self.progress.wait_until_idle(timeout).await
    }

    fn dispatch(self: &Arc<Self>, pool: &Arc<TaskPool>, entry: TaskEntry, settings: Arc<CycleSettings>) {
        let scheduler = Arc::clone(self);
        let pool = Arc::clone(pool);
        tokio::spawn(async move {
            scheduler.run_worker(pool, entry, settings).await;
        });
    }

    /// One pool slot's worker. Runs the entry to a terminal outcome, then
    /// keeps the slot by taking over whichever feed its completion promoted,
    /// so concurrency never exceeds capacity and promotion stays FIFO.
    async fn run_worker(
        self: Arc<Self>,
        pool: Arc<TaskPool>,
        first: TaskEntry,
        settings: Arc<CycleSettings>,
    ) {
        let mut next = Some(first);
        while let Some(entry) = next.take() {
            self.execute_entry(&entry, &settings).await;

            let outcome = pool.complete(entry.feed.id);
            self.progress.increment();
            if outcome.drained {
                self.progress.finish();
                let snap = self.progress.snapshot();
                info!(
                    "Refresh cycle finished: {}/{} feeds",
                    snap.current, snap.total
                );
            }
            next = outcome.promoted;
        }
    }

    /// Run the pipeline for one feed. Failures stay local: they are logged
    /// and the feed still counts as completed.
    async fn execute_entry(&self, entry: &TaskEntry, settings: &CycleSettings) {
        let started = Instant::now();
        match self.pipeline.execute(&entry.feed, settings).await {
            Ok(articles) => {
                match self.store.save_articles(&articles) {
                    Ok(inserted) => {
                        debug!(
                            "Feed {} refreshed: {} articles, {} new, {:.2}s",
                            entry.feed.id,
                            articles.len(),
                            inserted,
                            started.elapsed().as_secs_f64()
                        );
                        metrics::ARTICLES_STORED.inc_by(inserted as u64);
                    }
                    Err(e) => {
                        warn!("Failed to persist articles for feed {}: {}", entry.feed.id, e);
                    }
                }
                metrics::FEEDS_REFRESHED.with_label_values(&["ok"]).inc();
                metrics::FEED_REFRESH_DURATION
                    .with_label_values(&["ok"])
                    .observe(started.elapsed().as_secs_f64());
            }
            Err(e) => {
                warn!("Refresh failed for feed {} ({}): {}", entry.feed.id, entry.feed.url, e);
                metrics::FEEDS_REFRESHED.with_label_values(&["error"]).inc();
                metrics::FEED_REFRESH_DURATION
                    .with_label_values(&["error"])
                    .observe(started.elapsed().as_secs_f64());
            }
        }
    }
}
