//! Types shared by the refresh scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::FetchError;
use crate::store::{Feed, SettingsStore, StoreError};

/// Errors that can occur while scheduling or executing a refresh.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// A refresh cycle is already running; the request is rejected whole.
    #[error("a refresh cycle is already running")]
    AlreadyRunning,

    /// Feed retrieval or parsing failed.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Persistence failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Why a feed was included in a refresh cycle.
///
/// The reason never affects scheduling order; it is carried for status
/// display and logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshReason {
    Manual,
    Scheduled,
    Startup,
    Retry,
}

impl RefreshReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshReason::Manual => "manual",
            RefreshReason::Scheduled => "scheduled",
            RefreshReason::Startup => "startup",
            RefreshReason::Retry => "retry",
        }
    }
}

/// A feed admitted to the pool or waiting in the queue.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    pub feed: Feed,
    pub reason: RefreshReason,
}

/// Result of submitting a feed to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A pool slot was free; the feed should be dispatched now.
    Admitted,
    /// Pool full; the feed waits at the given queue position (1-based).
    Queued { position: usize },
    /// The feed already has a pending task; the submission is a no-op.
    Duplicate,
}

/// Result of completing a feed's task, computed under one lock.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    /// Queue head promoted into the freed slot, to be dispatched by the
    /// completing worker.
    pub promoted: Option<TaskEntry>,
    /// True iff pool and queue are both empty after this completion.
    pub drained: bool,
}

/// A feed currently being refreshed (status surface).
#[derive(Debug, Clone, Serialize)]
pub struct PoolTask {
    pub feed_id: i64,
    pub feed_title: String,
    pub reason: RefreshReason,
    pub created_at: DateTime<Utc>,
}

/// A feed waiting for a pool slot (status surface).
#[derive(Debug, Clone, Serialize)]
pub struct QueuedTask {
    pub feed_id: i64,
    pub feed_title: String,
    pub reason: RefreshReason,
    /// 1-based rank; 1 is promoted next.
    pub position: usize,
}

/// Aggregate state of the current refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub current: usize,
    pub is_running: bool,
}

/// Typed per-cycle settings, converted from the string-encoded settings store
/// once at cycle start.
#[derive(Debug, Clone)]
pub struct CycleSettings {
    /// Maximum concurrently refreshing feeds. Always >= 1.
    pub capacity: usize,
    pub translation_enabled: bool,
    pub target_language: String,
}

/// Fallback when `max_concurrent_refreshes` is absent.
const DEFAULT_CAPACITY: usize = 5;

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            translation_enabled: false,
            target_language: "en".to_string(),
        }
    }
}

impl CycleSettings {
    /// Read and convert the cycle-relevant settings. Invalid or non-positive
    /// concurrency values are clamped to 1; missing keys fall back to
    /// defaults. Store errors degrade to defaults rather than blocking the
    /// cycle.
    pub fn load(settings: &dyn SettingsStore) -> Self {
        let defaults = Self::default();

        let capacity = settings
            .get_setting("max_concurrent_refreshes")
            .ok()
            .flatten()
            .map(|raw| raw.trim().parse::<i64>().unwrap_or(0).max(1) as usize)
            .unwrap_or(defaults.capacity);

        let translation_enabled = settings
            .get_setting("translation_enabled")
            .ok()
            .flatten()
            .map(|v| v == "true")
            .unwrap_or(defaults.translation_enabled);

        let target_language = settings
            .get_setting("target_language")
            .ok()
            .flatten()
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.target_language);

        Self {
            capacity,
            translation_enabled,
            target_language,
        }
    }
}
