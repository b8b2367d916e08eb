//! Bounded task pool with FIFO overflow queue.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::types::{Admission, CompletionOutcome, PoolTask, QueuedTask, RefreshReason, TaskEntry};

struct RunningTask {
    entry: TaskEntry,
    created_at: DateTime<Utc>,
}

struct QueuedEntry {
    entry: TaskEntry,
    seq: u64,
}

struct PoolState {
    running: HashMap<i64, RunningTask>,
    queued: VecDeque<QueuedEntry>,
    /// Monotonic sequence for queue ordering; rank is derived at read time
    /// instead of rewriting positions on every promotion.
    next_seq: u64,
}

/// The set of feeds currently refreshing plus the FIFO backlog waiting for a
/// slot. A feed id appears at most once across both, so overlapping triggers
/// for the same feed collapse into a single task.
///
/// One internal lock guards both structures; no method acquires any other
/// lock while holding it.
pub struct TaskPool {
    capacity: usize,
    inner: Mutex<PoolState>,
}

impl TaskPool {
    /// Create a pool. Capacity is clamped to a floor of 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(PoolState {
                running: HashMap::new(),
                queued: VecDeque::new(),
                next_seq: 0,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Submit a feed for refresh.
    pub fn submit(&self, feed: crate::store::Feed, reason: RefreshReason) -> Admission {
        let mut state = self.inner.lock().unwrap();

        let feed_id = feed.id;
        if state.running.contains_key(&feed_id)
            || state.queued.iter().any(|q| q.entry.feed.id == feed_id)
        {
            return Admission::Duplicate;
        }

        let entry = TaskEntry { feed, reason };
        if state.running.len() < self.capacity {
            state.running.insert(
                feed_id,
                RunningTask {
                    entry,
                    created_at: Utc::now(),
                },
            );
            Admission::Admitted
        } else {
            let seq = state.next_seq;
            state.next_seq += 1;
            state.queued.push_back(QueuedEntry { entry, seq });
            Admission::Queued {
                position: state.queued.len(),
            }
        }
    }

    /// Complete a feed's task, promoting the queue head into the freed slot.
    ///
    /// The promoted entry (if any) must be dispatched by the caller; `drained`
    /// reports whether pool and queue are both empty afterwards. Both facts
    /// are computed under the same lock acquisition so concurrent completions
    /// cannot observe a torn state.
    pub fn complete(&self, feed_id: i64) -> CompletionOutcome {
        let mut state = self.inner.lock().unwrap();
        state.running.remove(&feed_id);

        let promoted = state.queued.pop_front().map(|q| {
            let id = q.entry.feed.id;
            state.running.insert(
                id,
                RunningTask {
                    entry: q.entry.clone(),
                    created_at: Utc::now(),
                },
            );
            q.entry
        });

        CompletionOutcome {
            promoted,
            drained: state.running.is_empty() && state.queued.is_empty(),
        }
    }

    /// True iff no feed is running or queued.
    pub fn is_drained(&self) -> bool {
        let state = self.inner.lock().unwrap();
        state.running.is_empty() && state.queued.is_empty()
    }

    /// Snapshot of the running set, sorted by feed title for stable display.
    pub fn list_pool(&self) -> Vec<PoolTask> {
        let state = self.inner.lock().unwrap();
        let mut tasks: Vec<PoolTask> = state
            .running
            .values()
            .map(|t| PoolTask {
                feed_id: t.entry.feed.id,
                feed_title: t.entry.feed.title.clone(),
                reason: t.entry.reason,
                created_at: t.created_at,
            })
            .collect();
        tasks.sort_by(|a, b| a.feed_title.cmp(&b.feed_title));
        tasks
    }

    /// First `limit` queued feeds in promotion order.
    pub fn list_queue(&self, limit: usize) -> Vec<QueuedTask> {
        let state = self.inner.lock().unwrap();
        let mut entries: Vec<&QueuedEntry> = state.queued.iter().collect();
        entries.sort_by_key(|q| q.seq);
        entries
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, q)| QueuedTask {
                feed_id: q.entry.feed.id,
                feed_title: q.entry.feed.title.clone(),
                reason: q.entry.reason,
                position: i + 1,
            })
            .collect()
    }
}
