//! Concurrent feed-refresh scheduling.
//!
//! One refresh *cycle* drives a requested feed set to completion:
//! - [`RefreshProgress`] serializes cycles and tracks aggregate progress.
//! - [`TaskPool`] bounds concurrent fetches and queues the overflow FIFO.
//! - [`RefreshScheduler`] dispatches workers, promotes queued feeds and
//!   finishes the cycle when the pool drains.
//! - [`FeedPipeline`] turns one feed into articles (fetch, extract, translate).

mod pipeline;
mod pool;
mod progress;
mod scheduler;
mod types;

pub use pipeline::FeedPipeline;
pub use pool::TaskPool;
pub use progress::{RefreshProgress, POLL_INTERVAL};
pub use scheduler::RefreshScheduler;
pub use types::{
    Admission, CompletionOutcome, CycleSettings, PoolTask, ProgressSnapshot, QueuedTask,
    RefreshError, RefreshReason, TaskEntry,
};
