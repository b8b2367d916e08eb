//! Cycle progress coordination.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use super::types::ProgressSnapshot;

/// Interval at which [`RefreshProgress::wait_until_idle`] re-reads the state.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Tracks one refresh cycle's aggregate state and enforces one cycle at a
/// time. All three fields are guarded by a single lock so snapshots are
/// always consistent.
#[derive(Debug, Default)]
pub struct RefreshProgress {
    state: Mutex<ProgressSnapshot>,
}

impl RefreshProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a cycle of `total` feeds. Returns false without touching the
    /// state if a cycle is already running.
    pub fn try_start(&self, total: usize) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.is_running {
            return false;
        }
        *state = ProgressSnapshot {
            total,
            current: 0,
            is_running: true,
        };
        true
    }

    /// Record one completed feed.
    pub fn increment(&self) {
        let mut state = self.state.lock().unwrap();
        state.current += 1;
    }

    /// Mark the cycle finished. Idempotent.
    pub fn finish(&self) {
        let mut state = self.state.lock().unwrap();
        state.is_running = false;
    }

    /// Consistent read of the full progress state.
    pub fn snapshot(&self) -> ProgressSnapshot {
        *self.state.lock().unwrap()
    }

    /// Poll until the running cycle (if any) finishes. Returns false if the
    /// timeout elapsed first.
    pub async fn wait_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.snapshot().is_running {
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        true
    }
}
