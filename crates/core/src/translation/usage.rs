//! AI translation quota accounting and request rate limiting.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

use crate::store::{SettingsStore, StoreError};

const USAGE_KEY: &str = "ai_usage_tokens";
const LIMIT_KEY: &str = "ai_usage_limit";

/// Default AI request rate when none is configured.
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 10;

/// Token bucket for AI request pacing.
///
/// Tokens are added at a constant rate and consumed per request; when empty,
/// the caller waits for the refill.
struct TokenBucket {
    capacity: f32,
    tokens: f32,
    refill_rate: f32,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(requests_per_minute: u32) -> Self {
        let capacity = requests_per_minute.max(1) as f32;
        Self {
            capacity,
            tokens: capacity,
            refill_rate: capacity / 60.0,
            last_refill: Instant::now(),
        }
    }

    /// `Ok(())` if a token was acquired, `Err(wait)` with the time until one
    /// becomes available.
    fn try_acquire(&mut self) -> Result<(), Duration> {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let tokens_needed = 1.0 - self.tokens;
            Err(Duration::from_secs_f32(tokens_needed / self.refill_rate))
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f32();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }
}

/// Tracks cumulative AI token usage against a configurable quota and paces
/// AI requests.
///
/// Usage is an estimate (roughly one token per four characters) persisted in
/// the settings store so it survives restarts. A limit of zero means
/// unlimited. Usage is only recorded for translations that succeed.
pub struct AiUsageTracker {
    settings: Arc<dyn SettingsStore>,
    bucket: Mutex<TokenBucket>,
}

impl AiUsageTracker {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self::with_rate(settings, DEFAULT_REQUESTS_PER_MINUTE)
    }

    pub fn with_rate(settings: Arc<dyn SettingsStore>, requests_per_minute: u32) -> Self {
        Self {
            settings,
            bucket: Mutex::new(TokenBucket::new(requests_per_minute)),
        }
    }

    /// Rough token count for a piece of text.
    pub fn estimate_tokens(text: &str) -> u64 {
        (text.chars().count() as u64) / 4 + 1
    }

    /// Cumulative tokens recorded so far. Unreadable state counts as zero.
    pub fn current_usage(&self) -> u64 {
        self.read_counter(USAGE_KEY)
    }

    /// Configured quota; zero means unlimited.
    pub fn usage_limit(&self) -> u64 {
        self.read_counter(LIMIT_KEY)
    }

    /// True when translating `text` would exceed the quota.
    pub fn is_limit_reached(&self, text: &str) -> bool {
        let limit = self.usage_limit();
        if limit == 0 {
            return false;
        }
        self.current_usage() + Self::estimate_tokens(text) > limit
    }

    /// Wait until the rate limiter grants a request slot.
    pub async fn wait_for_rate_limit(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                match bucket.try_acquire() {
                    Ok(()) => return,
                    Err(wait) => wait,
                }
            };
            debug!("AI rate limit hit, waiting {:?}", wait);
            sleep(wait).await;
        }
    }

    /// Record a successful translation against the quota.
    pub fn track_translation(&self, text: &str) -> Result<(), StoreError> {
        let updated = self.current_usage() + Self::estimate_tokens(text);
        self.settings.set_setting(USAGE_KEY, &updated.to_string())
    }

    /// Reset the usage counter to zero.
    pub fn reset_usage(&self) -> Result<(), StoreError> {
        self.settings.set_setting(USAGE_KEY, "0")
    }

    fn read_counter(&self, key: &str) -> u64 {
        self.settings
            .get_setting(key)
            .ok()
            .flatten()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0)
    }
}
