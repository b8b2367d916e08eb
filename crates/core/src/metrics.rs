//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Refresh scheduler (cycles, per-feed results, durations)
//! - Article persistence
//! - Translation resolution

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Refresh Metrics
// =============================================================================

/// Refresh cycles started, by trigger reason.
pub static REFRESH_CYCLES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gazette_refresh_cycles_total", "Total refresh cycles started"),
        &["reason"], // "manual", "scheduled", "startup", "retry"
    )
    .unwrap()
});

/// Per-feed refresh outcomes.
pub static FEEDS_REFRESHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "gazette_feeds_refreshed_total",
            "Total per-feed refresh attempts",
        ),
        &["result"], // "ok", "error"
    )
    .unwrap()
});

/// Per-feed refresh duration in seconds.
pub static FEED_REFRESH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "gazette_feed_refresh_duration_seconds",
            "Duration of a single feed refresh",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Persistence Metrics
// =============================================================================

/// New articles inserted.
pub static ARTICLES_STORED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("gazette_articles_stored_total", "Total new articles stored").unwrap()
});

// =============================================================================
// Translation Metrics
// =============================================================================

/// Translation resolutions by outcome.
pub static TRANSLATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gazette_translations_total", "Total translation resolutions"),
        &["outcome"], // "translated", "skipped", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(REFRESH_CYCLES.clone()),
        Box::new(FEEDS_REFRESHED.clone()),
        Box::new(FEED_REFRESH_DURATION.clone()),
        Box::new(ARTICLES_STORED.clone()),
        Box::new(TRANSLATIONS.clone()),
    ]
}
