use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gazette_core::translation::{
    AiTranslator, AiUsageTracker, GoogleFreeTranslator, TranslationResolver, Translator,
};
use gazette_core::{
    load_config, validate_config, ArticleStore, FeedPipeline, FeedSource, HttpFeedSource,
    RefreshError, RefreshReason, RefreshScheduler, SettingsStore, SqliteStore,
};

use gazette_server::api::create_router;
use gazette_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fallback when the `update_interval` setting is absent, in minutes.
const DEFAULT_UPDATE_INTERVAL_MINUTES: u64 = 30;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("GAZETTE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Gazette {} starting", VERSION);
    info!("Database path: {:?}", config.database.path);

    // Create the SQLite store (articles, feeds and settings)
    let store = Arc::new(
        SqliteStore::new(&config.database.path).context("Failed to create article store")?,
    );
    let articles: Arc<dyn ArticleStore> = Arc::clone(&store) as Arc<dyn ArticleStore>;
    let settings: Arc<dyn SettingsStore> = Arc::clone(&store) as Arc<dyn SettingsStore>;
    info!("Article store initialized");

    // Create the feed source
    let source: Arc<dyn FeedSource> = Arc::new(
        HttpFeedSource::new(config.fetch.clone()).context("Failed to create feed source")?,
    );

    // Translation: the free provider is always available as fallback; the
    // AI provider joins when credentials are configured.
    let fallback: Arc<dyn Translator> = Arc::new(GoogleFreeTranslator::new());
    let requests_per_minute = config
        .translation
        .as_ref()
        .map(|t| t.ai_requests_per_minute)
        .unwrap_or(10);
    let usage = Arc::new(AiUsageTracker::with_rate(
        Arc::clone(&settings),
        requests_per_minute,
    ));

    let mut resolver = TranslationResolver::new(Arc::clone(&settings), usage, fallback);
    if let Some(ai_config) = config.translation.as_ref().and_then(|t| t.ai.clone()) {
        if ai_config.api_key.is_empty() {
            warn!("AI translation configured without an api_key, provider disabled");
        } else {
            info!("AI translation provider enabled (model: {})", ai_config.model);
            resolver = resolver.with_provider(Arc::new(AiTranslator::new(ai_config)));
        }
    }
    let resolver = Arc::new(resolver);

    // Create the refresh scheduler
    let pipeline = FeedPipeline::new(source).with_resolver(Arc::clone(&resolver));
    let scheduler = Arc::new(RefreshScheduler::new(
        Arc::clone(&articles),
        Arc::clone(&settings),
        Arc::new(pipeline),
    ));
    info!("Refresh scheduler initialized");

    // Refresh all feeds once on startup
    match articles.list_feeds() {
        Ok(feeds) if !feeds.is_empty() => {
            info!("Startup refresh: {} feeds", feeds.len());
            if let Err(e) = scheduler.refresh(feeds, RefreshReason::Startup) {
                warn!("Startup refresh not started: {}", e);
            }
        }
        Ok(_) => info!("No feeds subscribed, skipping startup refresh"),
        Err(e) => warn!("Failed to list feeds for startup refresh: {}", e),
    }

    // Periodic refresh loop; the interval is re-read each tick so setting
    // changes apply without a restart.
    spawn_scheduled_refresh(Arc::clone(&articles), Arc::clone(&settings), Arc::clone(&scheduler));

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        articles,
        settings,
        scheduler,
        Some(resolver),
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    Ok(())
}

/// Spawn the periodic refresh task.
fn spawn_scheduled_refresh(
    articles: Arc<dyn ArticleStore>,
    settings: Arc<dyn SettingsStore>,
    scheduler: Arc<RefreshScheduler>,
) {
    tokio::spawn(async move {
        loop {
            let minutes = settings
                .get_setting("update_interval")
                .ok()
                .flatten()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|m| *m > 0)
                .unwrap_or(DEFAULT_UPDATE_INTERVAL_MINUTES);
            tokio::time::sleep(Duration::from_secs(minutes * 60)).await;

            let feeds = match articles.list_feeds() {
                Ok(feeds) => feeds,
                Err(e) => {
                    warn!("Scheduled refresh: failed to list feeds: {}", e);
                    continue;
                }
            };
            if feeds.is_empty() {
                continue;
            }
            match scheduler.refresh(feeds, RefreshReason::Scheduled) {
                Ok(()) => {}
                Err(RefreshError::AlreadyRunning) => {
                    debug!("Scheduled refresh skipped, a cycle is already running");
                }
                Err(e) => warn!("Scheduled refresh failed to start: {}", e),
            }
        }
    });
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
