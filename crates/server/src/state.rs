//! Shared application state for API handlers.

use std::sync::Arc;

use gazette_core::translation::TranslationResolver;
use gazette_core::{ArticleStore, Config, RefreshScheduler, SanitizedConfig, SettingsStore};

/// Application state shared across all API handlers.
pub struct AppState {
    config: Config,
    articles: Arc<dyn ArticleStore>,
    settings: Arc<dyn SettingsStore>,
    scheduler: Arc<RefreshScheduler>,
    resolver: Option<Arc<TranslationResolver>>,
}

impl AppState {
    pub fn new(
        config: Config,
        articles: Arc<dyn ArticleStore>,
        settings: Arc<dyn SettingsStore>,
        scheduler: Arc<RefreshScheduler>,
        resolver: Option<Arc<TranslationResolver>>,
    ) -> Self {
        Self {
            config,
            articles,
            settings,
            scheduler,
            resolver,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Config with secrets redacted, for the config endpoint.
    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn articles(&self) -> &Arc<dyn ArticleStore> {
        &self.articles
    }

    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.settings
    }

    pub fn scheduler(&self) -> &Arc<RefreshScheduler> {
        &self.scheduler
    }

    pub fn resolver(&self) -> Option<&Arc<TranslationResolver>> {
        self.resolver.as_ref()
    }
}
