pub mod config;
pub mod fetch;
pub mod metrics;
pub mod refresh;
pub mod store;
pub mod testing;
pub mod translation;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use fetch::{FeedSource, FetchError, HttpFeedSource, HttpFeedSourceConfig};
pub use refresh::{FeedPipeline, ProgressSnapshot, RefreshError, RefreshReason, RefreshScheduler};
pub use store::{Article, ArticleStore, Feed, NewArticle, SettingsStore, SqliteStore, StoreError};
pub use translation::{
    AiTranslator, AiTranslatorConfig, AiUsageTracker, GoogleFreeTranslator, LanguageDetector,
    TranslationResolver, Translator,
};
