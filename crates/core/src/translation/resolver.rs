//! Translation resolution: provider selection, quota, fallback.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::detector::{normalize_language_code, LanguageDetector};
use super::usage::AiUsageTracker;
use super::{TranslationError, Translator};
use crate::metrics;
use crate::store::SettingsStore;

/// Outcome of resolving one piece of text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    /// Translated text, or the original text when `skipped`.
    pub text: String,
    /// True when no translation was needed (already in the target language,
    /// or the provider returned the input unchanged).
    pub skipped: bool,
    /// True when the AI quota was exhausted and the fallback handled the
    /// request instead.
    pub limit_reached: bool,
}

impl Resolution {
    fn skipped(text: &str) -> Self {
        Self {
            text: text.to_string(),
            skipped: true,
            limit_reached: false,
        }
    }
}

/// Decides whether and how to translate a title.
///
/// Flow: skip same-language text, pick the configured provider, route AI
/// requests through the usage quota and rate limiter, and fall back to the
/// keyless provider when the AI path is unavailable or fails. Usage is
/// tracked once per AI-path request that ends in a successful translation,
/// whichever provider produced it; the quota-exhausted path is untracked.
pub struct TranslationResolver {
    settings: Arc<dyn SettingsStore>,
    detector: LanguageDetector,
    usage: Arc<AiUsageTracker>,
    providers: HashMap<String, Arc<dyn Translator>>,
    fallback: Arc<dyn Translator>,
}

impl TranslationResolver {
    /// The fallback provider is also registered under its own name.
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        usage: Arc<AiUsageTracker>,
        fallback: Arc<dyn Translator>,
    ) -> Self {
        let mut providers: HashMap<String, Arc<dyn Translator>> = HashMap::new();
        providers.insert(fallback.name().to_string(), Arc::clone(&fallback));
        Self {
            settings,
            detector: LanguageDetector::new(),
            usage,
            providers,
            fallback,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn Translator>) -> Self {
        self.providers
            .insert(provider.name().to_string(), provider);
        self
    }

    pub fn usage(&self) -> &AiUsageTracker {
        &self.usage
    }

    /// Resolve a translation for `text` into `target_language`.
    ///
    /// Errors surface only when the final provider in the chain fails; every
    /// earlier degradation (quota, AI failure) is absorbed by the fallback.
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<Resolution, TranslationError> {
        let target = normalize_language_code(target_language);

        if !self.detector.should_translate(text, &target) {
            debug!("Text already in target language {}, skipping", target);
            metrics::TRANSLATIONS.with_label_values(&["skipped"]).inc();
            return Ok(Resolution::skipped(text));
        }

        let provider = self.select_provider();
        let mut limit_reached = false;

        let translated = if provider.is_ai() {
            if self.usage.is_limit_reached(text) {
                warn!(
                    "AI usage limit reached ({}/{}), using {} fallback",
                    self.usage.current_usage(),
                    self.usage.usage_limit(),
                    self.fallback.name()
                );
                limit_reached = true;
                self.run_fallback(text, &target).await?
            } else {
                self.usage.wait_for_rate_limit().await;
                let translated = match provider.translate(text, &target).await {
                    Ok(translated) => translated,
                    Err(e) => {
                        warn!(
                            "Provider {} failed ({}), using {} fallback",
                            provider.name(),
                            e,
                            self.fallback.name()
                        );
                        self.run_fallback(text, &target).await?
                    }
                };
                // The allowance is consumed whether the AI provider or its
                // fallback produced the result.
                if let Err(e) = self.usage.track_translation(text) {
                    warn!("Failed to persist AI usage: {}", e);
                }
                translated
            }
        } else {
            provider.translate(text, &target).await.map_err(|e| {
                metrics::TRANSLATIONS.with_label_values(&["failed"]).inc();
                e
            })?
        };

        // A provider echoing the input back means there was nothing to do.
        if translated.trim() == text.trim() {
            metrics::TRANSLATIONS.with_label_values(&["skipped"]).inc();
            return Ok(Resolution {
                limit_reached,
                ..Resolution::skipped(text)
            });
        }

        metrics::TRANSLATIONS
            .with_label_values(&["translated"])
            .inc();
        Ok(Resolution {
            text: translated,
            skipped: false,
            limit_reached,
        })
    }

    fn select_provider(&self) -> Arc<dyn Translator> {
        let name = self
            .settings
            .get_setting("translation_provider")
            .ok()
            .flatten()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.fallback.name().to_string());

        match self.providers.get(&name) {
            Some(provider) => Arc::clone(provider),
            None => {
                warn!(
                    "Unknown translation provider {:?}, using {}",
                    name,
                    self.fallback.name()
                );
                Arc::clone(&self.fallback)
            }
        }
    }

    async fn run_fallback(
        &self,
        text: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        self.fallback.translate(text, target).await.map_err(|e| {
            metrics::TRANSLATIONS.with_label_values(&["failed"]).inc();
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::testing::MockTranslator;

    const FOREIGN: &str = "这是一篇关于技术的文章。";

    struct Fixture {
        store: Arc<SqliteStore>,
        ai: Arc<MockTranslator>,
        fallback: Arc<MockTranslator>,
        resolver: TranslationResolver,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let usage = Arc::new(AiUsageTracker::new(
            Arc::clone(&store) as Arc<dyn SettingsStore>
        ));
        let ai = Arc::new(MockTranslator::ai("ai"));
        let fallback = Arc::new(MockTranslator::new("google"));
        let resolver = TranslationResolver::new(
            Arc::clone(&store) as Arc<dyn SettingsStore>,
            usage,
            Arc::clone(&fallback) as Arc<dyn Translator>,
        )
        .with_provider(Arc::clone(&ai) as Arc<dyn Translator>);
        Fixture {
            store,
            ai,
            fallback,
            resolver,
        }
    }

    #[tokio::test]
    async fn test_same_language_is_skipped_without_provider_calls() {
        let f = fixture();
        let resolution = f
            .resolver
            .translate("This is an article about technology.", "en")
            .await
            .unwrap();

        assert!(resolution.skipped);
        assert_eq!(resolution.text, "This is an article about technology.");
        assert!(f.ai.calls().await.is_empty());
        assert!(f.fallback.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_default_provider_is_fallback() {
        let f = fixture();
        f.fallback.set_response("An article about technology").await;

        let resolution = f.resolver.translate(FOREIGN, "en").await.unwrap();
        assert!(!resolution.skipped);
        assert_eq!(resolution.text, "An article about technology");
        assert!(f.ai.calls().await.is_empty());
        assert_eq!(f.fallback.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_ai_provider_success_tracks_usage() {
        let f = fixture();
        f.store.set_setting("translation_provider", "ai").unwrap();
        f.ai.set_response("An article about technology").await;

        let resolution = f.resolver.translate(FOREIGN, "en").await.unwrap();
        assert_eq!(resolution.text, "An article about technology");
        assert!(!resolution.limit_reached);
        assert_eq!(f.ai.calls().await.len(), 1);
        assert!(f.fallback.calls().await.is_empty());
        assert!(f.resolver.usage().current_usage() > 0);
    }

    #[tokio::test]
    async fn test_ai_failure_falls_back_and_tracks_usage() {
        let f = fixture();
        f.store.set_setting("translation_provider", "ai").unwrap();
        f.ai.set_fail(true).await;
        f.fallback.set_response("An article about technology").await;

        let resolution = f.resolver.translate(FOREIGN, "en").await.unwrap();
        assert_eq!(resolution.text, "An article about technology");
        assert!(!resolution.limit_reached);
        assert_eq!(f.ai.calls().await.len(), 1);
        assert_eq!(f.fallback.calls().await.len(), 1);
        // The fallback stood in for the AI provider; the allowance is spent.
        assert!(f.resolver.usage().current_usage() > 0);
    }

    #[tokio::test]
    async fn test_ai_quota_exhausted_uses_fallback_directly() {
        let f = fixture();
        f.store.set_setting("translation_provider", "ai").unwrap();
        f.store.set_setting("ai_usage_limit", "10").unwrap();
        f.store.set_setting("ai_usage_tokens", "10").unwrap();
        f.fallback.set_response("An article about technology").await;

        let resolution = f.resolver.translate(FOREIGN, "en").await.unwrap();
        assert_eq!(resolution.text, "An article about technology");
        assert!(resolution.limit_reached);
        assert!(f.ai.calls().await.is_empty());
        assert_eq!(f.fallback.calls().await.len(), 1);
        // Quota untouched by the fallback path
        assert_eq!(f.resolver.usage().current_usage(), 10);
    }

    #[tokio::test]
    async fn test_echoed_input_counts_as_skipped() {
        let f = fixture();
        f.fallback.set_response(FOREIGN).await;

        let resolution = f.resolver.translate(FOREIGN, "en").await.unwrap();
        assert!(resolution.skipped);
        assert_eq!(resolution.text, FOREIGN);
    }

    #[tokio::test]
    async fn test_unknown_provider_name_uses_fallback() {
        let f = fixture();
        f.store
            .set_setting("translation_provider", "bing")
            .unwrap();
        f.fallback.set_response("An article about technology").await;

        let resolution = f.resolver.translate(FOREIGN, "en").await.unwrap();
        assert_eq!(resolution.text, "An article about technology");
        assert_eq!(f.fallback.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_failure_propagates() {
        let f = fixture();
        f.fallback.set_fail(true).await;

        let err = f.resolver.translate(FOREIGN, "en").await.unwrap_err();
        assert!(matches!(err, TranslationError::Api { .. }));
    }
}
