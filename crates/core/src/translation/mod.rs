//! Title translation: providers, language detection, quota and resolution.

mod ai;
mod detector;
mod google;
mod resolver;
mod usage;

pub use ai::{AiTranslator, AiTranslatorConfig};
pub use detector::LanguageDetector;
pub use google::GoogleFreeTranslator;
pub use resolver::{Resolution, TranslationResolver};
pub use usage::AiUsageTracker;

use async_trait::async_trait;

/// Error type for translation operations.
#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Response(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// A translation provider.
///
/// Implementations translate a single piece of text into the target language
/// (two-letter code). They do not decide whether translation is needed; that
/// is the resolver's job.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Provider name (e.g. "google", "ai").
    fn name(&self) -> &str;

    /// Whether this provider consumes the AI usage quota.
    fn is_ai(&self) -> bool {
        false
    }

    async fn translate(&self, text: &str, target_language: &str)
        -> Result<String, TranslationError>;
}
