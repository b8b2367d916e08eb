//! Mock translator for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::translation::{TranslationError, Translator};

#[derive(Default)]
struct MockTranslatorState {
    /// Fixed response; when unset the input is uppercased.
    response: Option<String>,
    /// When true, translate fails with an API error.
    fail: bool,
    /// Recorded (text, target_language) calls.
    calls: Vec<(String, String)>,
}

/// Mock implementation of the Translator trait.
///
/// Returns a scripted response (or an uppercased echo of the input), can be
/// flipped into a failing state, and records every call for assertions.
pub struct MockTranslator {
    name: String,
    is_ai: bool,
    state: Arc<RwLock<MockTranslatorState>>,
}

impl MockTranslator {
    /// Create a non-AI mock provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_ai: false,
            state: Arc::new(RwLock::new(MockTranslatorState::default())),
        }
    }

    /// Create a mock provider that counts against the AI quota.
    pub fn ai(name: impl Into<String>) -> Self {
        Self {
            is_ai: true,
            ..Self::new(name)
        }
    }

    /// Set a fixed response for subsequent calls.
    pub async fn set_response(&self, response: impl Into<String>) {
        self.state.write().await.response = Some(response.into());
    }

    /// Make subsequent calls fail (or succeed again).
    pub async fn set_fail(&self, fail: bool) {
        self.state.write().await.fail = fail;
    }

    /// Recorded (text, target_language) calls.
    pub async fn calls(&self) -> Vec<(String, String)> {
        self.state.read().await.calls.clone()
    }

    /// Number of calls made.
    pub async fn call_count(&self) -> usize {
        self.state.read().await.calls.len()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_ai(&self) -> bool {
        self.is_ai
    }

    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        let mut state = self.state.write().await;
        state
            .calls
            .push((text.to_string(), target_language.to_string()));

        if state.fail {
            return Err(TranslationError::Api {
                status: 500,
                message: "mock failure".to_string(),
            });
        }

        Ok(state
            .response
            .clone()
            .unwrap_or_else(|| text.to_uppercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_response_uppercases() {
        let translator = MockTranslator::new("mock");
        let out = translator.translate("hello", "fr").await.unwrap();
        assert_eq!(out, "HELLO");
    }

    #[tokio::test]
    async fn test_scripted_response_and_call_log() {
        let translator = MockTranslator::new("mock");
        translator.set_response("bonjour").await;

        let out = translator.translate("hello", "fr").await.unwrap();
        assert_eq!(out, "bonjour");
        assert_eq!(
            translator.calls().await,
            vec![("hello".to_string(), "fr".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failure_mode() {
        let translator = MockTranslator::new("mock");
        translator.set_fail(true).await;
        assert!(translator.translate("hello", "fr").await.is_err());

        translator.set_fail(false).await;
        assert!(translator.translate("hello", "fr").await.is_ok());
        assert_eq!(translator.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_ai_flag() {
        assert!(!MockTranslator::new("google").is_ai());
        assert!(MockTranslator::ai("ai").is_ai());
    }
}
