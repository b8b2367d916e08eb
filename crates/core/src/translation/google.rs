//! Keyless Google translation provider.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{TranslationError, Translator};

const API_BASE: &str = "https://translate.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Translator backed by the free `translate_a/single` endpoint. No API key,
/// no quota accounting; used as the default provider and as the fallback when
/// the AI provider fails or runs out of quota.
pub struct GoogleFreeTranslator {
    client: reqwest::Client,
    api_base: String,
}

impl Default for GoogleFreeTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleFreeTranslator {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_base: API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// The endpoint answers with nested arrays; the translated text is split into
/// segments at `[0][i][0]`.
fn parse_response(body: &str) -> Result<String, TranslationError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| TranslationError::Response(e.to_string()))?;

    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::Response("missing segment array".to_string()))?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(text) = segment.get(0).and_then(Value::as_str) {
            translated.push_str(text);
        }
    }

    if translated.is_empty() {
        return Err(TranslationError::Response("empty translation".to_string()));
    }
    Ok(translated)
}

#[async_trait]
impl Translator for GoogleFreeTranslator {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        let url = format!(
            "{}/translate_a/single?client=gtx&sl=auto&tl={}&dt=t&q={}",
            self.api_base,
            target_language,
            urlencoding::encode(text)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TranslationError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            return Err(TranslationError::Api { status, message });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranslationError::Http(e.to_string()))?;

        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_segment() {
        let body = r#"[[["Bonjour le monde","Hello world",null,null,10]],null,"en"]"#;
        assert_eq!(parse_response(body).unwrap(), "Bonjour le monde");
    }

    #[test]
    fn test_parse_concatenates_segments() {
        let body = r#"[[["Première phrase. ","First sentence. "],["Deuxième.","Second."]],null,"en"]"#;
        assert_eq!(parse_response(body).unwrap(), "Première phrase. Deuxième.");
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        assert!(parse_response("not json").is_err());
        assert!(parse_response("{}").is_err());
        assert!(parse_response("[[]]").is_err());
    }

    #[test]
    fn test_provider_identity() {
        let translator = GoogleFreeTranslator::new();
        assert_eq!(translator.name(), "google");
        assert!(!translator.is_ai());
    }
}
