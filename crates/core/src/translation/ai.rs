//! AI translation provider speaking the OpenAI-compatible chat API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{TranslationError, Translator};

const DEFAULT_API_BASE: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_PROMPT: &str = "Translate the following title into {language}. \
Reply with the translation only, no explanations or quotes.";

/// Configuration for [`AiTranslator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiTranslatorConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

/// Translates titles through an OpenAI-compatible `/v1/chat/completions`
/// endpoint. Counts against the AI usage quota.
pub struct AiTranslator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
    prompt: String,
}

impl AiTranslator {
    pub fn new(config: AiTranslatorConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key,
            model: config.model,
            api_base: config.api_base,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    pub fn with_prompt_template(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    fn system_prompt(&self, target_language: &str) -> String {
        self.prompt.replace("{language}", target_language)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    error: ChatErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ChatErrorDetail {
    message: String,
}

#[async_trait]
impl Translator for AiTranslator {
    fn name(&self) -> &str {
        "ai"
    }

    fn is_ai(&self) -> bool {
        true
    }

    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if self.api_key.is_empty() {
            return Err(TranslationError::NotConfigured("ai".to_string()));
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: self.system_prompt(target_language),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.api_base))
            .header("authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslationError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ChatError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(TranslationError::Api { status, message });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Response(e.to_string()))?;

        let translated = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();

        if translated.is_empty() {
            return Err(TranslationError::Response("empty completion".to_string()));
        }

        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AiTranslatorConfig {
        AiTranslatorConfig {
            api_key: "key".to_string(),
            model: default_model(),
            api_base: default_api_base(),
        }
    }

    #[test]
    fn test_system_prompt_substitutes_language() {
        let translator = AiTranslator::new(config());
        let prompt = translator.system_prompt("fr");
        assert!(prompt.contains("into fr"));
        assert!(!prompt.contains("{language}"));
    }

    #[test]
    fn test_custom_prompt_template() {
        let translator =
            AiTranslator::new(config()).with_prompt_template("To {language}, tersely.");
        assert_eq!(translator.system_prompt("de"), "To de, tersely.");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_not_configured() {
        let translator = AiTranslator::new(AiTranslatorConfig {
            api_key: String::new(),
            model: default_model(),
            api_base: default_api_base(),
        });
        let err = translator.translate("Hello", "fr").await.unwrap_err();
        assert!(matches!(err, TranslationError::NotConfigured(_)));
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            temperature: 0.0,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"model\":\"gpt-4o-mini\""));
        assert!(json.contains("\"role\":\"user\""));
    }
}
