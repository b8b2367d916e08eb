use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::fetch::HttpFeedSourceConfig;
use crate::translation::AiTranslatorConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub fetch: HttpFeedSourceConfig,
    #[serde(default)]
    pub translation: Option<TranslationConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            fetch: HttpFeedSourceConfig::default(),
            translation: None,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("gazette.db")
}

/// Translation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    /// AI provider credentials (required to enable the "ai" provider)
    #[serde(default)]
    pub ai: Option<AiTranslatorConfig>,
    /// AI requests per minute (default: 10)
    #[serde(default = "default_ai_rpm")]
    pub ai_requests_per_minute: u32,
}

fn default_ai_rpm() -> u32 {
    10
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub fetch: HttpFeedSourceConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<SanitizedTranslationConfig>,
}

/// Sanitized translation config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTranslationConfig {
    pub ai_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
    pub ai_requests_per_minute: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            fetch: config.fetch.clone(),
            translation: config
                .translation
                .as_ref()
                .map(|t| SanitizedTranslationConfig {
                    ai_configured: t.ai.as_ref().is_some_and(|ai| !ai.api_key.is_empty()),
                    ai_model: t.ai.as_ref().map(|ai| ai.model.clone()),
                    ai_requests_per_minute: t.ai_requests_per_minute,
                }),
        }
    }
}
