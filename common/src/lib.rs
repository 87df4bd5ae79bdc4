/*!
common/src/lib.rs

Shared configuration types and credential helpers for newspost.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader that merges a default file with an optional override file
- Credential resolution from the process environment
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "config.default.toml";
pub const LOCAL_CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

pub const DEFAULT_NEWS_API_URL: &str = "https://api.currentsapi.services/v1/latest-news";
pub const DEFAULT_NEWS_API_KEY_ENV: &str = "CURRENTSAPI_KEY";
pub const DEFAULT_NEWS_LANGUAGE: &str = "en";
pub const DEFAULT_NEWS_TIMEOUT_SECONDS: u64 = 10;

pub const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_LLM_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_TIMEOUT_SECONDS: u64 = 60;

/// HTTP server section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind (e.g. "0.0.0.0")
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// News provider section (CurrentsAPI compatible)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsConfig {
    pub api_url: Option<String>,
    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,
    pub language: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Remote LLM section (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Per-stage generation parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub title_max_tokens: Option<usize>,
    pub meta_max_tokens: Option<usize>,
    pub body_max_tokens: Option<usize>,
    pub temperature: Option<f32>,
    /// Number of completions requested per call
    pub samples: Option<usize>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// API keys read from the environment once at startup.
#[derive(Clone)]
pub struct Credentials {
    pub news_api_key: String,
    pub llm_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("news_api_key", &"<redacted>")
            .field("llm_api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CredentialError {
    #[error("environment variable {0} is not set")]
    Missing(String),
}

impl Config {
    /// Resolve configuration the way the binaries do: `<dir>/config.default.toml`
    /// as the base, overridden by `explicit` (which must exist) or by
    /// `<dir>/config.toml` when present.
    pub async fn discover(dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let default_path = dir.join(DEFAULT_CONFIG_FILE);

        let override_path = match explicit {
            Some(p) => {
                if !p.exists() {
                    anyhow::bail!("Config file not found: {}", p.display());
                }
                Some(p.to_path_buf())
            }
            None => {
                let p = dir.join(LOCAL_CONFIG_FILE);
                if p.exists() { Some(p) } else { None }
            }
        };

        Self::load_with_defaults(
            if default_path.exists() { Some(default_path.as_path()) } else { None },
            override_path.as_deref(),
        )
        .await
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    /// With neither present, built-in defaults apply.
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject provider URLs that cannot be parsed, so a typo fails at startup
    /// rather than on the first request.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.news_api_url())
            .with_context(|| format!("Invalid news.api_url: {}", self.news_api_url()))?;
        url::Url::parse(&self.llm_api_url())
            .with_context(|| format!("Invalid llm.api_url: {}", self.llm_api_url()))?;
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        self.server.bind.clone().unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    pub fn port(&self) -> u16 {
        self.server.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn news_api_url(&self) -> String {
        self.news.api_url.clone().unwrap_or_else(|| DEFAULT_NEWS_API_URL.to_string())
    }

    pub fn news_language(&self) -> String {
        self.news.language.clone().unwrap_or_else(|| DEFAULT_NEWS_LANGUAGE.to_string())
    }

    pub fn news_timeout_seconds(&self) -> u64 {
        self.news.timeout_seconds.unwrap_or(DEFAULT_NEWS_TIMEOUT_SECONDS)
    }

    pub fn llm_api_url(&self) -> String {
        self.llm.api_url.clone().unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string())
    }

    pub fn llm_model(&self) -> String {
        self.llm.model.clone().unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string())
    }

    pub fn llm_timeout_seconds(&self) -> u64 {
        self.llm.timeout_seconds.unwrap_or(DEFAULT_LLM_TIMEOUT_SECONDS)
    }

    /// Read both API keys from the process environment.
    pub fn resolve_credentials(&self) -> Result<Credentials, CredentialError> {
        self.resolve_credentials_with(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::resolve_credentials`] with an injectable lookup.
    /// Empty values count as missing.
    pub fn resolve_credentials_with<F>(&self, lookup: F) -> Result<Credentials, CredentialError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let news_env = self.news.api_key_env.as_deref().unwrap_or(DEFAULT_NEWS_API_KEY_ENV);
        let llm_env = self.llm.api_key_env.as_deref().unwrap_or(DEFAULT_LLM_API_KEY_ENV);

        let read = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| CredentialError::Missing(name.to_string()))
        };

        Ok(Credentials {
            llm_api_key: read(llm_env)?,
            news_api_key: read(news_env)?,
        })
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}
