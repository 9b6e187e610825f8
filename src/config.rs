//! Configuration loading and management for yoyaku.
//!
//! Loads settings from `yoyaku.toml` with environment variable overrides for
//! sensitive data. Every section is optional; without a file the built-in
//! defaults apply.

use crate::style::Style;
use crate::summary::Length;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE: &str = "yoyaku.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing required API key for provider: {0}")]
    MissingApiKey(String),
}

/// Which summariser produces the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Built-in sentence selection
    #[default]
    Extractive,
    /// External LLM backend
    Generative,
}

/// Default selections for a summary request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub length: Length,
    /// Raw custom length, used when `length = "custom"`
    pub custom_length: Option<String>,
    pub style: Style,
    pub engine: EngineKind,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            length: Length::Short,
            custom_length: None,
            style: Style::Friendly,
            engine: EngineKind::Extractive,
        }
    }
}

/// Retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Relay that fetches `?url=<target>` on our behalf when direct retrieval fails
    pub proxy_endpoint: Option<String>,
    pub timeout_secs: u64,
    /// Upper bound on characters taken from a fetched page
    pub max_source_chars: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            proxy_endpoint: None,
            timeout_secs: 30,
            max_source_chars: 200_000,
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// LLM provider, currently only "gemini"
    pub provider: String,
    /// Model identifier (e.g., "gemini-2.0-flash")
    pub model: String,
    /// Extra instruction placed before the generated prompt
    pub persona: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            persona: None,
        }
    }
}

/// API keys configuration (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub gemini_key: Option<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from the default location, or defaults if there is none
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from(&path)?,
            None => Config::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Override secrets and endpoints from environment variables
    fn apply_env(&mut self) {
        if let Some(key) = non_empty_env("GEMINI_API_KEY") {
            self.api.gemini_key = Some(key);
        }
        if let Some(endpoint) = non_empty_env("YOYAKU_PROXY_ENDPOINT") {
            self.fetch.proxy_endpoint = Some(endpoint);
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        let home_config = dirs::home_dir()?
            .join(".config")
            .join("yoyaku")
            .join(CONFIG_FILE);
        home_config.exists().then_some(home_config)
    }

    /// Get the API key for the configured provider
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        match self.agent.provider.as_str() {
            "gemini" => self
                .api
                .gemini_key
                .as_deref()
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingApiKey("gemini".to_string())),
            other => Err(ConfigError::MissingApiKey(other.to_string())),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
