#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Placeholder endpoint used when `SUPABASE_URL` is unset. Not a real project;
/// kept so a fresh checkout fails loudly against a non-existent host instead of
/// silently doing nothing.
pub const PLACEHOLDER_SUPABASE_URL: &str = "https://your-project.supabase.co";
/// Placeholder credential used when `SUPABASE_SERVICE_ROLE_KEY` is unset.
pub const PLACEHOLDER_SERVICE_ROLE_KEY: &str = "your-service-role-key";

pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub supabase: SupabaseConfig,
    pub ollama: OllamaConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OllamaConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatchConfig {
    pub batch_size: u32,
    pub entry_pause_ms: u64,
    pub batch_pause_ms: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: PLACEHOLDER_SUPABASE_URL.to_string(),
            service_role_key: PLACEHOLDER_SERVICE_ROLE_KEY.to_string(),
            table: "journal_entries".to_string(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 11434,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            entry_pause_ms: 100,
            batch_pause_ms: 1000,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid port: {0} (must be between 1 and 65535)")]
    InvalidPort(u16),
    #[error("Invalid batch size: {0} (must be between 1 and 1000)")]
    InvalidBatchSize(u32),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid table name: {0} (cannot be empty)")]
    InvalidTable(String),
    #[error("Invalid protocol: {0} (must be 'http' or 'https')")]
    InvalidProtocol(String),
    #[error("Invalid pause: {0}ms (must be at most 60000)")]
    InvalidPause(u64),
    #[error("Invalid environment value for {0}: {1}")]
    InvalidEnvValue(&'static str, String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Config {
    /// Load configuration from the platform config directory, then apply
    /// environment variable overrides.
    #[inline]
    pub fn load() -> Result<Self> {
        let config_dir = default_config_dir();
        let mut config = Self::load_from(&config_dir)?;
        config.apply_env_overrides()?;
        config.validate().context("Configuration validation failed")?;
        Ok(config)
    }

    /// Load configuration from `config.toml` under the given directory,
    /// falling back to defaults when the file does not exist. Environment
    /// overrides are NOT applied here.
    #[inline]
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(config)
    }

    /// Apply the environment variable contract inherited from the original
    /// deployment: `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY`, `OLLAMA_HOST`,
    /// `OLLAMA_PORT`, `OLLAMA_MODEL`, `BATCH_SIZE`.
    #[inline]
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = env::var("SUPABASE_URL") {
            self.supabase.url = url;
        }
        if let Ok(key) = env::var("SUPABASE_SERVICE_ROLE_KEY") {
            self.supabase.service_role_key = key;
        }
        if let Ok(host) = env::var("OLLAMA_HOST") {
            self.ollama.host = host;
        }
        if let Ok(port) = env::var("OLLAMA_PORT") {
            self.ollama.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnvValue("OLLAMA_PORT", port))?;
        }
        if let Ok(model) = env::var("OLLAMA_MODEL") {
            self.ollama.model = model;
        }
        if let Ok(batch_size) = env::var("BATCH_SIZE") {
            self.batch.batch_size = batch_size
                .parse()
                .map_err(|_| ConfigError::InvalidEnvValue("BATCH_SIZE", batch_size))?;
        }
        Ok(())
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.supabase.validate()?;
        self.ollama.validate()?;
        self.batch.validate()?;
        Ok(())
    }
}

impl SupabaseConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.url).map_err(|_| ConfigError::InvalidUrl(self.url.clone()))?;

        if self.table.trim().is_empty() {
            return Err(ConfigError::InvalidTable(self.table.clone()));
        }

        Ok(())
    }

    #[inline]
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.url).map_err(|_| ConfigError::InvalidUrl(self.url.clone()))
    }

    /// True when the config still carries the documented placeholder values.
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.url == PLACEHOLDER_SUPABASE_URL
            || self.service_role_key == PLACEHOLDER_SERVICE_ROLE_KEY
    }
}

impl OllamaConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol != "http" && self.protocol != "https" {
            return Err(ConfigError::InvalidProtocol(self.protocol.clone()));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }

        let url_str = format!("{}://{}:{}", self.protocol, self.host, self.port);
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))?;

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        Ok(())
    }

    #[inline]
    pub fn ollama_url(&self) -> Result<Url, ConfigError> {
        let url_str = format!("{}://{}:{}", self.protocol, self.host, self.port);
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))
    }
}

impl BatchConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 || self.batch_size > 1000 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }

        if self.entry_pause_ms > 60_000 {
            return Err(ConfigError::InvalidPause(self.entry_pause_ms));
        }

        if self.batch_pause_ms > 60_000 {
            return Err(ConfigError::InvalidPause(self.batch_pause_ms));
        }

        Ok(())
    }

    #[inline]
    pub fn set_batch_size(&mut self, batch_size: u32) -> Result<(), ConfigError> {
        if batch_size == 0 || batch_size > 1000 {
            return Err(ConfigError::InvalidBatchSize(batch_size));
        }
        self.batch_size = batch_size;
        Ok(())
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("embed-backfill")
}
