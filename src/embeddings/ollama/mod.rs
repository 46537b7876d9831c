
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::OllamaConfig;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
/// Model pulls download gigabytes; give them a much longer leash.
const PULL_TIMEOUT_SECONDS: u64 = 600;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: Url,
    model: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct PullRequest {
    name: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub size: Option<u64>,
    pub digest: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

impl OllamaClient {
    #[inline]
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let base_url = config
            .ollama_url()
            .context("Failed to generate Ollama URL from config")?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            model: config.model.clone(),
            agent,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check that the Ollama server is reachable at all.
    #[inline]
    pub fn ping(&self) -> Result<()> {
        let url = self
            .base_url
            .join("/api/tags")
            .context("Failed to build ping URL")?;

        debug!("Pinging Ollama server at {}", url);

        self.agent
            .get(url.as_str())
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .context("Failed to ping Ollama server")?;

        debug!("Server ping successful");
        Ok(())
    }

    /// List all models installed on the Ollama server.
    #[inline]
    pub fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self
            .base_url
            .join("/api/tags")
            .context("Failed to build models URL")?;

        debug!("Fetching available models from {}", url);

        let response_text = self
            .agent
            .get(url.as_str())
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .context("Failed to fetch models")?;

        let models_response: ModelsResponse =
            serde_json::from_str(&response_text).context("Failed to parse models response")?;

        debug!("Found {} models", models_response.models.len());
        Ok(models_response.models)
    }

    /// Check whether the configured model is installed. Ollama reports tags
    /// with an explicit `:latest` suffix when none was given at pull time, so
    /// an untagged configured name matches its `:latest` variant.
    #[inline]
    pub fn has_model(&self) -> Result<bool> {
        let models = self.list_models().context("Failed to list models")?;
        let latest = format!("{}:latest", self.model);

        Ok(models
            .iter()
            .any(|m| m.name == self.model || m.name == latest))
    }

    /// Pull the configured model onto the Ollama server.
    #[inline]
    pub fn pull_model(&self) -> Result<()> {
        let url = self
            .base_url
            .join("/api/pull")
            .context("Failed to build pull URL")?;

        info!("Pulling model {} from Ollama registry", self.model);

        let request = PullRequest {
            name: self.model.clone(),
            stream: false,
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to serialize pull request")?;

        // The pull agent gets its own timeout; the default would cut off any
        // real download.
        let pull_agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(PULL_TIMEOUT_SECONDS)))
            .build()
            .into();

        pull_agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .with_context(|| format!("Failed to pull model {}", self.model))?;

        info!("Model {} downloaded", self.model);
        Ok(())
    }

    /// Make sure the configured model is present, pulling it if missing.
    #[inline]
    pub fn ensure_model(&self) -> Result<()> {
        if self.has_model().context("Failed to check installed models")? {
            debug!("Model {} is available", self.model);
            return Ok(());
        }

        warn!("Model {} not found locally, pulling", self.model);
        self.pull_model()?;

        if self.has_model().context("Failed to re-check installed models")? {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "Model '{}' still missing after pull",
                self.model
            ))
        }
    }

    /// Generate an embedding vector for a single text input.
    #[inline]
    pub fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating embedding for text (length: {})", text.len());

        let request = EmbedRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let url = self
            .base_url
            .join("/api/embeddings")
            .context("Failed to build embedding URL")?;

        let request_json =
            serde_json::to_string(&request).context("Failed to serialize embedding request")?;

        let response_text = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .context("Failed to generate embedding")?;

        let embed_response: EmbedResponse =
            serde_json::from_str(&response_text).context("Failed to parse embedding response")?;

        if embed_response.embedding.is_empty() {
            return Err(anyhow::anyhow!("Ollama returned an empty embedding"));
        }

        debug!(
            "Generated embedding with {} dimensions",
            embed_response.embedding.len()
        );

        Ok(embed_response.embedding)
    }
}
