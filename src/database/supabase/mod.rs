
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::SupabaseConfig;
use crate::database::models::JournalEntry;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Client for the remote journal table, speaking PostgREST.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    base_url: Url,
    service_role_key: String,
    table: String,
    agent: ureq::Agent,
}

impl SupabaseClient {
    #[inline]
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let base_url = config
            .base_url()
            .context("Failed to parse Supabase URL from config")?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            service_role_key: config.service_role_key.clone(),
            table: config.table.clone(),
            agent,
        })
    }

    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fetch up to `limit` entries whose embedding column is still null.
    /// Only the columns this tool needs are selected; the embedding column
    /// itself is never read back.
    #[inline]
    pub fn fetch_unembedded(&self, limit: u32) -> Result<Vec<JournalEntry>> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("select", "id,content,mood,tags,created_at")
            .append_pair("embedding", "is.null")
            .append_pair("limit", &limit.to_string());

        debug!("Fetching up to {} unembedded entries", limit);

        let response_text = self
            .agent
            .get(url.as_str())
            .header("apikey", &self.service_role_key)
            .header("Authorization", &format!("Bearer {}", self.service_role_key))
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .context("Failed to fetch unembedded entries")?;

        let entries: Vec<JournalEntry> = serde_json::from_str(&response_text)
            .context("Failed to parse journal entry rows")?;

        debug!("Fetched {} unembedded entries", entries.len());
        Ok(entries)
    }

    /// Write an embedding vector back to the row with the given id.
    #[inline]
    pub fn update_embedding(&self, id: &str, embedding: &[f32]) -> Result<()> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"));

        // Serialize the f32 slice directly: going through `serde_json::json!`
        // would widen each f32 to f64 and distort the written values.
        #[derive(serde::Serialize)]
        struct EmbeddingPatch<'a> {
            embedding: &'a [f32],
        }
        let body = serde_json::to_string(&EmbeddingPatch { embedding })
            .context("Failed to serialize embedding update")?;

        debug!(
            "Updating embedding for entry {} ({} dimensions)",
            id,
            embedding.len()
        );

        self.agent
            .patch(url.as_str())
            .header("apikey", &self.service_role_key)
            .header("Authorization", &format!("Bearer {}", self.service_role_key))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .send(&body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .with_context(|| format!("Failed to update embedding for entry {id}"))?;

        Ok(())
    }

    /// Count entries still waiting for an embedding, via PostgREST's exact
    /// count in the Content-Range response header.
    #[inline]
    pub fn count_unembedded(&self) -> Result<u64> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("select", "id")
            .append_pair("embedding", "is.null")
            .append_pair("limit", "1");

        let response = self
            .agent
            .get(url.as_str())
            .header("apikey", &self.service_role_key)
            .header("Authorization", &format!("Bearer {}", self.service_role_key))
            .header("Prefer", "count=exact")
            .call()
            .context("Failed to count unembedded entries")?;

        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .context("Count response missing Content-Range header")?;

        parse_content_range_total(content_range)
            .with_context(|| format!("Unparseable Content-Range header: {content_range}"))
    }

    fn table_url(&self) -> Result<Url> {
        self.base_url
            .join(&format!("/rest/v1/{}", self.table))
            .context("Failed to build table URL")
    }
}

/// Extract the total from a Content-Range value like `0-0/42` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.parse().ok()
}
