#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A journal entry as returned by the remote table, minus the embedding
/// column (which this tool only ever writes). Deserialization is the
/// validation boundary: rows that don't match this shape are rejected at
/// fetch time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub id: String,
    pub content: String,
    pub mood: String,
    #[serde(default, deserialize_with = "tags_or_empty")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// PostgREST serializes an unset array column as `null`, not `[]`.
fn tags_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = Option::<Vec<String>>::deserialize(deserializer)?;
    Ok(tags.unwrap_or_default())
}

impl JournalEntry {
    /// The text that gets embedded. Prefixing the mood gives the vector a
    /// stronger affect signal than the content alone.
    #[inline]
    pub fn embedding_text(&self) -> String {
        format!("{}: {}", self.mood, self.content)
    }

    /// Short id prefix for log lines.
    #[inline]
    pub fn short_id(&self) -> String {
        self.id.chars().take(8).collect()
    }
}
