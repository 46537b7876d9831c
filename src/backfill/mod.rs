
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::BatchConfig;
use crate::database::{JournalEntry, SupabaseClient};
use crate::embeddings::ollama::OllamaClient;

/// Totals accumulated over one backfill run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackfillStats {
    pub batches: usize,
    pub entries_seen: usize,
    pub succeeded: usize,
    pub embed_failures: usize,
    pub update_failures: usize,
    /// Set when a fetch failed and ended the run before the table was known
    /// to be exhausted.
    pub fetch_failed: bool,
}

impl BackfillStats {
    /// True when the run saw the table through to an empty fetch.
    #[inline]
    pub fn completed(&self) -> bool {
        !self.fetch_failed
    }
}

/// Drives the fetch -> embed -> persist loop against the two services.
pub struct BackfillRunner {
    store: SupabaseClient,
    ollama: OllamaClient,
    batch: BatchConfig,
}

impl BackfillRunner {
    #[inline]
    pub fn new(store: SupabaseClient, ollama: OllamaClient, batch: BatchConfig) -> Self {
        Self {
            store,
            ollama,
            batch,
        }
    }

    /// Run batches until a fetch comes back empty. Every entry that gets an
    /// embedding persisted stays out of the next fetch, so a rerun after an
    /// interruption picks up exactly the remaining work.
    ///
    /// A fetch error is logged and ends the loop; it never propagates. The
    /// returned stats carry `fetch_failed` so the caller can tell an errored
    /// stop from an exhausted table.
    #[inline]
    pub fn run(&self) -> BackfillStats {
        let mut stats = BackfillStats::default();
        let mut batch_num = 1;

        loop {
            debug!("Fetching batch {}", batch_num);

            let entries = match self.store.fetch_unembedded(self.batch.batch_size) {
                Ok(entries) => entries,
                Err(e) => {
                    error!("Failed to fetch batch {}: {:#}", batch_num, e);
                    stats.fetch_failed = true;
                    break;
                }
            };

            if entries.is_empty() {
                info!("No unembedded entries remain");
                break;
            }

            println!(
                "Batch {}: found {} entries without embeddings",
                batch_num,
                entries.len()
            );

            let batch_succeeded = self.process_batch(&entries, &mut stats);
            stats.batches += 1;

            println!(
                "Batch {}: {}/{} successful",
                batch_num,
                batch_succeeded,
                entries.len()
            );

            batch_num += 1;
            std::thread::sleep(Duration::from_millis(self.batch.batch_pause_ms));
        }

        stats
    }

    /// Embed and persist one batch, entry by entry. Failures are logged and
    /// skipped; the entry stays unembedded and a later run retries it.
    /// Returns the number of entries that both embedded and persisted.
    #[inline]
    pub fn process_batch(&self, entries: &[JournalEntry], stats: &mut BackfillStats) -> usize {
        let mut succeeded = 0;
        let bar = progress_bar(entries.len() as u64);

        for entry in entries {
            bar.set_message(entry.short_id());

            match self.ollama.generate_embedding(&entry.embedding_text()) {
                Ok(embedding) => match self.store.update_embedding(&entry.id, &embedding) {
                    Ok(()) => {
                        succeeded += 1;
                        stats.succeeded += 1;
                        debug!("Processed entry {} ({})", entry.short_id(), entry.mood);
                    }
                    Err(e) => {
                        stats.update_failures += 1;
                        error!("Failed to update entry {}: {:#}", entry.short_id(), e);
                    }
                },
                Err(e) => {
                    stats.embed_failures += 1;
                    error!(
                        "Failed to generate embedding for {}: {:#}",
                        entry.short_id(),
                        e
                    );
                }
            }

            stats.entries_seen += 1;
            bar.inc(1);

            // Courtesy pause so a fast table doesn't hammer Ollama.
            std::thread::sleep(Duration::from_millis(self.batch.entry_pause_ms));
        }

        bar.finish_and_clear();
        succeeded
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    if std::io::stdout().is_terminal() {
        ProgressBar::new(len).with_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] Embedding {msg}")
                .expect("style template is valid"),
        )
    } else {
        ProgressBar::hidden()
    }
}
