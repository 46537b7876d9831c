use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::backfill::BackfillRunner;
use crate::config::Config;
use crate::database::SupabaseClient;
use crate::embeddings::ollama::OllamaClient;

/// Run the full backfill: environment check, then batches until exhausted.
///
/// A failed environment check prints the problem and returns `Ok` so the
/// process still exits normally; there is nothing useful to do with a
/// distinct exit code here and the original deployment never had one.
#[inline]
pub fn run_backfill(config: &Config) -> Result<()> {
    println!("Journal embedding backfill");
    println!("==========================");

    if config.supabase.is_placeholder() {
        warn!("SUPABASE_URL or SUPABASE_SERVICE_ROLE_KEY is still a placeholder value");
    }

    let ollama = OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?;
    let store = SupabaseClient::new(&config.supabase)
        .context("Failed to create Supabase client")?;

    if let Err(e) = ollama.ping() {
        error!("Ollama is not reachable: {:#}", e);
        println!("Ollama is not running. Start it with: ollama serve");
        return Ok(());
    }
    println!("Ollama is running");

    if let Err(e) = ollama.ensure_model() {
        error!("Embedding model unavailable: {:#}", e);
        println!("Could not make model {} available: {e:#}", ollama.model());
        return Ok(());
    }
    println!("Model {} is available", ollama.model());

    info!(
        "Starting backfill against table {} with batch size {}",
        store.table(),
        config.batch.batch_size
    );

    let runner = BackfillRunner::new(store, ollama, config.batch.clone());
    let stats = runner.run();

    println!();
    println!("==========================");
    if stats.completed() {
        println!(
            "Complete! {} entries embedded across {} batches",
            stats.succeeded, stats.batches
        );
    } else {
        println!(
            "Stopped early after a fetch error; {} entries embedded across {} batches. Rerun to continue.",
            stats.succeeded, stats.batches
        );
    }
    if stats.embed_failures > 0 || stats.update_failures > 0 {
        println!(
            "Skipped {} entries ({} embedding failures, {} update failures); rerun to retry them",
            stats.embed_failures + stats.update_failures,
            stats.embed_failures,
            stats.update_failures
        );
    }

    Ok(())
}

/// Print how much work is left, without touching Ollama.
#[inline]
pub fn show_status(config: &Config) -> Result<()> {
    let store = SupabaseClient::new(&config.supabase)
        .context("Failed to create Supabase client")?;

    let remaining = store
        .count_unembedded()
        .context("Failed to count unembedded entries")?;

    println!("Table:     {}", store.table());
    println!("Endpoint:  {}", config.supabase.url);
    println!("Model:     {}", config.ollama.model);
    if remaining == 0 {
        println!("All entries have embeddings.");
    } else {
        println!("Entries waiting for embeddings: {remaining}");
    }

    Ok(())
}

/// Print the resolved configuration with the credential redacted.
#[inline]
pub fn show_config(config: &Config) {
    println!("Supabase URL:      {}", config.supabase.url);
    println!("Service role key:  {}", redact(&config.supabase.service_role_key));
    println!("Table:             {}", config.supabase.table);
    println!(
        "Ollama:            {}://{}:{}",
        config.ollama.protocol, config.ollama.host, config.ollama.port
    );
    println!("Model:             {}", config.ollama.model);
    println!("Batch size:        {}", config.batch.batch_size);
    println!("Entry pause:       {}ms", config.batch.entry_pause_ms);
    println!("Batch pause:       {}ms", config.batch.batch_pause_ms);
}

fn redact(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    format!("{prefix}...")
}
