use clap::{Parser, Subcommand};
use embed_backfill::Result;
use embed_backfill::commands::{run_backfill, show_config, show_status};
use embed_backfill::config::Config;

#[derive(Parser)]
#[command(name = "embed-backfill")]
#[command(about = "Generates vector embeddings for journal entries via a local Ollama instance")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the backfill: embed every entry missing a vector
    Run {
        /// Override the number of entries fetched per batch
        #[arg(long)]
        batch_size: Option<u32>,
    },
    /// Show how many entries are still waiting for embeddings
    Status,
    /// Show the resolved configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { batch_size } => {
            let mut config = Config::load()?;
            if let Some(batch_size) = batch_size {
                config.batch.set_batch_size(batch_size)?;
            }
            run_backfill(&config)?;
        }
        Commands::Status => {
            show_status(&Config::load()?)?;
        }
        Commands::Config => {
            show_config(&Config::load()?);
        }
    }

    Ok(())
}
