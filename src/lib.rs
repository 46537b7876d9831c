use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackfillError>;

#[derive(Error, Debug)]
pub enum BackfillError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod backfill;
pub mod commands;
pub mod config;
pub mod database;
pub mod embeddings;
