pub mod settings;

pub use settings::{BatchConfig, Config, ConfigError, OllamaConfig, SupabaseConfig};
