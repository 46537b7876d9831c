use super::*;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

#[test]
fn defaults_carry_placeholder_credentials() {
    let config = Config::default();

    assert_eq!(config.supabase.url, PLACEHOLDER_SUPABASE_URL);
    assert_eq!(config.supabase.service_role_key, PLACEHOLDER_SERVICE_ROLE_KEY);
    assert_eq!(config.supabase.table, "journal_entries");
    assert!(config.supabase.is_placeholder());
    assert_eq!(config.ollama.model, DEFAULT_EMBEDDING_MODEL);
    assert_eq!(config.batch.batch_size, 10);
    assert!(config.validate().is_ok());
}

#[test]
fn load_from_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("can create temp dir");

    let config = Config::load_from(temp_dir.path()).expect("load should succeed");

    assert_eq!(config, Config::default());
}

#[test]
fn load_from_toml_file() {
    let temp_dir = TempDir::new().expect("can create temp dir");
    let content = r#"
[supabase]
url = "https://project.supabase.co"
service_role_key = "secret"

[ollama]
host = "ollama.internal"
port = 11435

[batch]
batch_size = 50
"#;
    fs::write(temp_dir.path().join("config.toml"), content).expect("can write config");

    let config = Config::load_from(temp_dir.path()).expect("load should succeed");

    assert_eq!(config.supabase.url, "https://project.supabase.co");
    assert_eq!(config.supabase.service_role_key, "secret");
    // Unset sections and fields keep their defaults
    assert_eq!(config.supabase.table, "journal_entries");
    assert_eq!(config.ollama.host, "ollama.internal");
    assert_eq!(config.ollama.port, 11435);
    assert_eq!(config.ollama.model, DEFAULT_EMBEDDING_MODEL);
    assert_eq!(config.batch.batch_size, 50);
    assert_eq!(config.batch.entry_pause_ms, 100);
}

#[test]
fn load_from_invalid_toml_fails() {
    let temp_dir = TempDir::new().expect("can create temp dir");
    fs::write(temp_dir.path().join("config.toml"), "not valid toml [[[")
        .expect("can write config");

    assert!(Config::load_from(temp_dir.path()).is_err());
}

#[test]
#[serial]
fn env_overrides_take_precedence() {
    // SAFETY: test is serialized; no other thread reads these variables.
    unsafe {
        std::env::set_var("SUPABASE_URL", "https://override.supabase.co");
        std::env::set_var("SUPABASE_SERVICE_ROLE_KEY", "override-key");
        std::env::set_var("OLLAMA_MODEL", "mxbai-embed-large");
        std::env::set_var("BATCH_SIZE", "25");
    }

    let mut config = Config::default();
    config
        .apply_env_overrides()
        .expect("overrides should apply");

    // SAFETY: same as above.
    unsafe {
        std::env::remove_var("SUPABASE_URL");
        std::env::remove_var("SUPABASE_SERVICE_ROLE_KEY");
        std::env::remove_var("OLLAMA_MODEL");
        std::env::remove_var("BATCH_SIZE");
    }

    assert_eq!(config.supabase.url, "https://override.supabase.co");
    assert_eq!(config.supabase.service_role_key, "override-key");
    assert!(!config.supabase.is_placeholder());
    assert_eq!(config.ollama.model, "mxbai-embed-large");
    assert_eq!(config.batch.batch_size, 25);
}

#[test]
#[serial]
fn non_numeric_batch_size_env_is_rejected() {
    // SAFETY: test is serialized; no other thread reads this variable.
    unsafe {
        std::env::set_var("BATCH_SIZE", "lots");
    }

    let mut config = Config::default();
    let result = config.apply_env_overrides();

    // SAFETY: same as above.
    unsafe {
        std::env::remove_var("BATCH_SIZE");
    }

    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvValue("BATCH_SIZE", _))
    ));
}

#[test]
fn supabase_url_must_parse() {
    let config = SupabaseConfig {
        url: "not a url".to_string(),
        ..Default::default()
    };

    assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
}

#[test]
fn table_cannot_be_empty() {
    let config = SupabaseConfig {
        table: "  ".to_string(),
        ..Default::default()
    };

    assert!(matches!(config.validate(), Err(ConfigError::InvalidTable(_))));
}

#[test]
fn ollama_protocol_is_restricted() {
    let config = OllamaConfig {
        protocol: "ftp".to_string(),
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));
}

#[test]
fn ollama_port_zero_is_rejected() {
    let config = OllamaConfig {
        port: 0,
        ..Default::default()
    };

    assert!(matches!(config.validate(), Err(ConfigError::InvalidPort(0))));
}

#[test]
fn ollama_model_cannot_be_empty() {
    let config = OllamaConfig {
        model: String::new(),
        ..Default::default()
    };

    assert!(matches!(config.validate(), Err(ConfigError::InvalidModel(_))));
}

#[test]
fn ollama_url_builds_from_parts() {
    let config = OllamaConfig {
        host: "embedder".to_string(),
        port: 9999,
        ..Default::default()
    };

    let url = config.ollama_url().expect("url should build");
    assert_eq!(url.as_str(), "http://embedder:9999/");
}

#[test]
fn batch_size_bounds() {
    let mut config = BatchConfig::default();

    assert!(config.set_batch_size(0).is_err());
    assert!(config.set_batch_size(1001).is_err());
    assert!(config.set_batch_size(1000).is_ok());
    assert_eq!(config.batch_size, 1000);
}

#[test]
fn pause_upper_bound() {
    let config = BatchConfig {
        entry_pause_ms: 60_001,
        ..Default::default()
    };

    assert!(matches!(config.validate(), Err(ConfigError::InvalidPause(_))));
}
