//! Configuration loading and resolution tests
//!
//! Tests that touch VERDICT_DATA_DIR or GEMINI_API_KEY are #[serial] so they
//! never race each other.

use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use verdict_common::config::{
    default_data_dir, is_valid_key, resolve_api_key, resolve_data_dir, StorageBackend, TomlConfig,
};
use verdict_common::scoring::Polarity;

#[test]
fn test_defaults() {
    let config = TomlConfig::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 5730);
    assert_eq!(config.storage.backend, StorageBackend::Json);
    assert_eq!(config.llm.model, "gemini-2.5-flash");
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.pdf.args, vec!["{input}", "-o", "{output}"]);
    assert_eq!(config.scoring.rules.len(), 2);
    assert!(config.random_seed.is_none());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let config = TomlConfig::parse(
        r#"
        random_seed = 42

        [server]
        port = 8080

        [storage]
        backend = "sqlite"
        "#,
    )
    .unwrap();

    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.storage.backend, StorageBackend::Sqlite);
    assert_eq!(config.random_seed, Some(42));
    assert_eq!(config.llm.timeout_secs, 60);
}

#[test]
fn test_keyword_table_override() {
    let config = TomlConfig::parse(
        r#"
        [scoring]
        unknown_marker = "n/a"

        [[scoring.rules]]
        category = "positive"
        terms = ["great"]
        weight = 20
        "#,
    )
    .unwrap();

    assert_eq!(config.scoring.unknown_marker, "n/a");
    assert_eq!(config.scoring.rules.len(), 1);
    assert_eq!(config.scoring.rules[0].category, Polarity::Positive);
    assert_eq!(config.scoring.score("great idea"), 70.0);
}

#[test]
fn test_invalid_toml_is_an_error() {
    assert!(TomlConfig::parse("[server\nport = ").is_err());
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let (config, source) = TomlConfig::load_or_default(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config.server.port, 5730);
    assert!(source.is_none());
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[llm]\nmodel = \"gemini-pro\"\n").unwrap();

    let (config, source) = TomlConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.llm.model, "gemini-pro");
    assert_eq!(source, Some(path));
}

#[test]
#[serial]
fn test_data_dir_priority() {
    env::remove_var("VERDICT_DATA_DIR");
    let mut config = TomlConfig::default();

    assert_eq!(resolve_data_dir(None, &config), default_data_dir());

    config.storage.data_dir = Some(PathBuf::from("/tmp/verdict-toml"));
    assert_eq!(resolve_data_dir(None, &config), PathBuf::from("/tmp/verdict-toml"));

    env::set_var("VERDICT_DATA_DIR", "/tmp/verdict-env");
    assert_eq!(resolve_data_dir(None, &config), PathBuf::from("/tmp/verdict-env"));

    let cli = Path::new("/tmp/verdict-cli");
    assert_eq!(resolve_data_dir(Some(cli), &config), cli.to_path_buf());

    env::remove_var("VERDICT_DATA_DIR");
}

#[test]
#[serial]
fn test_api_key_priority() {
    env::remove_var("GEMINI_API_KEY");
    let mut config = TomlConfig::default();

    assert_eq!(resolve_api_key(None, &config), None);

    config.llm.api_key = Some("toml-key".to_string());
    assert_eq!(resolve_api_key(None, &config).as_deref(), Some("toml-key"));

    env::set_var("GEMINI_API_KEY", "env-key");
    assert_eq!(resolve_api_key(None, &config).as_deref(), Some("env-key"));
    assert_eq!(resolve_api_key(Some("cli-key"), &config).as_deref(), Some("cli-key"));

    // Blank values fall through to the next source
    env::set_var("GEMINI_API_KEY", "   ");
    assert_eq!(resolve_api_key(Some(""), &config).as_deref(), Some("toml-key"));

    env::remove_var("GEMINI_API_KEY");
}

#[test]
fn test_key_validation() {
    assert!(is_valid_key("abc"));
    assert!(!is_valid_key(""));
    assert!(!is_valid_key(" \t"));
}
