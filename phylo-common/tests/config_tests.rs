//! Unit tests for configuration loading and resolution priority
//!
//! Tests that manipulate PHYLO_* environment variables are marked #[serial]
//! so they never run concurrently.

use phylo_common::config::{
    ConfigSource, TomlConfig, DEFAULT_BIND, ENV_BIND, ENV_DATABASE, ENV_MATCHER_API_KEY,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
fn test_missing_file_yields_defaults() {
    let config = TomlConfig::load(Path::new("/nonexistent/phylo/config.toml"))
        .expect("missing config must not be fatal");

    assert!(config.database_path.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.resolver.fetch_chunk_size, 100);
    assert_eq!(config.resolver.stream_chunk_size, 50);
    assert_eq!(config.matcher.max_attempts, 4);
    assert_eq!(config.matcher.backoff_base_ms, 2000);
}

#[test]
fn test_partial_file_fills_defaults() {
    let file = write_config(
        r#"
        database_path = "/tmp/phylo-test.db"

        [resolver]
        call_timeout_ms = 2500
        "#,
    );

    let config = TomlConfig::load(file.path()).unwrap();
    assert_eq!(config.database_path, Some(PathBuf::from("/tmp/phylo-test.db")));
    assert_eq!(config.resolver.call_timeout_ms, 2500);
    assert_eq!(config.resolver.fetch_chunk_size, 100);
    assert!(config.matcher.api_key.is_none());
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = write_config("database_path = [unterminated");
    let result = TomlConfig::load(file.path());
    assert!(matches!(result, Err(phylo_common::Error::Config(_))));
}

#[test]
#[serial]
fn test_database_path_priority() {
    let config = TomlConfig {
        database_path: Some(PathBuf::from("/from/toml.db")),
        ..TomlConfig::default()
    };

    env::remove_var(ENV_DATABASE);
    assert_eq!(config.resolve_database_path(None), PathBuf::from("/from/toml.db"));

    env::set_var(ENV_DATABASE, "/from/env.db");
    assert_eq!(config.resolve_database_path(None), PathBuf::from("/from/env.db"));

    assert_eq!(
        config.resolve_database_path(Some(Path::new("/from/cli.db"))),
        PathBuf::from("/from/cli.db")
    );

    env::remove_var(ENV_DATABASE);
    let defaults = TomlConfig::default();
    assert!(defaults
        .resolve_database_path(None)
        .ends_with(Path::new("phylo.db")));
}

#[test]
#[serial]
fn test_bind_priority() {
    env::remove_var(ENV_BIND);
    assert_eq!(TomlConfig::default().resolve_bind(None), DEFAULT_BIND);

    let config = TomlConfig {
        bind: Some("0.0.0.0:9000".to_string()),
        ..TomlConfig::default()
    };
    assert_eq!(config.resolve_bind(None), "0.0.0.0:9000");

    env::set_var(ENV_BIND, "127.0.0.1:9100");
    assert_eq!(config.resolve_bind(None), "127.0.0.1:9100");
    assert_eq!(config.resolve_bind(Some("127.0.0.1:9200")), "127.0.0.1:9200");
    env::remove_var(ENV_BIND);
}

#[test]
#[serial]
fn test_matcher_api_key_env_overrides_toml_and_blank_is_absent() {
    let file = write_config(
        r#"
        [matcher]
        api_key = "toml-key"
        "#,
    );
    let config = TomlConfig::load(file.path()).unwrap();

    env::remove_var(ENV_MATCHER_API_KEY);
    assert_eq!(config.resolve_matcher_api_key().as_deref(), Some("toml-key"));

    env::set_var(ENV_MATCHER_API_KEY, "env-key");
    assert_eq!(config.resolve_matcher_api_key().as_deref(), Some("env-key"));

    env::set_var(ENV_MATCHER_API_KEY, "   ");
    assert_eq!(config.resolve_matcher_api_key().as_deref(), Some("toml-key"));

    env::remove_var(ENV_MATCHER_API_KEY);
    assert_eq!(TomlConfig::default().resolve_matcher_api_key(), None);
}

#[test]
fn test_config_source_reports_existing_file() {
    let file = write_config("[logging]\nlevel = \"debug\"\n");

    assert_eq!(
        ConfigSource::locate(Some(file.path())),
        ConfigSource::File(file.path().to_path_buf())
    );
}

#[test]
fn test_config_source_reports_missing_explicit_path() {
    let path = Path::new("/nonexistent/phylo/config.toml");

    assert_eq!(
        ConfigSource::locate(Some(path)),
        ConfigSource::Missing(path.to_path_buf())
    );
}
