//! Configuration Loader Tests
//!
//! Tests for the default / TOML / environment merge order and the
//! validation applied after extraction.
//!
//! # Running the Environment Tests
//!
//! Tests that mutate environment variables are `#[ignore]`d and must run
//! sequentially:
//!
//! ```bash
//! cargo test -p scopewire-runtime --test unit config -- --test-threads=1 --ignored
//! ```

use std::env;
use std::fs;

use scopewire_domain::Error;
use scopewire_runtime::config::{ConfigLoader, LoggingConfig, RuntimeConfig, ScopeSettings};
use scopewire_runtime::constants::DEFAULT_LOG_LEVEL;
use scopewire_runtime::logging::parse_log_level;
use tempfile::TempDir;
use tracing::Level;

/// Helper to set env var safely
fn set_env(key: &str, value: &str) {
    // SAFETY: Tests must run with --test-threads=1
    unsafe {
        env::set_var(key, value);
    }
}

/// Helper to remove env var safely
fn remove_env(key: &str) {
    // SAFETY: Tests must run with --test-threads=1
    unsafe {
        env::remove_var(key);
    }
}

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("scopewire.toml");
    fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, DEFAULT_LOG_LEVEL);
    assert!(!config.json_format);
}

#[test]
fn test_runtime_config_default_has_no_scopes() {
    let config = RuntimeConfig::default();

    assert!(config.scopes.is_empty());
    assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
}

#[test]
fn test_load_without_sources_yields_defaults() {
    let config = ConfigLoader::new()
        .with_config_path("/nonexistent/scopewire.toml")
        .load()
        .unwrap();

    assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
    assert!(config.scopes.is_empty());
}

// ============================================================================
// TOML Files
// ============================================================================

#[test]
fn test_toml_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
            [logging]
            level = "debug"
            json_format = true
        "#,
    );

    let loader = ConfigLoader::new().with_config_path(&path);
    let config = loader.load().unwrap();

    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json_format);
    assert_eq!(loader.config_path(), Some(path.as_path()));
}

#[test]
fn test_toml_scopes_table_parsed() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
            [scopes.worker]
            priority = 3
            depends = ["local"]

            [scopes.batch]
            base = "worker"
            embedded = true
        "#,
    );

    let config = ConfigLoader::new().with_config_path(&path).load().unwrap();

    assert_eq!(config.scopes.len(), 2);
    let worker = &config.scopes["worker"];
    assert_eq!(worker.priority, Some(3));
    assert_eq!(worker.depends.as_deref(), Some(&["local".to_string()][..]));
    let batch = &config.scopes["batch"];
    assert_eq!(batch.base.as_deref(), Some("worker"));
    assert_eq!(batch.embedded, Some(true));
}

#[test]
fn test_reload_picks_up_file_changes() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[logging]\nlevel = \"warn\"\n");
    let loader = ConfigLoader::new().with_config_path(&path);

    assert_eq!(loader.load().unwrap().logging.level, "warn");

    fs::write(&path, "[logging]\nlevel = \"error\"\n").unwrap();
    assert_eq!(loader.reload().unwrap().logging.level, "error");
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_invalid_log_level_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[logging]\nlevel = \"verbose\"\n");

    let result = ConfigLoader::new().with_config_path(&path).load();

    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn test_invalid_scope_name_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[scopes.\"bad name\"]\npriority = 1\n");

    let result = ConfigLoader::new().with_config_path(&path).load();

    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn test_invalid_depend_name_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[scopes.worker]\ndepends = [\"not a name\"]\n");

    let result = ConfigLoader::new().with_config_path(&path).load();

    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn test_unknown_scope_field_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[scopes.worker]\nbogus = 1\n");

    let result = ConfigLoader::new().with_config_path(&path).load();

    assert!(matches!(result, Err(Error::Config { .. })));
}

// ============================================================================
// Scope Settings
// ============================================================================

#[test]
fn test_scope_settings_to_raw_carries_table_key() {
    let settings = ScopeSettings {
        base: Some("service".to_string()),
        priority: Some(7),
        depends: Some(vec!["local".to_string()]),
        ..ScopeSettings::default()
    };

    let raw = settings.to_raw("worker");

    assert_eq!(raw.name.as_deref(), Some("worker"));
    assert_eq!(raw.base.as_deref(), Some("service"));
    assert_eq!(raw.priority, Some(7));
    assert_eq!(raw.depends.as_deref(), Some(&["local".to_string()][..]));
}

// ============================================================================
// Log Levels
// ============================================================================

#[test]
fn test_parse_log_level() {
    assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
    assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
    assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
    assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);
    assert_eq!(parse_log_level("INFO").unwrap(), Level::INFO);

    assert!(parse_log_level("invalid").is_err());
}

// ============================================================================
// Environment Overrides
// ============================================================================

/// Verify env vars with SCOPEWIRE_ prefix override file values
///
/// Run with: `cargo test -p scopewire-runtime --test unit config -- --test-threads=1 --ignored`
#[test]
#[ignore = "requires --test-threads=1 due to env var mutations"]
fn test_env_overrides_toml_level() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[logging]\nlevel = \"debug\"\n");
    set_env("SCOPEWIRE_LOGGING_LEVEL", "error");

    let config = ConfigLoader::new().with_config_path(&path).load().unwrap();

    assert_eq!(config.logging.level, "error");

    remove_env("SCOPEWIRE_LOGGING_LEVEL");
}

/// Verify nested scope settings can be supplied through the environment
///
/// Run with: `cargo test -p scopewire-runtime --test unit config -- --test-threads=1 --ignored`
#[test]
#[ignore = "requires --test-threads=1 due to env var mutations"]
fn test_env_provides_scope_priority() {
    set_env("SCOPEWIRE_SCOPES_WORKER_PRIORITY", "7");

    let config = ConfigLoader::new()
        .with_config_path("/nonexistent/scopewire.toml")
        .load()
        .unwrap();

    assert_eq!(config.scopes["worker"].priority, Some(7));

    remove_env("SCOPEWIRE_SCOPES_WORKER_PRIORITY");
}

/// Verify a custom prefix replaces the default one
///
/// Run with: `cargo test -p scopewire-runtime --test unit config -- --test-threads=1 --ignored`
#[test]
#[ignore = "requires --test-threads=1 due to env var mutations"]
fn test_custom_env_prefix_replaces_default() {
    set_env("SCOPEWIRE_LOGGING_LEVEL", "error");
    set_env("CUSTOM_LOGGING_LEVEL", "warn");

    let config = ConfigLoader::new()
        .with_config_path("/nonexistent/scopewire.toml")
        .with_env_prefix("CUSTOM")
        .load()
        .unwrap();

    assert_eq!(config.logging.level, "warn");

    remove_env("SCOPEWIRE_LOGGING_LEVEL");
    remove_env("CUSTOM_LOGGING_LEVEL");
}
