//! Configuration loading
//!
//! Handles loading runtime configuration from default values, an
//! optional TOML file, and environment variables, using Figment for
//! source merging. The `scopes` table is a passive description of scope
//! definitions; [`ScopeRegistry::apply_settings`](crate::registry::ScopeRegistry::apply_settings)
//! turns it into registered definitions.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use scopewire_domain::{Error, RawScopeConfig, Result, validate_scope_name};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CONFIG_FILE, DEFAULT_LOG_LEVEL, ENV_PREFIX};
use crate::logging::{log_config_loaded, parse_log_level};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, or error
    pub level: String,

    /// Emit JSON-formatted log lines instead of plain text
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
        }
    }
}

/// Declarative settings for one scope, keyed by name in
/// [`RuntimeConfig::scopes`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScopeSettings {
    /// Base definition unset fields inherit from
    pub base: Option<String>,

    /// Abstract definitions only serve as bases
    #[serde(rename = "abstract")]
    pub abstract_: Option<bool>,

    /// Merge priority
    pub priority: Option<i32>,

    /// Merge providers into consumers instead of owning an injector
    pub embedded: Option<bool>,

    /// Auto-admitted when referenced without definition
    pub implicit: Option<bool>,

    /// Ordered dependency scope names
    pub depends: Option<Vec<String>>,
}

impl ScopeSettings {
    /// Combine these settings with their table key into a raw scope config
    pub fn to_raw(&self, name: &str) -> RawScopeConfig {
        RawScopeConfig {
            name: Some(name.to_string()),
            base: self.base.clone(),
            abstract_: self.abstract_,
            priority: self.priority,
            embedded: self.embedded,
            implicit: self.implicit,
            depends: self.depends.clone(),
        }
    }
}

/// Top-level runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Scope definitions keyed by scope name
    pub scopes: BTreeMap<String, ScopeSettings>,
}

/// Configuration loader service
#[derive(Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    ///
    /// Configuration sources are merged in this order (later sources override earlier):
    /// 1. Default values from `RuntimeConfig::default()`
    /// 2. TOML configuration file (if exists)
    /// 3. Environment variables with prefix (e.g., `SCOPEWIRE_LOGGING_LEVEL`)
    pub fn load(&self) -> Result<RuntimeConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(RuntimeConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
                log_config_loaded(config_path, true);
            } else {
                log_config_loaded(config_path, false);
            }
        } else if let Some(default_path) = Self::find_default_config_path() {
            figment = figment.merge(Toml::file(&default_path));
            log_config_loaded(&default_path, true);
        }

        // Underscore separates nested keys (e.g. SCOPEWIRE_LOGGING_LEVEL)
        figment = figment.merge(Env::prefixed(&format!("{}_", self.env_prefix)).split("_"));

        let config: RuntimeConfig = figment
            .extract()
            .map_err(|err| Error::config_with_source("failed to extract configuration", err))?;

        validate_runtime_config(&config)?;

        Ok(config)
    }

    /// Reload configuration (useful for re-applying external changes)
    pub fn reload(&self) -> Result<RuntimeConfig> {
        self.load()
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Default configuration file in the working directory, if present
    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;
        let candidate = current_dir.join(DEFAULT_CONFIG_FILE);
        candidate.exists().then_some(candidate)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate runtime configuration
///
/// Checks the log level and every scope, base, and dependency name
/// before anything reaches the registry.
fn validate_runtime_config(config: &RuntimeConfig) -> Result<()> {
    parse_log_level(&config.logging.level)?;
    for (name, settings) in &config.scopes {
        validate_scope_name(name)?;
        if let Some(base) = &settings.base {
            validate_scope_name(base)?;
        }
        if let Some(depends) = &settings.depends {
            for dep in depends {
                validate_scope_name(dep)?;
            }
        }
    }
    Ok(())
}
