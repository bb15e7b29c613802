//! Structured logging with tracing
//!
//! Centralized logging setup for the scope runtime. All lifecycle
//! transitions (define, prepare, create, bootstrap, dispose, implicit
//! admission) emit structured tracing events; this module wires them to
//! a subscriber configured from [`LoggingConfig`].

use scopewire_domain::{Error, Result};
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// Re-export LoggingConfig for convenience
pub use crate::config::LoggingConfig;
use crate::constants::ENV_LOG;

/// Initialize logging with the provided configuration
///
/// The `SCOPEWIRE_LOG` environment variable overrides the configured
/// level with a full filter directive. Fails if a global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(&config.level));

    // json_format branches separately: the layer types differ
    if config.json_format {
        let stdout = fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        Registry::default()
            .with(filter)
            .with(stdout)
            .try_init()
            .map_err(|err| Error::internal(format!("failed to initialize logging: {err}")))?;
    } else {
        let stdout = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        Registry::default()
            .with(filter)
            .with(stdout)
            .try_init()
            .map_err(|err| Error::internal(format!("failed to initialize logging: {err}")))?;
    }

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::config(format!(
            "Invalid log level: {}. Use trace, debug, info, warn, or error",
            level
        ))),
    }
}

/// Log configuration loading status
pub fn log_config_loaded(config_path: &std::path::Path, success: bool) {
    if success {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        warn!("Configuration file not found: {}", config_path.display());
    }
}
