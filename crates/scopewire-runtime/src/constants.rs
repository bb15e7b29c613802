//! Runtime layer constants
//!
//! Contains constants used by the registry, configuration loader, and
//! logging setup. Scope-name and priority constants live in
//! `scopewire-domain/src/constants.rs`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SCOPEWIRE";

/// Default configuration file name searched in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "scopewire.toml";

/// Environment variable holding a full log-filter directive
pub const ENV_LOG: &str = "SCOPEWIRE_LOG";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level when none is configured
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ============================================================================
// REGISTRY CONSTANTS
// ============================================================================

/// Ready-order value meaning "not yet prepared"
pub const ORDER_UNSET: u64 = 0;
