//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scope runtime
#[derive(Error, Debug)]
pub enum Error {
    /// Scope configuration error (invalid name, bad raw values, duplicate
    /// definition)
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced scope definition does not exist
    #[error("Unknown scope: '{name}'")]
    UnknownScope {
        /// The scope name that failed to resolve
        name: String,
    },

    /// Strict preparation of a scope that is already ready
    #[error("Scope '{scope}' is already prepared")]
    AlreadyPrepared {
        /// Name of the scope
        scope: String,
    },

    /// Resolution against an injector with no active content cache
    #[error("Injector for scope '{scope}' is inactive (not bootstrapped or already disposed)")]
    InjectorInactive {
        /// Scope name of the injector
        scope: String,
    },

    /// One or more exit-stack callbacks failed during disposal
    #[error("Cleanup error: {message}: [{}]", failures.join("; "))]
    Cleanup {
        /// Description of the disposal that failed
        message: String,
        /// Individual release failures, in release order
        failures: Vec<String>,
    },

    /// Generic string-based error
    #[error("String error: {0}")]
    String(String),

    /// Internal system error (poisoned lock, dropped registry handle)
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an unknown-scope error
    pub fn unknown_scope<S: Into<String>>(name: S) -> Self {
        Self::UnknownScope { name: name.into() }
    }
}

// Lifecycle error creation methods
impl Error {
    /// Create an already-prepared error
    pub fn already_prepared<S: Into<String>>(scope: S) -> Self {
        Self::AlreadyPrepared {
            scope: scope.into(),
        }
    }

    /// Create an inactive-injector error
    pub fn injector_inactive<S: Into<String>>(scope: S) -> Self {
        Self::InjectorInactive {
            scope: scope.into(),
        }
    }

    /// Create a cleanup error aggregating release failures
    pub fn cleanup<S: Into<String>>(message: S, failures: Vec<String>) -> Self {
        Self::Cleanup {
            message: message.into(),
            failures,
        }
    }
}

// Internal error creation methods
impl Error {
    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}
