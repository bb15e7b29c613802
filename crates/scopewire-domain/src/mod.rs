//! # Scopewire Domain
//!
//! Contracts and value objects for the scope runtime.
//!
//! This crate carries no machinery: it defines the vocabulary the runtime
//! crate implements. Scopes are named units of provider composition; the
//! types here describe how they are declared and which interfaces the
//! runtime exposes at its seams.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`constants`] | Reserved scope names and priority constants |
//! | [`error`] | Workspace-wide error taxonomy and `Result` alias |
//! | [`key`] | Injection keys and the resolved-value type |
//! | [`ports`] | Provider, resolver, injector-view and observer traits |
//! | [`value_objects`] | Raw scope configuration and name validation |

pub mod constants;
pub mod error;
pub mod key;
pub mod ports;
pub mod value_objects;

// Re-export commonly used types
pub use error::{Error, Result};
pub use key::{InjectKey, Value};
pub use ports::{InjectorPort, Provider, Resolver, ScopeObserver};
pub use value_objects::{RawScopeConfig, validate_scope_name};
