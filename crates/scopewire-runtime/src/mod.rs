//! # Scopewire Runtime
//!
//! The scope/injector engine: definition resolution, the process-wide
//! registry, provider stacks, and per-context injectors with their
//! resolution caches.
//!
//! ## Module Categories
//!
//! ### Scope Model
//! | Module | Description |
//! |--------|-------------|
//! | [`definition`] | Raw-config resolution into immutable scope definitions |
//! | [`registry`] | Process-wide registry: definitions, providers, instances |
//! | [`scope`] | Runtime scope instances with lazy dependency/provider caches |
//!
//! ### Resolution
//! | Module | Description |
//! |--------|-------------|
//! | [`stack`] | Priority-merged provider stacks |
//! | [`provide`] | Value, factory, and alias providers |
//! | [`injector`] | Per-context injectors and their content caches |
//! | [`context`] | Exit stacks and unit-of-work contexts |
//! | [`factory`] | Pluggable cache/context/injector construction strategies |
//!
//! ### Support
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-based configuration loading |
//! | [`logging`] | Structured logging with tracing |
//! | [`diagnostics`] | Serializable registry snapshots |
//! | [`memo`] | Guarded compute-once memoization primitives |
//! | [`locks`] | Poisoned-lock error mapping |
//! | [`constants`] | Runtime constants |

// Core runtime modules
pub mod config;
pub mod constants;
pub mod context;
pub mod definition;
pub mod diagnostics;
pub mod factory;
pub mod injector;
pub mod locks;
pub mod logging;
pub mod memo;
pub mod provide;
pub mod registry;
pub mod scope;
pub mod stack;

// Re-export commonly used types
pub use config::{ConfigLoader, LoggingConfig, RuntimeConfig, ScopeSettings};
pub use context::{ExitStack, InjectorContext};
pub use definition::{ScopeDefinition, ScopeStrategies};
pub use diagnostics::{ProviderReport, RegistryReport, ScopeReport};
pub use factory::{
    CacheFactory, ContextFactory, DefaultCacheFactory, DefaultContextFactory,
    DefaultInjectorFactory, InjectorFactory,
};
pub use injector::{ContentMap, Injector};
pub use logging::{init_logging, parse_log_level};
pub use provide::{AliasProvider, FactoryFn, FactoryProvider, ValueProvider, ValueResolver};
pub use registry::ScopeRegistry;
pub use scope::ScopeInstance;
pub use stack::ProviderStack;
