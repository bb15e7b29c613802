//! # Scopewire
//!
//! A hierarchical scope runtime for dependency injection.
//!
//! This crate provides the main public API for Scopewire. It re-exports
//! the domain vocabulary and the runtime machinery so applications can
//! depend on a single crate.
//!
//! ## Features
//!
//! - **Named Scopes**: Units of work declared by name, with inheritance and priorities
//! - **Priority-Merged Providers**: Provider stacks merged across embedded scopes
//! - **Lazy Injector Chains**: Per-context injectors that resolve and cache on first use
//! - **Lifecycle Hooks**: Prepare/ready observers and reverse-order exit stacks
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use scopewire::{InjectKey, RawScopeConfig, ScopeRegistry, Value, ValueProvider};
//!
//! let registry = ScopeRegistry::new();
//!
//! // Declare a scope and hang a value on it
//! registry.define(RawScopeConfig::new("job"))?;
//! let greeting: Value = Arc::new("hello".to_string());
//! registry.provide(Arc::new(ValueProvider::new(
//!     InjectKey::named("greeting"),
//!     "job",
//!     greeting,
//! )))?;
//!
//! // Open a unit of work and resolve through its injector chain
//! let ctx = registry.context("job")?;
//! let value = ctx.injector().resolve(&InjectKey::named("greeting"))?;
//! ctx.close()?;
//! ```
//!
//! ## Architecture
//!
//! The workspace is split into two layers:
//!
//! - `domain` - Injection keys, provider/resolver ports, raw scope
//!   configuration, and the error taxonomy
//! - `runtime` - The scope registry, definition resolution, provider
//!   stacks, injectors, and unit-of-work contexts

/// Domain layer - injection keys, ports, and scope contracts
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use scopewire_domain::*;
}

/// Runtime layer - registry, provider stacks, and injector lifecycle
///
/// Re-exports from the runtime crate for convenience
pub mod runtime {
    pub use scopewire_runtime::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

// Re-export the main entry point at the crate root
pub use runtime::ScopeRegistry;

// Re-export resolution and provider types for convenience
pub use runtime::{
    AliasProvider, FactoryProvider, Injector, InjectorContext, ValueProvider,
};

// Re-export configuration and logging helpers
pub use runtime::{ConfigLoader, LoggingConfig, RuntimeConfig, init_logging};
