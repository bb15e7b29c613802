//! Pluggable construction strategies
//!
//! Scope definitions carry three factory strategies, one per artifact
//! the runtime builds on behalf of a scope: the per-injector content
//! cache, unit-of-work contexts with their exit stacks, and injector
//! nodes themselves. The default implementations cover normal use;
//! overrides slot in through
//! [`ScopeStrategies`](crate::definition::ScopeStrategies).

use std::sync::Arc;

use scopewire_domain::Result;

use crate::context::{ExitStack, InjectorContext};
use crate::injector::{ContentMap, Injector};
use crate::scope::ScopeInstance;

/// Builds the per-injector content cache installed at bootstrap
pub trait CacheFactory: Send + Sync {
    /// Create an empty content cache
    fn create_cache(&self) -> ContentMap;
}

/// Builds unit-of-work contexts and standalone exit stacks
pub trait ContextFactory: Send + Sync {
    /// Wrap `injector` in a context guard, bootstrapping it
    fn create_context(&self, injector: &Injector) -> Result<InjectorContext>;

    /// Create a fresh exit stack for resources tied to `injector`'s unit of work
    fn create_exit_stack(&self, injector: &Injector) -> ExitStack;
}

/// Builds injector nodes
pub trait InjectorFactory: Send + Sync {
    /// Create an inactive injector for `scope`, parented to `parent`
    fn create_injector(
        &self,
        scope: Arc<ScopeInstance>,
        parent: Option<Injector>,
        id: u64,
    ) -> Injector;
}

/// Default cache factory: a plain map
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCacheFactory;

impl CacheFactory for DefaultCacheFactory {
    fn create_cache(&self) -> ContentMap {
        ContentMap::new()
    }
}

/// Default context factory: owning [`InjectorContext`] guards
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultContextFactory;

impl ContextFactory for DefaultContextFactory {
    fn create_context(&self, injector: &Injector) -> Result<InjectorContext> {
        InjectorContext::new(injector.clone())
    }

    fn create_exit_stack(&self, _injector: &Injector) -> ExitStack {
        ExitStack::new()
    }
}

/// Default injector factory: plain [`Injector`] nodes
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultInjectorFactory;

impl InjectorFactory for DefaultInjectorFactory {
    fn create_injector(
        &self,
        scope: Arc<ScopeInstance>,
        parent: Option<Injector>,
        id: u64,
    ) -> Injector {
        Injector::new(scope, parent, id)
    }
}
