//! Ports at the seams of the scope runtime
//!
//! Object-safe traits implemented on one side of the boundary and consumed
//! on the other: providers declare how a capability is produced, resolvers
//! produce values once attached to an injector, `InjectorPort` is the view
//! of an injector handed to resolvers and factories, and observers receive
//! lifecycle notifications.

use std::sync::Arc;

use crate::error::Result;
use crate::key::{InjectKey, Value};

/// Read-only view of an injector, given to resolvers and factory closures
pub trait InjectorPort: Send + Sync {
    /// Resolve a key through this injector's chain
    ///
    /// Unknown keys are a soft miss (`Ok(None)`), never an error.
    fn resolve(&self, key: &InjectKey) -> Result<Option<Value>>;

    /// Name of the scope owning this injector
    fn scope_name(&self) -> &str;

    /// Numeric id of this injector, for log correlation
    fn context_id(&self) -> u64;
}

/// Declares how one abstract capability is produced
pub trait Provider: Send + Sync {
    /// The abstract key this provider satisfies
    fn key(&self) -> InjectKey;

    /// Merge priority; higher wins, ties go to the later merge
    fn priority(&self) -> i32;

    /// Name of the scope that owns this provider
    fn scope(&self) -> &str;

    /// Build a resolver for this provider
    ///
    /// Called with `None` the result is an unattached template, cached once
    /// per scope and later attached to concrete injectors via
    /// [`Resolver::attach`].
    fn bind(&self, injector: Option<&Arc<dyn InjectorPort>>) -> Result<Arc<dyn Resolver>>;
}

/// A provider bound toward an injector, ready to produce a value
pub trait Resolver: Send + Sync {
    /// Copy of this resolver attached to `injector`
    fn attach(&self, injector: &Arc<dyn InjectorPort>) -> Arc<dyn Resolver>;

    /// Produce the value
    ///
    /// `Ok(None)` is a soft miss (for resolvers that delegate to another
    /// key); errors are reserved for real failures.
    fn resolve(&self) -> Result<Option<Value>>;
}

/// Lifecycle notifications fired by scopes and the registry
///
/// Every hook defaults to a no-op; implementors override the ones of
/// interest. Hooks run synchronously on the thread driving the lifecycle
/// transition and should return quickly.
pub trait ScopeObserver: Send + Sync {
    /// Preparation hooks for `scope` are about to run
    fn on_prepare(&self, _scope: &str) {}

    /// `scope` became ready with the given ready order
    fn on_ready(&self, _scope: &str, _ready_order: u64) {}

    /// A new injector was created for `scope`
    fn on_create(&self, _scope: &str, _parent_scope: Option<&str>) {}

    /// The injector identified by `injector` was bootstrapped
    fn on_bootstrap(&self, _scope: &str, _injector: u64) {}

    /// The injector identified by `injector` was disposed
    fn on_dispose(&self, _scope: &str, _injector: u64) {}
}
