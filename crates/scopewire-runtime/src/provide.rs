//! Built-in provider implementations
//!
//! Three provider families cover the registration surface:
//!
//! | Provider | Produces |
//! |----------|----------|
//! | [`ValueProvider`] | a fixed shared value |
//! | [`FactoryProvider`] | a value computed per resolution, optionally shared per injector |
//! | [`AliasProvider`] | another key resolved through the same injector |
//!
//! `bind(None)` yields an unbound template resolver that scope instances
//! memoize; `attach` then clones the template onto a concrete injector.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use scopewire_domain::constants::{DEFAULT_PRIORITY, INJECTOR_ALIAS_PRIORITY};
use scopewire_domain::{Error, InjectKey, InjectorPort, Provider, Resolver, Result, Value};

/// Factory closure signature: receives the injector the resolver is
/// attached to, so it can resolve its own dependencies.
pub type FactoryFn = Arc<dyn Fn(&Arc<dyn InjectorPort>) -> Result<Value> + Send + Sync>;

// ============================================================================
// VALUE PROVIDERS
// ============================================================================

/// Provider supplying one fixed value for a key
pub struct ValueProvider {
    key: InjectKey,
    scope: String,
    priority: i32,
    value: Value,
}

impl ValueProvider {
    /// Create a value provider at the default priority
    pub fn new<S: Into<String>>(key: InjectKey, scope: S, value: Value) -> Self {
        Self {
            key,
            scope: scope.into(),
            priority: DEFAULT_PRIORITY,
            value,
        }
    }

    /// Set the merge priority
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Provider for ValueProvider {
    fn key(&self) -> InjectKey {
        self.key.clone()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn scope(&self) -> &str {
        &self.scope
    }

    fn bind(&self, _injector: Option<&Arc<dyn InjectorPort>>) -> Result<Arc<dyn Resolver>> {
        Ok(Arc::new(ValueResolver::new(self.value.clone())))
    }
}

/// Resolver yielding a fixed value, identical before and after attach
pub struct ValueResolver {
    value: Value,
}

impl ValueResolver {
    /// Wrap a fixed value
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl Resolver for ValueResolver {
    fn attach(&self, _injector: &Arc<dyn InjectorPort>) -> Arc<dyn Resolver> {
        Arc::new(Self {
            value: self.value.clone(),
        })
    }

    fn resolve(&self) -> Result<Option<Value>> {
        Ok(Some(self.value.clone()))
    }
}

// ============================================================================
// FACTORY PROVIDERS
// ============================================================================

/// Provider computing values through a closure.
///
/// A shared factory computes at most once per attached injector; the
/// content cache guarantees one attached resolver per (injector, key),
/// so sharing at the root injector yields process-wide singletons.
pub struct FactoryProvider {
    key: InjectKey,
    scope: String,
    priority: i32,
    shared: bool,
    factory: FactoryFn,
}

impl FactoryProvider {
    /// Create a factory provider at the default priority
    pub fn new<S, F>(key: InjectKey, scope: S, factory: F) -> Self
    where
        S: Into<String>,
        F: Fn(&Arc<dyn InjectorPort>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            key,
            scope: scope.into(),
            priority: DEFAULT_PRIORITY,
            shared: false,
            factory: Arc::new(factory),
        }
    }

    /// Create a factory provider keyed by the produced type
    pub fn of_type<T, S, F>(scope: S, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        S: Into<String>,
        F: Fn(&Arc<dyn InjectorPort>) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        Self::new(InjectKey::of::<T>(), scope, move |injector| {
            factory(injector).map(|value| value as Value)
        })
    }

    /// Set the merge priority
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Memoize the computed value per attached injector
    #[must_use]
    pub fn shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }
}

impl Provider for FactoryProvider {
    fn key(&self) -> InjectKey {
        self.key.clone()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn scope(&self) -> &str {
        &self.scope
    }

    fn bind(&self, injector: Option<&Arc<dyn InjectorPort>>) -> Result<Arc<dyn Resolver>> {
        Ok(Arc::new(FactoryResolver {
            factory: Arc::clone(&self.factory),
            shared: self.shared,
            injector: injector.cloned(),
            cell: OnceCell::new(),
        }))
    }
}

struct FactoryResolver {
    factory: FactoryFn,
    shared: bool,
    injector: Option<Arc<dyn InjectorPort>>,
    cell: OnceCell<Value>,
}

impl Resolver for FactoryResolver {
    fn attach(&self, injector: &Arc<dyn InjectorPort>) -> Arc<dyn Resolver> {
        Arc::new(Self {
            factory: Arc::clone(&self.factory),
            shared: self.shared,
            injector: Some(Arc::clone(injector)),
            cell: OnceCell::new(),
        })
    }

    fn resolve(&self) -> Result<Option<Value>> {
        let injector = self.injector.as_ref().ok_or_else(|| {
            Error::internal("factory resolver used before being attached to an injector")
        })?;
        if self.shared {
            let value = self
                .cell
                .get_or_try_init(|| (self.factory)(injector))
                .map(Clone::clone)?;
            Ok(Some(value))
        } else {
            (self.factory)(injector).map(Some)
        }
    }
}

// ============================================================================
// ALIAS PROVIDERS
// ============================================================================

/// Provider resolving a key by delegating to another key on the same injector
pub struct AliasProvider {
    key: InjectKey,
    target: InjectKey,
    scope: String,
    priority: i32,
}

impl AliasProvider {
    /// Create an alias provider at the default priority
    pub fn new<S: Into<String>>(key: InjectKey, target: InjectKey, scope: S) -> Self {
        Self {
            key,
            target,
            scope: scope.into(),
            priority: DEFAULT_PRIORITY,
        }
    }

    /// Set the merge priority
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Alias the generic injector key to a scope's own injector key.
    ///
    /// Registered automatically as the last entry of every provider
    /// stack, at the lowest priority, so any declared provider for the
    /// generic key outranks it.
    pub fn injector_alias<S: Into<String>>(scope: S) -> Self {
        let scope = scope.into();
        Self::new(
            InjectKey::Injector,
            InjectKey::scope_injector(scope.clone()),
            scope,
        )
        .with_priority(INJECTOR_ALIAS_PRIORITY)
    }
}

impl Provider for AliasProvider {
    fn key(&self) -> InjectKey {
        self.key.clone()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn scope(&self) -> &str {
        &self.scope
    }

    fn bind(&self, injector: Option<&Arc<dyn InjectorPort>>) -> Result<Arc<dyn Resolver>> {
        Ok(Arc::new(AliasResolver {
            target: self.target.clone(),
            injector: injector.cloned(),
        }))
    }
}

struct AliasResolver {
    target: InjectKey,
    injector: Option<Arc<dyn InjectorPort>>,
}

impl Resolver for AliasResolver {
    fn attach(&self, injector: &Arc<dyn InjectorPort>) -> Arc<dyn Resolver> {
        Arc::new(Self {
            target: self.target.clone(),
            injector: Some(Arc::clone(injector)),
        })
    }

    fn resolve(&self) -> Result<Option<Value>> {
        let injector = self.injector.as_ref().ok_or_else(|| {
            Error::internal("alias resolver used before being attached to an injector")
        })?;
        injector.resolve(&self.target)
    }
}
