//! Runtime scope instances
//!
//! A [`ScopeInstance`] is the resolved, process-lifetime form of one
//! named scope: its definition, its dependency closure, its merged
//! provider stack, and its resolver template cache. Instances are
//! created only by the registry, exactly once per name, and never
//! discarded while the registry lives.
//!
//! Readiness is a one-way transition:
//!
//! ```text
//! UNPREPARED --prepare()--> PREPARED (terminal)
//! ```
//!
//! `prepare(strict = true)` on an already-prepared instance is the only
//! failing transition attempt. The `depends`, `providers`, and
//! per-key `resolvers` caches are computed at most once and never
//! invalidated during the process lifetime.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;
use scopewire_domain::{Error, InjectKey, Resolver, Result, ScopeObserver, Value};
use tracing::{debug, warn};

use crate::constants::ORDER_UNSET;
use crate::context::{ExitStack, InjectorContext};
use crate::definition::ScopeDefinition;
use crate::injector::Injector;
use crate::memo::{Memo, MemoMap};
use crate::provide::{AliasProvider, ValueResolver};
use crate::registry::RegistryShared;
use crate::stack::ProviderStack;

/// One resolved runtime scope, shared process-wide
pub struct ScopeInstance {
    definition: ScopeDefinition,
    registry: Weak<RegistryShared>,
    self_ref: Weak<ScopeInstance>,
    ready_order: AtomicU64,
    prepared: OnceCell<()>,
    depends: Memo<Vec<Arc<ScopeInstance>>>,
    providers: Memo<Arc<ProviderStack>>,
    resolvers: MemoMap<InjectKey, Option<Arc<dyn Resolver>>>,
}

impl ScopeInstance {
    pub(crate) fn new(definition: ScopeDefinition, registry: Weak<RegistryShared>) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            definition,
            registry,
            self_ref: self_ref.clone(),
            ready_order: AtomicU64::new(ORDER_UNSET),
            prepared: OnceCell::new(),
            depends: Memo::new(),
            providers: Memo::new(),
            resolvers: MemoMap::new(),
        })
    }

    /// Scope name
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// The resolved definition this instance was built from
    pub fn definition(&self) -> &ScopeDefinition {
        &self.definition
    }

    /// Sequence value stamped at preparation, 0 while unprepared
    pub fn ready_order(&self) -> u64 {
        self.ready_order.load(Ordering::SeqCst)
    }

    /// Whether this instance has been prepared
    pub fn is_ready(&self) -> bool {
        self.ready_order() != ORDER_UNSET
    }

    /// Run the one-time preparation and stamp the ready order.
    ///
    /// Already ready: no-op, unless `strict`, which fails with
    /// [`Error::AlreadyPrepared`]. Concurrent callers observe exactly
    /// one preparation run.
    pub fn prepare(&self, strict: bool) -> Result<()> {
        if self.is_ready() {
            if strict {
                return Err(Error::already_prepared(self.name()));
            }
            return Ok(());
        }
        self.prepared.get_or_try_init(|| -> Result<()> {
            debug!(scope = %self.name(), "preparing scope");
            self.notify(|observer| observer.on_prepare(self.name()))?;
            let order = self.shared()?.next_order();
            self.ready_order.store(order, Ordering::SeqCst);
            debug!(scope = %self.name(), order, "scope ready");
            self.notify(|observer| observer.on_ready(self.name(), order))?;
            Ok(())
        })?;
        Ok(())
    }

    /// Dependency instances in resolution order.
    ///
    /// Memoized on first access. Names resolve through the registry,
    /// which may auto-admit implicit scopes; ordering is priority
    /// descending, then registration order ascending.
    pub fn depends(&self) -> Result<&[Arc<ScopeInstance>]> {
        self.depends
            .get_or_try_init(|| {
                let shared = self.shared()?;
                let mut instances = Vec::with_capacity(self.definition.depends().len());
                for name in self.definition.depends() {
                    instances.push(RegistryShared::get(&shared, name)?);
                }
                instances.sort_by_key(|instance| instance.definition().sort_key());
                Ok(instances)
            })
            .map(Vec::as_slice)
    }

    /// Embedded dependencies, in resolution order
    pub fn embeds(&self) -> Result<Vec<Arc<ScopeInstance>>> {
        Ok(self
            .depends()?
            .iter()
            .filter(|dep| dep.definition().is_embedded())
            .cloned()
            .collect())
    }

    /// Non-embedded dependencies, in resolution order
    pub fn parents(&self) -> Result<Vec<Arc<ScopeInstance>>> {
        Ok(self
            .depends()?
            .iter()
            .filter(|dep| !dep.definition().is_embedded())
            .cloned()
            .collect())
    }

    /// The merged provider stack for this scope.
    ///
    /// Built once: each embedded dependency's full stack merges in
    /// resolution order, this scope's declared providers overlay them in
    /// registration order, and the synthetic injector alias lands last
    /// at the lowest priority.
    pub fn providers(&self) -> Result<Arc<ProviderStack>> {
        self.providers
            .get_or_try_init(|| {
                let mut stack = ProviderStack::new();
                for embed in self.embeds()? {
                    stack.merge(&*embed.providers()?);
                }
                for provider in self.shared()?.declared_providers(self.name()) {
                    stack.push(provider);
                }
                stack.push(Arc::new(AliasProvider::injector_alias(self.name())));
                debug!(scope = %self.name(), providers = stack.len(), "provider stack built");
                Ok(Arc::new(stack))
            })
            .map(Arc::clone)
    }

    /// Whether the provider stack has already been built
    pub fn providers_memoized(&self) -> bool {
        self.providers.get().is_some()
    }

    /// The provider stack if already built, without forcing the build
    pub fn providers_if_built(&self) -> Option<Arc<ProviderStack>> {
        self.providers.get().map(Arc::clone)
    }

    /// Template resolver for `key`, or `None` when no provider covers it.
    ///
    /// Per-key compute-once: a present provider is bound unattached and
    /// cached; a miss caches an explicit `None` marker so repeated
    /// misses never re-consult the stack. Access prepares the scope.
    pub fn resolver(&self, key: &InjectKey) -> Result<Option<Arc<dyn Resolver>>> {
        self.prepare(false)?;
        let providers = self.providers()?;
        self.resolvers
            .get_or_try_insert(key.clone(), || match providers.get(key) {
                Some(provider) => provider.bind(None).map(Some),
                None => Ok(None),
            })
    }

    /// Ensure an injector chain covering this scope, extending `parent`.
    ///
    /// Returns `parent` unchanged when its chain already contains this
    /// scope. Otherwise missing non-embedded dependencies gain injectors
    /// first, then a new injector for this scope tops the chain. The
    /// dependency injectors created along the way are bootstrapped
    /// immediately; the returned injector is not, so callers bootstrap
    /// it (directly or through a context) before resolving.
    /// Dependency cycles are not detected and recurse without bound.
    pub fn create(&self, parent: &Injector) -> Result<Injector> {
        if parent.contains_scope(self) {
            return Ok(parent.clone());
        }
        let mut chain = parent.clone();
        for dep in self.parents()? {
            if !chain.contains_scope(&dep) {
                let created = dep.create(&chain)?;
                dep.bootstrap(&created)?;
                chain = created;
            }
        }
        let id = self.shared()?.next_order();
        let scope = self.self_arc()?;
        let injector = self
            .definition
            .injector_factory()
            .create_injector(scope, Some(chain.clone()), id);
        debug!(scope = %self.name(), injector = id, parent = %chain, "created injector");
        self.notify(|observer| observer.on_create(self.name(), Some(chain.scope_name())))?;
        Ok(injector)
    }

    /// Prepare this scope and install a fresh content cache on `injector`.
    ///
    /// The cache is seeded with this scope's own injector key resolving
    /// to `injector` itself. Bootstrapping an already-active injector
    /// replaces its cache.
    pub fn bootstrap(&self, injector: &Injector) -> Result<Injector> {
        self.prepare(false)?;
        let mut cache = self.definition.cache_factory().create_cache();
        let value: Value = Arc::new(injector.clone());
        cache.insert(
            InjectKey::scope_injector(self.name()),
            Some(Arc::new(ValueResolver::new(value))),
        );
        injector.activate(cache)?;
        debug!(scope = %self.name(), injector = injector.context_id(), "injector bootstrapped");
        self.notify(|observer| observer.on_bootstrap(self.name(), injector.context_id()))?;
        Ok(injector.clone())
    }

    /// Release `injector`'s exit stack and detach its content cache.
    ///
    /// The exit stack is released on every path; release failures are
    /// aggregated and surfaced after the cache is detached. Disposing an
    /// inactive injector is a no-op. Parent injectors are untouched.
    pub fn dispose(&self, injector: &Injector) -> Result<()> {
        let release = injector.exit_stack().release_all();
        let was_active = injector.deactivate()?;
        let notified = if was_active {
            debug!(scope = %self.name(), injector = injector.context_id(), "injector disposed");
            self.notify(|observer| observer.on_dispose(self.name(), injector.context_id()))
        } else {
            Ok(())
        };
        release.and(notified)
    }

    /// Wrap `injector` in a unit-of-work context via the context factory
    pub fn create_context(&self, injector: &Injector) -> Result<InjectorContext> {
        self.definition.context_factory().create_context(injector)
    }

    /// Create a standalone exit stack via the context factory
    pub fn create_exit_stack(&self, injector: &Injector) -> ExitStack {
        self.definition.context_factory().create_exit_stack(injector)
    }

    /// Whether `other` is this scope or reachable through its dependencies
    pub fn contains(&self, other: &ScopeInstance) -> bool {
        if self.name() == other.name() {
            return true;
        }
        match self.depends() {
            Ok(deps) => deps.iter().any(|dep| dep.contains(other)),
            Err(err) => {
                warn!(scope = %self.name(), error = %err, "containment check could not resolve dependencies");
                false
            }
        }
    }

    fn shared(&self) -> Result<Arc<RegistryShared>> {
        self.registry
            .upgrade()
            .ok_or_else(|| Error::internal("scope registry was dropped"))
    }

    fn self_arc(&self) -> Result<Arc<ScopeInstance>> {
        self.self_ref
            .upgrade()
            .ok_or_else(|| Error::internal("scope instance handle unavailable"))
    }

    fn notify<F: Fn(&dyn ScopeObserver)>(&self, f: F) -> Result<()> {
        self.shared()?.notify(f)
    }
}

impl fmt::Display for ScopeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = self.ready_order();
        if order == ORDER_UNSET {
            write!(f, "{}(unprepared)", self.name())
        } else {
            write!(f, "{}(ready:{order})", self.name())
        }
    }
}

impl fmt::Debug for ScopeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeInstance")
            .field("name", &self.name())
            .field("ready_order", &self.ready_order())
            .field("depends_memoized", &self.depends.get().is_some())
            .field("providers_memoized", &self.providers_memoized())
            .field("resolvers_cached", &self.resolvers.len())
            .finish()
    }
}
