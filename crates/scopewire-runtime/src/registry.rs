//! Process-wide scope registry
//!
//! The [`ScopeRegistry`] owns every table the runtime shares across
//! execution contexts: the monotonic registration-order sequence, the
//! definition catalog, the declared-provider lists, the lazily built
//! instance cache, the observer list, and the root injector. Handles
//! are cheap clones over one shared allocation; there is no ambient
//! global state.
//!
//! A fresh registry is seeded with the built-in catalog, in declaration
//! order:
//!
//! | scope | flags |
//! |-------|-------|
//! | `implicit` | abstract base for auto-admission: embedded, implicit, priority -1 |
//! | `any` | embedded |
//! | `main` | the root scope |
//! | `local` | embedded |
//! | `console` | depends `[local]` |
//! | `request` | depends `[local]` |

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use scopewire_domain::constants::{
    DEFAULT_PRIORITY, IMPLICIT_PRIORITY, SCOPE_ANY, SCOPE_CONSOLE, SCOPE_IMPLICIT, SCOPE_LOCAL,
    SCOPE_MAIN, SCOPE_REQUEST,
};
use scopewire_domain::{
    Error, Provider, RawScopeConfig, Result, ScopeObserver, validate_scope_name,
};
use tracing::{debug, info, warn};

use crate::config::RuntimeConfig;
use crate::context::InjectorContext;
use crate::definition::{ScopeDefinition, ScopeStrategies};
use crate::injector::Injector;
use crate::locks::{lock_mutex, lock_rwlock_read, lock_rwlock_write};
use crate::memo::MemoMap;
use crate::scope::ScopeInstance;

/// Monotonic sequence for registration orders and injector ids.
/// Starts at 1; 0 is reserved for "not yet prepared".
pub(crate) struct OrderSequence {
    counter: AtomicU64,
}

impl OrderSequence {
    fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }

    pub(crate) fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }
}

/// State shared by every handle of one registry
pub(crate) struct RegistryShared {
    order: OrderSequence,
    definitions: DashMap<String, ScopeDefinition>,
    declared: DashMap<String, Vec<Arc<dyn Provider>>>,
    instances: MemoMap<String, Arc<ScopeInstance>>,
    observers: RwLock<Vec<Arc<dyn ScopeObserver>>>,
    root: Mutex<Option<Injector>>,
}

impl RegistryShared {
    pub(crate) fn next_order(&self) -> u64 {
        self.order.next()
    }

    pub(crate) fn declared_providers(&self, scope: &str) -> Vec<Arc<dyn Provider>> {
        self.declared
            .get(scope)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub(crate) fn notify<F: Fn(&dyn ScopeObserver)>(&self, f: F) -> Result<()> {
        let observers = lock_rwlock_read(&self.observers, "scope observers")?;
        for observer in observers.iter() {
            f(observer.as_ref());
        }
        Ok(())
    }

    pub(crate) fn definition_of(&self, name: &str) -> Option<ScopeDefinition> {
        self.definitions.get(name).map(|entry| entry.value().clone())
    }

    pub(crate) fn instance_of(&self, name: &str) -> Option<Arc<ScopeInstance>> {
        self.instances.get(name)
    }

    /// Every name with a definition or a live instance, sorted
    pub(crate) fn known_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .definitions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.extend(self.instances.keys());
        names.sort();
        names.dedup();
        names
    }

    /// Scope instance for `name`, constructing at most once per name.
    ///
    /// Unknown names are auto-admitted as implicit scopes derived from
    /// the `implicit` base definition. Abstract definitions cannot be
    /// instantiated.
    pub(crate) fn get(this: &Arc<Self>, name: &str) -> Result<Arc<ScopeInstance>> {
        this.instances.get_or_try_insert(name.to_string(), || {
            let definition = match this.definition_of(name) {
                Some(definition) => definition,
                None => Self::admit_implicit(this, name)?,
            };
            if definition.is_abstract() {
                return Err(Error::config(format!(
                    "abstract scope '{name}' cannot be instantiated"
                )));
            }
            debug!(scope = %name, "creating scope instance");
            Ok(ScopeInstance::new(definition, Arc::downgrade(this)))
        })
    }

    fn admit_implicit(this: &Arc<Self>, name: &str) -> Result<ScopeDefinition> {
        validate_scope_name(name)?;
        let base = this
            .definition_of(SCOPE_IMPLICIT)
            .ok_or_else(|| Error::unknown_scope(name))?;
        let raw = RawScopeConfig::new(name);
        let definition =
            ScopeDefinition::resolve(&raw, ScopeStrategies::new(), Some(&base), this.order.next())?;
        info!(scope = %name, "implicitly admitted scope");
        Ok(definition)
    }
}

/// Cheap-clone handle to one scope registry
#[derive(Clone)]
pub struct ScopeRegistry {
    shared: Arc<RegistryShared>,
}

impl ScopeRegistry {
    /// Create a registry seeded with the built-in scope catalog
    pub fn new() -> Self {
        let registry = Self {
            shared: Arc::new(RegistryShared {
                order: OrderSequence::new(),
                definitions: DashMap::new(),
                declared: DashMap::new(),
                instances: MemoMap::new(),
                observers: RwLock::new(Vec::new()),
                root: Mutex::new(None),
            }),
        };
        registry.seed_builtins();
        registry
    }

    fn seed_builtins(&self) {
        // (name, priority, embedded, implicit, abstract, depends)
        let catalog: [(&str, i32, bool, bool, bool, &[&str]); 6] = [
            (SCOPE_IMPLICIT, IMPLICIT_PRIORITY, true, true, true, &[]),
            (SCOPE_ANY, DEFAULT_PRIORITY, true, false, false, &[]),
            (SCOPE_MAIN, DEFAULT_PRIORITY, false, false, false, &[]),
            (SCOPE_LOCAL, DEFAULT_PRIORITY, true, false, false, &[]),
            (SCOPE_CONSOLE, DEFAULT_PRIORITY, false, false, false, &[SCOPE_LOCAL]),
            (SCOPE_REQUEST, DEFAULT_PRIORITY, false, false, false, &[SCOPE_LOCAL]),
        ];
        for (name, priority, embedded, implicit, is_abstract, depends) in catalog {
            let order = self.shared.next_order();
            let definition =
                ScopeDefinition::prefab(name, priority, embedded, implicit, is_abstract, depends, order);
            self.shared.definitions.insert(name.to_string(), definition);
        }
    }

    /// Register a scope definition from raw configuration
    pub fn define(&self, raw: RawScopeConfig) -> Result<ScopeDefinition> {
        self.define_with(raw, ScopeStrategies::new())
    }

    /// Register a scope definition with explicit factory strategies.
    ///
    /// Fails when the base is unknown, the resolved name or a dependency
    /// name is invalid, the name is already defined, or an instance
    /// already exists for the name.
    pub fn define_with(
        &self,
        raw: RawScopeConfig,
        strategies: ScopeStrategies,
    ) -> Result<ScopeDefinition> {
        let base = match &raw.base {
            Some(base_name) => Some(
                self.shared
                    .definition_of(base_name)
                    .ok_or_else(|| Error::unknown_scope(base_name))?,
            ),
            None => None,
        };
        let order = self.shared.next_order();
        let definition = ScopeDefinition::resolve(&raw, strategies, base.as_ref(), order)?;
        for dep in definition.depends() {
            validate_scope_name(dep)?;
        }
        if self.shared.instance_of(definition.name()).is_some() {
            return Err(Error::config(format!(
                "scope '{}' already has a live instance",
                definition.name()
            )));
        }
        match self.shared.definitions.entry(definition.name().to_string()) {
            Entry::Occupied(_) => Err(Error::config(format!(
                "scope '{}' is already defined",
                definition.name()
            ))),
            Entry::Vacant(entry) => {
                debug!(
                    scope = %definition.name(),
                    order = definition.registration_order(),
                    "scope defined"
                );
                entry.insert(definition.clone());
                Ok(definition)
            }
        }
    }

    /// Scope instance for `name`, created on first access
    pub fn get(&self, name: &str) -> Result<Arc<ScopeInstance>> {
        RegistryShared::get(&self.shared, name)
    }

    /// Register a provider under its owning scope.
    ///
    /// The owner must be a known scope. Providers registered after the
    /// owning scope's stack was built are inert; that case is logged.
    pub fn provide(&self, provider: Arc<dyn Provider>) -> Result<()> {
        let scope = provider.scope().to_string();
        let known = self.shared.definitions.contains_key(&scope)
            || self.shared.instance_of(&scope).is_some();
        if !known {
            return Err(Error::unknown_scope(&scope));
        }
        if let Some(instance) = self.shared.instance_of(&scope) {
            if instance.providers_memoized() {
                warn!(
                    scope = %scope,
                    key = %provider.key(),
                    "provider registered after the stack was built and will not take effect"
                );
            }
        }
        self.shared.declared.entry(scope).or_default().push(provider);
        Ok(())
    }

    /// Register a lifecycle observer
    pub fn observe(&self, observer: Arc<dyn ScopeObserver>) -> Result<()> {
        let mut observers = lock_rwlock_write(&self.shared.observers, "scope observers")?;
        observers.push(observer);
        Ok(())
    }

    /// The root injector: the `main` scope's injector, created and
    /// bootstrapped on first access, then shared by every chain
    pub fn root_injector(&self) -> Result<Injector> {
        let mut guard = lock_mutex(&self.shared.root, "root injector")?;
        if let Some(existing) = guard.as_ref() {
            return Ok(existing.clone());
        }
        let main = RegistryShared::get(&self.shared, SCOPE_MAIN)?;
        let id = self.shared.next_order();
        let root = main
            .definition()
            .injector_factory()
            .create_injector(Arc::clone(&main), None, id);
        main.bootstrap(&root)?;
        info!(injector = id, "root injector created");
        *guard = Some(root.clone());
        Ok(root)
    }

    /// Open a unit-of-work context for `name`, chained from the root.
    ///
    /// When the root chain already covers the scope, the existing
    /// injector is adopted without re-bootstrapping and the context
    /// leaves it alive on close.
    pub fn context(&self, name: &str) -> Result<InjectorContext> {
        let scope = self.get(name)?;
        let root = self.root_injector()?;
        let injector = scope.create(&root)?;
        if Injector::ptr_eq(&injector, &root) {
            return Ok(InjectorContext::adopt(injector));
        }
        scope.create_context(&injector)
    }

    /// Drop cached instances and the root injector; definitions and
    /// declared providers stay. Intended for tests.
    pub fn reset(&self) -> Result<()> {
        let root = { lock_mutex(&self.shared.root, "root injector")?.take() };
        if let Some(root) = root {
            root.dispose()?;
        }
        self.shared.instances.clear();
        debug!("registry reset");
        Ok(())
    }

    /// Whether `name` has an explicit definition
    pub fn is_defined(&self, name: &str) -> bool {
        self.shared.definitions.contains_key(name)
    }

    /// Explicitly defined scope names, sorted
    pub fn scope_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .shared
            .definitions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Define every scope listed in `config.scopes`, in name order
    pub fn apply_settings(&self, config: &RuntimeConfig) -> Result<()> {
        for (name, settings) in &config.scopes {
            self.define(settings.to_raw(name))?;
        }
        Ok(())
    }

    pub(crate) fn shared(&self) -> &Arc<RegistryShared> {
        &self.shared
    }
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScopeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeRegistry")
            .field("definitions", &self.shared.definitions.len())
            .field("instances", &self.shared.instances.len())
            .finish()
    }
}
