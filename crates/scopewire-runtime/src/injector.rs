//! Per-execution-context injectors
//!
//! An [`Injector`] is one node in an upward-only parent chain, created
//! for a single unit of work. It holds a private `content` cache
//! mapping each key to its bound resolver (or an explicit `None` miss
//! marker), so every (injector, key) pair binds at most once. The cache
//! exists only between bootstrap and dispose; resolution outside that
//! window fails with `InjectorInactive`.
//!
//! Resolution order for a key: local cache, then the owning scope's
//! resolver templates, then the parent injector. A resolver found on
//! the parent is cached locally as-is, still bound to the parent, so
//! values shared at an ancestor stay shared below it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use scopewire_domain::key::downcast;
use scopewire_domain::{Error, InjectKey, InjectorPort, Resolver, Result, Value};

use crate::context::ExitStack;
use crate::locks::lock_mutex;
use crate::scope::ScopeInstance;

/// Per-injector resolution cache: key to bound resolver or miss marker
pub type ContentMap = HashMap<InjectKey, Option<Arc<dyn Resolver>>>;

struct InjectorInner {
    id: u64,
    scope: Arc<ScopeInstance>,
    parent: Option<Injector>,
    content: Mutex<Option<ContentMap>>,
    exits: ExitStack,
}

/// Cheap-clone handle to one injector node
#[derive(Clone)]
pub struct Injector {
    inner: Arc<InjectorInner>,
}

impl Injector {
    /// Create an inactive injector node.
    ///
    /// The node stays inert until its scope bootstraps it; resolution
    /// before that fails with `InjectorInactive`.
    pub fn new(scope: Arc<ScopeInstance>, parent: Option<Injector>, id: u64) -> Self {
        Self {
            inner: Arc::new(InjectorInner {
                id,
                scope,
                parent,
                content: Mutex::new(None),
                exits: ExitStack::new(),
            }),
        }
    }

    /// Numeric id, unique per registry
    pub fn context_id(&self) -> u64 {
        self.inner.id
    }

    /// The scope this injector was created for
    pub fn scope(&self) -> &Arc<ScopeInstance> {
        &self.inner.scope
    }

    /// Name of the owning scope
    pub fn scope_name(&self) -> &str {
        self.inner.scope.name()
    }

    /// Parent node, `None` only at the root
    pub fn parent(&self) -> Option<&Injector> {
        self.inner.parent.as_ref()
    }

    /// Chain length from this node to the root inclusive
    pub fn depth(&self) -> usize {
        1 + self.inner.parent.as_ref().map_or(0, |parent| parent.depth())
    }

    /// Resource-release stack disposed together with this injector
    pub fn exit_stack(&self) -> &ExitStack {
        &self.inner.exits
    }

    /// Whether two handles refer to the same injector node
    pub fn ptr_eq(a: &Injector, b: &Injector) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Whether this injector currently holds a content cache
    pub fn is_active(&self) -> bool {
        self.inner
            .content
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Whether `scope` is covered by this chain, through scope containment
    pub fn contains_scope(&self, scope: &ScopeInstance) -> bool {
        if self.inner.scope.contains(scope) {
            return true;
        }
        self.inner
            .parent
            .as_ref()
            .is_some_and(|parent| parent.contains_scope(scope))
    }

    /// Resolve `key` to a value, `Ok(None)` when no provider covers it
    pub fn resolve(&self, key: &InjectKey) -> Result<Option<Value>> {
        match self.resolver(key)? {
            Some(resolver) => resolver.resolve(),
            None => Ok(None),
        }
    }

    /// Typed resolution sugar over [`resolve`](Self::resolve)
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>> {
        let key = InjectKey::of::<T>();
        match self.resolve(&key)? {
            Some(value) => downcast::<T>(value).map(Some).ok_or_else(|| {
                Error::internal(format!("value cached for {key} has an unexpected type"))
            }),
            None => Ok(None),
        }
    }

    /// The bound resolver cached for `key`, binding it on first access.
    ///
    /// The cache lock is never held while scope lookup, template
    /// attachment, or parent resolution runs; a concurrent first access
    /// is settled by whichever result lands in the cache first.
    pub fn resolver(&self, key: &InjectKey) -> Result<Option<Arc<dyn Resolver>>> {
        {
            let guard = lock_mutex(&self.inner.content, "injector content")?;
            let content = guard
                .as_ref()
                .ok_or_else(|| Error::injector_inactive(self.scope_name()))?;
            if let Some(cached) = content.get(key) {
                return Ok(cached.clone());
            }
        }

        let bound: Option<Arc<dyn Resolver>> = match self.inner.scope.resolver(key)? {
            Some(template) => Some(template.attach(&self.as_port())),
            None => match &self.inner.parent {
                Some(parent) => parent.resolver(key)?,
                None => None,
            },
        };

        let mut guard = lock_mutex(&self.inner.content, "injector content")?;
        let content = guard
            .as_mut()
            .ok_or_else(|| Error::injector_inactive(self.scope_name()))?;
        Ok(content.entry(key.clone()).or_insert(bound).clone())
    }

    /// Object-safe view handed to resolvers and factories
    pub fn as_port(&self) -> Arc<dyn InjectorPort> {
        Arc::new(self.clone())
    }

    /// Dispose through the owning scope
    pub fn dispose(&self) -> Result<()> {
        self.inner.scope.dispose(self)
    }

    /// Install a fresh content cache. Replaces any existing cache.
    pub(crate) fn activate(&self, cache: ContentMap) -> Result<()> {
        let mut guard = lock_mutex(&self.inner.content, "injector content")?;
        *guard = Some(cache);
        Ok(())
    }

    /// Detach the content cache, returning whether one was attached
    pub(crate) fn deactivate(&self) -> Result<bool> {
        let mut guard = lock_mutex(&self.inner.content, "injector content")?;
        Ok(guard.take().is_some())
    }
}

impl InjectorPort for Injector {
    fn resolve(&self, key: &InjectKey) -> Result<Option<Value>> {
        Injector::resolve(self, key)
    }

    fn scope_name(&self) -> &str {
        Injector::scope_name(self)
    }

    fn context_id(&self) -> u64 {
        Injector::context_id(self)
    }
}

impl fmt::Display for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.scope_name(), self.inner.id)
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("id", &self.inner.id)
            .field("scope", &self.scope_name())
            .field("depth", &self.depth())
            .field("active", &self.is_active())
            .finish()
    }
}
