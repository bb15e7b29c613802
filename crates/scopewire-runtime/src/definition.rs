//! Resolved scope configuration
//!
//! [`ScopeDefinition::resolve`] turns a raw, partially-specified
//! [`RawScopeConfig`] into a fully resolved definition by applying the
//! uniform rule per field: explicit value, else the base definition's
//! resolved value, else the field default. Dependency lists are
//! deduplicated, exclude the scope itself, and gain the trailing
//! sentinel scopes (`any`, `main`) unless the scope is embedded.

use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;

use scopewire_domain::constants::{DEFAULT_PRIORITY, SENTINEL_SCOPES};
use scopewire_domain::{Error, RawScopeConfig, Result, validate_scope_name};

use crate::factory::{
    CacheFactory, ContextFactory, DefaultCacheFactory, DefaultContextFactory,
    DefaultInjectorFactory, InjectorFactory,
};

/// Pluggable construction strategies for a scope.
///
/// Unset fields inherit from the base definition, then fall back to the
/// default implementations.
#[derive(Clone, Default)]
pub struct ScopeStrategies {
    /// Builds the per-injector content cache
    pub cache_factory: Option<Arc<dyn CacheFactory>>,
    /// Builds injector contexts and exit stacks
    pub context_factory: Option<Arc<dyn ContextFactory>>,
    /// Builds injectors
    pub injector_factory: Option<Arc<dyn InjectorFactory>>,
}

impl ScopeStrategies {
    /// Create a strategy set with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache factory
    #[must_use]
    pub fn with_cache_factory(mut self, factory: Arc<dyn CacheFactory>) -> Self {
        self.cache_factory = Some(factory);
        self
    }

    /// Set the context factory
    #[must_use]
    pub fn with_context_factory(mut self, factory: Arc<dyn ContextFactory>) -> Self {
        self.context_factory = Some(factory);
        self
    }

    /// Set the injector factory
    #[must_use]
    pub fn with_injector_factory(mut self, factory: Arc<dyn InjectorFactory>) -> Self {
        self.injector_factory = Some(factory);
        self
    }
}

impl fmt::Debug for ScopeStrategies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeStrategies")
            .field("cache_factory", &self.cache_factory.is_some())
            .field("context_factory", &self.context_factory.is_some())
            .field("injector_factory", &self.injector_factory.is_some())
            .finish()
    }
}

/// Fully resolved configuration for one named scope.
///
/// Immutable after resolution. Registration order is allocated by the
/// registry's monotonic sequence and breaks priority ties.
#[derive(Clone)]
pub struct ScopeDefinition {
    name: String,
    is_abstract: bool,
    priority: i32,
    embedded: bool,
    implicit: bool,
    depends: Vec<String>,
    registration_order: u64,
    cache_factory: Arc<dyn CacheFactory>,
    context_factory: Arc<dyn ContextFactory>,
    injector_factory: Arc<dyn InjectorFactory>,
}

impl ScopeDefinition {
    /// Resolve a raw configuration against an optional base definition.
    ///
    /// `order` is the registration-order value allocated by the caller
    /// for this definition. Fails with [`Error::Config`] when the name
    /// is missing or not a valid identifier.
    pub fn resolve(
        raw: &RawScopeConfig,
        strategies: ScopeStrategies,
        base: Option<&ScopeDefinition>,
        order: u64,
    ) -> Result<Self> {
        let name = match (&raw.name, base) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(base)) => base.name.clone(),
            (None, None) => return Err(Error::config("scope name is required")),
        };
        validate_scope_name(&name)?;

        let is_abstract = raw.abstract_.unwrap_or(false);
        let priority = raw
            .priority
            .or_else(|| base.map(|b| b.priority))
            .unwrap_or(DEFAULT_PRIORITY);
        let embedded = raw
            .embedded
            .or_else(|| base.map(|b| b.embedded))
            .unwrap_or(false);
        let implicit = raw
            .implicit
            .or_else(|| base.map(|b| b.implicit))
            .unwrap_or(false);

        let depends = Self::resolve_depends(&name, raw, base, embedded);

        let cache_factory = strategies
            .cache_factory
            .or_else(|| base.map(|b| b.cache_factory.clone()))
            .unwrap_or_else(|| Arc::new(DefaultCacheFactory));
        let context_factory = strategies
            .context_factory
            .or_else(|| base.map(|b| b.context_factory.clone()))
            .unwrap_or_else(|| Arc::new(DefaultContextFactory));
        let injector_factory = strategies
            .injector_factory
            .or_else(|| base.map(|b| b.injector_factory.clone()))
            .unwrap_or_else(|| Arc::new(DefaultInjectorFactory));

        Ok(Self {
            name,
            is_abstract,
            priority,
            embedded,
            implicit,
            depends,
            registration_order: order,
            cache_factory,
            context_factory,
            injector_factory,
        })
    }

    /// Build the ordered, deduplicated dependency-name list.
    ///
    /// The seen set starts with the scope's own name, plus the sentinels
    /// when the scope is embedded. Non-embedded scopes get the sentinels
    /// re-appended at the end so they stay the trailing dependencies no
    /// matter where the explicit list mentions them.
    fn resolve_depends(
        name: &str,
        raw: &RawScopeConfig,
        base: Option<&ScopeDefinition>,
        embedded: bool,
    ) -> Vec<String> {
        let mut seen: Vec<String> = vec![name.to_string()];
        if embedded {
            seen.extend(SENTINEL_SCOPES.iter().map(|s| (*s).to_string()));
        }

        let candidates: Vec<String> = match (&raw.depends, base) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(base)) => base.depends.clone(),
            (None, None) => Vec::new(),
        };

        let mut ordered: Vec<String> = Vec::with_capacity(candidates.len() + 2);
        for candidate in &candidates {
            if !embedded && SENTINEL_SCOPES.contains(&candidate.as_str()) {
                continue;
            }
            if seen.iter().any(|s| s == candidate) {
                continue;
            }
            seen.push(candidate.clone());
            ordered.push(candidate.clone());
        }
        if !embedded {
            for sentinel in SENTINEL_SCOPES {
                if seen.iter().any(|s| s == sentinel) {
                    continue;
                }
                seen.push(sentinel.to_string());
                ordered.push(sentinel.to_string());
            }
        }
        ordered
    }

    /// Build a catalog definition directly, with default strategies.
    ///
    /// Only for the registry's built-in scopes, whose names are known
    /// valid. Dependency names run through the same resolution as
    /// [`resolve`](Self::resolve).
    pub(crate) fn prefab(
        name: &str,
        priority: i32,
        embedded: bool,
        implicit: bool,
        is_abstract: bool,
        depends: &[&str],
        order: u64,
    ) -> Self {
        let raw = RawScopeConfig::new(name).with_depends(depends.iter().copied());
        let depends = Self::resolve_depends(name, &raw, None, embedded);
        Self {
            name: name.to_string(),
            is_abstract,
            priority,
            embedded,
            implicit,
            depends,
            registration_order: order,
            cache_factory: Arc::new(DefaultCacheFactory),
            context_factory: Arc::new(DefaultContextFactory),
            injector_factory: Arc::new(DefaultInjectorFactory),
        }
    }

    /// Scope name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this definition only serves as a base for others
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Merge priority
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether this scope merges into consumers instead of owning an injector
    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// Whether this scope was auto-admitted without explicit definition
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    /// Ordered dependency scope names
    pub fn depends(&self) -> &[String] {
        &self.depends
    }

    /// Monotonic registration order, breaks priority ties
    pub fn registration_order(&self) -> u64 {
        self.registration_order
    }

    /// Cache factory strategy
    pub fn cache_factory(&self) -> &Arc<dyn CacheFactory> {
        &self.cache_factory
    }

    /// Context factory strategy
    pub fn context_factory(&self) -> &Arc<dyn ContextFactory> {
        &self.context_factory
    }

    /// Injector factory strategy
    pub fn injector_factory(&self) -> &Arc<dyn InjectorFactory> {
        &self.injector_factory
    }

    /// Total-order sort key: higher priority first, earlier registration first
    pub fn sort_key(&self) -> (Reverse<i32>, u64) {
        (Reverse(self.priority), self.registration_order)
    }
}

impl fmt::Debug for ScopeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeDefinition")
            .field("name", &self.name)
            .field("abstract", &self.is_abstract)
            .field("priority", &self.priority)
            .field("embedded", &self.embedded)
            .field("implicit", &self.implicit)
            .field("depends", &self.depends)
            .field("registration_order", &self.registration_order)
            .finish()
    }
}

impl fmt::Display for ScopeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
