//! Injection keys and resolved values
//!
//! Providers satisfy abstract keys, not concrete implementations. A key is
//! either a Rust type, an arbitrary name, or one of the two injector keys
//! used by scope bootstrap: the generic "my scope's injector" key and the
//! per-scope injector key that bootstrap seeds eagerly.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

/// A resolved value as stored in injector caches
pub type Value = Arc<dyn Any + Send + Sync>;

/// Abstract key satisfied by a provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InjectKey {
    /// Keyed by a Rust type
    Type {
        /// Type identity
        id: TypeId,
        /// Type name, kept for diagnostics only
        name: &'static str,
    },
    /// Keyed by an arbitrary capability name
    Named(String),
    /// The generic injector key, satisfied in every scope by the synthetic
    /// alias provider
    Injector,
    /// A specific scope's own injector, seeded at bootstrap
    ScopeInjector(String),
}

impl InjectKey {
    /// Key for the Rust type `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Type {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Key for a string-addressed capability
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self::Named(name.into())
    }

    /// Key for the injector owned by `scope`
    pub fn scope_injector<S: Into<String>>(scope: S) -> Self {
        Self::ScopeInjector(scope.into())
    }
}

impl fmt::Display for InjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { name, .. } => write!(f, "type:{name}"),
            Self::Named(name) => write!(f, "named:{name}"),
            Self::Injector => write!(f, "injector"),
            Self::ScopeInjector(scope) => write!(f, "injector:{scope}"),
        }
    }
}

/// Downcast a resolved value to a concrete `Arc<T>`
///
/// Returns `None` when the value holds a different type.
pub fn downcast<T: Send + Sync + 'static>(value: Value) -> Option<Arc<T>> {
    value.downcast::<T>().ok()
}
