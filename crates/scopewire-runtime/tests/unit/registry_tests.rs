//! Scope Registry Tests
//!
//! Tests for definition registration, instance caching, auto-admission,
//! provider bookkeeping and the root injector.

use std::sync::Arc;
use std::thread;

use scopewire_domain::constants::{
    IMPLICIT_PRIORITY, SCOPE_ANY, SCOPE_CONSOLE, SCOPE_IMPLICIT, SCOPE_LOCAL, SCOPE_MAIN,
    SCOPE_REQUEST,
};
use scopewire_domain::{Error, InjectKey, RawScopeConfig, Value};
use scopewire_runtime::config::{RuntimeConfig, ScopeSettings};
use scopewire_runtime::injector::Injector;
use scopewire_runtime::provide::ValueProvider;
use scopewire_runtime::registry::ScopeRegistry;

fn value(text: &str) -> Value {
    Arc::new(text.to_string())
}

// ============================================================================
// Built-in Catalog
// ============================================================================

#[test]
fn test_builtin_catalog_seeded() {
    let registry = ScopeRegistry::new();
    for name in [
        SCOPE_IMPLICIT,
        SCOPE_ANY,
        SCOPE_MAIN,
        SCOPE_LOCAL,
        SCOPE_CONSOLE,
        SCOPE_REQUEST,
    ] {
        assert!(registry.is_defined(name), "missing built-in scope '{name}'");
    }
}

#[test]
fn test_builtin_request_depends_end_with_main() {
    let registry = ScopeRegistry::new();
    let request = registry.get(SCOPE_REQUEST).unwrap();
    let names: Vec<&str> = request
        .definition()
        .depends()
        .iter()
        .map(String::as_str)
        .collect();

    assert_eq!(names, [SCOPE_LOCAL, SCOPE_ANY, SCOPE_MAIN]);
}

#[test]
fn test_builtin_main_depends_only_on_any() {
    let registry = ScopeRegistry::new();
    let main = registry.get(SCOPE_MAIN).unwrap();
    let names: Vec<&str> = main
        .definition()
        .depends()
        .iter()
        .map(String::as_str)
        .collect();

    assert_eq!(names, [SCOPE_ANY]);
}

// ============================================================================
// Definition Registration
// ============================================================================

#[test]
fn test_define_returns_resolved_definition() {
    let registry = ScopeRegistry::new();
    let definition = registry
        .define(RawScopeConfig::new("worker").with_priority(4))
        .unwrap();

    assert_eq!(definition.name(), "worker");
    assert_eq!(definition.priority(), 4);
    assert!(registry.is_defined("worker"));
}

#[test]
fn test_define_duplicate_rejected() {
    let registry = ScopeRegistry::new();
    registry.define(RawScopeConfig::new("worker")).unwrap();
    let result = registry.define(RawScopeConfig::new("worker"));

    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn test_define_unknown_base_rejected() {
    let registry = ScopeRegistry::new();
    let result = registry.define(RawScopeConfig::new("worker").with_base("missing"));

    assert!(matches!(result, Err(Error::UnknownScope { name }) if name == "missing"));
}

#[test]
fn test_define_invalid_depend_name_rejected() {
    let registry = ScopeRegistry::new();
    let result = registry.define(RawScopeConfig::new("worker").with_depends(["not a name"]));

    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn test_define_rejected_once_instance_exists() {
    let registry = ScopeRegistry::new();
    // Auto-admission creates an instance without a definition.
    registry.get("ghost").unwrap();
    let result = registry.define(RawScopeConfig::new("ghost"));

    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn test_define_with_base_inherits_depends() {
    let registry = ScopeRegistry::new();
    registry
        .define(
            RawScopeConfig::new("service")
                .with_priority(4)
                .with_depends([SCOPE_LOCAL]),
        )
        .unwrap();
    let other = registry
        .define(RawScopeConfig::new("other").with_base("service"))
        .unwrap();

    assert_eq!(other.priority(), 4);
    let names: Vec<&str> = other.depends().iter().map(String::as_str).collect();
    assert_eq!(names, [SCOPE_LOCAL, SCOPE_ANY, SCOPE_MAIN]);
}

#[test]
fn test_base_name_reuse_rejected_without_new_name() {
    let registry = ScopeRegistry::new();
    registry.define(RawScopeConfig::new("service")).unwrap();
    // Without an explicit name the definition inherits "service", which
    // is already taken.
    let result = registry.define(RawScopeConfig::default().with_base("service"));

    assert!(matches!(result, Err(Error::Config { .. })));
}

// ============================================================================
// Instances
// ============================================================================

#[test]
fn test_get_memoizes_instance() {
    let registry = ScopeRegistry::new();
    let first = registry.get(SCOPE_CONSOLE).unwrap();
    let second = registry.get(SCOPE_CONSOLE).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_concurrent_get_constructs_one_instance() {
    let registry = ScopeRegistry::new();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || registry.get(SCOPE_CONSOLE).unwrap())
        })
        .collect();

    let instances: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    for instance in &instances[1..] {
        assert!(Arc::ptr_eq(&instances[0], instance));
    }
}

#[test]
fn test_get_abstract_scope_rejected() {
    let registry = ScopeRegistry::new();
    let result = registry.get(SCOPE_IMPLICIT);

    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn test_get_unknown_name_auto_admits() {
    let registry = ScopeRegistry::new();
    let ghost = registry.get("ghost").unwrap();
    let definition = ghost.definition();

    assert!(definition.is_embedded());
    assert!(definition.is_implicit());
    assert!(!definition.is_abstract());
    assert_eq!(definition.priority(), IMPLICIT_PRIORITY);
    assert!(definition.depends().is_empty());
    // Auto-admission never adds a definition.
    assert!(!registry.is_defined("ghost"));
}

#[test]
fn test_get_invalid_name_rejected() {
    let registry = ScopeRegistry::new();

    assert!(registry.get("2fast").is_err());
    assert!(registry.get("").is_err());
}

// ============================================================================
// Providers
// ============================================================================

#[test]
fn test_provide_unknown_scope_rejected() {
    let registry = ScopeRegistry::new();
    let provider = ValueProvider::new(InjectKey::named("db"), "missing", value("db"));
    let result = registry.provide(Arc::new(provider));

    assert!(matches!(result, Err(Error::UnknownScope { name }) if name == "missing"));
}

#[test]
fn test_provide_accepts_auto_admitted_scope() {
    let registry = ScopeRegistry::new();
    registry.get("ghost").unwrap();
    let provider = ValueProvider::new(InjectKey::named("db"), "ghost", value("db"));

    assert!(registry.provide(Arc::new(provider)).is_ok());
}

#[test]
fn test_provide_after_stack_built_is_inert() {
    let registry = ScopeRegistry::new();
    let request = registry.get(SCOPE_REQUEST).unwrap();
    let key = InjectKey::named("db");

    // Force the stack build with a miss, then register the provider.
    assert!(request.resolver(&key).unwrap().is_none());
    let provider = ValueProvider::new(key.clone(), SCOPE_REQUEST, value("db"));
    registry.provide(Arc::new(provider)).unwrap();

    assert!(request.resolver(&key).unwrap().is_none());
}

// ============================================================================
// Root Injector and Reset
// ============================================================================

#[test]
fn test_root_injector_memoized_and_active() {
    let registry = ScopeRegistry::new();
    let first = registry.root_injector().unwrap();
    let second = registry.root_injector().unwrap();

    assert!(Injector::ptr_eq(&first, &second));
    assert_eq!(first.scope_name(), SCOPE_MAIN);
    assert_eq!(first.depth(), 1);
    assert!(first.parent().is_none());
    assert!(first.is_active());
}

#[test]
fn test_reset_disposes_root_and_drops_instances() {
    let registry = ScopeRegistry::new();
    let root = registry.root_injector().unwrap();
    let console = registry.get(SCOPE_CONSOLE).unwrap();

    registry.reset().unwrap();

    assert!(!root.is_active());
    assert!(registry.is_defined(SCOPE_CONSOLE));
    let fresh = registry.get(SCOPE_CONSOLE).unwrap();
    assert!(!Arc::ptr_eq(&console, &fresh));

    // A new root is created on demand after reset.
    let new_root = registry.root_injector().unwrap();
    assert!(!Injector::ptr_eq(&root, &new_root));
    assert!(new_root.is_active());
}

// ============================================================================
// Settings and Introspection
// ============================================================================

#[test]
fn test_apply_settings_defines_scopes() {
    let registry = ScopeRegistry::new();
    let mut config = RuntimeConfig::default();
    config.scopes.insert(
        "worker".to_string(),
        ScopeSettings {
            priority: Some(3),
            depends: Some(vec![SCOPE_LOCAL.to_string()]),
            ..ScopeSettings::default()
        },
    );

    registry.apply_settings(&config).unwrap();

    assert!(registry.is_defined("worker"));
    let worker = registry.get("worker").unwrap();
    assert_eq!(worker.definition().priority(), 3);
}

#[test]
fn test_scope_names_sorted() {
    let registry = ScopeRegistry::new();
    registry.define(RawScopeConfig::new("zeta")).unwrap();
    registry.define(RawScopeConfig::new("alpha")).unwrap();

    let names = registry.scope_names();
    let mut sorted = names.clone();
    sorted.sort();

    assert_eq!(names, sorted);
    assert!(names.contains(&"alpha".to_string()));
    assert!(names.contains(&"zeta".to_string()));
}
