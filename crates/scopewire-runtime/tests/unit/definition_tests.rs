//! Scope Definition Resolution Tests
//!
//! Tests for the explicit / base / default field resolution and the
//! dependency-list normalization rules.

use std::sync::Arc;

use scopewire_domain::{Error, InjectKey, RawScopeConfig};
use scopewire_runtime::definition::{ScopeDefinition, ScopeStrategies};
use scopewire_runtime::factory::CacheFactory;
use scopewire_runtime::injector::ContentMap;

fn resolve(raw: RawScopeConfig, base: Option<&ScopeDefinition>, order: u64) -> ScopeDefinition {
    ScopeDefinition::resolve(&raw, ScopeStrategies::new(), base, order).unwrap()
}

fn depend_names(definition: &ScopeDefinition) -> Vec<&str> {
    definition.depends().iter().map(String::as_str).collect()
}

// ============================================================================
// Field Resolution
// ============================================================================

#[test]
fn test_defaults_applied_without_base() {
    let definition = resolve(RawScopeConfig::new("worker"), None, 7);

    assert_eq!(definition.name(), "worker");
    assert_eq!(definition.priority(), 1);
    assert!(!definition.is_embedded());
    assert!(!definition.is_implicit());
    assert!(!definition.is_abstract());
    assert_eq!(definition.registration_order(), 7);
}

#[test]
fn test_explicit_fields_override_base() {
    let base = resolve(
        RawScopeConfig::new("base")
            .with_priority(5)
            .with_embedded(true),
        None,
        1,
    );
    let definition = resolve(
        RawScopeConfig::new("worker")
            .with_priority(9)
            .with_embedded(false),
        Some(&base),
        2,
    );

    assert_eq!(definition.priority(), 9);
    assert!(!definition.is_embedded());
}

#[test]
fn test_unset_fields_inherit_from_base() {
    let base = resolve(
        RawScopeConfig::new("base")
            .with_priority(5)
            .with_embedded(true)
            .with_implicit(true),
        None,
        1,
    );
    let definition = resolve(RawScopeConfig::new("worker"), Some(&base), 2);

    assert_eq!(definition.priority(), 5);
    assert!(definition.is_embedded());
    assert!(definition.is_implicit());
}

#[test]
fn test_abstract_never_inherited_from_base() {
    let base = resolve(RawScopeConfig::new("base").with_abstract(true), None, 1);
    let definition = resolve(RawScopeConfig::new("worker"), Some(&base), 2);

    assert!(base.is_abstract());
    assert!(!definition.is_abstract());
}

#[test]
fn test_name_inherited_from_base_when_unset() {
    let base = resolve(RawScopeConfig::new("base"), None, 1);
    let raw = RawScopeConfig::default().with_priority(3);
    let definition = resolve(raw, Some(&base), 2);

    assert_eq!(definition.name(), "base");
    assert_eq!(definition.priority(), 3);
}

#[test]
fn test_name_required_without_base() {
    let result =
        ScopeDefinition::resolve(&RawScopeConfig::default(), ScopeStrategies::new(), None, 1);

    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn test_invalid_name_rejected() {
    for bad in ["", "2fast", "has space", "dash-ed"] {
        let result = ScopeDefinition::resolve(
            &RawScopeConfig::new(bad),
            ScopeStrategies::new(),
            None,
            1,
        );
        assert!(result.is_err(), "name '{bad}' should be rejected");
    }
}

// ============================================================================
// Dependency Normalization
// ============================================================================

#[test]
fn test_non_embedded_gains_trailing_sentinels() {
    let definition = resolve(RawScopeConfig::new("job"), None, 1);

    assert_eq!(depend_names(&definition), ["any", "main"]);
}

#[test]
fn test_embedded_with_no_depends_stays_empty() {
    let definition = resolve(RawScopeConfig::new("part").with_embedded(true), None, 1);

    assert!(definition.depends().is_empty());
}

#[test]
fn test_embedded_drops_sentinel_mentions() {
    let definition = resolve(
        RawScopeConfig::new("part")
            .with_embedded(true)
            .with_depends(["any", "db", "main"]),
        None,
        1,
    );

    assert_eq!(depend_names(&definition), ["db"]);
}

#[test]
fn test_sentinels_moved_to_end_of_explicit_list() {
    let definition = resolve(
        RawScopeConfig::new("job").with_depends(["main", "db", "any", "cache"]),
        None,
        1,
    );

    assert_eq!(depend_names(&definition), ["db", "cache", "any", "main"]);
}

#[test]
fn test_own_name_excluded_from_depends() {
    let definition = resolve(
        RawScopeConfig::new("job").with_depends(["job", "db"]),
        None,
        1,
    );

    assert_eq!(depend_names(&definition), ["db", "any", "main"]);
}

#[test]
fn test_duplicate_depends_keep_first_position() {
    let definition = resolve(
        RawScopeConfig::new("job").with_depends(["db", "cache", "db"]),
        None,
        1,
    );

    assert_eq!(depend_names(&definition), ["db", "cache", "any", "main"]);
}

#[test]
fn test_depends_inherited_from_base_resolved_list() {
    let base = resolve(RawScopeConfig::new("base").with_depends(["db"]), None, 1);
    assert_eq!(depend_names(&base), ["db", "any", "main"]);

    // Non-embedded child inherits the resolved list unchanged.
    let child = resolve(RawScopeConfig::new("job"), Some(&base), 2);
    assert_eq!(depend_names(&child), ["db", "any", "main"]);

    // Embedded child inherits the same candidates but sheds the sentinels.
    let embedded = resolve(
        RawScopeConfig::new("part").with_embedded(true),
        Some(&base),
        3,
    );
    assert_eq!(depend_names(&embedded), ["db"]);
}

#[test]
fn test_explicit_empty_depends_overrides_base() {
    let base = resolve(RawScopeConfig::new("base").with_depends(["db"]), None, 1);
    let child = resolve(
        RawScopeConfig::new("job").with_depends(Vec::<String>::new()),
        Some(&base),
        2,
    );

    assert_eq!(depend_names(&child), ["any", "main"]);
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_sort_key_orders_priority_desc_then_registration_asc() {
    let a = resolve(RawScopeConfig::new("a").with_priority(5), None, 10);
    let b = resolve(RawScopeConfig::new("b").with_priority(5), None, 20);
    let c = resolve(RawScopeConfig::new("c").with_priority(3), None, 1);

    let mut definitions = vec![c, b, a];
    definitions.sort_by_key(ScopeDefinition::sort_key);
    let names: Vec<&str> = definitions.iter().map(ScopeDefinition::name).collect();

    assert_eq!(names, ["a", "b", "c"]);
}

// ============================================================================
// Strategies
// ============================================================================

struct SeededCacheFactory;

impl CacheFactory for SeededCacheFactory {
    fn create_cache(&self) -> ContentMap {
        let mut cache = ContentMap::new();
        cache.insert(InjectKey::named("seed"), None);
        cache
    }
}

#[test]
fn test_explicit_cache_factory_used() {
    let strategies = ScopeStrategies::new().with_cache_factory(Arc::new(SeededCacheFactory));
    let definition =
        ScopeDefinition::resolve(&RawScopeConfig::new("worker"), strategies, None, 1).unwrap();

    let cache = definition.cache_factory().create_cache();
    assert!(cache.contains_key(&InjectKey::named("seed")));
}

#[test]
fn test_cache_factory_inherited_from_base() {
    let strategies = ScopeStrategies::new().with_cache_factory(Arc::new(SeededCacheFactory));
    let base =
        ScopeDefinition::resolve(&RawScopeConfig::new("base"), strategies, None, 1).unwrap();
    let child = resolve(RawScopeConfig::new("worker"), Some(&base), 2);

    let cache = child.cache_factory().create_cache();
    assert!(cache.contains_key(&InjectKey::named("seed")));
}

#[test]
fn test_default_cache_factory_builds_empty_cache() {
    let definition = resolve(RawScopeConfig::new("worker"), None, 1);

    assert!(definition.cache_factory().create_cache().is_empty());
}
