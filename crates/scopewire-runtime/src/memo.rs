//! Guarded one-shot memoization primitives
//!
//! [`Memo`] caches a single value computed at most once even under
//! concurrent callers. [`MemoMap`] does the same per key. Both back the
//! lazy caches of the registry and scope instances: scope lookups,
//! dependency lists, merged provider stacks, and resolver templates.

use std::fmt;
use std::hash::Hash;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use once_cell::sync::OnceCell;
use scopewire_domain::Result;

/// Compute-once cell.
///
/// The init closure runs at most once per cell. A failed init leaves the
/// cell empty, so a later caller retries with a fresh closure.
pub struct Memo<T> {
    cell: OnceCell<T>,
}

impl<T> Memo<T> {
    /// Create an empty cell
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Return the cached value, computing it with `init` when absent
    pub fn get_or_try_init<F>(&self, init: F) -> Result<&T>
    where
        F: FnOnce() -> Result<T>,
    {
        self.cell.get_or_try_init(init)
    }

    /// Return the cached value without computing
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo").field("value", &self.cell.get()).finish()
    }
}

/// Keyed compute-once map.
///
/// Concurrent callers for the same key observe exactly one init run; the
/// entry stays locked while init executes. Init closures must not access
/// this map again, for any key.
pub struct MemoMap<K, V> {
    entries: DashMap<K, V>,
}

impl<K, V> MemoMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Return the memoized value for `key`, computing it with `init` when absent
    pub fn get_or_try_insert<F>(&self, key: K, init: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let value = init()?;
                entry.insert(value.clone());
                Ok(value)
            }
        }
    }

    /// Return the memoized value for `key` without computing
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: std::hash::Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Snapshot of the memoized keys
    pub fn keys(&self) -> Vec<K> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Drop every memoized entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of memoized entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for MemoMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> fmt::Debug for MemoMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoMap").field("len", &self.entries.len()).finish()
    }
}
