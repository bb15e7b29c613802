//! Priority-ordered provider stacks
//!
//! A [`ProviderStack`] maps each abstract key to its single winning
//! provider. Stacks are built by merging the provider sets of a scope's
//! embedded dependencies and then overlaying the scope's own providers.
//! An incoming provider replaces the current winner when the key is
//! absent or its priority is greater than or equal to the current one,
//! so the later merge wins priority ties.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use scopewire_domain::{InjectKey, Provider};

/// Key-to-winning-provider mapping with recorded insertion order
pub struct ProviderStack {
    entries: IndexMap<InjectKey, Arc<dyn Provider>>,
}

impl ProviderStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Insert one provider, applying the replacement policy
    pub fn push(&mut self, provider: Arc<dyn Provider>) {
        let key = provider.key();
        match self.entries.get(&key) {
            Some(existing) if provider.priority() < existing.priority() => {}
            _ => {
                self.entries.insert(key, provider);
            }
        }
    }

    /// Merge every entry of `other` into this stack, in `other`'s order
    pub fn merge(&mut self, other: &ProviderStack) {
        for provider in other.entries.values() {
            self.push(Arc::clone(provider));
        }
    }

    /// Winning provider for `key`, if any
    pub fn get(&self, key: &InjectKey) -> Option<&Arc<dyn Provider>> {
        self.entries.get(key)
    }

    /// Whether `key` has a winning provider
    pub fn contains(&self, key: &InjectKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&InjectKey, &Arc<dyn Provider>)> {
        self.entries.iter()
    }

    /// Number of keys with a winning provider
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack holds no providers
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ProviderStack {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProviderStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, provider) in &self.entries {
            map.entry(
                &format_args!("{key}"),
                &format_args!("{}@{}", provider.scope(), provider.priority()),
            );
        }
        map.finish()
    }
}
