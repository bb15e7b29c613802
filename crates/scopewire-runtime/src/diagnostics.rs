//! Registry and scope diagnostics
//!
//! Serializable snapshots of the registry state for logging and
//! operational inspection. Reports never force lazy computation:
//! provider entries appear only for scopes whose stacks were already
//! built, and uninstantiated definitions report with zeroed runtime
//! state.

use scopewire_domain::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::registry::ScopeRegistry;

/// One merged provider-stack entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderReport {
    /// Abstract key the provider satisfies
    pub key: String,
    /// Owning scope name
    pub scope: String,
    /// Merge priority
    pub priority: i32,
}

/// Snapshot of one known scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeReport {
    /// Scope name
    pub name: String,
    /// Merge priority
    pub priority: i32,
    /// Embedded flag
    pub embedded: bool,
    /// Implicit flag
    pub implicit: bool,
    /// Abstract flag
    #[serde(rename = "abstract")]
    pub abstract_: bool,
    /// Whether an explicit definition exists (false for auto-admitted scopes)
    pub defined: bool,
    /// Whether a scope instance has been created
    pub instantiated: bool,
    /// Registration order of the definition
    pub registration_order: u64,
    /// Ready order of the instance, 0 while unprepared or uninstantiated
    pub ready_order: u64,
    /// Resolved dependency names in declaration order
    pub depends: Vec<String>,
    /// Merged stack entries, present only when the stack was built
    pub providers: Vec<ProviderReport>,
}

/// Snapshot of a whole registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryReport {
    /// Every known scope, sorted by name
    pub scopes: Vec<ScopeReport>,
}

impl RegistryReport {
    /// Serialize the report as a JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| Error::internal(format!("failed to serialize registry report: {err}")))
    }
}

impl ScopeRegistry {
    /// Build a snapshot of every known scope
    pub fn report(&self) -> RegistryReport {
        let shared = self.shared();
        let mut scopes = Vec::new();
        for name in shared.known_names() {
            let instance = shared.instance_of(&name);
            let explicit = shared.definition_of(&name);
            let defined = explicit.is_some();
            let definition = match explicit
                .or_else(|| instance.as_ref().map(|i| i.definition().clone()))
            {
                Some(definition) => definition,
                None => continue,
            };

            let providers = instance
                .as_ref()
                .and_then(|i| i.providers_if_built())
                .map(|stack| {
                    stack
                        .iter()
                        .map(|(key, provider)| ProviderReport {
                            key: key.to_string(),
                            scope: provider.scope().to_string(),
                            priority: provider.priority(),
                        })
                        .collect()
                })
                .unwrap_or_default();

            scopes.push(ScopeReport {
                name: definition.name().to_string(),
                priority: definition.priority(),
                embedded: definition.is_embedded(),
                implicit: definition.is_implicit(),
                abstract_: definition.is_abstract(),
                defined,
                instantiated: instance.is_some(),
                registration_order: definition.registration_order(),
                ready_order: instance.as_ref().map_or(0, |i| i.ready_order()),
                depends: definition.depends().to_vec(),
                providers,
            });
        }
        RegistryReport { scopes }
    }
}
