//! Value objects for scope registration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Raw, partial configuration for one scope, as supplied at registration
///
/// Unset fields inherit from the definition named by `base` and then fall
/// back to global defaults when the registry resolves the definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawScopeConfig {
    /// Scope name; required unless inherited from `base`
    pub name: Option<String>,

    /// Name of the base definition unset fields inherit from
    pub base: Option<String>,

    /// Abstract definitions only serve as bases and cannot be instantiated
    #[serde(rename = "abstract")]
    pub abstract_: Option<bool>,

    /// Merge priority; higher sorts first among dependencies
    pub priority: Option<i32>,

    /// Embedded scopes merge their providers into the consuming scope's
    /// stack instead of requiring an injector of their own
    pub embedded: Option<bool>,

    /// Implicit scopes are auto-admitted when referenced without an
    /// explicit definition
    pub implicit: Option<bool>,

    /// Ordered names of depended-on scopes
    pub depends: Option<Vec<String>>,
}

impl RawScopeConfig {
    /// Start a configuration for scope `name`
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Inherit unset fields from the definition named `base`
    pub fn with_base<S: Into<String>>(mut self, base: S) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Mark this definition abstract (base-only)
    pub fn with_abstract(mut self, value: bool) -> Self {
        self.abstract_ = Some(value);
        self
    }

    /// Set the merge priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the embedded flag
    pub fn with_embedded(mut self, embedded: bool) -> Self {
        self.embedded = Some(embedded);
        self
    }

    /// Set the implicit flag
    pub fn with_implicit(mut self, implicit: bool) -> Self {
        self.implicit = Some(implicit);
        self
    }

    /// Set the dependency list
    pub fn with_depends<I, S>(mut self, depends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends = Some(depends.into_iter().map(Into::into).collect());
        self
    }
}

/// Validate a scope or dependency name
///
/// Names follow identifier rules: non-empty, first character alphabetic or
/// underscore, remaining characters alphanumeric or underscore. Fails with
/// a configuration error before anything reaches the registry tables.
pub fn validate_scope_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::config(format!(
            "scope name must be a valid identifier, got '{name}'"
        )))
    }
}
