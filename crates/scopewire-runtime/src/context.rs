//! Scoped resource release and unit-of-work contexts
//!
//! An [`ExitStack`] collects labeled release callbacks and runs them in
//! strict reverse registration order. Release never stops early: every
//! callback runs on every disposal path, and failures are aggregated
//! into a single [`Error::Cleanup`](scopewire_domain::Error::Cleanup).
//!
//! An [`InjectorContext`] wraps one injector for one unit of work:
//! construction bootstraps the injector, `close()` disposes it and
//! surfaces errors, and `Drop` disposes as a safety net.

use std::fmt;
use std::sync::Mutex;

use scopewire_domain::{Error, Result};

use crate::injector::Injector;
use crate::locks::lock_mutex;

/// Release callback registered on an [`ExitStack`]
pub type ExitHook = Box<dyn FnOnce() -> Result<()> + Send>;

/// Reverse-order resource release stack
pub struct ExitStack {
    hooks: Mutex<Vec<(String, ExitHook)>>,
}

impl ExitStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self {
            hooks: Mutex::new(Vec::new()),
        }
    }

    /// Register a release callback, run after all later registrations
    pub fn defer<S, F>(&self, label: S, hook: F) -> Result<()>
    where
        S: Into<String>,
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let mut hooks = lock_mutex(&self.hooks, "exit stack")?;
        hooks.push((label.into(), Box::new(hook)));
        Ok(())
    }

    /// Number of callbacks still registered
    pub fn pending(&self) -> Result<usize> {
        Ok(lock_mutex(&self.hooks, "exit stack")?.len())
    }

    /// Run every registered callback in reverse registration order.
    ///
    /// A failing callback never skips the remaining ones; all failures
    /// are reported together. Releasing an empty stack is a no-op, so
    /// repeated release is safe.
    pub fn release_all(&self) -> Result<()> {
        let mut hooks = {
            let mut guard = lock_mutex(&self.hooks, "exit stack")?;
            std::mem::take(&mut *guard)
        };
        if hooks.is_empty() {
            return Ok(());
        }
        tracing::debug!(hooks = hooks.len(), "releasing exit stack");
        let mut failures = Vec::new();
        while let Some((label, hook)) = hooks.pop() {
            if let Err(err) = hook() {
                tracing::warn!(hook = %label, error = %err, "exit hook failed");
                failures.push(format!("{label}: {err}"));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::cleanup("exit stack release failed", failures))
        }
    }
}

impl Default for ExitStack {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExitStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self.hooks.try_lock().map(|guard| guard.len()).unwrap_or(0);
        f.debug_struct("ExitStack").field("pending", &pending).finish()
    }
}

/// RAII guard over one injector's unit of work.
///
/// Contexts created by [`InjectorContext::new`] own disposal of their
/// injector; contexts created by [`InjectorContext::adopt`] wrap an
/// injector someone else owns (an already-covering parent) and leave it
/// untouched on close.
pub struct InjectorContext {
    injector: Injector,
    owned: bool,
    closed: bool,
}

impl InjectorContext {
    /// Bootstrap `injector` and take ownership of its disposal
    pub fn new(injector: Injector) -> Result<Self> {
        injector.scope().bootstrap(&injector)?;
        Ok(Self {
            injector,
            owned: true,
            closed: false,
        })
    }

    /// Wrap an injector without bootstrapping or owning it
    pub fn adopt(injector: Injector) -> Self {
        Self {
            injector,
            owned: false,
            closed: false,
        }
    }

    /// The wrapped injector
    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    /// Dispose the injector (when owned) and surface any release failure
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        if self.owned { self.injector.dispose() } else { Ok(()) }
    }
}

impl Drop for InjectorContext {
    fn drop(&mut self) {
        if self.closed || !self.owned {
            return;
        }
        if let Err(err) = self.injector.dispose() {
            tracing::error!(
                scope = %self.injector.scope_name(),
                error = %err,
                "failed to dispose injector context on drop"
            );
        }
    }
}

impl fmt::Debug for InjectorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectorContext")
            .field("injector", &self.injector)
            .field("owned", &self.owned)
            .finish()
    }
}
