//! Domain layer constants
//!
//! Reserved scope names and the priority values used by definition
//! resolution. Runtime-specific constants (env prefix, config file names)
//! live in `scopewire-runtime/src/constants.rs`.

// ============================================================================
// RESERVED SCOPE NAMES
// ============================================================================

/// Abstract base definition for auto-admitted scopes
pub const SCOPE_IMPLICIT: &str = "implicit";

/// Sentinel scope merged into every non-embedded scope
pub const SCOPE_ANY: &str = "any";

/// Root scope; its injector heads every injector chain
pub const SCOPE_MAIN: &str = "main";

/// Embedded helper scope used by the built-in `console` and `request` scopes
pub const SCOPE_LOCAL: &str = "local";

/// Built-in scope for interactive console contexts
pub const SCOPE_CONSOLE: &str = "console";

/// Built-in scope for request-shaped units of work
pub const SCOPE_REQUEST: &str = "request";

/// Sentinel dependencies appended, in this order, to every non-embedded scope
pub const SENTINEL_SCOPES: [&str; 2] = [SCOPE_ANY, SCOPE_MAIN];

// ============================================================================
// PRIORITIES
// ============================================================================

/// Priority assigned when neither the raw config nor its base sets one
pub const DEFAULT_PRIORITY: i32 = 1;

/// Priority of the abstract `implicit` base (and of auto-admitted scopes)
pub const IMPLICIT_PRIORITY: i32 = -1;

/// Priority of the synthetic injector alias provider; loses every contest
pub const INJECTOR_ALIAS_PRIORITY: i32 = i32::MIN;
