//! Error types for hearth-core

use crate::guard::GuardError;
use crate::loader::LoadError;
use thiserror::Error;

/// Result type alias for navigation operations
pub type Result<T> = std::result::Result<T, NavigationError>;

/// Runtime navigation failures.
///
/// Every variant is returned as a structured result to the navigation
/// layer; guard and loader failures stay distinguishable from a plain
/// blocked or unmatched outcome. Configuration mistakes are not here -
/// they surface as [`hearth_router::BuildError`] at table construction.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// No entry matches the requested path; the caller renders a fallback
    #[error("no route matches {path:?}")]
    NotFound { path: String },

    /// A guard rejected the navigation
    #[error("navigation into {route:?} blocked by guard")]
    Blocked { route: String },

    /// A guard errored, which is not the same as rejecting
    #[error("guard on {route:?} failed")]
    GuardFailed {
        route: String,
        #[source]
        source: GuardError,
    },

    /// The runtime redirect bound was exceeded; the table is misconfigured
    #[error("redirect limit of {limit} exceeded while resolving {path:?}")]
    RedirectLoop { path: String, limit: usize },

    /// The lazy view loader failed (network or module error)
    #[error("failed to load view for {route:?}")]
    LoadFailed {
        route: String,
        #[source]
        source: LoadError,
    },

    /// A newer navigation started while this one was loading; the result
    /// must be discarded, never applied
    #[error("navigation superseded by a newer request")]
    Superseded,
}
