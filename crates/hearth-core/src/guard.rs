//! Navigation guards
//!
//! A guard gates entry into a route subtree. Guards are supplied by an
//! external collaborator (session, auth) and must be pure with respect to
//! the route table: they read the navigation context and answer, nothing
//! else.

use crate::context::NavigationContext;
use thiserror::Error;

/// What a guard decided about the navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Continue into the subtree
    Allow,
    /// Cancel the navigation
    Block,
    /// Restart resolution at the given path
    Redirect(String),
}

/// A guard evaluation failure, distinct from a `Block` verdict
#[derive(Debug, Error)]
#[error("{message}")]
pub struct GuardError {
    message: String,
}

impl GuardError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// What a guard check returns
pub type GuardResult = Result<Verdict, GuardError>;

/// Predicate gating entry into a route subtree.
///
/// Implemented for any `Fn(&NavigationContext) -> GuardResult` closure,
/// so most call sites pass a closure straight to
/// [`Route::guard`](crate::routes::Route::guard).
pub trait Guard: Send + Sync {
    fn check(&self, ctx: &NavigationContext) -> GuardResult;
}

impl<F> Guard for F
where
    F: Fn(&NavigationContext) -> GuardResult + Send + Sync,
{
    fn check(&self, ctx: &NavigationContext) -> GuardResult {
        self(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use std::sync::Arc;

    #[test]
    fn test_closure_guard() {
        let guard = |ctx: &NavigationContext| -> GuardResult {
            if ctx.auth().authenticated {
                Ok(Verdict::Allow)
            } else {
                Ok(Verdict::Redirect("login".to_string()))
            }
        };

        let anonymous = NavigationContext::new(Arc::new(AppState::default()));
        assert_eq!(
            guard.check(&anonymous).unwrap(),
            Verdict::Redirect("login".to_string())
        );

        let mut state = AppState::default();
        state.auth.authenticated = true;
        let signed_in = NavigationContext::new(Arc::new(state));
        assert_eq!(guard.check(&signed_in).unwrap(), Verdict::Allow);
    }

    #[test]
    fn test_guard_error_message() {
        let err = GuardError::new("session store unreachable");
        assert_eq!(err.to_string(), "session store unreachable");
    }
}
