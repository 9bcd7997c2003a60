//! Per-navigation context
//!
//! Carries the bound route parameters plus a handle to the application
//! state, and is handed to every guard on the matched chain. The resolver
//! rebinds the parameters on every matching pass (including after a
//! redirect), so guards always see the parameters of the path currently
//! being matched.

use crate::state::{AppState, AuthState};
use std::collections::HashMap;
use std::sync::Arc;

/// Opaque per-request data passed to guards.
#[derive(Debug, Clone)]
pub struct NavigationContext {
    params: HashMap<String, String>,
    state: Arc<AppState>,
}

impl NavigationContext {
    /// Create a context over the shared application state
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            params: HashMap::new(),
            state,
        }
    }

    /// All parameters bound by the current matching pass
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// A single bound parameter, e.g. `id`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The auth section of the application state
    pub fn auth(&self) -> &AuthState {
        &self.state.auth
    }

    /// The whole application state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub(crate) fn bind_params(&mut self, params: impl IntoIterator<Item = (String, String)>) {
        self.params.clear();
        self.params.extend(params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_rebound_per_pass() {
        let mut ctx = NavigationContext::new(Arc::new(AppState::default()));
        ctx.bind_params(vec![("id".to_string(), "42".to_string())]);
        assert_eq!(ctx.param("id"), Some("42"));

        ctx.bind_params(vec![("slug".to_string(), "elm-road".to_string())]);
        assert_eq!(ctx.param("id"), None);
        assert_eq!(ctx.param("slug"), Some("elm-road"));
    }
}
