//! Application state shape
//!
//! Declares the top-level keys of the client-side state store. This is a
//! type contract with no runtime logic; the resolver's guards consult the
//! `auth` section through [`NavigationContext`](crate::NavigationContext).

use std::time::SystemTime;

/// Auth section of the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    /// Whether a session is currently live
    pub authenticated: bool,
    /// Identifier of the signed-in user, if any
    pub user_id: Option<String>,
    /// When the current session expires, if known
    pub session_expires_at: Option<SystemTime>,
}

impl AuthState {
    /// State for a live session belonging to `user_id`
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            user_id: Some(user_id.into()),
            session_expires_at: None,
        }
    }
}

/// Top-level shape of the client-side state store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub auth: AuthState,
}

impl AppState {
    /// State with a signed-in user, the common test and bootstrap case
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            auth: AuthState::signed_in(user_id),
        }
    }
}
