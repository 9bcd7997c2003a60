//! hearth-core: navigation core for the hearth CRM front-end
//!
//! Routing and environment-configuration layer of a browser-based
//! real-estate CRM. The centerpiece is the route resolver: declarative
//! lazy-loaded route tables, guard gating, sibling-scoped redirects, and
//! cancellation of stale navigations.
//!
//! ## Pieces
//! - `resolver` - matches a path, runs guards ancestors first, follows
//!   redirects under a runtime bound, awaits the lazy view loader
//! - `routes` - the declarative [`Route`] builder, validated into an
//!   immutable table at startup
//! - `guard` / `loader` - the contracts external collaborators implement
//! - `features` - the customers / properties / saved-searches tables
//! - `config` / `state` - environment options and the state-store shape

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod error;
pub mod features;
pub mod guard;
pub mod loader;
pub mod resolver;
pub mod routes;
pub mod state;

// Re-exports
pub use config::{Environment, FeatureFlags, MapSettings};
pub use context::NavigationContext;
pub use error::{NavigationError, Result};
pub use guard::{Guard, GuardError, GuardResult, Verdict};
pub use loader::{loader, LoadError, LoaderFuture, ViewLoader};
pub use resolver::{Resolution, Router, MAX_REDIRECT_DEPTH};
pub use routes::Route;
pub use state::{AppState, AuthState};

// Table-construction re-exports
pub use hearth_router::{BuildError, MatchMode};
