//! Lazy view loaders
//!
//! A view handler is produced on demand by a deferred factory, the
//! stand-in for a dynamic module import. The resolver invokes the factory
//! only after every guard on the matched chain has allowed the
//! navigation, and the loaded handler travels with the resolution result
//! so one navigation never loads the same view twice.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Future returned by a view loader
pub type LoaderFuture<V> = Pin<Box<dyn Future<Output = std::result::Result<V, LoadError>> + Send>>;

/// Deferred factory producing a view handler on demand
pub type ViewLoader<V> = Arc<dyn Fn() -> LoaderFuture<V> + Send + Sync>;

/// A lazy load failure (network or module error)
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LoadError {
    message: String,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Wrap an async factory closure into a [`ViewLoader`].
pub fn loader<V, F, Fut>(factory: F) -> ViewLoader<V>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<V, LoadError>> + Send + 'static,
{
    Arc::new(move || Box::pin(factory()))
}
