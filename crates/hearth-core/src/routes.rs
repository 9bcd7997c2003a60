//! Declarative route building
//!
//! [`Route`] is the application-facing declaration: a path pattern plus
//! exactly one of a view loader, a redirect target, or children, with
//! optional guards. [`Router::new`](crate::Router::new) flattens the
//! declarations into a [`hearth_router::RouteTable`], assigning handler
//! and guard ids, and rejects misconfigured tables before the
//! application starts.

use crate::guard::Guard;
use crate::loader::ViewLoader;
use hearth_router::{MatchMode, RouteDef};
use std::sync::Arc;

/// One declarative route entry.
pub struct Route<V> {
    pub(crate) pattern: String,
    pub(crate) mode: Option<MatchMode>,
    pub(crate) redirect: Option<String>,
    pub(crate) loader: Option<ViewLoader<V>>,
    pub(crate) guards: Vec<Arc<dyn Guard>>,
    pub(crate) children: Vec<Route<V>>,
}

impl<V> Route<V> {
    /// Start an entry for the given pattern (`""`, `list`, `:id`, ...)
    pub fn path(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            mode: None,
            redirect: None,
            loader: None,
            guards: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Terminate this entry with a lazy view loader
    pub fn view(mut self, loader: ViewLoader<V>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Terminate this entry with a redirect into the sibling scope
    pub fn redirect_to(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    /// Gate this entry's subtree with a guard
    pub fn guard(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Gate this entry's subtree with an already-shared guard
    pub fn guard_shared(mut self, guard: Arc<dyn Guard>) -> Self {
        self.guards.push(guard);
        self
    }

    /// Nest child entries under this one
    pub fn children(mut self, children: Vec<Route<V>>) -> Self {
        self.children = children;
        self
    }

    /// Require the whole remaining path to be consumed by this entry
    pub fn match_full(mut self) -> Self {
        self.mode = Some(MatchMode::Full);
        self
    }

    /// Flatten into a [`RouteDef`], registering guards and loaders
    pub(crate) fn into_def(
        self,
        guards: &mut Vec<Arc<dyn Guard>>,
        loaders: &mut Vec<ViewLoader<V>>,
    ) -> RouteDef {
        let mut def = RouteDef::path(self.pattern);
        if let Some(mode) = self.mode {
            def = def.mode(mode);
        }
        if let Some(target) = self.redirect {
            def = def.redirect(target);
        }
        if let Some(loader) = self.loader {
            let handler_id = loaders.len() as u32;
            loaders.push(loader);
            def = def.view(handler_id);
        }
        for guard in self.guards {
            let guard_id = guards.len() as u32;
            guards.push(guard);
            def = def.guard(guard_id);
        }
        def.children(
            self.children
                .into_iter()
                .map(|child| child.into_def(guards, loaders))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::loader;
    use crate::resolver::Router;
    use hearth_router::BuildError;

    fn stub(name: &'static str) -> ViewLoader<&'static str> {
        loader(move || async move { Ok(name) })
    }

    #[test]
    fn test_duplicate_siblings_rejected_at_build() {
        let err = Router::new(vec![
            Route::path("list").view(stub("a")),
            Route::path("list").view(stub("b")),
        ])
        .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateSibling { .. }));
    }

    #[test]
    fn test_entry_without_target_rejected_at_build() {
        let err = Router::<&str>::new(vec![Route::path("bare")]).unwrap_err();
        assert!(matches!(err, BuildError::EmptyEntry { .. }));
    }

    #[test]
    fn test_static_redirect_cycle_rejected_at_build() {
        // The a -> b -> a cycle is a startup failure, not a runtime one.
        let err = Router::<&str>::new(vec![
            Route::path("a").redirect_to("b"),
            Route::path("b").redirect_to("a"),
        ])
        .unwrap_err();
        assert!(matches!(err, BuildError::RedirectCycle { .. }));
    }
}
