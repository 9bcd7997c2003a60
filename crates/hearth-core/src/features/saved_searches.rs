//! Saved-search feature routes
//!
//! The whole subtree is gated by the external auth guard: an anonymous
//! session can reach neither the list nor any per-search view, and no
//! saved-search loader runs until the guard allows.

use crate::guard::Guard;
use crate::loader::ViewLoader;
use crate::routes::Route;
use std::sync::Arc;

/// Lazy loaders for the saved-search views
pub struct SavedSearchViews<V> {
    pub list: ViewLoader<V>,
    pub new: ViewLoader<V>,
    pub edit: ViewLoader<V>,
    pub results: ViewLoader<V>,
}

/// The `saved-searches` subtree, gated at the root by `auth_guard`.
pub fn routes<V>(views: SavedSearchViews<V>, auth_guard: Arc<dyn Guard>) -> Route<V> {
    Route::path("saved-searches")
        .guard_shared(auth_guard)
        .children(vec![
            Route::path("").redirect_to("list"),
            Route::path("list").view(views.list),
            Route::path("new").view(views.new),
            Route::path(":id").children(vec![
                Route::path("edit").view(views.edit),
                Route::path("results").view(views.results),
            ]),
        ])
}
