//! Customer feature routes

use crate::loader::ViewLoader;
use crate::routes::Route;

/// Lazy loaders for the customer views
pub struct CustomerViews<V> {
    pub list: ViewLoader<V>,
    pub new: ViewLoader<V>,
    pub edit: ViewLoader<V>,
    pub matches: ViewLoader<V>,
}

/// The `customers` subtree: the bare feature path redirects to the list,
/// and per-customer views hang off `:id`.
pub fn routes<V>(views: CustomerViews<V>) -> Route<V> {
    Route::path("customers").children(vec![
        Route::path("").redirect_to("list"),
        Route::path("list").view(views.list),
        Route::path("new").view(views.new),
        Route::path(":id").children(vec![
            Route::path("edit").view(views.edit),
            Route::path("matches").view(views.matches),
        ]),
    ])
}
