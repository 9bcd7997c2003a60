//! Property feature routes

use crate::loader::ViewLoader;
use crate::routes::Route;

/// Lazy loaders for the property views
pub struct PropertyViews<V> {
    pub list: ViewLoader<V>,
    pub new: ViewLoader<V>,
    pub detail: ViewLoader<V>,
    pub edit: ViewLoader<V>,
}

/// The `properties` subtree. The detail view sits on the bare `:id`
/// path (an empty-pattern leaf under the group), with `edit` next to it.
pub fn routes<V>(views: PropertyViews<V>) -> Route<V> {
    Route::path("properties").children(vec![
        Route::path("").redirect_to("list"),
        Route::path("list").view(views.list),
        Route::path("new").view(views.new),
        Route::path(":id").children(vec![
            Route::path("").view(views.detail),
            Route::path("edit").view(views.edit),
        ]),
    ])
}
