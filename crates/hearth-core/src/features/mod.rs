//! Feature route tables
//!
//! The three lazily-loaded feature areas of the CRM. Each module exposes
//! a `routes` function building its subtree from caller-supplied view
//! loaders, so the tables stay declarative while the actual view modules
//! (and the auth guard for saved searches) remain external collaborators.

pub mod customers;
pub mod properties;
pub mod saved_searches;

pub use customers::CustomerViews;
pub use properties::PropertyViews;
pub use saved_searches::SavedSearchViews;
