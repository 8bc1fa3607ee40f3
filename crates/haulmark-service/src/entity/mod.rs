//! Generic entity CRUD with a locally cached list.

pub mod scope;
pub mod service;

pub use scope::ListScope;
pub use service::EntityService;
