//! Business logic between the HTTP handlers and the store.

pub mod task;

pub use task::TaskService;
