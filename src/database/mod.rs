//! Multi-backend database support
//!
//! The adapter capability trait, its seven backend implementations, the
//! database objects factory, and the memoizing multi-database registry.

pub mod adapter;
pub mod adapters;
pub mod objects;
pub mod registry;

// Re-export main types for convenience
pub use adapter::{DatastoreAdapter, SearchPage, SearchQuery};
pub use objects::{get_database_objects, DatabaseObjects, NativeClient};
pub use registry::{DatabaseRegistry, MultiDatabases};
