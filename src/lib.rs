//! Polystore - a uniform data-access adapter over heterogeneous backends
//!
//! Polystore normalizes seven storage engines behind one capability trait:
//! - In-memory tables for tests and ephemeral data
//! - DynamoDB-style key-value storage
//! - MongoDB-style document storage
//! - OpenSearch-style search indexes
//! - MySQL, PostgreSQL and SQLite relational storage
//!
//! Applications configure logical databases by name, bind models through
//! the ORM layer, and use the same create/retrieve/update/delete/search
//! interface regardless of which engine sits underneath.

// Enforce error handling best practices
#![cfg_attr(
    not(test),
    warn(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
    )
)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used,))]

pub mod config;
pub mod context;
pub mod cruds;
pub mod error;
pub mod naming;
pub mod orm;

// Database module for multi-backend support
pub mod database;

// Re-export main types for public API
pub use config::{
    BackendKind, DatabasesConfig, DatastoreProps, DatabaseObjectsProps, HttpsAgentConfig,
};
pub use context::{get_model_props, HostContext};
pub use cruds::{ModelCruds, SearchResult};
pub use error::{Error, Result};
pub use naming::{default_table_name_fn, resolve_name, TableNameFn};
pub use orm::{get_orm, Model, Orm};

// Re-export database access
pub use database::adapter::{DatastoreAdapter, SearchPage, SearchQuery};
pub use database::objects::{get_database_objects, DatabaseObjects, NativeClient};
pub use database::registry::{DatabaseRegistry, MultiDatabases};
