//! Datastore adapter implementations for the supported backends

pub mod dynamo;
pub mod memory;
pub mod mongo;
pub mod mysql;
pub mod opensearch;
pub mod postgres;
pub mod sqlite;

pub use dynamo::{DynamoAdapter, DynamoConnection};
pub use memory::MemoryAdapter;
pub use mongo::{MongoAdapter, MongoConnection};
pub use mysql::{MySqlAdapter, MySqlConnection};
pub use opensearch::{OpensearchAdapter, OpensearchConnection};
pub use postgres::{PostgresAdapter, PostgresConnection};
pub use sqlite::SqliteAdapter;
