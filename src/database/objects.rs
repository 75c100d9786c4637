//! Database objects factory
//!
//! Turns a declarative per-backend configuration into a live adapter
//! bundle: one native client, the capability adapter wrapping it, and a
//! cleanup handle. Dispatch over the backend kind happens exactly once,
//! here; everything downstream works through the adapter trait.

use crate::config::{DatabaseObjectsProps, DatastoreProps};
use crate::database::adapter::DatastoreAdapter;
use crate::database::adapters::{
    DynamoAdapter, DynamoConnection, MemoryAdapter, MongoAdapter, MongoConnection, MySqlAdapter,
    MySqlConnection, OpensearchAdapter, OpensearchConnection, PostgresAdapter, PostgresConnection,
    SqliteAdapter,
};
use crate::error::Result;
use crate::naming::resolve_name;
use opensearch::OpenSearch;
use sqlx::{MySqlPool, PgPool, SqlitePool};
use std::fmt;
use std::sync::Arc;

/// Backend-specific escape hatch to the native client
///
/// The raw client's shape is inherently backend-dependent, so it is
/// exposed as a per-backend variant rather than a universal field. The
/// in-memory backend has no native client.
#[derive(Clone)]
pub enum NativeClient {
    None,
    Mongo(mongodb::Client),
    Dynamo(aws_sdk_dynamodb::Client),
    Opensearch(Arc<OpenSearch>),
    Mysql(MySqlPool),
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl NativeClient {
    pub fn mongo_client(&self) -> Option<&mongodb::Client> {
        match self {
            NativeClient::Mongo(client) => Some(client),
            _ => None,
        }
    }

    pub fn dynamo_client(&self) -> Option<&aws_sdk_dynamodb::Client> {
        match self {
            NativeClient::Dynamo(client) => Some(client),
            _ => None,
        }
    }

    pub fn opensearch_client(&self) -> Option<Arc<OpenSearch>> {
        match self {
            NativeClient::Opensearch(client) => Some(Arc::clone(client)),
            _ => None,
        }
    }

    pub fn mysql_pool(&self) -> Option<&MySqlPool> {
        match self {
            NativeClient::Mysql(pool) => Some(pool),
            _ => None,
        }
    }

    pub fn pg_pool(&self) -> Option<&PgPool> {
        match self {
            NativeClient::Postgres(pool) => Some(pool),
            _ => None,
        }
    }

    pub fn sqlite_pool(&self) -> Option<&SqlitePool> {
        match self {
            NativeClient::Sqlite(pool) => Some(pool),
            _ => None,
        }
    }
}

/// Live adapter bundle for one logical database
///
/// Owned by the registry for the process lifetime; `cleanup` releases the
/// native client exactly once at shutdown.
pub struct DatabaseObjects {
    adapter: Arc<dyn DatastoreAdapter>,
    raw: NativeClient,
}

impl DatabaseObjects {
    pub fn new(adapter: Arc<dyn DatastoreAdapter>, raw: NativeClient) -> Self {
        Self { adapter, raw }
    }

    /// The capability adapter for this database
    pub fn adapter(&self) -> Arc<dyn DatastoreAdapter> {
        Arc::clone(&self.adapter)
    }

    /// The backend-specific native client, for direct low-level access
    pub fn raw(&self) -> &NativeClient {
        &self.raw
    }

    /// Release the native client
    ///
    /// Swallows the well-known idempotent "already closed" teardown class;
    /// any other teardown error is re-raised.
    pub async fn cleanup(&self) -> Result<()> {
        match self.adapter.close().await {
            Ok(()) => Ok(()),
            Err(err) if err.is_benign_close() => {
                log::debug!(
                    "suppressed benign teardown error from {}: {}",
                    self.adapter.kind(),
                    err
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

impl fmt::Debug for DatabaseObjects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseObjects")
            .field("adapter", &self.adapter.kind())
            .finish_non_exhaustive()
    }
}

/// Build the database objects for one configuration entry
///
/// Computes the physical namespace via the naming resolver (unless a
/// custom naming function or a literal connection string is supplied),
/// constructs exactly one native client, and wraps it in the matching
/// adapter.
///
/// # Returns
/// * `Ok(DatabaseObjects)` - Live adapter bundle
/// * `Err(Error)` - Configuration or native connection error, unchanged
pub async fn get_database_objects(props: DatabaseObjectsProps) -> Result<DatabaseObjects> {
    let kind = props.datastore.kind();
    log::info!(
        "building '{}' database objects for {}/{}",
        kind,
        props.system_name,
        props.environment
    );

    let names = props.naming();
    let database_name = resolve_name(&props.system_name, &props.environment, None);

    match &props.datastore {
        DatastoreProps::Memory => {
            let adapter = MemoryAdapter::new(names);
            Ok(DatabaseObjects::new(Arc::new(adapter), NativeClient::None))
        }

        DatastoreProps::Dynamo {
            aws_region,
            https_agent,
        } => {
            let conn = DynamoConnection {
                aws_region,
                https_agent: https_agent.clone().unwrap_or_default(),
            };
            let adapter = DynamoAdapter::connect(conn, names).await?;
            let client = adapter.client().clone();
            Ok(DatabaseObjects::new(
                Arc::new(adapter),
                NativeClient::Dynamo(client),
            ))
        }

        DatastoreProps::Mongo {
            host,
            port,
            username,
            password,
            connection_string,
        } => {
            let conn = MongoConnection {
                host: host.as_deref(),
                port: *port,
                username: username.as_deref(),
                password: password.as_deref(),
                connection_string: connection_string.as_deref(),
                database: &database_name,
            };
            let adapter = MongoAdapter::connect(conn, names).await?;
            let client = adapter.client().clone();
            Ok(DatabaseObjects::new(
                Arc::new(adapter),
                NativeClient::Mongo(client),
            ))
        }

        DatastoreProps::Opensearch {
            username,
            password,
            host,
        } => {
            let conn = OpensearchConnection {
                username,
                password,
                host,
            };
            let adapter = OpensearchAdapter::connect(conn, names)?;
            let client = adapter.client();
            Ok(DatabaseObjects::new(
                Arc::new(adapter),
                NativeClient::Opensearch(client),
            ))
        }

        DatastoreProps::Mysql {
            host,
            port,
            username,
            password,
            max_connections,
        } => {
            let conn = MySqlConnection {
                host,
                port: *port,
                username: username.as_deref(),
                password: password.as_deref(),
                database: &database_name,
                max_connections: *max_connections,
            };
            let adapter = MySqlAdapter::connect(conn, names).await?;
            let pool = adapter.pool().clone();
            Ok(DatabaseObjects::new(
                Arc::new(adapter),
                NativeClient::Mysql(pool),
            ))
        }

        DatastoreProps::Postgres {
            host,
            port,
            username,
            password,
            max_connections,
        } => {
            let conn = PostgresConnection {
                host,
                port: *port,
                username: username.as_deref(),
                password: password.as_deref(),
                database: &database_name,
                max_connections: *max_connections,
            };
            let adapter = PostgresAdapter::connect(conn, names).await?;
            let pool = adapter.pool().clone();
            Ok(DatabaseObjects::new(
                Arc::new(adapter),
                NativeClient::Postgres(pool),
            ))
        }

        DatastoreProps::Sqlite { filename } => {
            // The file path is the database identity; no logical database
            // name is passed to the driver
            let adapter = SqliteAdapter::connect(filename, names).await?;
            let pool = adapter.pool().clone();
            Ok(DatabaseObjects::new(
                Arc::new(adapter),
                NativeClient::Sqlite(pool),
            ))
        }
    }
}
