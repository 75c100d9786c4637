//! Database configuration structures and parsing
//!
//! This module holds the declarative per-backend configuration consumed by
//! the database objects factory, plus the multi-database configuration map
//! with its mandatory "default" entry. Backend selection is a closed,
//! internally-tagged sum type: an unrecognized `datastoreType` is rejected
//! at parse time, and every builder pattern-matches exhaustively.

use crate::error::{Error, Result};
use crate::naming::{default_table_name_fn, TableNameFn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The closed set of supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    Dynamodb,
    Mongodb,
    Opensearch,
    Mysql,
    Postgres,
    Sqlite,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Dynamodb => "dynamodb",
            BackendKind::Mongodb => "mongodb",
            BackendKind::Opensearch => "opensearch",
            BackendKind::Mysql => "mysql",
            BackendKind::Postgres => "postgres",
            BackendKind::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "memory" => Ok(BackendKind::Memory),
            "dynamodb" => Ok(BackendKind::Dynamodb),
            "mongodb" => Ok(BackendKind::Mongodb),
            "opensearch" => Ok(BackendKind::Opensearch),
            "mysql" => Ok(BackendKind::Mysql),
            "postgres" => Ok(BackendKind::Postgres),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(Error::configuration(format!(
                "Unsupported datastore type '{}'",
                other
            ))),
        }
    }
}

/// HTTPS agent tuning for the key-value backend
///
/// Connection reuse is enabled and the concurrent socket ceiling bounded
/// unless the caller overrides these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpsAgentConfig {
    #[serde(default = "default_keep_alive")]
    pub keep_alive: bool,

    #[serde(default = "default_max_sockets")]
    pub max_sockets: usize,
}

impl Default for HttpsAgentConfig {
    fn default() -> Self {
        Self {
            keep_alive: default_keep_alive(),
            max_sockets: default_max_sockets(),
        }
    }
}

/// Connection properties for a single logical database
///
/// Tagged by `datastoreType`; exactly one backend variant per instance.
/// The shared {environment, system_name} pair lives outside this type (see
/// [`DatabaseObjectsProps`]) and is merged in by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "datastoreType")]
pub enum DatastoreProps {
    #[serde(rename = "memory")]
    Memory,

    #[serde(rename = "dynamodb", rename_all = "camelCase")]
    Dynamo {
        aws_region: String,
        #[serde(default, rename = "httpsAgentConfig", alias = "httpsAgent")]
        https_agent: Option<HttpsAgentConfig>,
    },

    #[serde(rename = "mongodb", rename_all = "camelCase")]
    Mongo {
        #[serde(default)]
        host: Option<String>,
        #[serde(default)]
        port: Option<u16>,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
        /// Caller-supplied connection string, used verbatim when present
        #[serde(default)]
        connection_string: Option<String>,
    },

    #[serde(rename = "opensearch", rename_all = "camelCase")]
    Opensearch {
        username: String,
        password: String,
        host: String,
    },

    #[serde(rename = "mysql", rename_all = "camelCase")]
    Mysql {
        host: String,
        #[serde(default)]
        port: Option<u16>,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
        #[serde(default = "default_max_connections")]
        max_connections: u32,
    },

    #[serde(rename = "postgres", rename_all = "camelCase")]
    Postgres {
        host: String,
        #[serde(default)]
        port: Option<u16>,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
        #[serde(default = "default_max_connections")]
        max_connections: u32,
    },

    #[serde(rename = "sqlite", rename_all = "camelCase")]
    Sqlite { filename: String },
}

impl DatastoreProps {
    /// Backend discriminant for this variant
    pub fn kind(&self) -> BackendKind {
        match self {
            DatastoreProps::Memory => BackendKind::Memory,
            DatastoreProps::Dynamo { .. } => BackendKind::Dynamodb,
            DatastoreProps::Mongo { .. } => BackendKind::Mongodb,
            DatastoreProps::Opensearch { .. } => BackendKind::Opensearch,
            DatastoreProps::Mysql { .. } => BackendKind::Mysql,
            DatastoreProps::Postgres { .. } => BackendKind::Postgres,
            DatastoreProps::Sqlite { .. } => BackendKind::Sqlite,
        }
    }
}

/// Fully resolved construction props for one logical database
///
/// Immutable once built; the registry constructs these by merging the
/// shared {environment, system_name} pair into each configured entry.
#[derive(Clone)]
pub struct DatabaseObjectsProps {
    pub environment: String,
    pub system_name: String,
    pub datastore: DatastoreProps,
    /// Custom per-model naming function; fully replaces the default
    /// derivation when supplied
    pub table_name_fn: Option<TableNameFn>,
}

impl DatabaseObjectsProps {
    pub fn new(
        environment: impl Into<String>,
        system_name: impl Into<String>,
        datastore: DatastoreProps,
    ) -> Self {
        Self {
            environment: environment.into(),
            system_name: system_name.into(),
            datastore,
            table_name_fn: None,
        }
    }

    /// Replace the default naming derivation with a custom function
    pub fn with_table_name_fn(mut self, table_name_fn: TableNameFn) -> Self {
        self.table_name_fn = Some(table_name_fn);
        self
    }

    /// The per-model naming function for this database: the custom override
    /// when supplied, otherwise the default curried with
    /// {system_name, environment}
    pub fn naming(&self) -> TableNameFn {
        match &self.table_name_fn {
            Some(custom) => custom.clone(),
            None => default_table_name_fn(&self.system_name, &self.environment),
        }
    }
}

impl fmt::Debug for DatabaseObjectsProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseObjectsProps")
            .field("environment", &self.environment)
            .field("system_name", &self.system_name)
            .field("datastore", &self.datastore)
            .field(
                "table_name_fn",
                &self.table_name_fn.as_ref().map(|_| "<custom>"),
            )
            .finish()
    }
}

/// Configuration for multiple logical databases
///
/// A map of logical name to connection properties. The `"default"` entry is
/// mandatory; its absence is a configuration error raised at registry
/// construction, before any connection attempt.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabasesConfig {
    #[serde(flatten)]
    pub databases: HashMap<String, DatastoreProps>,
}

impl DatabasesConfig {
    /// Logical name of the mandatory default database
    pub const DEFAULT_KEY: &'static str = "default";

    pub fn new() -> Self {
        Self {
            databases: HashMap::new(),
        }
    }

    /// Add a database configuration
    pub fn add_database(&mut self, name: impl Into<String>, props: DatastoreProps) {
        self.databases.insert(name.into(), props);
    }

    /// Get a database configuration by logical name
    pub fn get(&self, name: &str) -> Option<&DatastoreProps> {
        self.databases.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    /// List all configured logical names
    pub fn list_names(&self) -> Vec<String> {
        self.databases.keys().cloned().collect()
    }

    /// Validate the configuration shape
    ///
    /// # Returns
    /// * `Ok(())` - The mandatory "default" entry is present
    /// * `Err(Error)` - Configuration error, raised before any connection
    pub fn validate(&self) -> Result<()> {
        if !self.databases.contains_key(Self::DEFAULT_KEY) {
            return Err(Error::configuration(
                "databases configuration is missing the mandatory 'default' entry",
            ));
        }
        Ok(())
    }
}

// Default values for configuration
fn default_keep_alive() -> bool {
    true
}
fn default_max_sockets() -> usize {
    50
}
fn default_max_connections() -> u32 {
    10
}
