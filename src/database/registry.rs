//! Multi-database registry
//!
//! Builds and memoizes the full set of live database objects declared in a
//! multi-database configuration. Construction runs at most once per
//! registry instance, even under concurrent first calls; all callers share
//! the same resolved map. The registry also coordinates shutdown, closing
//! each backend strictly one at a time.

use crate::config::{DatabaseObjectsProps, DatabasesConfig};
use crate::database::objects::{get_database_objects, DatabaseObjects};
use crate::error::{Error, Result};
use crate::naming::TableNameFn;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Resolved mapping from logical name to live database objects
pub type MultiDatabases = HashMap<String, Arc<DatabaseObjects>>;

/// Registry owning the live database objects for one configuration
///
/// The memoization cell is per registry instance, never process-wide, so
/// separate registries (tests, tenants) cannot leak state into each other.
pub struct DatabaseRegistry {
    environment: String,
    system_name: String,
    config: DatabasesConfig,
    naming_overrides: HashMap<String, TableNameFn>,
    databases: OnceCell<Arc<MultiDatabases>>,
}

impl DatabaseRegistry {
    /// Create a registry for a validated configuration
    ///
    /// # Returns
    /// * `Ok(registry)` - Configuration has the mandatory "default" entry
    /// * `Err(Error)` - Configuration error, raised before any connection
    ///   attempt
    pub fn new(
        environment: impl Into<String>,
        system_name: impl Into<String>,
        config: DatabasesConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            environment: environment.into(),
            system_name: system_name.into(),
            config,
            naming_overrides: HashMap::new(),
            databases: OnceCell::new(),
        })
    }

    /// Install a custom naming function for one logical database
    ///
    /// Must be called before the first `get_databases`; the override fully
    /// replaces the default naming derivation for that entry.
    pub fn with_table_name_fn(
        mut self,
        name: impl Into<String>,
        table_name_fn: TableNameFn,
    ) -> Self {
        self.naming_overrides.insert(name.into(), table_name_fn);
        self
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn system_name(&self) -> &str {
        &self.system_name
    }

    /// Get the resolved multi-database map, building it on first use
    ///
    /// Memoized: the construction routine runs at most once per registry,
    /// and concurrent first callers all wait for, and share, the same
    /// result. If any backend fails to build, the whole call fails and no
    /// partial map is cached.
    pub async fn get_databases(&self) -> Result<Arc<MultiDatabases>> {
        let databases = self
            .databases
            .get_or_try_init(|| self.build_all())
            .await?;
        Ok(Arc::clone(databases))
    }

    /// Get one logical database by name
    pub async fn get(&self, name: &str) -> Result<Arc<DatabaseObjects>> {
        let databases = self.get_databases().await?;
        databases.get(name).map(Arc::clone).ok_or_else(|| {
            Error::configuration(format!("database '{}' is not configured", name))
        })
    }

    /// Get the default logical database
    pub async fn get_default(&self) -> Result<Arc<DatabaseObjects>> {
        self.get(DatabasesConfig::DEFAULT_KEY).await
    }

    async fn build_all(&self) -> Result<Arc<MultiDatabases>> {
        // Stable order keeps construction logs and failures deterministic
        let mut names: Vec<String> = self.config.list_names();
        names.sort();

        let mut databases = HashMap::with_capacity(names.len());
        for name in names {
            let datastore = self
                .config
                .get(&name)
                .cloned()
                .ok_or_else(|| {
                    Error::configuration(format!("database '{}' disappeared from config", name))
                })?;

            // Merge the shared {environment, system_name} into the entry's
            // props before construction
            let mut props =
                DatabaseObjectsProps::new(&self.environment, &self.system_name, datastore);
            if let Some(custom) = self.naming_overrides.get(&name) {
                props = props.with_table_name_fn(custom.clone());
            }

            let objects = get_database_objects(props).await?;
            databases.insert(name, Arc::new(objects));
        }

        Ok(Arc::new(databases))
    }

    /// Close every database, one at a time
    ///
    /// Teardowns run with concurrency 1 in stable name order, so one
    /// backend's failure never races with another's shutdown. The first
    /// unrecovered error propagates and aborts the remaining cleanups. A
    /// registry that never built its databases cleans up as a no-op.
    pub async fn cleanup(&self) -> Result<()> {
        let Some(databases) = self.databases.get() else {
            return Ok(());
        };

        let mut names: Vec<&String> = databases.keys().collect();
        names.sort();

        for name in names {
            log::debug!("closing database '{}'", name);
            databases[name].cleanup().await?;
        }
        Ok(())
    }
}

impl fmt::Debug for DatabaseRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseRegistry")
            .field("environment", &self.environment)
            .field("system_name", &self.system_name)
            .field("databases", &self.config.list_names())
            .field("initialized", &self.databases.initialized())
            .finish_non_exhaustive()
    }
}
