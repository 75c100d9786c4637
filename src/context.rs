//! Hosting context tying ambient identity to a database registry
//!
//! A `HostContext` is what an application constructs once at startup: the
//! environment and system name every derived table name carries, plus the
//! registry that memoizes the configured databases.

use crate::config::DatabasesConfig;
use crate::database::registry::DatabaseRegistry;
use crate::error::Result;
use crate::naming::TableNameFn;
use crate::orm::{get_orm, Orm};

/// Ambient identity plus the registry built from it
pub struct HostContext {
    registry: DatabaseRegistry,
}

impl HostContext {
    /// Build a context for one deployment
    ///
    /// # Arguments
    /// * `environment` - Deployment environment, e.g. "dev" or "prod"
    /// * `system_name` - Stable system identifier prefixed onto every
    ///   derived name
    /// * `config` - The multi-database configuration; must contain a
    ///   "default" entry
    ///
    /// # Returns
    /// * `Ok(HostContext)` - Validated context; no connections are opened yet
    /// * `Err(Error)` - Configuration error when the config is invalid
    pub fn new(
        environment: impl Into<String>,
        system_name: impl Into<String>,
        config: DatabasesConfig,
    ) -> Result<Self> {
        Ok(Self {
            registry: DatabaseRegistry::new(environment, system_name, config)?,
        })
    }

    /// Register a custom table-name closure for one logical database
    pub fn with_table_name_fn(
        mut self,
        name: impl Into<String>,
        table_name_fn: TableNameFn,
    ) -> Self {
        self.registry = self.registry.with_table_name_fn(name, table_name_fn);
        self
    }

    pub fn environment(&self) -> &str {
        self.registry.environment()
    }

    pub fn system_name(&self) -> &str {
        self.registry.system_name()
    }

    /// The underlying registry, for direct multi-database access
    pub fn registry(&self) -> &DatabaseRegistry {
        &self.registry
    }

    /// Close every database this context ever opened
    pub async fn cleanup(&self) -> Result<()> {
        self.registry.cleanup().await
    }
}

/// Resolve an ORM bound to one of the context's logical databases
///
/// Defaults to the "default" database when no name is given. Connections
/// are established (once) on first use through the registry.
pub async fn get_model_props(context: &HostContext, datastore_name: Option<&str>) -> Result<Orm> {
    let objects = match datastore_name {
        Some(name) => context.registry().get(name).await?,
        None => context.registry().get_default().await?,
    };
    Ok(get_orm(&objects))
}
