//! ORM binding
//!
//! Wraps one logical database's adapter into a small model runtime: a
//! model factory for declaring data shapes and a fetcher for retrieving
//! previously declared models. The binding itself is thin; all persistence
//! behavior lives behind the adapter.

use crate::cruds::ModelCruds;
use crate::database::adapter::DatastoreAdapter;
use crate::database::objects::DatabaseObjects;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Declarative data-shape descriptor bound to one adapter-backed runtime
///
/// The stable model name is what the naming resolver turns into the
/// physical table/collection/index name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    name: String,
    id_field: String,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_field: "id".to_string(),
        }
    }

    /// Use a different primary-key field than the default `id`
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }
}

/// Model runtime bound to one logical database's adapter
pub struct Orm {
    adapter: Arc<dyn DatastoreAdapter>,
    models: DashMap<String, Model>,
}

impl Orm {
    pub fn new(adapter: Arc<dyn DatastoreAdapter>) -> Self {
        Self {
            adapter,
            models: DashMap::new(),
        }
    }

    /// The adapter this runtime is bound to
    pub fn adapter(&self) -> Arc<dyn DatastoreAdapter> {
        Arc::clone(&self.adapter)
    }

    /// Model factory: declare a model by its stable name
    pub fn define(&self, name: impl Into<String>) -> Model {
        self.define_model(Model::new(name))
    }

    /// Model factory: declare a fully configured model
    pub fn define_model(&self, model: Model) -> Model {
        self.models.insert(model.name().to_string(), model.clone());
        model
    }

    /// Model fetcher: retrieve a previously declared model by name
    pub fn get(&self, name: &str) -> Option<Model> {
        self.models.get(name).map(|entry| entry.value().clone())
    }

    /// Bind a typed CRUD/search service to a model
    pub fn cruds<T>(&self, model: &Model) -> ModelCruds<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        ModelCruds::new(model.clone(), self.adapter())
    }
}

impl fmt::Debug for Orm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orm")
            .field("adapter", &self.adapter.kind())
            .field("models", &self.models.len())
            .finish_non_exhaustive()
    }
}

/// Bind a chosen database's adapter into a model runtime
pub fn get_orm(objects: &DatabaseObjects) -> Orm {
    Orm::new(objects.adapter())
}
