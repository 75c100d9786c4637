//! Model CRUD/search service
//!
//! The five-operation interface application code talks to. Every operation
//! converts between plain data and stored documents at this boundary, so
//! driver-native handles never leak upward. Create and update are the same
//! upsert; the distinction, if one ever matters, belongs to the underlying
//! engine.

use crate::database::adapter::{DatastoreAdapter, SearchQuery};
use crate::error::{Error, Result};
use crate::orm::Model;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::marker::PhantomData;
use std::sync::Arc;

/// One page of search results as plain data
#[derive(Debug, Clone)]
pub struct SearchResult<T> {
    /// Matching instances in the engine's result order
    pub instances: Vec<T>,
    /// Opaque continuation token, carried through from the adapter
    /// unchanged
    pub page: Option<String>,
}

/// CRUD/search operations closed over exactly one bound model
///
/// Cheap to construct; holds no state beyond the model descriptor and the
/// adapter handle, so instances are created on demand and never cached.
pub struct ModelCruds<T> {
    model: Model,
    adapter: Arc<dyn DatastoreAdapter>,
    _data: PhantomData<fn() -> T>,
}

impl<T> ModelCruds<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(model: Model, adapter: Arc<dyn DatastoreAdapter>) -> Self {
        Self {
            model,
            adapter,
            _data: PhantomData,
        }
    }

    /// The bound model, for advanced direct use
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Persist new data and return the stored plain representation
    ///
    /// # Returns
    /// * `Ok(T)` - The instance as the engine stored it
    /// * `Err(Error)` - Driver error, or an invariant violation when the
    ///   engine reports success yet the instance cannot be re-read
    pub async fn create(&self, data: T) -> Result<T> {
        let value = serde_json::to_value(&data)?;
        let id = self.extract_id(&value)?;

        self.adapter.put(self.model.name(), &id, value).await?;

        let stored = self
            .adapter
            .get(self.model.name(), &id)
            .await?
            .ok_or_else(|| {
                Error::invariant(format!(
                    "model '{}' instance '{}' is missing right after a successful save",
                    self.model.name(),
                    id
                ))
            })?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Overwrite existing data; identical to `create` (upsert semantics)
    pub async fn update(&self, data: T) -> Result<T> {
        self.create(data).await
    }

    /// Look up by primary key
    ///
    /// # Returns
    /// * `Ok(Some(T))` - The stored instance
    /// * `Ok(None)` - No instance with that id; absence is not an error
    pub async fn retrieve(&self, id: &str) -> Result<Option<T>> {
        match self.adapter.get(self.model.name(), id).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Delete by primary key; deleting a missing id resolves as a no-op
    pub async fn delete(&self, id: &str) -> Result<()> {
        if self.adapter.get(self.model.name(), id).await?.is_none() {
            return Ok(());
        }
        self.adapter.delete(self.model.name(), id).await
    }

    /// Run a backend-native query and normalize the results
    ///
    /// Every returned instance is plain data; order is preserved and the
    /// adapter's pagination token is carried through unchanged.
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResult<T>> {
        let page = self.adapter.query(self.model.name(), query).await?;

        let mut instances = Vec::with_capacity(page.items.len());
        for item in page.items {
            instances.push(serde_json::from_value(item)?);
        }

        Ok(SearchResult {
            instances,
            page: page.page,
        })
    }

    fn extract_id(&self, value: &JsonValue) -> Result<String> {
        match value.get(self.model.id_field()) {
            Some(JsonValue::String(id)) => Ok(id.clone()),
            Some(JsonValue::Number(id)) => Ok(id.to_string()),
            _ => Err(Error::validation(format!(
                "model '{}' data has no usable '{}' field",
                self.model.name(),
                self.model.id_field()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::adapters::MemoryAdapter;
    use crate::naming::default_table_name_fn;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: String,
        label: String,
        count: i64,
    }

    fn cruds() -> ModelCruds<Widget> {
        let adapter = Arc::new(MemoryAdapter::new(default_table_name_fn("sys", "test")));
        ModelCruds::new(Model::new("Widget"), adapter)
    }

    fn widget(id: &str, label: &str, count: i64) -> Widget {
        Widget {
            id: id.to_string(),
            label: label.to_string(),
            count,
        }
    }

    #[tokio::test]
    async fn test_create_retrieve_roundtrip() {
        let cruds = cruds();
        let data = widget("w1", "first", 1);

        let created = cruds.create(data.clone()).await.unwrap();
        assert_eq!(created, data);

        let fetched = cruds.retrieve("w1").await.unwrap();
        assert_eq!(fetched, Some(data));
    }

    #[tokio::test]
    async fn test_retrieve_missing_is_none() {
        let cruds = cruds();
        assert_eq!(cruds.retrieve("never-existed").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_overwrites() {
        let cruds = cruds();
        cruds.create(widget("w1", "first", 1)).await.unwrap();

        let updated = cruds.update(widget("w1", "renamed", 2)).await.unwrap();
        assert_eq!(updated.label, "renamed");
        assert_eq!(cruds.retrieve("w1").await.unwrap().unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_delete_then_retrieve_is_none() {
        let cruds = cruds();
        cruds.create(widget("w1", "first", 1)).await.unwrap();

        cruds.delete("w1").await.unwrap();
        assert_eq!(cruds.retrieve("w1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let cruds = cruds();
        cruds.delete("never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn test_search_on_empty_store() {
        let cruds = cruds();
        let result = cruds.search(SearchQuery::default()).await.unwrap();
        assert!(result.instances.is_empty());
        assert!(result.page.is_none());
    }

    #[tokio::test]
    async fn test_search_preserves_order_and_filters() {
        let cruds = cruds();
        for (id, count) in [("a", 1), ("b", 2), ("c", 1)] {
            cruds.create(widget(id, "x", count)).await.unwrap();
        }

        let all = cruds.search(SearchQuery::default()).await.unwrap();
        let ids: Vec<&str> = all.instances.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);

        let ones = cruds
            .search(SearchQuery::new(json!({"count": 1})))
            .await
            .unwrap();
        assert_eq!(ones.instances.len(), 2);
    }

    #[tokio::test]
    async fn test_create_without_id_is_rejected() {
        #[derive(Debug, Serialize, Deserialize)]
        struct NoId {
            label: String,
        }

        let adapter = Arc::new(MemoryAdapter::new(default_table_name_fn("sys", "test")));
        let cruds: ModelCruds<NoId> = ModelCruds::new(Model::new("NoId"), adapter);

        let err = cruds
            .create(NoId {
                label: "x".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("id"));
    }

    #[tokio::test]
    async fn test_numeric_id_is_accepted() {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        struct Numbered {
            id: i64,
            label: String,
        }

        let adapter = Arc::new(MemoryAdapter::new(default_table_name_fn("sys", "test")));
        let cruds: ModelCruds<Numbered> = ModelCruds::new(Model::new("Numbered"), adapter);

        let data = Numbered {
            id: 42,
            label: "answer".to_string(),
        };
        cruds.create(data.clone()).await.unwrap();
        assert_eq!(cruds.retrieve("42").await.unwrap(), Some(data));
    }
}
