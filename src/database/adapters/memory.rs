//! In-memory datastore adapter
//!
//! Backs the adapter contract with process-local maps. There is no
//! connection step and close is a no-op, which makes this backend the
//! reference implementation for tests.

use crate::config::BackendKind;
use crate::database::adapter::{
    matches_filter, paginate_offset, parse_offset, DatastoreAdapter, SearchPage, SearchQuery,
};
use crate::error::Result;
use crate::naming::TableNameFn;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// In-memory datastore adapter
///
/// Documents live in per-table ordered maps, so query results come back in
/// deterministic id order.
pub struct MemoryAdapter {
    tables: DashMap<String, BTreeMap<String, JsonValue>>,
    names: TableNameFn,
}

impl MemoryAdapter {
    pub fn new(names: TableNameFn) -> Self {
        Self {
            tables: DashMap::new(),
            names,
        }
    }

    /// Number of documents currently stored for a model
    pub fn len(&self, model: &str) -> usize {
        self.tables
            .get(&self.table_name(model))
            .map(|t| t.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, model: &str) -> bool {
        self.len(model) == 0
    }
}

#[async_trait]
impl DatastoreAdapter for MemoryAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn table_name(&self, model: &str) -> String {
        (self.names)(model)
    }

    async fn put(&self, model: &str, id: &str, value: JsonValue) -> Result<()> {
        let table = self.table_name(model);
        log::debug!("memory PUT {}/{}", table, id);

        self.tables
            .entry(table)
            .or_default()
            .insert(id.to_string(), value);
        Ok(())
    }

    async fn get(&self, model: &str, id: &str) -> Result<Option<JsonValue>> {
        let table = self.table_name(model);
        Ok(self
            .tables
            .get(&table)
            .and_then(|table| table.get(id).cloned()))
    }

    async fn delete(&self, model: &str, id: &str) -> Result<()> {
        let table = self.table_name(model);
        log::debug!("memory DELETE {}/{}", table, id);

        if let Some(mut table) = self.tables.get_mut(&table) {
            table.remove(id);
        }
        Ok(())
    }

    async fn query(&self, model: &str, query: SearchQuery) -> Result<SearchPage> {
        let table = self.table_name(model);
        let offset = parse_offset(query.page.as_deref())?;

        let matching: Vec<JsonValue> = self
            .tables
            .get(&table)
            .map(|table| {
                table
                    .values()
                    .filter(|item| matches_filter(item, &query.filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(paginate_offset(matching, offset, query.limit))
    }

    async fn close(&self) -> Result<()> {
        // Nothing to release
        Ok(())
    }
}
