//! Datastore adapter trait for multi-backend support
//!
//! This module provides the one capability contract every backend
//! implements: {get, put, delete, query, close}. The database objects
//! factory selects an implementation at construction time; nothing
//! downstream ever branches on backend identity again.

use crate::config::BackendKind;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

/// Backend-native search request
///
/// `filter` is handed to the engine in its native form (an equality map
/// for the key-value/relational/memory engines, a driver filter document
/// for the document store, a full search body for the index engine).
/// `page` is the opaque continuation token returned by a previous query.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub filter: JsonValue,
    pub page: Option<String>,
    pub limit: Option<u64>,
}

impl SearchQuery {
    pub fn new(filter: JsonValue) -> Self {
        Self {
            filter,
            page: None,
            limit: None,
        }
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One page of raw query results
#[derive(Debug, Clone)]
pub struct SearchPage {
    /// Matching documents in the engine's result order
    pub items: Vec<JsonValue>,
    /// Opaque continuation token; None when the engine reports no further page
    pub page: Option<String>,
}

/// Unified datastore adapter trait
///
/// Implemented once per backend. All payloads cross this boundary as plain
/// JSON values; driver-native row/document/hit shapes never escape an
/// adapter.
#[async_trait]
pub trait DatastoreAdapter: Send + Sync {
    /// The backend this adapter talks to
    fn kind(&self) -> BackendKind;

    /// Physical resource name for a model, via the bound naming function
    fn table_name(&self, model: &str) -> String;

    /// Persist a document under (model, id), overwriting any existing one
    async fn put(&self, model: &str, id: &str, value: JsonValue) -> Result<()>;

    /// Fetch a document by primary key
    ///
    /// # Returns
    /// * `Ok(Some(value))` - The stored document
    /// * `Ok(None)` - No document with that id; absence is not an error
    async fn get(&self, model: &str, id: &str) -> Result<Option<JsonValue>>;

    /// Delete a document by primary key; deleting a missing id is a no-op
    async fn delete(&self, model: &str, id: &str) -> Result<()>;

    /// Run a backend-native query and return one page of results
    async fn query(&self, model: &str, query: SearchQuery) -> Result<SearchPage>;

    /// Release the native client
    ///
    /// Idempotent: a second close resolves without error.
    async fn close(&self) -> Result<()>;
}

/// Check a document against an equality filter
///
/// A filter that is `null` or an empty object matches everything; otherwise
/// every filter key must be present in the document with an equal value.
/// Shared by the engines without a server-side query language of their own.
pub(crate) fn matches_filter(item: &JsonValue, filter: &JsonValue) -> bool {
    match filter {
        JsonValue::Null => true,
        JsonValue::Object(conditions) => conditions
            .iter()
            .all(|(key, expected)| item.get(key) == Some(expected)),
        _ => false,
    }
}

/// Parse an offset-style continuation token
pub(crate) fn parse_offset(page: Option<&str>) -> Result<u64> {
    match page {
        None => Ok(0),
        Some(token) => token.parse::<u64>().map_err(|_| {
            crate::error::Error::validation(format!("invalid page token '{}'", token))
        }),
    }
}

/// Apply offset/limit paging to an already-ordered result set
///
/// Emits a continuation token only when a limit was given and the page came
/// back full, mirroring offset-paging engines.
pub(crate) fn paginate_offset(
    items: Vec<JsonValue>,
    offset: u64,
    limit: Option<u64>,
) -> SearchPage {
    let remaining: Vec<JsonValue> = items.into_iter().skip(offset as usize).collect();

    match limit {
        None => SearchPage {
            items: remaining,
            page: None,
        },
        Some(limit) => {
            let taken: Vec<JsonValue> = remaining.into_iter().take(limit as usize).collect();
            let page = if taken.len() as u64 == limit && limit > 0 {
                Some((offset + limit).to_string())
            } else {
                None
            };
            SearchPage { items: taken, page }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matches_filter_empty_matches_all() {
        let doc = json!({"id": "1", "name": "a"});
        assert!(matches_filter(&doc, &JsonValue::Null));
        assert!(matches_filter(&doc, &json!({})));
    }

    #[test]
    fn test_matches_filter_equality() {
        let doc = json!({"id": "1", "name": "a", "count": 3});
        assert!(matches_filter(&doc, &json!({"name": "a"})));
        assert!(matches_filter(&doc, &json!({"name": "a", "count": 3})));
        assert!(!matches_filter(&doc, &json!({"name": "b"})));
        assert!(!matches_filter(&doc, &json!({"missing": "x"})));
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset(None).unwrap(), 0);
        assert_eq!(parse_offset(Some("25")).unwrap(), 25);
        assert!(parse_offset(Some("not-a-number")).is_err());
    }

    #[test]
    fn test_paginate_offset_without_limit_returns_everything() {
        let items = vec![json!({"id": "1"}), json!({"id": "2"})];
        let page = paginate_offset(items, 0, None);
        assert_eq!(page.items.len(), 2);
        assert!(page.page.is_none());
    }

    #[test]
    fn test_paginate_offset_emits_token_on_full_page() {
        let items: Vec<JsonValue> = (0..5).map(|i| json!({ "id": i.to_string() })).collect();

        let first = paginate_offset(items.clone(), 0, Some(2));
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.page.as_deref(), Some("2"));

        let last = paginate_offset(items, 4, Some(2));
        assert_eq!(last.items.len(), 1);
        assert!(last.page.is_none());
    }
}
