//! Tests for the cleanup coordinator's error handling
//!
//! Uses a scripted adapter so teardown failures can be produced on demand.

use async_trait::async_trait;
use polystore::{
    BackendKind, DatabaseObjects, DatastoreAdapter, Error, NativeClient, SearchPage, SearchQuery,
};
use serde_json::Value as JsonValue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Adapter whose close() fails with a configurable message
struct FlakyCloseAdapter {
    close_error: Option<String>,
    close_calls: AtomicUsize,
}

impl FlakyCloseAdapter {
    fn new(close_error: Option<&str>) -> Self {
        Self {
            close_error: close_error.map(str::to_string),
            close_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DatastoreAdapter for FlakyCloseAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn table_name(&self, model: &str) -> String {
        model.to_string()
    }

    async fn put(&self, _model: &str, _id: &str, _value: JsonValue) -> polystore::Result<()> {
        Ok(())
    }

    async fn get(&self, _model: &str, _id: &str) -> polystore::Result<Option<JsonValue>> {
        Ok(None)
    }

    async fn delete(&self, _model: &str, _id: &str) -> polystore::Result<()> {
        Ok(())
    }

    async fn query(&self, _model: &str, _query: SearchQuery) -> polystore::Result<SearchPage> {
        Ok(SearchPage {
            items: Vec::new(),
            page: None,
        })
    }

    async fn close(&self) -> polystore::Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        match &self.close_error {
            Some(message) => Err(Error::invariant(message.clone())),
            None => Ok(()),
        }
    }
}

#[tokio::test]
async fn test_clean_close_propagates_nothing() {
    let adapter = Arc::new(FlakyCloseAdapter::new(None));
    let objects = DatabaseObjects::new(adapter.clone(), NativeClient::None);

    objects.cleanup().await.unwrap();
    assert_eq!(adapter.close_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_already_closed_client_is_suppressed() {
    let adapter = Arc::new(FlakyCloseAdapter::new(Some(
        "Operation interrupted because the client was closed",
    )));
    let objects = DatabaseObjects::new(adapter.clone(), NativeClient::None);

    // the driver's idempotent-teardown complaint never reaches the caller
    objects.cleanup().await.unwrap();
    objects.cleanup().await.unwrap();
    assert_eq!(adapter.close_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_real_teardown_failure_propagates() {
    let adapter = Arc::new(FlakyCloseAdapter::new(Some("connection pool poisoned")));
    let objects = DatabaseObjects::new(adapter, NativeClient::None);

    let err = objects.cleanup().await.unwrap_err();
    assert!(err.to_string().contains("connection pool poisoned"));
}
