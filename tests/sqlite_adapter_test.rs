//! Integration tests for the SQLite adapter against a temporary database file

use polystore::database::adapters::SqliteAdapter;
use polystore::naming::default_table_name_fn;
use polystore::{DatastoreAdapter, SearchQuery};
use serde_json::json;

async fn adapter(dir: &tempfile::TempDir) -> SqliteAdapter {
    let filename = dir
        .path()
        .join("store.db")
        .to_string_lossy()
        .into_owned();
    SqliteAdapter::connect(&filename, default_table_name_fn("sys", "test"))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_put_get_delete_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let sqlite = adapter(&dir).await;

    sqlite
        .put("Account", "a1", json!({"id": "a1", "owner": "alice"}))
        .await
        .unwrap();
    assert_eq!(
        sqlite.get("Account", "a1").await.unwrap(),
        Some(json!({"id": "a1", "owner": "alice"}))
    );

    sqlite.delete("Account", "a1").await.unwrap();
    assert_eq!(sqlite.get("Account", "a1").await.unwrap(), None);

    sqlite.close().await.unwrap();
}

#[tokio::test]
async fn test_put_is_an_upsert() {
    let dir = tempfile::tempdir().unwrap();
    let sqlite = adapter(&dir).await;

    sqlite
        .put("Account", "a1", json!({"id": "a1", "balance": 1}))
        .await
        .unwrap();
    sqlite
        .put("Account", "a1", json!({"id": "a1", "balance": 2}))
        .await
        .unwrap();

    let stored = sqlite.get("Account", "a1").await.unwrap().unwrap();
    assert_eq!(stored["balance"], 2);

    sqlite.close().await.unwrap();
}

#[tokio::test]
async fn test_query_filters_and_pages() {
    let dir = tempfile::tempdir().unwrap();
    let sqlite = adapter(&dir).await;

    for i in 1..=4 {
        sqlite
            .put(
                "Account",
                &format!("a{}", i),
                json!({"id": format!("a{}", i), "owner": "alice"}),
            )
            .await
            .unwrap();
    }
    sqlite
        .put("Account", "b1", json!({"id": "b1", "owner": "bob"}))
        .await
        .unwrap();

    let all = sqlite
        .query("Account", SearchQuery::default())
        .await
        .unwrap();
    assert_eq!(all.items.len(), 5);

    let first = sqlite
        .query(
            "Account",
            SearchQuery::new(json!({"owner": "alice"})).with_limit(3),
        )
        .await
        .unwrap();
    assert_eq!(first.items.len(), 3);
    let token = first.page.unwrap();

    let rest = sqlite
        .query(
            "Account",
            SearchQuery::new(json!({"owner": "alice"}))
                .with_limit(3)
                .with_page(token),
        )
        .await
        .unwrap();
    assert_eq!(rest.items.len(), 1);
    assert!(rest.page.is_none());

    sqlite.close().await.unwrap();
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let sqlite = adapter(&dir).await;

    sqlite.close().await.unwrap();
    sqlite.close().await.unwrap();
}
