//! End-to-end tests for the model service over the in-memory backend

use polystore::{get_model_props, HostContext, SearchQuery};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Account {
    id: String,
    owner: String,
    balance: i64,
}

fn account(id: &str, owner: &str, balance: i64) -> Account {
    Account {
        id: id.to_string(),
        owner: owner.to_string(),
        balance,
    }
}

fn host_context() -> HostContext {
    let config = serde_json::from_value(json!({
        "default": { "datastoreType": "memory" },
        "archive": { "datastoreType": "memory" }
    }))
    .unwrap();
    HostContext::new("test", "bank", config).unwrap()
}

#[tokio::test]
async fn test_full_crud_lifecycle() {
    let context = host_context();
    let orm = get_model_props(&context, None).await.unwrap();
    let model = orm.define("Account");
    let accounts = orm.cruds::<Account>(&model);

    // create then read back
    let created = accounts.create(account("a1", "alice", 100)).await.unwrap();
    assert_eq!(created.balance, 100);
    assert_eq!(
        accounts.retrieve("a1").await.unwrap(),
        Some(account("a1", "alice", 100))
    );

    // update is an upsert over the same id
    let updated = accounts.update(account("a1", "alice", 250)).await.unwrap();
    assert_eq!(updated.balance, 250);

    // delete, then both retrieve and a second delete observe absence
    accounts.delete("a1").await.unwrap();
    assert_eq!(accounts.retrieve("a1").await.unwrap(), None);
    accounts.delete("a1").await.unwrap();

    context.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_search_with_filter_and_paging() {
    let context = host_context();
    let orm = get_model_props(&context, None).await.unwrap();
    let model = orm.define("Account");
    let accounts = orm.cruds::<Account>(&model);

    for i in 1..=5 {
        accounts
            .create(account(&format!("a{}", i), "alice", i))
            .await
            .unwrap();
    }
    accounts.create(account("b1", "bob", 10)).await.unwrap();

    let alices = accounts
        .search(SearchQuery::new(json!({"owner": "alice"})))
        .await
        .unwrap();
    assert_eq!(alices.instances.len(), 5);
    assert!(alices.page.is_none());

    // page through alice's accounts two at a time
    let first = accounts
        .search(SearchQuery::new(json!({"owner": "alice"})).with_limit(2))
        .await
        .unwrap();
    assert_eq!(first.instances.len(), 2);
    let token = first.page.unwrap();

    let second = accounts
        .search(
            SearchQuery::new(json!({"owner": "alice"}))
                .with_limit(2)
                .with_page(token),
        )
        .await
        .unwrap();
    assert_eq!(second.instances.len(), 2);
    assert_ne!(first.instances[0].id, second.instances[0].id);
}

#[tokio::test]
async fn test_search_on_empty_model() {
    let context = host_context();
    let orm = get_model_props(&context, None).await.unwrap();
    let model = orm.define("Account");
    let accounts = orm.cruds::<Account>(&model);

    let result = accounts.search(SearchQuery::default()).await.unwrap();
    assert!(result.instances.is_empty());
    assert!(result.page.is_none());
}

#[tokio::test]
async fn test_named_databases_are_isolated() {
    let context = host_context();
    let live = get_model_props(&context, None).await.unwrap();
    let archive = get_model_props(&context, Some("archive")).await.unwrap();

    let model = live.define("Account");
    live.cruds::<Account>(&model)
        .create(account("a1", "alice", 1))
        .await
        .unwrap();

    let archived = archive
        .cruds::<Account>(&archive.define("Account"))
        .retrieve("a1")
        .await
        .unwrap();
    assert_eq!(archived, None);
}

#[tokio::test]
async fn test_unknown_database_name_is_rejected() {
    let context = host_context();
    let err = get_model_props(&context, Some("nope")).await.unwrap_err();
    assert!(err.to_string().contains("nope"));
}

#[tokio::test]
async fn test_missing_default_entry_is_rejected() {
    let config = serde_json::from_value(json!({
        "archive": { "datastoreType": "memory" }
    }))
    .unwrap();
    assert!(HostContext::new("test", "bank", config).is_err());
}

#[tokio::test]
async fn test_custom_table_name_fn_replaces_default() {
    let config = serde_json::from_value(json!({
        "default": { "datastoreType": "memory" }
    }))
    .unwrap();
    let context = HostContext::new("test", "bank", config)
        .unwrap()
        .with_table_name_fn("default", Arc::new(|model| format!("legacy_{}", model)));

    let objects = context.registry().get_default().await.unwrap();
    assert_eq!(objects.adapter().table_name("Account"), "legacy_Account");
}
