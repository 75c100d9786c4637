//! DynamoDB datastore adapter implementation
//!
//! The SDK client rides on a dedicated HTTPS agent with connection reuse
//! enabled and a bounded concurrent-socket ceiling (default 50) unless the
//! caller overrides the agent configuration.

use crate::config::{BackendKind, HttpsAgentConfig};
use crate::database::adapter::{DatastoreAdapter, SearchPage, SearchQuery};
use crate::error::{Error, Result};
use crate::naming::TableNameFn;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;
use serde_dynamo::aws_sdk_dynamodb_1::{from_item, from_items, to_attribute_value, to_item};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Connection parameters for the key-value store
pub struct DynamoConnection<'a> {
    pub aws_region: &'a str,
    pub https_agent: HttpsAgentConfig,
}

/// Saturate a caller-supplied limit into the SDK's signed page-size type
pub(crate) fn scan_limit(limit: u64) -> i32 {
    i32::try_from(limit).unwrap_or(i32::MAX)
}

/// DynamoDB datastore adapter
pub struct DynamoAdapter {
    client: Client,
    names: TableNameFn,
    closed: AtomicBool,
}

impl DynamoAdapter {
    /// Build the SDK client with the tuned HTTPS agent
    pub async fn connect(conn: DynamoConnection<'_>, names: TableNameFn) -> Result<Self> {
        let mut hyper_builder = hyper::client::Builder::default();
        hyper_builder.pool_max_idle_per_host(conn.https_agent.max_sockets);
        if !conn.https_agent.keep_alive {
            hyper_builder.pool_idle_timeout(Duration::from_secs(0));
        }

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_only()
            .enable_http1()
            .enable_http2()
            .build();
        let http_client = HyperClientBuilder::new()
            .hyper_builder(hyper_builder)
            .build(connector);

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(conn.aws_region.to_string()))
            .http_client(http_client)
            .load()
            .await;
        log::info!("DynamoDB client ready: region {}", conn.aws_region);

        Ok(Self {
            client: Client::new(&sdk_config),
            names,
            closed: AtomicBool::new(false),
        })
    }

    /// Get the underlying native client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl DatastoreAdapter for DynamoAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Dynamodb
    }

    fn table_name(&self, model: &str) -> String {
        (self.names)(model)
    }

    async fn put(&self, model: &str, id: &str, value: JsonValue) -> Result<()> {
        let table = self.table_name(model);
        log::debug!("dynamodb PUT {}/{}", table, id);

        let mut item: HashMap<String, AttributeValue> = to_item(&value)?;
        item.insert("id".to_string(), AttributeValue::S(id.to_string()));

        self.client
            .put_item()
            .table_name(&table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(())
    }

    async fn get(&self, model: &str, id: &str) -> Result<Option<JsonValue>> {
        let table = self.table_name(model);

        let output = self
            .client
            .get_item()
            .table_name(&table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;

        match output.item {
            Some(item) => Ok(Some(from_item(item)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, model: &str, id: &str) -> Result<()> {
        let table = self.table_name(model);
        log::debug!("dynamodb DELETE {}/{}", table, id);

        self.client
            .delete_item()
            .table_name(&table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(())
    }

    async fn query(&self, model: &str, query: SearchQuery) -> Result<SearchPage> {
        let table = self.table_name(model);

        // The page token is the serialized LastEvaluatedKey from the
        // previous scan
        let start_key = match query.page.as_deref() {
            Some(token) => {
                let value: JsonValue = serde_json::from_str(token)
                    .map_err(|_| Error::validation(format!("invalid page token '{}'", token)))?;
                Some(to_item(&value)?)
            }
            None => None,
        };

        let mut scan = self
            .client
            .scan()
            .table_name(&table)
            .set_exclusive_start_key(start_key);
        if let Some(limit) = query.limit {
            scan = scan.limit(scan_limit(limit));
        }

        if let JsonValue::Object(conditions) = &query.filter {
            if !conditions.is_empty() {
                let mut name_map = HashMap::new();
                let mut value_map = HashMap::new();
                let mut clauses = Vec::with_capacity(conditions.len());

                for (index, (field, expected)) in conditions.iter().enumerate() {
                    let name_key = format!("#f{}", index);
                    let value_key = format!(":v{}", index);
                    clauses.push(format!("{} = {}", name_key, value_key));
                    name_map.insert(name_key, field.clone());
                    value_map.insert(value_key, to_attribute_value(expected.clone())?);
                }

                scan = scan
                    .filter_expression(clauses.join(" AND "))
                    .set_expression_attribute_names(Some(name_map))
                    .set_expression_attribute_values(Some(value_map));
            }
        }

        let output = scan.send().await.map_err(aws_sdk_dynamodb::Error::from)?;

        let items: Vec<JsonValue> = from_items(output.items.unwrap_or_default())?;
        let page = match output.last_evaluated_key {
            Some(key) => {
                let value: JsonValue = from_item(key)?;
                Some(serde_json::to_string(&value)?)
            }
            None => None,
        };

        Ok(SearchPage { items, page })
    }

    async fn close(&self) -> Result<()> {
        // The SDK client holds no exclusive resources; guard only for
        // idempotence
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
