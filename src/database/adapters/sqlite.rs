//! SQLite datastore adapter implementation
//!
//! The embedded engine: the file path is the database identity, so no
//! logical database name is involved. Documents are stored per model in a
//! two-column `(id, doc)` table created lazily.

use crate::config::BackendKind;
use crate::database::adapter::{
    matches_filter, paginate_offset, parse_offset, DatastoreAdapter, SearchPage, SearchQuery,
};
use crate::error::Result;
use crate::naming::TableNameFn;
use async_trait::async_trait;
use dashmap::DashSet;
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::sync::atomic::{AtomicBool, Ordering};

/// SQLite datastore adapter
pub struct SqliteAdapter {
    pool: SqlitePool,
    names: TableNameFn,
    created_tables: DashSet<String>,
    closed: AtomicBool,
}

impl SqliteAdapter {
    /// Open (or create) the database file and build the adapter
    pub async fn connect(filename: &str, names: TableNameFn) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(filename)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        log::info!("SQLite connection established: {}", filename);

        Ok(Self {
            pool,
            names,
            created_tables: DashSet::new(),
            closed: AtomicBool::new(false),
        })
    }

    /// Get reference to the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_table(&self, table: &str) -> Result<()> {
        if self.created_tables.contains(table) {
            return Ok(());
        }

        let sql = format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (id TEXT PRIMARY KEY, doc TEXT NOT NULL)",
            table
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        self.created_tables.insert(table.to_string());
        Ok(())
    }
}

#[async_trait]
impl DatastoreAdapter for SqliteAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    fn table_name(&self, model: &str) -> String {
        (self.names)(model)
    }

    async fn put(&self, model: &str, id: &str, value: JsonValue) -> Result<()> {
        let table = self.table_name(model);
        self.ensure_table(&table).await?;
        log::debug!("sqlite PUT {}/{}", table, id);

        let sql = format!(
            "INSERT INTO \"{}\" (id, doc) VALUES (?, ?) \
             ON CONFLICT(id) DO UPDATE SET doc = excluded.doc",
            table
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(serde_json::to_string(&value)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, model: &str, id: &str) -> Result<Option<JsonValue>> {
        let table = self.table_name(model);
        self.ensure_table(&table).await?;

        let sql = format!("SELECT doc FROM \"{}\" WHERE id = ?", table);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let doc: String = row.try_get("doc")?;
                Ok(Some(serde_json::from_str(&doc)?))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, model: &str, id: &str) -> Result<()> {
        let table = self.table_name(model);
        self.ensure_table(&table).await?;
        log::debug!("sqlite DELETE {}/{}", table, id);

        let sql = format!("DELETE FROM \"{}\" WHERE id = ?", table);
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn query(&self, model: &str, query: SearchQuery) -> Result<SearchPage> {
        let table = self.table_name(model);
        self.ensure_table(&table).await?;
        let offset = parse_offset(query.page.as_deref())?;

        let sql = format!("SELECT doc FROM \"{}\" ORDER BY id", table);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut matching = Vec::with_capacity(rows.len());
        for row in rows {
            let doc: String = row.try_get("doc")?;
            let value: JsonValue = serde_json::from_str(&doc)?;
            if matches_filter(&value, &query.filter) {
                matching.push(value);
            }
        }

        Ok(paginate_offset(matching, offset, query.limit))
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.pool.close().await;
        Ok(())
    }
}
