//! PostgreSQL Entity Store using sqlx
//!
//! All collections share one JSONB table; filters use containment (`@>`),
//! body sort keys use jsonb ordering so numbers compare numerically.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use crate::store::entity::{EntityStore, Filter, Record, SortKey};

const RECORD_COLUMNS: &str = "id, collection, data, created_date, updated_date";

#[derive(Debug, Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub async fn connect(connection_string: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await
            .context("Failed to connect to PostgreSQL")?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing entity schema...");

        sqlx::query("CREATE SCHEMA IF NOT EXISTS entities")
            .execute(&self.pool)
            .await
            .context("Failed to create entities schema")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entities.records (
                id TEXT PRIMARY KEY,
                collection TEXT NOT NULL,
                data JSONB NOT NULL,
                created_date TIMESTAMPTZ NOT NULL,
                updated_date TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create entities.records table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS records_collection_idx ON entities.records (collection, created_date)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create collection index")?;

        info!("Entity schema initialized");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn record_from_row(row: PgRow) -> Result<Record> {
    let data: Json<Value> = row.try_get("data")?;
    let created_date: DateTime<Utc> = row.try_get("created_date")?;
    let updated_date: DateTime<Utc> = row.try_get("updated_date")?;

    Ok(Record {
        id: row.try_get("id")?,
        collection: row.try_get("collection")?,
        data: data.0,
        created_date,
        updated_date,
    })
}

impl EntityStore for PgEntityStore {
    async fn create(&self, collection: &str, data: Value) -> Result<Record> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO entities.records (id, collection, data, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(&id)
        .bind(collection)
        .bind(Json(data))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Failed to insert {} record", collection))?;

        debug!(collection = %collection, id = %id, "Created record");
        record_from_row(row)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM entities.records WHERE collection = $1 AND id = $2"
        ))
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to load {} record {}", collection, id))?;

        row.map(record_from_row).transpose()
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Record> {
        if !patch.is_object() {
            return Err(anyhow!("patch must be a JSON object"));
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE entities.records
            SET data = data || $3, updated_date = NOW()
            WHERE collection = $1 AND id = $2
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(collection)
        .bind(id)
        .bind(Json(patch))
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to update {} record {}", collection, id))?;

        let row = row.ok_or_else(|| anyhow!("{} record {} not found", collection, id))?;
        debug!(collection = %collection, id = %id, "Updated record");
        record_from_row(row)
    }

    async fn filter(&self, collection: &str, filter: &Filter) -> Result<Vec<Record>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS} FROM entities.records
            WHERE collection = $1 AND data @> $2
            ORDER BY created_date ASC
            "#
        ))
        .bind(collection)
        .bind(Json(filter.as_json()))
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to filter {} records", collection))?;

        rows.into_iter().map(record_from_row).collect()
    }

    async fn list(&self, collection: &str, sort: &SortKey, limit: usize) -> Result<Vec<Record>> {
        let direction = if sort.descending { "DESC" } else { "ASC" };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = if sort.is_timestamp() {
            // Column name comes from a fixed whitelist, never from the caller
            let column = if sort.field == SortKey::CREATED_DATE {
                "created_date"
            } else {
                "updated_date"
            };
            sqlx::query(&format!(
                "SELECT {RECORD_COLUMNS} FROM entities.records WHERE collection = $1 \
                 ORDER BY {column} {direction} LIMIT $2"
            ))
            .bind(collection)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query(&format!(
                "SELECT {RECORD_COLUMNS} FROM entities.records WHERE collection = $1 \
                 ORDER BY data -> $3 {direction} NULLS LAST LIMIT $2"
            ))
            .bind(collection)
            .bind(limit)
            .bind(&sort.field)
            .fetch_all(&self.pool)
            .await
        }
        .with_context(|| format!("Failed to list {} records", collection))?;

        rows.into_iter().map(record_from_row).collect()
    }
}
