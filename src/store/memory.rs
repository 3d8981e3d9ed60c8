//! In-Memory Entity Store
//!
//! Dev-mode and test backend. Same contract as the PostgreSQL store,
//! nothing survives a restart.

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::store::entity::{EntityStore, Filter, Record, SortKey};

#[derive(Debug, Clone, Default)]
pub struct MemoryEntityStore {
    collections: Arc<RwLock<HashMap<String, Vec<Record>>>>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, Vec::len)
    }
}

/// Shallow JSON merge; `patch` must be an object
pub(crate) fn merge_patch(target: &mut Value, patch: Value) -> Result<()> {
    let Value::Object(fields) = patch else {
        return Err(anyhow!("patch must be a JSON object"));
    };

    match target {
        Value::Object(existing) => {
            for (key, value) in fields {
                existing.insert(key, value);
            }
        }
        other => *other = Value::Object(fields),
    }
    Ok(())
}

impl EntityStore for MemoryEntityStore {
    async fn create(&self, collection: &str, data: Value) -> Result<Record> {
        let now = Utc::now();
        let record = Record {
            id: Uuid::new_v4().to_string(),
            collection: collection.to_string(),
            data,
            created_date: now,
            updated_date: now,
        };

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());

        debug!(collection = %collection, id = %record.id, "Created record");
        Ok(record)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|records| records.iter().find(|r| r.id == id))
            .cloned())
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Record> {
        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| anyhow!("{} record {} not found", collection, id))?;

        merge_patch(&mut record.data, patch)?;
        record.updated_date = Utc::now();

        debug!(collection = %collection, id = %id, "Updated record");
        Ok(record.clone())
    }

    async fn filter(&self, collection: &str, filter: &Filter) -> Result<Vec<Record>> {
        let collections = self.collections.read().await;
        let mut matched: Vec<Record> = collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| filter.matches(&r.data))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        matched.sort_by_key(|r| r.created_date);
        Ok(matched)
    }

    async fn list(&self, collection: &str, sort: &SortKey, limit: usize) -> Result<Vec<Record>> {
        let collections = self.collections.read().await;
        let mut records = collections.get(collection).cloned().unwrap_or_default();

        records.sort_by(|a, b| sort.compare(a, b));
        records.truncate(limit);
        Ok(records)
    }
}
