//! Entity Store Contract
//!
//! Generic record storage addressed by collection name. Records carry a
//! schemaless JSON body; typed views (profiles etc.) are decoded by callers.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::future::Future;

/// A stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub collection: String,
    pub data: Value,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

/// Field-equality predicate over a record body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Map<String, Value>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn matches(&self, data: &Value) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| data.get(field) == Some(expected))
    }

    /// The predicate as a JSON object (used for containment queries)
    pub fn as_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Sort order for `list`; `-field` means descending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub const CREATED_DATE: &'static str = "created_date";
    pub const UPDATED_DATE: &'static str = "updated_date";

    pub fn parse(key: &str) -> Self {
        match key.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_string(),
                descending: true,
            },
            None => Self {
                field: key.to_string(),
                descending: false,
            },
        }
    }

    pub fn descending(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }

    /// Whether the key refers to record metadata rather than the body
    pub fn is_timestamp(&self) -> bool {
        self.field == Self::CREATED_DATE || self.field == Self::UPDATED_DATE
    }

    /// Records without the field sort last in either direction, like
    /// `NULLS LAST` in the Postgres store
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = match self.field.as_str() {
            Self::CREATED_DATE => a.created_date.cmp(&b.created_date),
            Self::UPDATED_DATE => a.updated_date.cmp(&b.updated_date),
            field => match (a.data.get(field), b.data.get(field)) {
                (Some(x), Some(y)) => compare_values(x, y),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => return Ordering::Equal,
            },
        };

        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// null < bool < number < string < other
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn class(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => class(a).cmp(&class(b)),
    }
}

/// Remote (or in-process) record storage
pub trait EntityStore: Send + Sync {
    fn create(&self, collection: &str, data: Value)
        -> impl Future<Output = Result<Record>> + Send;

    fn get(&self, collection: &str, id: &str)
        -> impl Future<Output = Result<Option<Record>>> + Send;

    /// Shallow-merge `patch` into the record body; fails if the record is missing
    fn update(&self, collection: &str, id: &str, patch: Value)
        -> impl Future<Output = Result<Record>> + Send;

    /// Records matching `filter`, oldest first
    fn filter(&self, collection: &str, filter: &Filter)
        -> impl Future<Output = Result<Vec<Record>>> + Send;

    fn list(&self, collection: &str, sort: &SortKey, limit: usize)
        -> impl Future<Output = Result<Vec<Record>>> + Send;
}
