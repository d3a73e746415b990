//! In-process store with the same constraints as the PostgreSQL schema:
//! required columns, column types, enum values and RESTRICT foreign keys.
//! Each instance is isolated, so tests can create one per case.

use super::{resolve_fields, resolve_update_fields, Record, Store};
use crate::error::StoreError;
use crate::resource::{Column, ColumnKind, Resource};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    // rows in insertion order, per resource
    tables: RwLock<HashMap<Resource, Vec<Record>>>,
}

type Tables = HashMap<Resource, Vec<Record>>;

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn exists(tables: &Tables, resource: Resource, id: &str) -> bool {
    tables
        .get(&resource)
        .is_some_and(|rows| rows.iter().any(|r| r.get("id").and_then(Value::as_str) == Some(id)))
}

/// Check one value against its column and return the normalized form to store.
fn check_value(
    tables: &Tables,
    resource: Resource,
    column: &'static Column,
    value: Value,
) -> Result<Value, StoreError> {
    let invalid = |reason: &str| StoreError::InvalidValue {
        resource,
        field: column.name,
        reason: reason.to_string(),
    };
    if value.is_null() {
        if column.required {
            return Err(StoreError::MissingField {
                resource,
                field: column.name,
            });
        }
        return Ok(value);
    }
    let value = match column.kind {
        ColumnKind::Text if value.is_string() => value,
        // INTEGER columns are 32-bit
        ColumnKind::Integer if value.as_i64().is_some_and(|n| i32::try_from(n).is_ok()) => value,
        ColumnKind::Float if value.is_number() => value,
        ColumnKind::Boolean if value.is_boolean() => value,
        ColumnKind::Timestamp => {
            let s = value.as_str().ok_or_else(|| invalid("expected an ISO-8601 string"))?;
            let ts = DateTime::parse_from_rfc3339(s).map_err(|e| invalid(&e.to_string()))?;
            Value::String(ts.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        ColumnKind::Enum(e) => {
            if !value.as_str().is_some_and(|s| e.values.contains(&s)) {
                return Err(invalid(&format!("expected one of {:?}", e.values)));
            }
            value
        }
        _ => return Err(invalid(&format!("expected {}", column.kind.pg_type()))),
    };
    if let (Some(target), Some(id)) = (column.references, value.as_str()) {
        if !exists(tables, target, id) {
            return Err(StoreError::ForeignKey {
                resource,
                field: column.name.to_string(),
            });
        }
    }
    Ok(value)
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_all(&self, resource: Resource) -> Result<Vec<Record>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(tables.get(&resource).cloned().unwrap_or_default())
    }

    async fn find_by_id(&self, resource: Resource, id: &str) -> Result<Option<Record>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(tables.get(&resource).and_then(|rows| {
            rows.iter()
                .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
                .cloned()
        }))
    }

    async fn insert(&self, resource: Resource, payload: Value) -> Result<Record, StoreError> {
        let fields = resolve_fields(resource, payload)?;
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());

        let mut record = Record::new();
        for (column, value) in fields {
            let value = check_value(&tables, resource, column, value)?;
            record.insert(column.name.to_string(), value);
        }
        for column in resource.columns() {
            if record.contains_key(column.name) {
                continue;
            }
            if column.required {
                return Err(StoreError::MissingField {
                    resource,
                    field: column.name,
                });
            }
            let default = match column.kind {
                ColumnKind::Boolean => Value::Bool(false),
                _ => Value::Null,
            };
            record.insert(column.name.to_string(), default);
        }
        let stamp = now();
        record.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        record.insert("createdAt".into(), stamp.clone());
        record.insert("updatedAt".into(), stamp);

        tables.entry(resource).or_default().push(record.clone());
        Ok(record)
    }

    async fn update(&self, resource: Resource, id: &str, payload: Value) -> Result<Record, StoreError> {
        let fields = resolve_update_fields(resource, id, payload)?;
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());

        let mut checked = Vec::with_capacity(fields.len());
        for (column, value) in fields {
            checked.push((column, check_value(&tables, resource, column, value)?));
        }
        let not_found = || StoreError::NotFound {
            resource,
            id: id.to_string(),
        };
        let record = tables
            .get_mut(&resource)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
            })
            .ok_or_else(not_found)?;
        for (column, value) in checked {
            record.insert(column.name.to_string(), value);
        }
        record.insert("updatedAt".into(), now());
        Ok(record.clone())
    }

    async fn delete(&self, resource: Resource, id: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        if !exists(&tables, resource, id) {
            return Err(StoreError::NotFound {
                resource,
                id: id.to_string(),
            });
        }
        for (owner, column) in resource.referenced_by() {
            let referenced = tables.get(&owner).is_some_and(|rows| {
                rows.iter()
                    .any(|r| r.get(column.name).and_then(Value::as_str) == Some(id))
            });
            if referenced {
                return Err(StoreError::ForeignKey {
                    resource: owner,
                    field: column.name.to_string(),
                });
            }
        }
        if let Some(rows) = tables.get_mut(&resource) {
            rows.retain(|r| r.get("id").and_then(Value::as_str) != Some(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
