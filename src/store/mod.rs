//! Storage layer: the `Store` trait the controllers call, and its PostgreSQL and in-memory implementations.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::error::StoreError;
use crate::resource::{Column, Resource, SYSTEM_FIELDS};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// One row as returned to clients: camelCase keys, `id` always present.
pub type Record = Map<String, Value>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_all(&self, resource: Resource) -> Result<Vec<Record>, StoreError>;
    async fn find_by_id(&self, resource: Resource, id: &str) -> Result<Option<Record>, StoreError>;
    async fn insert(&self, resource: Resource, payload: Value) -> Result<Record, StoreError>;
    async fn update(&self, resource: Resource, id: &str, payload: Value) -> Result<Record, StoreError>;
    async fn delete(&self, resource: Resource, id: &str) -> Result<(), StoreError>;
    /// Cheap liveness check used by the readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// A store bound to one resource: the handle a controller is constructed with.
#[derive(Clone)]
pub struct Collection {
    store: Arc<dyn Store>,
    resource: Resource,
}

impl Collection {
    pub fn new(store: Arc<dyn Store>, resource: Resource) -> Self {
        Self { store, resource }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub async fn find_all(&self) -> Result<Vec<Record>, StoreError> {
        self.store.find_all(self.resource).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Record>, StoreError> {
        self.store.find_by_id(self.resource, id).await
    }

    pub async fn insert(&self, payload: Value) -> Result<Record, StoreError> {
        self.store.insert(self.resource, payload).await
    }

    pub async fn update(&self, id: &str, payload: Value) -> Result<Record, StoreError> {
        self.store.update(self.resource, id, payload).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(self.resource, id).await
    }
}

/// Map a request payload onto the resource's columns.
/// Rejects non-objects, unknown keys, storage-managed keys and nested values;
/// required fields and value types are left to each store.
pub(crate) fn resolve_fields(
    resource: Resource,
    payload: Value,
) -> Result<Vec<(&'static Column, Value)>, StoreError> {
    let Value::Object(map) = payload else {
        return Err(StoreError::InvalidPayload { resource });
    };
    let mut fields = Vec::with_capacity(map.len());
    for (key, value) in map {
        if SYSTEM_FIELDS.contains(&key.as_str()) {
            return Err(StoreError::ReadOnlyField { resource, field: key });
        }
        let Some(column) = resource.column(&key) else {
            return Err(StoreError::UnknownField { resource, field: key });
        };
        if value.is_array() || value.is_object() {
            return Err(StoreError::InvalidValue {
                resource,
                field: column.name,
                reason: "expected a scalar".into(),
            });
        }
        fields.push((column, value));
    }
    Ok(fields)
}

/// Like `resolve_fields`, for an update of row `id`. A record echoed back from a read
/// is accepted: a matching `id` and the timestamps are dropped. A different `id` is rejected.
pub(crate) fn resolve_update_fields(
    resource: Resource,
    id: &str,
    payload: Value,
) -> Result<Vec<(&'static Column, Value)>, StoreError> {
    let Value::Object(mut map) = payload else {
        return Err(StoreError::InvalidPayload { resource });
    };
    match map.remove("id") {
        Some(v) if v.as_str() != Some(id) => {
            return Err(StoreError::ReadOnlyField {
                resource,
                field: "id".into(),
            });
        }
        _ => {}
    }
    map.remove("createdAt");
    map.remove("updatedAt");
    resolve_fields(resource, Value::Object(map))
}
