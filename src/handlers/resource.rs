//! Generic resource controller: list, read, create, update, delete over one bound collection.
//! Every storage failure becomes a 500 with the operation's message; only read reports absence as 404.

use crate::error::{ApiError, Operation, StoreError};
use crate::resource::Resource;
use crate::store::{Collection, Record, Store};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone)]
pub struct ResourceController {
    collection: Collection,
}

impl ResourceController {
    pub fn new(store: Arc<dyn Store>, resource: Resource) -> Self {
        Self {
            collection: Collection::new(store, resource),
        }
    }

    pub fn resource(&self) -> Resource {
        self.collection.resource()
    }

    fn failed(&self, op: Operation, id: Option<&str>, err: StoreError) -> ApiError {
        tracing::error!(resource = %self.resource(), operation = ?op, id, error = %err, "storage operation failed");
        ApiError::Operation(op)
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|essence| {
            let essence = essence.trim().to_ascii_lowercase();
            essence == "application/json" || essence.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Body as sent. A request that is not JSON, or has an empty body, carries no fields;
/// an unreadable JSON body escapes to the fallback handler.
fn payload(headers: &HeaderMap, body: &Bytes) -> Result<Value, ApiError> {
    if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::error!(error = %e, "unreadable request body");
        ApiError::Unhandled(e.to_string())
    })
}

#[instrument(skip_all, fields(resource = %ctl.resource()))]
pub async fn list(State(ctl): State<ResourceController>) -> Result<Json<Vec<Record>>, ApiError> {
    let rows = ctl
        .collection
        .find_all()
        .await
        .map_err(|e| ctl.failed(Operation::List, None, e))?;
    Ok(Json(rows))
}

#[instrument(skip_all, fields(resource = %ctl.resource(), %id))]
pub async fn read(
    State(ctl): State<ResourceController>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    ctl.collection
        .find_by_id(&id)
        .await
        .map_err(|e| ctl.failed(Operation::Get, Some(&id), e))?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[instrument(skip_all, fields(resource = %ctl.resource()))]
pub async fn create(
    State(ctl): State<ResourceController>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let body = payload(&headers, &body)?;
    let row = ctl
        .collection
        .insert(body)
        .await
        .map_err(|e| ctl.failed(Operation::Create, None, e))?;
    tracing::info!(id = ?row.get("id"), "created");
    Ok((StatusCode::CREATED, Json(row)))
}

#[instrument(skip_all, fields(resource = %ctl.resource(), %id))]
pub async fn update(
    State(ctl): State<ResourceController>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Record>, ApiError> {
    let body = payload(&headers, &body)?;
    let row = ctl
        .collection
        .update(&id, body)
        .await
        .map_err(|e| ctl.failed(Operation::Update, Some(&id), e))?;
    Ok(Json(row))
}

#[instrument(skip_all, fields(resource = %ctl.resource(), %id))]
pub async fn delete(
    State(ctl): State<ResourceController>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctl.collection
        .delete(&id)
        .await
        .map_err(|e| ctl.failed(Operation::Delete, Some(&id), e))?;
    Ok(StatusCode::NO_CONTENT)
}
