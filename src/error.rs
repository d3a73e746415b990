//! Typed errors and HTTP mapping.

use crate::resource::Resource;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Failure of one storage operation. The controller never distinguishes these: all map to 500.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{resource} '{id}' does not exist")]
    NotFound { resource: Resource, id: String },
    #[error("{resource}: missing required field '{field}'")]
    MissingField { resource: Resource, field: &'static str },
    #[error("{resource}: unknown field '{field}'")]
    UnknownField { resource: Resource, field: String },
    #[error("{resource}: field '{field}' is managed by storage")]
    ReadOnlyField { resource: Resource, field: String },
    #[error("{resource}: invalid value for '{field}': {reason}")]
    InvalidValue {
        resource: Resource,
        field: &'static str,
        reason: String,
    },
    #[error("{resource}: payload must be a JSON object")]
    InvalidPayload { resource: Resource },
    #[error("{resource}: foreign key '{field}' violated")]
    ForeignKey { resource: Resource, field: String },
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("migration: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// The five controller operations; each has its own failure message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::List => "Failed to fetch items",
            Operation::Get => "Failed to fetch item",
            Operation::Create => "Failed to create item",
            Operation::Update => "Failed to update item",
            Operation::Delete => "Failed to delete item",
        }
    }
}

pub const NOT_FOUND_MESSAGE: &str = "Item not found";
pub const FALLBACK_MESSAGE: &str = "Something went wrong!";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("item not found")]
    NotFound,
    #[error("{}", .0.failure_message())]
    Operation(Operation),
    /// Anything that escaped a controller, e.g. an unreadable request body.
    #[error("unhandled: {0}")]
    Unhandled(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": NOT_FOUND_MESSAGE }))).into_response()
            }
            ApiError::Operation(op) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": op.failure_message() })),
            )
                .into_response(),
            ApiError::Unhandled(_) => fallback_response(),
        }
    }
}

/// Body returned by the process-wide fallback handler.
pub fn fallback_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "error", "message": FALLBACK_MESSAGE })),
    )
        .into_response()
}
