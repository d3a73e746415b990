//! Resource routes: one controller per catalogue entry, nested under `/api/<path>`.

use crate::handlers::resource::{create, delete, list, read, update, ResourceController};
use crate::resource::Resource;
use crate::store::Store;
use axum::{routing::get, Router};
use std::sync::Arc;

/// The five CRUD routes of a single resource, relative to its prefix.
pub fn resource_routes(store: Arc<dyn Store>, resource: Resource) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(read).put(update).delete(delete))
        .with_state(ResourceController::new(store, resource))
}

/// Prefix under which a resource is mounted.
pub fn resource_prefix(resource: Resource) -> String {
    format!("/api/{}", resource.path())
}

/// Every resource in the catalogue, each nested at its prefix.
pub fn api_routes(store: Arc<dyn Store>) -> Router {
    Resource::ALL.into_iter().fold(Router::new(), |router, resource| {
        router.nest(
            &resource_prefix(resource),
            resource_routes(store.clone(), resource),
        )
    })
}
