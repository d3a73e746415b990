//! API documentation routes: Swagger UI at `/docs`, the OpenAPI document beside it.

use crate::docs::{openapi, swagger_ui_html, OPENAPI_PATH};
use crate::state::AppState;
use axum::{extract::State, response::Html, routing::get, Json, Router};
use utoipa::openapi::OpenApi;

async fn ui() -> Html<String> {
    Html(swagger_ui_html())
}

async fn document(State(state): State<AppState>) -> Json<OpenApi> {
    Json(openapi(&state.config))
}

pub fn docs_routes(state: AppState) -> Router {
    Router::new()
        .route("/docs", get(ui))
        .route(OPENAPI_PATH, get(document))
        .with_state(state)
}
