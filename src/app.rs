//! Application assembly: routers, the fallback error handler, CORS and request tracing.

use crate::error::fallback_response;
use crate::routes::{api_routes, common_routes, docs_routes};
use crate::state::AppState;
use axum::response::Response;
use axum::Router;
use std::any::Any;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

/// Last-resort handler: a panicking request answers 500 and the server keeps serving.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "request handler panicked");
    fallback_response()
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api_routes(state.store.clone()))
        .merge(docs_routes(state.clone()))
        .merge(common_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|req: &axum::http::Request<_>| {
                            let method = req.method().clone();
                            let uri = req.uri().clone();
                            tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                        })
                        .on_response(
                            |res: &axum::http::Response<_>,
                             latency: std::time::Duration,
                             span: &tracing::Span| {
                                let status = res.status();
                                span.record("status", tracing::field::display(status));
                                if status.is_server_error() {
                                    tracing::error!(%status, ?latency, "response");
                                } else {
                                    tracing::info!(%status, ?latency, "response");
                                }
                            },
                        ),
                )
                .layer(CorsLayer::permissive())
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
}

/// Bind the listener; `host` may be an IP literal (v4 or v6) or a hostname.
pub async fn bind(host: &str, port: u16) -> std::io::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((host, port)).await
}

pub async fn serve(app: Router, host: &str, port: u16) -> std::io::Result<()> {
    let listener = bind(host, port).await?;
    tracing::info!("Server is running on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}
