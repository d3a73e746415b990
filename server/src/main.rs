//! Kitch-Katch API server.
//!
//! Run from repo root: `cargo run -p kitchkatch-server`

use kitchkatch::{build_app, ensure_database_exists, serve, telemetry, AppConfig, AppState, PgStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    telemetry::init_tracing();

    ensure_database_exists(&config.database_url).await?;
    let store = PgStore::connect(&config.database_url, config.db_max_connections).await?;
    store.migrate().await?;

    let (host, port) = (config.host.clone(), config.port);
    let docs_url = format!("{}/docs", config.public_url);
    let state = AppState::new(Arc::new(store), config);
    let app = build_app(state);

    tracing::info!("Swagger documentation available at {}", docs_url);
    serve(app, &host, port).await?;
    Ok(())
}
