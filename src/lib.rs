//! Kitch-Katch: generic CRUD REST backend for household food and meal planning.

pub mod app;
pub mod case;
pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod resource;
pub mod routes;
pub mod sql;
pub mod state;
pub mod store;
pub mod telemetry;

pub use app::{bind, build_app, serve};
pub use config::{AppConfig, Environment};
pub use error::{ApiError, ConfigError, Operation, StoreError};
pub use handlers::ResourceController;
pub use resource::Resource;
pub use routes::{api_routes, common_routes, docs_routes, resource_routes};
pub use state::AppState;
pub use store::{ensure_database_exists, Collection, MemoryStore, PgStore, Record, Store};
